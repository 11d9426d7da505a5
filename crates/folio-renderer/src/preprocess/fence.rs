//! Fenced code tracking for line-based rewrites.
//!
//! Line rewrites must leave fenced code alone, so the preprocessor feeds
//! every line through a [`FenceTracker`] before touching it.

/// Tracks whether the current line is inside a fenced code block.
///
/// Fences open with three or more backticks or tildes, indented at most
/// three spaces. A fence closes on a line of the same character that is at
/// least as long as the opening run, followed only by whitespace.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<Fence>,
}

#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: char,
    len: usize,
}

impl FenceTracker {
    pub(crate) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Feed one line. Returns `true` if the line opened or closed a fence.
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let Some(run) = fence_run(line) else {
            return false;
        };

        match self.open {
            Some(fence) => {
                let closes = run.marker == fence.marker
                    && run.len >= fence.len
                    && run.rest.chars().all(char::is_whitespace);
                if closes {
                    self.open = None;
                }
                closes
            }
            None => {
                // Backtick fences may not carry backticks in their info string.
                if run.marker == '`' && run.rest.contains('`') {
                    return false;
                }
                self.open = Some(Fence {
                    marker: run.marker,
                    len: run.len,
                });
                true
            }
        }
    }
}

struct FenceRun<'a> {
    marker: char,
    len: usize,
    rest: &'a str,
}

fn fence_run(line: &str) -> Option<FenceRun<'_>> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }

    let marker = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let len = trimmed.chars().take_while(|&c| c == marker).count();
    (len >= 3).then(|| FenceRun {
        marker,
        len,
        rest: &trimmed[len..],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_outside_fence() {
        assert!(!FenceTracker::default().in_fence());
    }

    #[test]
    fn test_backtick_fence_with_language() {
        let mut tracker = FenceTracker::default();
        assert!(tracker.update("```ruby"));
        assert!(tracker.in_fence());
        assert!(!tracker.update("[^1]: inside code"));
        assert!(tracker.in_fence());
        assert!(tracker.update("```"));
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_tilde_fence_ignores_backticks() {
        let mut tracker = FenceTracker::default();
        assert!(tracker.update("~~~"));
        assert!(!tracker.update("```"));
        assert!(tracker.in_fence());
        assert!(tracker.update("~~~~"));
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_closing_run_must_be_long_enough() {
        let mut tracker = FenceTracker::default();
        assert!(tracker.update("````"));
        assert!(!tracker.update("```"));
        assert!(tracker.in_fence());
        assert!(tracker.update("````"));
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_closing_fence_rejects_info_string() {
        let mut tracker = FenceTracker::default();
        assert!(tracker.update("```"));
        assert!(!tracker.update("```ruby"));
        assert!(tracker.in_fence());
    }

    #[test]
    fn test_indent_limit() {
        let mut tracker = FenceTracker::default();
        assert!(!tracker.update("    ```"));
        assert!(!tracker.in_fence());
        assert!(tracker.update("   ```"));
        assert!(tracker.in_fence());
    }

    #[test]
    fn test_inline_code_is_not_a_fence() {
        let mut tracker = FenceTracker::default();
        assert!(!tracker.update("``code``"));
        assert!(!tracker.update("```a` b"));
        assert!(!tracker.in_fence());
    }
}
