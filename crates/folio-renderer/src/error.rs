//! Error types for the rendering pipeline.

use std::string::FromUtf8Error;

/// Error while numbering sections in rendered HTML.
///
/// Never fatal for a render: the pipeline keeps the un-numbered HTML and
/// records the error as a warning.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PostprocessError {
    /// HTML could not be tokenized.
    #[error("HTML parse error")]
    XmlParse(#[from] quick_xml::Error),

    /// Header attributes could not be read.
    #[error("HTML attribute error")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    /// Text could not be decoded.
    #[error("encoding error")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// Writing the rewritten HTML failed.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// Rewritten HTML is not valid UTF-8.
    #[error("UTF-8 error")]
    Utf8(#[from] FromUtf8Error),
}
