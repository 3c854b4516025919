//! Shared helpers for the input plugins: ZIP containers, text decoding,
//! XML access, MIME lookup and Markdown builders.

pub mod archive;
pub mod encoding;
pub mod markdown;
pub mod mime;
pub mod xml;
