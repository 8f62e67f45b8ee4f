//! A terminal screenplay editor.
//!
//! A [`Screenplay`] is a list of typed [`Paragraph`]s edited through a cursor,
//! with coalescing undo and character name autocompletion. [`fountain`] reads
//! and writes the plain text interchange format, [`render`] lays a screenplay
//! out for the terminal.

pub mod error;
pub mod fountain;
pub mod paragraph;
pub mod render;
pub mod screenplay;
pub mod theme;

pub use error::{Error, Result};
pub use paragraph::{Paragraph, ParagraphType};
pub use screenplay::{Cursor, Screenplay};
