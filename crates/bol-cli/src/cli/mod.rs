//! Terminal-facing pieces of the binary.

pub mod line_editor;

pub use line_editor::LineEditor;
