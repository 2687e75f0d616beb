//! Model-driven generation: the tool-calling loop.

pub mod text;

pub use text::{generate_text, DEFAULT_MAX_TURNS};
