pub mod extract;
pub mod gemini;
pub mod media;

pub use gemini::{generate_content, InlineImage};
