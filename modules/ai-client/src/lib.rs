pub mod error;
pub mod gemini;
pub mod traits;

pub use error::{AiError, Result};
pub use gemini::Gemini;
pub use traits::{Completion, TextModel};
