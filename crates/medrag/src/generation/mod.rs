//! Grounded prompt construction and answer synthesis

pub mod pipeline;
pub mod prompt;

pub use pipeline::{Answer, AnswerPipeline};
pub use prompt::PromptBuilder;
