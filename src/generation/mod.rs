//! Answer synthesis and prompt construction

pub mod answer;
pub mod prompt;

pub use answer::AnswerEngine;
