pub mod openai;
mod prompt;

pub use openai::OpenAiExtractor;
