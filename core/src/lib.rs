pub mod api;
pub mod config;
pub mod context;
pub mod directory;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod input;
pub mod llm;
pub mod tasks;
