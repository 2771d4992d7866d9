pub mod factory;
pub mod http;
pub mod llm;
pub mod notion;
pub mod services;
