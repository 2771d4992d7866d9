pub mod cost;
pub mod parse;
pub mod r#trait;

pub use cost::{calculate_cost, CostError};
pub use parse::{parse_tasks, ParseError};
pub use r#trait::{Completion, TaskExtractor, TokenUsage};
