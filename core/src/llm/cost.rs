use thiserror::Error;

use super::r#trait::TokenUsage;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CostError {
    #[error("invalid usage: prompt and completion token counts must be non-zero")]
    InvalidUsage,
    #[error("invalid model name")]
    InvalidModel,
}

/// Dollar rates per 1K tokens: (prompt, completion).
fn rates(model: &str) -> (f64, f64) {
    if model.contains("gpt-4-32") {
        (0.06, 0.12)
    } else if model.contains("gpt-4") {
        (0.03, 0.06)
    } else {
        (0.002, 0.002)
    }
}

pub fn calculate_cost(usage: &TokenUsage, model: &str) -> Result<f64, CostError> {
    if usage.prompt_tokens == 0 || usage.completion_tokens == 0 {
        return Err(CostError::InvalidUsage);
    }
    if model.trim().is_empty() {
        return Err(CostError::InvalidModel);
    }
    let (prompt_rate, completion_rate) = rates(model);
    Ok(usage.prompt_tokens as f64 / 1000.0 * prompt_rate
        + usage.completion_tokens as f64 / 1000.0 * completion_rate)
}
