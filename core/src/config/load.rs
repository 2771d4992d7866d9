use std::path::{Path, PathBuf};

use super::types::{AppConfig, MAX_LLM_TOKENS};

/// Get the default taskbridge data directory: ~/.taskbridge
pub fn get_taskbridge_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".taskbridge"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    load(None)
}

/// Load `explicit` when given, otherwise search the default locations; then
/// apply environment overrides and validate.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<AppConfig> {
    let mut cfg = match explicit {
        Some(path) => load_from_path(path)?,
        None => {
            // Priority 1: ~/.taskbridge/config.toml (highest)
            let home_config = get_taskbridge_data_dir()?.join("config.toml");
            // Priority 2: ./config.toml (current directory)
            let local_config = Path::new("config.toml");

            if home_config.exists() {
                load_from_path(&home_config)?
            } else if local_config.exists() {
                load_from_path(local_config)?
            } else {
                AppConfig::default()
            }
        }
    };

    // Environment variable overrides (Priority 0: highest)
    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());

    cfg.validate().map_err(|e| anyhow::anyhow!(e))?;
    Ok(cfg)
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)?;
    let cfg = toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))?;
    Ok(cfg)
}

fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty("NOTION_API_KEY") {
        cfg.directory.api_key = v;
    }
    if let Some(v) = non_empty("NOTION_TASKS_DB") {
        cfg.directory.tasks_database_id = v;
    }
    if let Some(v) = non_empty("NOTION_PROJECTS_DB") {
        cfg.directory.projects_database_id = Some(v);
    }
    if let Some(v) = non_empty("OPENAI_API_KEY") {
        cfg.llm.api_key = v;
    }
    if let Some(v) = non_empty("MAX_TOKENS") {
        cfg.llm.max_tokens = clamp_max_tokens(&v);
    }
    if let Some(v) = non_empty("TASKBRIDGE_MATCH_THRESHOLD") {
        match v.trim().parse::<f64>() {
            Ok(t) => cfg.matcher.threshold = t,
            Err(_) => tracing::warn!(value = %v, "ignoring non-numeric TASKBRIDGE_MATCH_THRESHOLD"),
        }
    }
}

fn clamp_max_tokens(raw: &str) -> u32 {
    match raw.trim().parse::<u32>() {
        Ok(0) | Err(_) => MAX_LLM_TOKENS,
        Ok(n) => n.min(MAX_LLM_TOKENS),
    }
}
