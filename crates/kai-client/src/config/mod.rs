//! Module config loader (strict parsing).

pub mod schema;

use std::fs;

use kai_core::error::{KaiError, Result};

pub use schema::{EndpointSection, ModuleConfig, ModuleSection};

pub fn load_from_file(path: &str) -> Result<ModuleConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| KaiError::Config(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ModuleConfig> {
    let cfg: ModuleConfig =
        serde_yaml::from_str(s).map_err(|e| KaiError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
