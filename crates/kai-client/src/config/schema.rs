use serde::Deserialize;

use kai_core::error::{KaiError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleConfig {
    pub version: u32,

    pub module: ModuleSection,

    #[serde(default)]
    pub endpoint: EndpointSection,
}

impl ModuleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(KaiError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        self.module.validate()?;
        self.endpoint.validate()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleSection {
    pub id: String,
    pub secret: String,
}

impl ModuleSection {
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(KaiError::Config("module.id must not be empty".into()));
        }
        if self.secret.is_empty() {
            return Err(KaiError::Config("module.secret must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for EndpointSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl EndpointSection {
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(KaiError::Config("endpoint.host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(KaiError::Config("endpoint.port must not be 0".into()));
        }
        Ok(())
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    2203
}
