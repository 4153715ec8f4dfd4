use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
    /// Directory served under `/public` (icons and other static assets).
    #[serde(default)]
    pub public_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_icon")]
    pub default_icon: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_icon: default_icon(),
        }
    }
}

fn default_icon() -> String {
    "default-icon.png".to_string()
}

/// One group (course category) backed by a single directory of PDFs.
#[derive(Debug, Deserialize, Clone)]
pub struct GroupConfig {
    pub name: String,
    pub path: PathBuf,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    config.resolve_paths(base);
    config.validate()?;

    Ok(config)
}

impl Config {
    /// Rewrites relative group and public directories against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for group in &mut self.groups {
            if group.path.is_relative() {
                group.path = base.join(&group.path);
            }
        }
        if let Some(dir) = self.server.public_dir.as_mut() {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.bind.trim().is_empty() {
            anyhow::bail!("server.bind must not be empty");
        }

        if self.groups.is_empty() {
            anyhow::bail!("at least one [[groups]] entry must be configured");
        }

        let mut seen = HashSet::new();
        for group in &self.groups {
            if group.name.trim().is_empty() {
                anyhow::bail!("group name must not be empty (path: {})", group.path.display());
            }
            if !seen.insert(group.name.as_str()) {
                anyhow::bail!("duplicate group name: '{}'", group.name);
            }
        }

        Ok(())
    }
}
