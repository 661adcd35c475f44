use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Site-wide settings, read from `fern.yaml` at the site root.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Global site name, substituted for `$site:title`.
    pub title: String,
    /// Absolute base for feed item links.
    pub base_url: String,
    /// Base repository URL for edit and create-new-file deep links.
    pub repo: String,
    /// Page id exempt from orphan reporting.
    pub home: String,
    pub source_dir: String,
    pub res_dir: String,
    pub out_dir: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "fern".to_string(),
            base_url: String::new(),
            repo: String::new(),
            home: "index".to_string(),
            source_dir: "pages".to_string(),
            res_dir: "res".to_string(),
            out_dir: "out".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SiteConfigRaw {
    site: Option<SiteMetaRaw>,
    dirs: Option<DirsRaw>,
}

#[derive(Debug, Deserialize)]
struct SiteMetaRaw {
    title: Option<String>,
    base_url: Option<String>,
    repo: Option<String>,
    home: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirsRaw {
    source: Option<String>,
    res: Option<String>,
    out: Option<String>,
}

/// Loads `fern.yaml`. A missing file yields the defaults; malformed YAML is
/// an error.
pub fn load_site_config(path: &Path) -> Result<SiteConfig> {
    if !path.exists() {
        return Ok(SiteConfig::default());
    }
    let raw_text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let raw: SiteConfigRaw = serde_yaml::from_str(&raw_text)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let mut config = SiteConfig::default();
    if let Some(site) = raw.site {
        if let Some(title) = site.title {
            config.title = title;
        }
        if let Some(base_url) = site.base_url {
            config.base_url = base_url;
        }
        if let Some(repo) = site.repo {
            config.repo = repo;
        }
        if let Some(home) = site.home {
            config.home = home;
        }
    }
    if let Some(dirs) = raw.dirs {
        if let Some(source) = dirs.source {
            config.source_dir = source;
        }
        if let Some(res) = dirs.res {
            config.res_dir = res;
        }
        if let Some(out) = dirs.out {
            config.out_dir = out;
        }
    }
    Ok(config)
}
