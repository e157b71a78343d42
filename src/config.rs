use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_XAPI_VERSION: &str = "1.0.1";
pub const DEFAULT_BATCH_SIZE: u64 = 20;
pub const DEFAULT_PLATFORM_NAME: &str = "Moodle";

#[derive(Debug, Clone)]
pub struct BackfillConfig {
    pub version: u32,
    pub lrs: LrsConfig,
    pub platform: PlatformConfig,
    pub batch_size: u64,
}

#[derive(Debug, Clone)]
pub struct LrsConfig {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub xapi_version: String,
}

#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub url: String,
    pub name: String,
    pub db: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawBackfillConfig {
    version: Option<u32>,
    lrs: Option<RawLrsConfig>,
    platform: Option<RawPlatformConfig>,
    upload: Option<RawUploadConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawLrsConfig {
    endpoint: Option<String>,
    username: Option<String>,
    password: Option<String>,
    xapi_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawPlatformConfig {
    url: Option<String>,
    name: Option<String>,
    db: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawUploadConfig {
    batch_size: Option<u64>,
}

pub fn load_config(path: &Path) -> Result<BackfillConfig> {
    let raw =
        std::fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let parsed: RawBackfillConfig =
        toml::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    validate_config(parsed, path)
}

fn validate_config(raw: RawBackfillConfig, path: &Path) -> Result<BackfillConfig> {
    let version = raw
        .version
        .ok_or_else(|| anyhow::anyhow!("{} missing required `version`", path.display()))?;
    if version != 1 {
        bail!(
            "{} has unsupported version {version}; expected version = 1",
            path.display()
        );
    }

    let lrs = raw
        .lrs
        .ok_or_else(|| anyhow::anyhow!("{} missing `[lrs]` section", path.display()))?;
    let endpoint = require_key(lrs.endpoint, path, "[lrs].endpoint")?;
    let lrs = LrsConfig {
        endpoint: endpoint.trim_end_matches('/').to_string(),
        username: require_key(lrs.username, path, "[lrs].username")?,
        password: require_key(lrs.password, path, "[lrs].password")?,
        xapi_version: sanitize_optional(lrs.xapi_version)
            .unwrap_or_else(|| DEFAULT_XAPI_VERSION.to_string()),
    };

    let platform = raw
        .platform
        .ok_or_else(|| anyhow::anyhow!("{} missing `[platform]` section", path.display()))?;
    let url = require_key(platform.url, path, "[platform].url")?;
    let platform = PlatformConfig {
        url: url.trim_end_matches('/').to_string(),
        name: sanitize_optional(platform.name)
            .unwrap_or_else(|| DEFAULT_PLATFORM_NAME.to_string()),
        db: sanitize_optional(platform.db).map(PathBuf::from),
    };

    let batch_size = raw
        .upload
        .and_then(|u| u.batch_size)
        .unwrap_or(DEFAULT_BATCH_SIZE);
    if batch_size == 0 {
        bail!(
            "{} has `[upload].batch_size = 0`; expected at least 1",
            path.display()
        );
    }

    Ok(BackfillConfig {
        version,
        lrs,
        platform,
        batch_size,
    })
}

fn require_key(value: Option<String>, path: &Path, key: &str) -> Result<String> {
    sanitize_optional(value)
        .ok_or_else(|| anyhow::anyhow!("{} missing `{key}` in config", path.display()))
}

fn sanitize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
