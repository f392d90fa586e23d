use directories::UserDirs;
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::constants::{
    CONFIG_DIR, CONFIG_FILE_NAME, DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS,
    ENTER_API_BASE_URL, ENTER_API_SECRET, ENV_API_SECRET, ENV_API_URL,
};
use crate::external_api::ApiError;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// ConvertKit API url, without trailing slash
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Account API secret, sent in the body of every request
    pub api_secret: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Config {
    pub fn new(api_base_url: &str, api_secret: &str) -> Result<Self, ApiError> {
        Ok(Self {
            api_base_url: validate_url(api_base_url)?,
            api_secret: validate_api_secret(api_secret)?,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        })
    }

    /// Ask the user for the config values
    pub fn create<R, W>(mut input: R, mut output: W) -> Result<Self, ApiError>
    where
        R: BufRead,
        W: Write,
    {
        let api_base_url = prompt(&mut input, &mut output, ENTER_API_BASE_URL)?;
        let api_base_url = if api_base_url.is_empty() {
            DEFAULT_API_BASE_URL.to_string()
        } else {
            api_base_url
        };
        let api_secret = prompt(&mut input, &mut output, ENTER_API_SECRET)?;
        Self::new(&api_base_url, &api_secret)
    }

    /// Read the config file at `path`, then apply environment overrides.
    ///
    /// A missing file is fine as long as the secret comes from the environment.
    pub fn resolve<F>(path: &Path, env_lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_file = if path.exists() {
            debug!("[Config] reading {}", path.display());
            let file = File::open(path)?;
            Some(serde_json::from_reader::<_, Self>(file)?)
        } else {
            None
        };

        let env_secret = env_lookup(ENV_API_SECRET).filter(|value| !value.is_empty());
        let env_url = env_lookup(ENV_API_URL).filter(|value| !value.is_empty());

        let mut config = match (from_file, env_secret.as_deref()) {
            (Some(config), _) => config,
            (None, Some(secret)) => Self {
                api_base_url: default_api_base_url(),
                api_secret: secret.to_string(),
                request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            },
            (None, None) => return Err(ApiError::MissingConfig(path.display().to_string())),
        };
        if let Some(secret) = env_secret {
            config.api_secret = secret;
        }
        if let Some(url) = env_url {
            config.api_base_url = url;
        }

        config.api_base_url = validate_url(&config.api_base_url)?;
        config.api_secret = validate_api_secret(&config.api_secret)?;
        Ok(config)
    }

    /// Config from the default location and the process environment
    pub fn load() -> Result<Self, ApiError> {
        Self::resolve(&get_config_path()?, |key| std::env::var(key).ok())
    }

    pub fn save(&self, path: &Path) -> Result<(), ApiError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = create_private_file(path)?;
        serde_json::to_writer_pretty(file, self)?;
        info!("[Config] saved to {}", path.display());
        Ok(())
    }
}

// The file holds the API secret: owner read/write only
#[cfg(unix)]
fn create_private_file(path: &Path) -> Result<File, ApiError> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies to newly created files
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn create_private_file(path: &Path) -> Result<File, ApiError> {
    Ok(File::create(path)?)
}

/// `~/.config/kitfields/config.json`
pub fn get_config_path() -> Result<PathBuf, ApiError> {
    UserDirs::new()
        .ok_or(ApiError::NotFoundUserDir)
        .map(|user_dirs| user_dirs.home_dir().join(CONFIG_DIR).join(CONFIG_FILE_NAME))
}

fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    text: &str,
) -> Result<String, ApiError> {
    output.write_all(text.as_bytes())?;
    output.flush()?;
    let mut value = String::new();
    input.read_line(&mut value)?;
    Ok(value.trim().to_string())
}

/// The entered string must be a URL
fn validate_url(value: &str) -> Result<String, ApiError> {
    let regex = Regex::new(r"^https?://.+$").map_err(|e| ApiError::Parse(e.to_string()))?;
    let value = value.trim();
    if !regex.is_match(value) {
        return Err(ApiError::InvalidUrl);
    }
    Ok(value.trim_end_matches('/').to_string())
}

fn validate_api_secret(value: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(ApiError::InvalidApiSecret);
    }
    Ok(value.to_string())
}
