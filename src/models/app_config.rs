use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;

pub const SOURCE_URL: &str = "SOURCE_URL";
pub const SOURCE_TOKEN: &str = "SOURCE_TOKEN";
pub const DESTINATION_URL: &str = "DESTINATION_URL";
pub const DESTINATION_TOKEN: &str = "DESTINATION_TOKEN";

const KNOWN_KEYS: [&str; 4] = [SOURCE_URL, SOURCE_TOKEN, DESTINATION_URL, DESTINATION_TOKEN];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} not found. Set it in the env file or the environment")]
    Missing(&'static str),
    #[error("{key} is not a valid URL ({value}): {message}")]
    InvalidUrl {
        key: &'static str,
        value: String,
        message: String,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
}

/// Key/value pairs read from a `.env`-style file.
#[derive(Debug, Clone, Default)]
pub struct EnvFile {
    values: HashMap<String, String>,
}

impl EnvFile {
    /// Reads `path`. A missing file only logs a warning and yields an empty set.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(
                    "{} file not found. Ensure environment variables are set.",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Read {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }

    pub fn parse(content: &str) -> Self {
        let values = content.lines().filter_map(parse_line).collect();
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Malformed lines yield `None` and are skipped by the caller.
fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() || key.contains('#') {
        return None;
    }

    Some((key.to_string(), strip_quotes(value.trim()).to_string()))
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Base URL and bearer token of one service instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub base_url: String,
    pub token: String,
}

impl Endpoint {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    settings: HashMap<&'static str, String>,
}

impl AppConfig {
    pub fn from_env(env_file: &Path) -> Result<Self, ConfigError> {
        let file = EnvFile::load(env_file)?;
        Ok(Self::from_sources(&file, |key| std::env::var(key).ok()))
    }

    /// File entries take precedence over `ambient`.
    pub fn from_sources(file: &EnvFile, ambient: impl Fn(&str) -> Option<String>) -> Self {
        let settings = KNOWN_KEYS
            .iter()
            .filter_map(|&key| {
                file.get(key)
                    .map(str::to_string)
                    .or_else(|| ambient(key))
                    .filter(|value| !value.is_empty())
                    .map(|value| (key, value))
            })
            .collect();

        Self { settings }
    }

    pub fn source(&self) -> Result<Endpoint, ConfigError> {
        self.endpoint(SOURCE_URL, SOURCE_TOKEN)
    }

    pub fn destination(&self) -> Result<Endpoint, ConfigError> {
        self.endpoint(DESTINATION_URL, DESTINATION_TOKEN)
    }

    fn endpoint(&self, url_key: &'static str, token_key: &'static str) -> Result<Endpoint, ConfigError> {
        let base_url = self.require(url_key)?;
        reqwest::Url::parse(base_url).map_err(|e| ConfigError::InvalidUrl {
            key: url_key,
            value: base_url.to_string(),
            message: e.to_string(),
        })?;
        let token = self.require(token_key)?;

        Ok(Endpoint {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn require(&self, key: &'static str) -> Result<&str, ConfigError> {
        self.settings
            .get(key)
            .map(String::as_str)
            .ok_or(ConfigError::Missing(key))
    }
}
