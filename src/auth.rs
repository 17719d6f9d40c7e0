//! Registry Credential Configuration
//!
//! Credential carriers plus Docker config.json discovery:
//! 1. Read config from $DOCKER_CONFIG or ~/.docker/config.json
//! 2. Decode auth entries (explicit pair, base64 auth, identity token)
//! 3. Look up credentials per registry with name normalization
//!
//! Exchanging credentials for bearer tokens is the transport layer's
//! job; this module only stores and resolves what it would send.

use crate::proxy::{ProxyAuthenticator, ProxyChallenge};
use crate::{RegistryError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Registry credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// A fixed credential pair answers every challenge with itself
impl ProxyAuthenticator for Credentials {
    fn respond(&self, _challenge: &ProxyChallenge) -> Option<Credentials> {
        Some(self.clone())
    }
}

/// Docker config.json structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DockerConfig {
    /// Registry auths (base64 encoded credentials)
    #[serde(default)]
    pub auths: HashMap<String, DockerAuthEntry>,

    /// Credential store (e.g., "osxkeychain", "secretservice")
    #[serde(rename = "credsStore", skip_serializing_if = "Option::is_none")]
    pub creds_store: Option<String>,

    /// Per-registry credential helpers
    #[serde(rename = "credHelpers", default)]
    pub cred_helpers: HashMap<String, String>,
}

/// Docker auth entry
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DockerAuthEntry {
    /// Base64-encoded "username:password"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,

    /// Username
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Email (legacy)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Identity token
    #[serde(rename = "identitytoken", skip_serializing_if = "Option::is_none")]
    pub identity_token: Option<String>,
}

impl DockerAuthEntry {
    /// Resolve this entry to usable credentials
    ///
    /// Tries an explicit username/password pair first, then the
    /// base64-encoded auth field, then an identity token.
    pub fn to_credentials(&self) -> Option<Credentials> {
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            return Some(Credentials {
                username: username.clone(),
                password: password.clone(),
            });
        }

        if let Some(auth) = &self.auth {
            if let Ok(decoded) =
                base64::Engine::decode(&base64::engine::general_purpose::STANDARD, auth)
            {
                if let Ok(s) = String::from_utf8(decoded) {
                    if let Some((username, password)) = s.split_once(':') {
                        return Some(Credentials {
                            username: username.to_string(),
                            password: password.to_string(),
                        });
                    }
                }
            }
        }

        if let Some(token) = &self.identity_token {
            return Some(Credentials {
                username: "<token>".to_string(),
                password: token.clone(),
            });
        }

        None
    }
}

impl DockerConfig {
    /// Load Docker config from the default location
    pub fn load() -> Result<Option<Self>> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&config_path)?;
        let config: DockerConfig = serde_json::from_str(&contents)?;

        Ok(Some(config))
    }

    /// Get the Docker config path
    pub fn config_path() -> Result<PathBuf> {
        // Check DOCKER_CONFIG env var first
        if let Ok(path) = std::env::var("DOCKER_CONFIG") {
            return Ok(PathBuf::from(path).join("config.json"));
        }

        // Default to ~/.docker/config.json
        let home = dirs::home_dir().ok_or_else(|| {
            RegistryError::AuthConfig("Could not determine home directory".to_string())
        })?;

        Ok(home.join(".docker").join("config.json"))
    }

    /// Look up credentials for a registry host
    ///
    /// Tries the normalized config.json key first (Docker Hub aliases map
    /// to the legacy index key), then the name as given.
    pub fn credentials_for(&self, registry: &str) -> Option<Credentials> {
        let normalized = normalize_registry(registry);

        self.auths
            .get(&normalized)
            .and_then(|entry| entry.to_credentials())
            .or_else(|| {
                self.auths
                    .get(registry)
                    .and_then(|entry| entry.to_credentials())
            })
    }
}

/// Normalize a registry name to its config.json key form
pub fn normalize_registry(registry: &str) -> String {
    match registry {
        "docker.io" | "index.docker.io" | "registry-1.docker.io" => {
            "https://index.docker.io/v1/".to_string()
        }
        r if r.starts_with("http://") || r.starts_with("https://") => r.to_string(),
        r => format!("https://{}", r),
    }
}
