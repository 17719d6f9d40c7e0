//! OCI Image Configuration Parsing
//!
//! Parses the image configuration JSON blob that defines:
//! - Default runtime configuration (user, env, cmd, entrypoint)
//! - Filesystem layer information
//! - Image metadata and history
//!
//! See: https://github.com/opencontainers/image-spec/blob/main/config.md

use crate::digest::Digest;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// OCI Image Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OciImageConfig {
    /// CPU architecture (e.g., "amd64", "arm64")
    pub architecture: String,

    /// Operating system (e.g., "linux")
    pub os: String,

    /// OS version (optional, mainly for Windows)
    #[serde(rename = "os.version", skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,

    /// Runtime configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ContainerConfig>,

    /// Layer DiffIDs (uncompressed layer digests)
    pub rootfs: RootFs,

    /// History entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<History>>,

    /// Image creation timestamp (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Author of the image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Container runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContainerConfig {
    /// User to run as (may be "user", "user:group", "uid", or "uid:gid")
    #[serde(rename = "User", skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Exposed ports (e.g., {"8080/tcp": {}})
    #[serde(rename = "ExposedPorts", skip_serializing_if = "Option::is_none")]
    pub exposed_ports: Option<HashMap<String, EmptyObject>>,

    /// Environment variables (["KEY=VALUE", ...])
    #[serde(rename = "Env", skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<String>>,

    /// Entrypoint command
    #[serde(rename = "Entrypoint", skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<Vec<String>>,

    /// Default command (appended to entrypoint)
    #[serde(rename = "Cmd", skip_serializing_if = "Option::is_none")]
    pub cmd: Option<Vec<String>>,

    /// Volumes (mount points)
    #[serde(rename = "Volumes", skip_serializing_if = "Option::is_none")]
    pub volumes: Option<HashMap<String, EmptyObject>>,

    /// Working directory
    #[serde(rename = "WorkingDir", skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,

    /// Labels (key-value metadata)
    #[serde(rename = "Labels", skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,

    /// Stop signal (e.g., "SIGTERM")
    #[serde(rename = "StopSignal", skip_serializing_if = "Option::is_none")]
    pub stop_signal: Option<String>,
}

/// Empty JSON object {} - used for ports and volumes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmptyObject {}

/// Rootfs layer information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootFs {
    /// Type (always "layers")
    #[serde(rename = "type")]
    pub fs_type: String,

    /// Layer DiffIDs (uncompressed content digests)
    pub diff_ids: Vec<Digest>,
}

/// Image history entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    /// Creation timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Command that created this layer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    /// Comment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Whether this is an empty (metadata-only) layer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_layer: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = format!(
            r#"{{
                "architecture": "amd64",
                "os": "linux",
                "config": {{
                    "User": "1000:1000",
                    "Env": ["PATH=/usr/local/bin:/usr/bin:/bin", "HOME=/home/user"],
                    "Cmd": ["/bin/sh"],
                    "WorkingDir": "/app",
                    "ExposedPorts": {{ "8080/tcp": {{}} }}
                }},
                "rootfs": {{
                    "type": "layers",
                    "diff_ids": ["sha256:{}"]
                }},
                "history": [
                    {{ "created_by": "COPY . /app", "empty_layer": false }}
                ]
            }}"#,
            "ef".repeat(32)
        );

        let config: OciImageConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.architecture, "amd64");
        assert_eq!(config.os, "linux");
        assert_eq!(config.rootfs.fs_type, "layers");
        assert_eq!(config.rootfs.diff_ids.len(), 1);
        assert_eq!(config.rootfs.diff_ids[0].algorithm(), "sha256");

        let container_config = config.config.unwrap();
        assert_eq!(container_config.user, Some("1000:1000".to_string()));
        assert_eq!(container_config.working_dir, Some("/app".to_string()));
        assert!(container_config
            .exposed_ports
            .unwrap()
            .contains_key("8080/tcp"));

        let history = config.history.unwrap();
        assert_eq!(history[0].created_by, Some("COPY . /app".to_string()));
    }

    #[test]
    fn test_minimal_config() {
        let json = format!(
            r#"{{
                "architecture": "arm64",
                "os": "linux",
                "rootfs": {{ "type": "layers", "diff_ids": ["sha256:{}"] }}
            }}"#,
            "01".repeat(32)
        );

        let config: OciImageConfig = serde_json::from_str(&json).unwrap();
        assert!(config.config.is_none());
        assert!(config.history.is_none());
        assert!(config.created.is_none());
    }

    #[test]
    fn test_serialize_skips_absent_fields() {
        let config = OciImageConfig {
            architecture: "amd64".to_string(),
            os: "linux".to_string(),
            os_version: None,
            config: None,
            rootfs: RootFs {
                fs_type: "layers".to_string(),
                diff_ids: vec![],
            },
            history: None,
            created: None,
            author: None,
        };

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("os.version"));
        assert!(!json.contains("history"));
    }
}
