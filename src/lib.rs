//! OCI Registry Client Configuration and Wire Models
//!
//! Building blocks for clients of OCI Distribution registries:
//! - Docker Hub (docker.io)
//! - GitHub Container Registry (ghcr.io)
//! - Other OCI-compliant registries
//!
//! Features:
//! - Transport proxy configuration with optional proxy authentication
//! - Registry error envelope parsing (`{"errors": [...]}`)
//! - Image reference and content digest parsing
//! - Manifest and image configuration wire formats
//! - Docker config.json credential discovery
//!
//! The crate carries configuration and data only. A transport layer
//! consumes these types to talk to registries; nothing here performs
//! network I/O.

mod auth;
mod config;
mod digest;
mod errors;
mod manifest;
mod proxy;
mod reference;

pub use auth::{Credentials, DockerAuthEntry, DockerConfig};
pub use config::{ContainerConfig, EmptyObject, History, OciImageConfig, RootFs};
pub use digest::Digest;
pub use errors::{ApiError, ErrorResponse};
pub use manifest::{
    parse_manifest, Descriptor, DockerManifestV2, ManifestDescriptor, ManifestKind, ManifestList,
    MediaType, OciManifest, Platform,
};
pub use proxy::{Proxy, ProxyAuthenticator, ProxyChallenge, ProxyConfig, ProxyScheme};
pub use reference::ImageReference;

use thiserror::Error;

/// Errors that can occur while building or decoding registry data
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Invalid image reference: {0}")]
    InvalidReference(String),

    #[error("Invalid digest: {0}")]
    InvalidDigest(String),

    #[error("Invalid proxy address: {0}")]
    InvalidProxy(String),

    #[error("Auth configuration error: {0}")]
    AuthConfig(String),

    #[error("Registry reported errors: {0}")]
    Api(#[from] ErrorResponse),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// OCI Image - represents a fully resolved container image
///
/// Assembled by transfer code once the manifest and configuration blobs
/// have been fetched; read-only afterwards.
#[derive(Debug, Clone)]
pub struct OciImage {
    /// Image reference (e.g., "docker.io/library/nginx:latest")
    pub reference: ImageReference,

    /// Image manifest
    pub manifest: OciManifest,

    /// Image configuration
    pub config: OciImageConfig,

    /// Manifest digest (content-addressable ID)
    pub digest: Digest,

    /// Total compressed size of all layers
    pub size: u64,
}

impl OciImage {
    /// Get the default command to run
    pub fn default_cmd(&self) -> Option<Vec<String>> {
        self.config.config.as_ref().and_then(|c| c.cmd.clone())
    }

    /// Get the entrypoint
    pub fn entrypoint(&self) -> Option<Vec<String>> {
        self.config
            .config
            .as_ref()
            .and_then(|c| c.entrypoint.clone())
    }

    /// Get environment variables
    pub fn env(&self) -> Vec<String> {
        self.config
            .config
            .as_ref()
            .and_then(|c| c.env.clone())
            .unwrap_or_default()
    }

    /// Get working directory
    pub fn working_dir(&self) -> Option<String> {
        self.config
            .config
            .as_ref()
            .and_then(|c| c.working_dir.clone())
    }

    /// Get the user to run as
    pub fn user(&self) -> Option<String> {
        self.config.config.as_ref().and_then(|c| c.user.clone())
    }

    /// Get exposed ports
    pub fn exposed_ports(&self) -> Vec<String> {
        self.config
            .config
            .as_ref()
            .and_then(|c| c.exposed_ports.clone())
            .map(|ports| ports.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Get volumes defined in the image
    pub fn volumes(&self) -> Vec<String> {
        self.config
            .config
            .as_ref()
            .and_then(|c| c.volumes.clone())
            .map(|vols| vols.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Get labels
    pub fn labels(&self) -> std::collections::HashMap<String, String> {
        self.config
            .config
            .as_ref()
            .and_then(|c| c.labels.clone())
            .unwrap_or_default()
    }
}
