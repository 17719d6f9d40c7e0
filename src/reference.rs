//! Image Reference Parsing
//!
//! Parses Docker-style image references like:
//! - nginx
//! - nginx:1.25
//! - myuser/myapp:v1.0
//! - ghcr.io/owner/repo:tag
//! - registry.example.com:5000/app@sha256:abc...

use crate::digest::Digest;
use crate::{RegistryError, Result};

/// Parsed image reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference {
    /// Registry host (e.g., "docker.io", "ghcr.io")
    pub registry: String,

    /// Repository path (e.g., "library/nginx", "myuser/myapp")
    pub repository: String,

    /// Tag (e.g., "latest", "v1.0")
    pub tag: String,

    /// Digest - takes precedence over tag when present
    pub digest: Option<Digest>,
}

impl ImageReference {
    /// Parse an image reference string
    ///
    /// Handles various formats:
    /// - `nginx` -> docker.io/library/nginx:latest
    /// - `nginx:1.25` -> docker.io/library/nginx:1.25
    /// - `myuser/myapp` -> docker.io/myuser/myapp:latest
    /// - `ghcr.io/owner/repo:tag`
    /// - `registry:5000/app@sha256:abc...`
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() {
            return Err(RegistryError::InvalidReference(
                "Empty image reference".to_string(),
            ));
        }

        // Split off digest if present
        let (ref_part, digest) = if let Some((r, d)) = s.split_once('@') {
            (r, Some(Digest::parse(d)?))
        } else {
            (s, None)
        };

        // Determine if the first component is a registry
        let parts: Vec<&str> = ref_part.splitn(2, '/').collect();

        let (registry, rest) = if parts.len() == 1 {
            // No slash - just an image name like "nginx"
            ("docker.io", parts[0])
        } else {
            let first = parts[0];
            // Check if first part looks like a registry (has dot, colon, or is "localhost")
            let is_registry = first.contains('.')
                || first.contains(':')
                || first == "localhost"
                || first.starts_with("localhost:");

            if is_registry {
                (first, parts[1])
            } else {
                // It's a user/repo format like "myuser/myapp"
                ("docker.io", ref_part)
            }
        };

        // Parse repository and tag from the rest
        let (repository, tag) = if let Some((r, t)) = rest.split_once(':') {
            (r.to_string(), t.to_string())
        } else {
            (rest.to_string(), "latest".to_string())
        };

        if repository.is_empty() {
            return Err(RegistryError::InvalidReference(format!(
                "Missing repository in reference: {}",
                s
            )));
        }

        // Add "library/" prefix for Docker Hub official images
        let repository = if registry == "docker.io" && !repository.contains('/') {
            format!("library/{}", repository)
        } else {
            repository
        };

        // Normalize Docker Hub registry name
        let registry = match registry {
            "index.docker.io" | "registry-1.docker.io" | "registry.hub.docker.com" => {
                "docker.io".to_string()
            }
            r => r.to_string(),
        };

        Ok(Self {
            registry,
            repository,
            tag,
            digest,
        })
    }

    /// Create a copy of this reference pinned to a digest
    pub fn with_digest(&self, digest: Digest) -> Self {
        Self {
            registry: self.registry.clone(),
            repository: self.repository.clone(),
            tag: "".to_string(),
            digest: Some(digest),
        }
    }

    /// Get the full reference string
    pub fn full_name(&self) -> String {
        if let Some(digest) = &self.digest {
            format!("{}/{}@{}", self.registry, self.repository, digest)
        } else {
            format!("{}/{}:{}", self.registry, self.repository, self.tag)
        }
    }

    /// Get the base API endpoint for this registry
    pub fn api_endpoint(&self) -> String {
        if self.registry == "docker.io" {
            "https://registry-1.docker.io".to_string()
        } else if self.registry.contains(':') || self.registry == "localhost" {
            // Local registry with port - use HTTP
            format!("http://{}", self.registry)
        } else {
            format!("https://{}", self.registry)
        }
    }

    /// Get the reference to use in API calls (digest or tag)
    pub fn api_reference(&self) -> &str {
        match &self.digest {
            Some(digest) => digest.as_str(),
            None => &self.tag,
        }
    }
}

impl std::fmt::Display for ImageReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

impl std::str::FromStr for ImageReference {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
