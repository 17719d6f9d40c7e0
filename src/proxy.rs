//! Transport Proxy Configuration
//!
//! Routes a registry client's outbound connections through a forward
//! proxy:
//! - HTTP, HTTPS, and SOCKS5 proxy endpoints
//! - Optional credential responder for proxies that challenge
//! - Adapter onto `reqwest::ClientBuilder` for the consuming transport
//!
//! Only configuration lives here. Reaching the proxy, and any failure
//! doing so, happens in the transport layer that consumes it.

use crate::auth::Credentials;
use crate::{RegistryError, Result};
use std::fmt;
use std::sync::Arc;

/// Protocol used to reach the forward proxy itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyScheme {
    Http,
    Https,
    Socks5,
}

impl ProxyScheme {
    /// Conventional port for proxies of this scheme
    pub fn default_port(&self) -> u16 {
        match self {
            ProxyScheme::Http => 80,
            ProxyScheme::Https => 443,
            ProxyScheme::Socks5 => 1080,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyScheme::Http => "http",
            ProxyScheme::Https => "https",
            ProxyScheme::Socks5 => "socks5",
        }
    }
}

impl fmt::Display for ProxyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProxyScheme {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "http" => Ok(ProxyScheme::Http),
            "https" => Ok(ProxyScheme::Https),
            "socks5" => Ok(ProxyScheme::Socks5),
            other => Err(RegistryError::InvalidProxy(format!(
                "Unsupported proxy scheme: {}",
                other
            ))),
        }
    }
}

/// Forward proxy endpoint descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proxy {
    /// Protocol spoken to the proxy
    pub scheme: ProxyScheme,

    /// Proxy host name or address
    pub host: String,

    /// Proxy port
    pub port: u16,
}

impl Proxy {
    /// Create a proxy descriptor from its parts
    pub fn new(scheme: ProxyScheme, host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme,
            host: host.into(),
            port,
        }
    }

    /// Parse a proxy address string
    ///
    /// Handles various formats:
    /// - `proxy.example.com` -> http, port 80
    /// - `proxy.example.com:3128`
    /// - `http://proxy.example.com:3128`
    /// - `socks5://10.0.0.1:1080`
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() {
            return Err(RegistryError::InvalidProxy(
                "Empty proxy address".to_string(),
            ));
        }

        let (scheme, rest) = if let Some((scheme, rest)) = s.split_once("://") {
            (scheme.parse::<ProxyScheme>()?, rest)
        } else {
            (ProxyScheme::Http, s)
        };

        let rest = rest.trim_end_matches('/');

        let (host, port) = if let Some((host, port)) = rest.rsplit_once(':') {
            let port = port.parse::<u16>().map_err(|_| {
                RegistryError::InvalidProxy(format!("Invalid proxy port: {}", port))
            })?;
            (host, port)
        } else {
            (rest, scheme.default_port())
        };

        if host.is_empty() {
            return Err(RegistryError::InvalidProxy(format!(
                "Missing proxy host: {}",
                s
            )));
        }

        Ok(Self {
            scheme,
            host: host.to_string(),
            port,
        })
    }

    /// Proxy URL in `scheme://host:port` form
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// Build the reqwest proxy for this endpoint
    pub fn to_reqwest(&self) -> Result<reqwest::Proxy> {
        Ok(reqwest::Proxy::all(self.url())?)
    }
}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url())
    }
}

impl std::str::FromStr for Proxy {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Challenge issued when a proxy demands credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyChallenge {
    /// Host of the challenging proxy
    pub host: String,

    /// Port of the challenging proxy
    pub port: u16,

    /// Authentication realm, when the proxy advertises one
    pub realm: Option<String>,
}

/// Supplies credentials when a proxy challenges a connection
///
/// Implementations answer with credentials for the given challenge, or
/// `None` to leave it unanswered.
pub trait ProxyAuthenticator: Send + Sync {
    fn respond(&self, challenge: &ProxyChallenge) -> Option<Credentials>;
}

/// Immutable proxy configuration for an outbound HTTP client
///
/// Bundles a proxy endpoint with an optional challenge responder. Built
/// once when the client is configured and never mutated; cloning shares
/// the responder.
#[derive(Clone)]
pub struct ProxyConfig {
    proxy: Proxy,
    authenticator: Option<Arc<dyn ProxyAuthenticator>>,
}

impl ProxyConfig {
    /// Configuration for a proxy that does not require authentication
    pub fn new(proxy: Proxy) -> Self {
        Self {
            proxy,
            authenticator: None,
        }
    }

    /// Configuration for a proxy that may challenge for credentials
    pub fn with_authenticator(proxy: Proxy, authenticator: Arc<dyn ProxyAuthenticator>) -> Self {
        Self {
            proxy,
            authenticator: Some(authenticator),
        }
    }

    /// The proxy endpoint
    pub fn proxy(&self) -> &Proxy {
        &self.proxy
    }

    /// The challenge responder, if one was supplied
    pub fn authenticator(&self) -> Option<&dyn ProxyAuthenticator> {
        self.authenticator.as_deref()
    }

    /// Route a client builder through this proxy
    ///
    /// When a responder is present it is challenged once for the proxy
    /// endpoint and the returned credentials are installed as proxy
    /// basic auth. No connection is made here.
    pub fn apply(&self, builder: reqwest::ClientBuilder) -> Result<reqwest::ClientBuilder> {
        let mut proxy = self.proxy.to_reqwest()?;

        if let Some(authenticator) = self.authenticator.as_deref() {
            let challenge = ProxyChallenge {
                host: self.proxy.host.clone(),
                port: self.proxy.port,
                realm: None,
            };

            if let Some(credentials) = authenticator.respond(&challenge) {
                proxy = proxy.basic_auth(&credentials.username, &credentials.password);
            }
        }

        Ok(builder.proxy(proxy))
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("proxy", &self.proxy)
            .field("authenticator", &self.authenticator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingAuthenticator {
        seen: Mutex<Option<ProxyChallenge>>,
    }

    impl ProxyAuthenticator for RecordingAuthenticator {
        fn respond(&self, challenge: &ProxyChallenge) -> Option<Credentials> {
            *self.seen.lock().unwrap() = Some(challenge.clone());
            Some(Credentials::new("squid", "hunter2"))
        }
    }

    #[test]
    fn test_config_round_trip() {
        let proxy = Proxy::new(ProxyScheme::Http, "proxy.example.com", 3128);
        let config = ProxyConfig::new(proxy.clone());

        assert_eq!(config.proxy(), &proxy);
        assert!(config.authenticator().is_none());
    }

    #[test]
    fn test_config_with_authenticator() {
        let proxy = Proxy::new(ProxyScheme::Http, "proxy.example.com", 3128);
        let auth = Arc::new(Credentials::new("user", "pass"));
        let config = ProxyConfig::with_authenticator(proxy, auth);

        let responder = config.authenticator().unwrap();
        let challenge = ProxyChallenge {
            host: "proxy.example.com".to_string(),
            port: 3128,
            realm: None,
        };
        let creds = responder.respond(&challenge).unwrap();
        assert_eq!(creds.username, "user");
        assert_eq!(creds.password, "pass");
    }

    #[test]
    fn test_parse_full() {
        let p = Proxy::parse("socks5://10.0.0.1:1080").unwrap();
        assert_eq!(p.scheme, ProxyScheme::Socks5);
        assert_eq!(p.host, "10.0.0.1");
        assert_eq!(p.port, 1080);
    }

    #[test]
    fn test_parse_defaults() {
        let p = Proxy::parse("proxy.local").unwrap();
        assert_eq!(p.scheme, ProxyScheme::Http);
        assert_eq!(p.port, 80);

        let p = Proxy::parse("https://proxy.local").unwrap();
        assert_eq!(p.scheme, ProxyScheme::Https);
        assert_eq!(p.port, 443);

        let p = Proxy::parse("proxy.local:3128").unwrap();
        assert_eq!(p.scheme, ProxyScheme::Http);
        assert_eq!(p.port, 3128);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Proxy::parse("").is_err());
        assert!(Proxy::parse("ftp://proxy.local:21").is_err());
        assert!(Proxy::parse("proxy.local:notaport").is_err());
        assert!(Proxy::parse("http://:8080").is_err());
    }

    #[test]
    fn test_url_round_trip() {
        let p = Proxy::parse("http://proxy.example.com:3128").unwrap();
        assert_eq!(p.url(), "http://proxy.example.com:3128");
        assert_eq!(p.to_string().parse::<Proxy>().unwrap(), p);
    }

    #[test]
    fn test_apply_challenges_once_for_proxy_endpoint() {
        let proxy = Proxy::new(ProxyScheme::Http, "proxy.example.com", 3128);
        let auth = Arc::new(RecordingAuthenticator {
            seen: Mutex::new(None),
        });
        let config = ProxyConfig::with_authenticator(proxy, auth.clone());

        let builder = config.apply(reqwest::Client::builder()).unwrap();
        assert!(builder.build().is_ok());

        let seen = auth.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.host, "proxy.example.com");
        assert_eq!(seen.port, 3128);
        assert!(seen.realm.is_none());
    }

    #[test]
    fn test_apply_without_authenticator() {
        let config = ProxyConfig::new(Proxy::parse("http://proxy.local:8080").unwrap());
        assert!(config.apply(reqwest::Client::builder()).is_ok());
    }

    #[test]
    fn test_debug_hides_authenticator() {
        let config = ProxyConfig::with_authenticator(
            Proxy::new(ProxyScheme::Http, "proxy.local", 8080),
            Arc::new(Credentials::new("user", "secret")),
        );

        let debug = format!("{:?}", config);
        assert!(debug.contains("authenticator: true"));
        assert!(!debug.contains("secret"));
    }
}
