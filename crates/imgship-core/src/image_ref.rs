//! Registry-qualified container image references.
//!
//! An [`ImageRef`] is rendered as `host[:port]/repository:tag` when it carries
//! a [`Registry`], or `repository:tag` for a purely local image. Digest
//! references (`name@sha256:...`) are not supported.

use std::fmt;
use std::str::FromStr;

/// Tag used when a reference omits one.
pub const DEFAULT_TAG: &str = "latest";

const MAX_TAG_LEN: usize = 128;

/// Registry endpoint an image is pushed to.
///
/// # Examples
///
/// ```
/// use imgship_core::Registry;
///
/// let registry = Registry::parse("registry.local:5000").unwrap();
/// assert_eq!(registry.host, "registry.local");
/// assert_eq!(registry.port, Some(5000));
/// assert_eq!(registry.to_string(), "registry.local:5000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Registry {
    pub host: String,
    pub port: Option<u16>,
}

impl Registry {
    pub fn new(host: impl Into<String>, port: Option<u16>) -> crate::Result<Self> {
        let host = host.into();
        validate_host(&host)?;
        if port == Some(0) {
            return Err(crate::Error::InvalidRegistry {
                registry: format!("{host}:0"),
                reason: "port must be between 1 and 65535",
            });
        }
        Ok(Self { host, port })
    }

    /// Parse `host` or `host:port`.
    pub fn parse(s: &str) -> crate::Result<Self> {
        match s.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| crate::Error::InvalidRegistry {
                    registry: s.to_owned(),
                    reason: "port must be a number between 1 and 65535",
                })?;
                Self::new(host, Some(port))
            }
            None => Self::new(s, None),
        }
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{port}", self.host),
            None => f.write_str(&self.host),
        }
    }
}

impl FromStr for Registry {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s)
    }
}

/// A container image reference.
///
/// # Examples
///
/// ```
/// use imgship_core::{ImageRef, Registry};
///
/// let local = ImageRef::local("reconciliation-service", "dev").unwrap();
/// assert_eq!(local.to_string(), "reconciliation-service:dev");
///
/// let remote = local.with_registry(Registry::parse("localhost:5000").unwrap());
/// assert_eq!(remote.to_string(), "localhost:5000/reconciliation-service:dev");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    pub registry: Option<Registry>,
    pub repository: String,
    pub tag: String,
}

impl ImageRef {
    /// Reference to an image that only exists in the local engine.
    pub fn local(repository: impl Into<String>, tag: impl Into<String>) -> crate::Result<Self> {
        let image = Self {
            registry: None,
            repository: repository.into(),
            tag: tag.into(),
        };
        image.validate()?;
        Ok(image)
    }

    /// Reference qualified with the registry it is pushed to.
    pub fn qualified(
        registry: Registry,
        repository: impl Into<String>,
        tag: impl Into<String>,
    ) -> crate::Result<Self> {
        let image = Self {
            registry: Some(registry),
            repository: repository.into(),
            tag: tag.into(),
        };
        image.validate()?;
        Ok(image)
    }

    /// Same repository and tag, bound to `registry`.
    pub fn with_registry(&self, registry: Registry) -> Self {
        Self {
            registry: Some(registry),
            repository: self.repository.clone(),
            tag: self.tag.clone(),
        }
    }

    pub fn is_qualified(&self) -> bool {
        self.registry.is_some()
    }

    /// Parse `[host[:port]/]repository[:tag]`.
    ///
    /// The first path segment is treated as a registry when it contains a
    /// `.` or `:`, or is `localhost`. A missing tag defaults to `latest`.
    pub fn parse(s: &str) -> crate::Result<Self> {
        let invalid = |reason| crate::Error::InvalidImageRef {
            reference: s.to_owned(),
            reason,
        };

        if s.is_empty() {
            return Err(invalid("reference is empty"));
        }
        if s.contains('@') {
            return Err(invalid("digest references are not supported"));
        }

        let (registry, remainder) = match s.split_once('/') {
            Some((first, rest))
                if first.contains('.') || first.contains(':') || first == "localhost" =>
            {
                (Some(Registry::parse(first)?), rest)
            }
            _ => (None, s),
        };

        let last_slash = remainder.rfind('/');
        let (repository, tag) = match remainder.rfind(':') {
            Some(colon) if last_slash.is_none_or(|slash| colon > slash) => {
                (&remainder[..colon], &remainder[colon + 1..])
            }
            _ => (remainder, DEFAULT_TAG),
        };

        let image = Self {
            registry,
            repository: repository.to_owned(),
            tag: tag.to_owned(),
        };
        image.validate().map_err(|e| match e {
            crate::Error::InvalidImageRef { reason, .. } => invalid(reason),
            other => other,
        })?;
        Ok(image)
    }

    fn validate(&self) -> crate::Result<()> {
        let invalid = |reason| crate::Error::InvalidImageRef {
            reference: self.to_string(),
            reason,
        };

        if self.repository.is_empty() {
            return Err(invalid("repository is empty"));
        }
        if self.repository.starts_with('/')
            || self.repository.ends_with('/')
            || self.repository.contains("//")
        {
            return Err(invalid("repository has an empty path component"));
        }
        if !self
            .repository
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "._-/".contains(c))
        {
            return Err(invalid(
                "repository may only contain lowercase letters, digits, '.', '_', '-' and '/'",
            ));
        }

        if self.tag.is_empty() {
            return Err(invalid("tag is empty"));
        }
        if self.tag.len() > MAX_TAG_LEN {
            return Err(invalid("tag is longer than 128 characters"));
        }
        if self.tag.starts_with('.') || self.tag.starts_with('-') {
            return Err(invalid("tag may not start with '.' or '-'"));
        }
        if !self
            .tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._-".contains(c))
        {
            return Err(invalid(
                "tag may only contain letters, digits, '.', '_' and '-'",
            ));
        }

        Ok(())
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(registry) = &self.registry {
            write!(f, "{registry}/")?;
        }
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

impl FromStr for ImageRef {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s)
    }
}

fn validate_host(host: &str) -> crate::Result<()> {
    let invalid = |reason| crate::Error::InvalidRegistry {
        registry: host.to_owned(),
        reason,
    };

    if host.is_empty() {
        return Err(invalid("host is empty"));
    }
    if !host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(invalid(
            "host may only contain letters, digits, '.' and '-'",
        ));
    }
    Ok(())
}
