use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::image_ref::{ImageRef, Registry};

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = "imgship.toml";

/// Overrides the configured registry endpoint (`host[:port]`).
pub const ENV_REGISTRY: &str = "IMGSHIP_REGISTRY";

/// Overrides the tag pushed to the registry.
pub const ENV_TAG: &str = "IMGSHIP_TAG";

/// imgship.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImgshipConfig {
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub recipe: RecipeConfig,
    #[serde(default)]
    pub docker: DockerConfig,
}

/// The locally built image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Local repository name
    #[serde(default = "default_image_name")]
    pub name: String,
    /// Development-environment tag applied by the build step
    #[serde(default = "default_image_tag")]
    pub tag: String,
}

/// Where the built image is published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Registry endpoint, `host` or `host:port`
    #[serde(default = "default_registry_endpoint")]
    pub endpoint: String,
    /// Remote repository name (defaults to `[image].name`)
    pub repository: Option<String>,
    /// Remote tag (defaults to `[image].tag`)
    pub tag: Option<String>,
}

/// Inputs to the generated image recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeConfig {
    /// Base runtime image
    #[serde(default = "default_base_image")]
    pub base_image: String,
    /// Working directory inside the image
    #[serde(default = "default_workdir")]
    pub workdir: String,
    /// Dependency manifest installed with pip, relative to the build context
    #[serde(default = "default_requirements")]
    pub requirements: String,
    /// Flask application module (`FLASK_APP`)
    #[serde(default = "default_app")]
    pub app: String,
    /// Address the web server binds (`FLASK_RUN_HOST`)
    #[serde(default = "default_host")]
    pub host: String,
    /// Port the web server listens on; drives both `EXPOSE` and `FLASK_RUN_PORT`
    #[serde(default = "default_port")]
    pub port: u16,
    /// Additional system packages to install via apt-get
    #[serde(default)]
    pub extra_packages: Vec<String>,
    /// Additional static environment variables baked into the image.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Container toolchain invoked for build, tag and push.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerConfig {
    /// CLI program (any docker-compatible CLI, e.g. `podman`)
    #[serde(default = "default_program")]
    pub program: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            name: default_image_name(),
            tag: default_image_tag(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            endpoint: default_registry_endpoint(),
            repository: None,
            tag: None,
        }
    }
}

impl Default for RecipeConfig {
    fn default() -> Self {
        Self {
            base_image: default_base_image(),
            workdir: default_workdir(),
            requirements: default_requirements(),
            app: default_app(),
            host: default_host(),
            port: default_port(),
            extra_packages: Vec::new(),
            env: BTreeMap::new(),
        }
    }
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
        }
    }
}

impl ImgshipConfig {
    /// Load from imgship.toml at the given path, or return defaults if not found.
    pub fn load(project_dir: &Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })
        } else {
            tracing::debug!(path = %config_path.display(), "no config file; using defaults");
            Ok(Self::default())
        }
    }

    /// Load the config file, then apply `IMGSHIP_REGISTRY` / `IMGSHIP_TAG`
    /// from the process environment or a `.env` file in the project directory.
    ///
    /// Variables already set in the process environment win over `.env`.
    pub fn load_with_env(project_dir: &Path) -> crate::Result<Self> {
        let dotenv_loaded = dotenvy::from_path(project_dir.join(".env")).is_ok();
        tracing::debug!(dotenv = dotenv_loaded, "loading imgship config");

        let mut config = Self::load(project_dir)?;
        // arch-lint: allow(no-silent-result-drop) reason="an unset override variable means the config file value applies"
        config.apply_overrides(std::env::var(ENV_REGISTRY).ok(), std::env::var(ENV_TAG).ok())?;
        Ok(config)
    }

    /// Apply registry and tag overrides; blank values are ignored.
    pub fn apply_overrides(
        &mut self,
        registry: Option<String>,
        tag: Option<String>,
    ) -> crate::Result<()> {
        if let Some(registry) = registry.filter(|r| !r.trim().is_empty()) {
            let parsed =
                Registry::parse(registry.trim()).map_err(|e| crate::Error::InvalidEnvOverride {
                    key: ENV_REGISTRY,
                    reason: e.to_string(),
                })?;
            tracing::debug!(registry = %parsed, "registry overridden from environment");
            self.registry.endpoint = parsed.to_string();
        }
        if let Some(tag) = tag.filter(|t| !t.trim().is_empty()) {
            tracing::debug!(tag = %tag.trim(), "tag overridden from environment");
            self.registry.tag = Some(tag.trim().to_owned());
        }
        Ok(())
    }

    /// Reference the build step applies to the freshly built image.
    pub fn local_image(&self) -> crate::Result<ImageRef> {
        ImageRef::local(&self.image.name, &self.image.tag)
    }

    /// Registry-qualified reference used by both the tag and push steps.
    pub fn remote_image(&self) -> crate::Result<ImageRef> {
        let registry = Registry::parse(&self.registry.endpoint)?;
        ImageRef::qualified(
            registry,
            self.registry
                .repository
                .as_deref()
                .unwrap_or(&self.image.name),
            self.registry.tag.as_deref().unwrap_or(&self.image.tag),
        )
    }
}

fn default_image_name() -> String {
    "reconciliation-service".to_owned()
}

fn default_image_tag() -> String {
    "dev".to_owned()
}

fn default_registry_endpoint() -> String {
    "localhost:5000".to_owned()
}

fn default_base_image() -> String {
    "python:3.11-slim".to_owned()
}

fn default_workdir() -> String {
    "/app".to_owned()
}

fn default_requirements() -> String {
    "requirements.txt".to_owned()
}

fn default_app() -> String {
    "app.py".to_owned()
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

fn default_port() -> u16 {
    5786
}

fn default_program() -> String {
    "docker".to_owned()
}
