use std::path::{Path, PathBuf};

use imgship_core::RecipeConfig;

use crate::eject;
use crate::recipe::{RecipeError, RecipeGenerator, RecipeSummary};

/// Directory inside the build context that holds the generated recipe.
pub const GENERATED_DIR: &str = ".imgship";

/// Where a build's recipe came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeSource {
    /// Rendered from `[recipe]` into `.imgship/Dockerfile`.
    Generated,
    /// The project's own `Dockerfile`.
    Project,
}

/// A recipe ready to hand to the container toolchain.
#[derive(Debug, Clone)]
pub struct PreparedRecipe {
    pub path: PathBuf,
    pub source: RecipeSource,
    /// Port agreed on by `EXPOSE` and `FLASK_RUN_PORT`, when both are declared.
    pub port: Option<u16>,
}

/// The directory tree made available to the build step.
#[derive(Debug, Clone)]
pub struct BuildContext {
    root: PathBuf,
}

impl BuildContext {
    pub fn open(root: &Path) -> Result<Self, ContextError> {
        if !root.is_dir() {
            return Err(ContextError::NotADirectory(root.to_path_buf()));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fails unless the dependency manifest exists in the context.
    pub fn require_manifest(&self, manifest: &str) -> Result<PathBuf, ContextError> {
        let path = self.root.join(manifest);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ContextError::MissingManifest(path))
        }
    }

    /// Select or render the recipe for this context.
    ///
    /// A project `Dockerfile` takes precedence; otherwise the recipe is
    /// rendered from `config` and written to `.imgship/Dockerfile`.
    pub fn prepare_recipe(&self, config: &RecipeConfig) -> Result<PreparedRecipe, ContextError> {
        self.require_manifest(&config.requirements)?;

        if eject::is_ejected(&self.root) {
            let content = eject::load_ejected_recipe(&self.root)?;
            let port = RecipeSummary::inspect(&content).verify_port()?;
            if port.is_none() {
                tracing::warn!(
                    "project Dockerfile does not declare both EXPOSE and FLASK_RUN_PORT; port consistency not checked"
                );
            }
            return Ok(PreparedRecipe {
                path: eject::recipe_path(&self.root),
                source: RecipeSource::Project,
                port,
            });
        }

        let content = RecipeGenerator::new(config).render()?;
        let path = self.write_generated_recipe(&content)?;
        Ok(PreparedRecipe {
            path,
            source: RecipeSource::Generated,
            port: Some(config.port),
        })
    }

    fn write_generated_recipe(&self, content: &str) -> Result<PathBuf, ContextError> {
        let dir = self.root.join(GENERATED_DIR);
        std::fs::create_dir_all(&dir).map_err(|e| ContextError::Create {
            path: dir.clone(),
            source: e,
        })?;

        let path = dir.join(eject::RECIPE_FILE);
        std::fs::write(&path, content).map_err(|e| ContextError::WriteRecipe {
            path: path.clone(),
            source: e,
        })?;

        tracing::debug!(path = %path.display(), "generated recipe written");
        Ok(path)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("build context {0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("dependency manifest not found at {0}")]
    MissingManifest(PathBuf),

    #[error("failed to create directory {path}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write recipe at {path}")]
    WriteRecipe {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Recipe(#[from] RecipeError),

    #[error(transparent)]
    Eject(#[from] eject::EjectError),
}
