use std::path::{Path, PathBuf};

/// File name of the project-owned recipe.
pub const RECIPE_FILE: &str = "Dockerfile";

/// Writes the rendered recipe to `<project>/Dockerfile`.
///
/// After ejecting, `imgship` builds from that file instead of
/// generating one.
pub fn eject(project_dir: &Path, recipe: &str) -> Result<PathBuf, EjectError> {
    let path = recipe_path(project_dir);
    if path.exists() {
        return Err(EjectError::AlreadyEjected(path));
    }

    std::fs::write(&path, recipe).map_err(|e| EjectError::Write {
        path: path.clone(),
        source: e,
    })?;

    Ok(path)
}

/// Check if the project carries its own recipe.
pub fn is_ejected(project_dir: &Path) -> bool {
    recipe_path(project_dir).is_file()
}

pub fn recipe_path(project_dir: &Path) -> PathBuf {
    project_dir.join(RECIPE_FILE)
}

/// Load the project-owned recipe.
pub fn load_ejected_recipe(project_dir: &Path) -> Result<String, EjectError> {
    let path = recipe_path(project_dir);
    std::fs::read_to_string(&path).map_err(|e| EjectError::Read { path, source: e })
}

#[derive(Debug, thiserror::Error)]
pub enum EjectError {
    #[error("recipe already ejected at {0}; edit it directly or delete it to re-eject")]
    AlreadyEjected(PathBuf),
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read project recipe at {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}
