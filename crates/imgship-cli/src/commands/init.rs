use imgship_core::{CONFIG_FILE, ImgshipConfig};
use std::path::Path;

const CONFIG_TEMPLATE: &str = r#"[image]
# name = "reconciliation-service"
# tag = "dev"

[registry]
# endpoint = "localhost:5000"
# repository = "reconciliation-service"
# tag = "dev"

[recipe]
# base_image = "python:3.11-slim"
# requirements = "requirements.txt"
# app = "app.py"
# port = 5786
# extra_packages = []

[docker]
# program = "docker"
"#;

/// Initialize imgship in an existing project.
pub fn init_project(project_dir: &Path) -> anyhow::Result<()> {
    if !project_dir.is_dir() {
        anyhow::bail!("{} is not a directory", project_dir.display());
    }

    let config_path = project_dir.join(CONFIG_FILE);
    if config_path.exists() {
        eprintln!("{CONFIG_FILE} already exists, skipping");
    } else {
        std::fs::write(&config_path, CONFIG_TEMPLATE)?;
        println!("Created {CONFIG_FILE}");
    }

    let config = ImgshipConfig::load(project_dir)?;
    if !project_dir.join(&config.recipe.requirements).is_file() {
        println!();
        println!(
            "Warning: {} not found; the build step will fail until it exists.",
            config.recipe.requirements
        );
    }

    println!();
    println!("Next steps:");
    println!();
    println!("  1. Point [registry].endpoint at your registry (or set IMGSHIP_REGISTRY)");
    println!("  2. Check your setup:");
    println!("     imgship doctor");
    println!("  3. Publish:");
    println!("     imgship");

    Ok(())
}
