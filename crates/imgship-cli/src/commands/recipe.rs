use imgship_build::RecipeGenerator;
use imgship_core::ImgshipConfig;
use std::path::Path;

/// Print the generated recipe without building.
pub fn recipe(project_dir: &Path) -> anyhow::Result<()> {
    let config = ImgshipConfig::load(project_dir)?;
    let recipe = RecipeGenerator::new(&config.recipe).render()?;
    print!("{recipe}");
    Ok(())
}
