use imgship_build::RecipeGenerator;
use imgship_core::ImgshipConfig;
use std::path::Path;

pub fn eject(project_dir: &Path) -> anyhow::Result<()> {
    let config = ImgshipConfig::load(project_dir)?;
    let recipe = RecipeGenerator::new(&config.recipe).render()?;

    let path = imgship_build::eject::eject(project_dir, &recipe)?;

    println!("Ejected recipe to {}", path.display());
    println!("You can now edit it directly. imgship will build from this file.");
    Ok(())
}
