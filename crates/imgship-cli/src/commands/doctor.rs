use imgship_build::eject as eject_mod;
use imgship_build::{BuildContext, RecipeGenerator, RecipeSummary};
use imgship_core::{CONFIG_FILE, ImgshipConfig};
use imgship_docker::{CheckResult, DockerClient};
use std::path::Path;

pub async fn doctor(project_dir: &Path) -> anyhow::Result<()> {
    let config = ImgshipConfig::load_with_env(project_dir);
    let defaults = ImgshipConfig::default();
    let effective = config.as_ref().unwrap_or(&defaults);

    let client = DockerClient::new(&effective.docker.program);
    let mut report = client.doctor().await;

    report.config_file = match &config {
        Ok(_) if project_dir.join(CONFIG_FILE).exists() => CheckResult::ok("Found"),
        Ok(_) => CheckResult::ok("Not found; using defaults"),
        Err(e) => CheckResult::fail(&format!("{e:#}")),
    };

    report.manifest = match BuildContext::open(project_dir)
        .and_then(|ctx| ctx.require_manifest(&effective.recipe.requirements))
    {
        Ok(path) => CheckResult::ok(&path.display().to_string()),
        Err(e) => CheckResult::fail(&e.to_string()),
    };

    report.recipe = recipe_check(project_dir, effective);

    println!();
    println!("{report}");

    if !report.all_passed() {
        anyhow::bail!("some checks failed; see above for details");
    }

    Ok(())
}

fn recipe_check(project_dir: &Path, config: &ImgshipConfig) -> CheckResult {
    if eject_mod::is_ejected(project_dir) {
        let content = match eject_mod::load_ejected_recipe(project_dir) {
            Ok(c) => c,
            Err(e) => return CheckResult::fail(&e.to_string()),
        };
        return match RecipeSummary::inspect(&content).verify_port() {
            Ok(Some(port)) => CheckResult::ok(&format!("project Dockerfile, port {port}")),
            Ok(None) => CheckResult::ok("project Dockerfile, port not declared"),
            Err(e) => CheckResult::fail(&e.to_string()),
        };
    }

    match RecipeGenerator::new(&config.recipe).validate() {
        Ok(()) => CheckResult::ok(&format!("generated, port {}", config.recipe.port)),
        Err(e) => CheckResult::fail(&e.to_string()),
    }
}
