use imgship_core::ImgshipConfig;
use imgship_docker::{PublishPlan, Publisher};
use std::path::Path;

/// Execute the build → tag → push pipeline.
pub async fn publish(project_dir: &Path, prune_on_failure: bool) -> anyhow::Result<()> {
    let config = ImgshipConfig::load_with_env(project_dir)?;

    let mut plan = PublishPlan::from_config(project_dir, &config)?;
    plan.prune_on_failure = prune_on_failure;

    tracing::debug!(
        local = %plan.local,
        remote = %plan.remote,
        program = %config.docker.program,
        "publish plan resolved"
    );

    let publisher = Publisher::new(&config.docker.program);
    let mut stdout = std::io::stdout().lock();
    publisher.run(&plan, &mut stdout).await?;

    Ok(())
}
