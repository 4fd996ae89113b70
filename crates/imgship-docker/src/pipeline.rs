//! The publish pipeline: build → tag → push → notify.
//!
//! Steps run strictly in order and the first failure aborts the run. A
//! failed tag or push leaves the locally built image in place unless the
//! plan asks for pruning.

use std::io::Write;
use std::path::Path;

use imgship_build::{BuildContext, ContextError, PreparedRecipe};
use imgship_core::{ImageRef, ImgshipConfig, RecipeConfig};

use crate::client::{BuildError, DockerClient, PushError, TagError};
use crate::executor::{DockerExecutor, RealExecutor};

/// Printed once, after a successful push.
pub const COMPLETION_MESSAGE: &str = "Image published successfully.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Build,
    Tag,
    Push,
}

/// Everything one publish run needs, resolved up front.
#[derive(Debug, Clone)]
pub struct PublishPlan {
    pub context: BuildContext,
    pub recipe: RecipeConfig,
    /// Development-environment reference applied by the build step.
    pub local: ImageRef,
    /// Registry-qualified reference; the tag step applies exactly this
    /// reference and the push step publishes exactly this reference.
    pub remote: ImageRef,
    /// Remove images created by this run when tag or push fails.
    pub prune_on_failure: bool,
}

impl PublishPlan {
    pub fn from_config(project_dir: &Path, config: &ImgshipConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            context: BuildContext::open(project_dir).map_err(PipelineError::Context)?,
            recipe: config.recipe.clone(),
            local: config.local_image()?,
            remote: config.remote_image()?,
            prune_on_failure: false,
        })
    }
}

/// Result of a successful publish run.
#[derive(Debug)]
pub struct PublishOutcome {
    pub local: ImageRef,
    pub remote: ImageRef,
    pub recipe: PreparedRecipe,
    pub completed: Vec<Step>,
}

/// Drives a plan through the container toolchain.
pub struct Publisher<E: DockerExecutor = RealExecutor> {
    client: DockerClient<E>,
}

impl Publisher<RealExecutor> {
    pub fn new(program: &str) -> Self {
        Self {
            client: DockerClient::new(program),
        }
    }
}

impl<E: DockerExecutor> Publisher<E> {
    pub fn with_client(client: DockerClient<E>) -> Self {
        Self { client }
    }

    /// Run build, tag, push; progress lines and the completion message go to `out`.
    pub async fn run<W: Write>(
        &self,
        plan: &PublishPlan,
        out: &mut W,
    ) -> Result<PublishOutcome, PipelineError> {
        let mut completed = Vec::with_capacity(3);

        progress(out, &format!("Building {} ...", plan.local))?;
        let recipe = plan
            .context
            .prepare_recipe(&plan.recipe)
            .map_err(PipelineError::Context)?;
        tracing::debug!(recipe = %recipe.path.display(), source = ?recipe.source, "recipe prepared");
        self.client
            .build(plan.context.root(), &recipe.path, &plan.local)
            .await?;
        completed.push(Step::Build);

        progress(out, &format!("Tagging {} as {} ...", plan.local, plan.remote))?;
        if let Err(e) = self.client.tag(&plan.local, &plan.remote).await {
            self.prune(plan, Step::Tag).await;
            return Err(e.into());
        }
        completed.push(Step::Tag);

        progress(out, &format!("Pushing {} ...", plan.remote))?;
        if let Err(e) = self.client.push(&plan.remote).await {
            self.prune(plan, Step::Push).await;
            return Err(e.into());
        }
        completed.push(Step::Push);

        progress(out, COMPLETION_MESSAGE)?;

        Ok(PublishOutcome {
            local: plan.local.clone(),
            remote: plan.remote.clone(),
            recipe,
            completed,
        })
    }

    async fn prune(&self, plan: &PublishPlan, failed: Step) {
        if !plan.prune_on_failure {
            tracing::debug!(step = ?failed, image = %plan.local, "leaving local image in place");
            return;
        }

        let mut images = vec![&plan.local];
        if failed == Step::Push {
            images.insert(0, &plan.remote);
        }

        for image in images {
            if !self.client.image_exists(image).await {
                continue;
            }
            match self.client.remove_image(image).await {
                Ok(()) => tracing::info!(%image, "removed image after failed {failed:?}"),
                Err(e) => tracing::warn!(%image, error = %e, "failed to remove image"),
            }
        }
    }
}

fn progress<W: Write>(out: &mut W, line: &str) -> Result<(), PipelineError> {
    writeln!(out, "{line}").map_err(PipelineError::Output)?;
    out.flush().map_err(PipelineError::Output)
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] imgship_core::Error),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Tag(#[from] TagError),

    #[error(transparent)]
    Push(#[from] PushError),

    #[error("failed to write progress output")]
    Output(#[source] std::io::Error),
}

impl PipelineError {
    /// Step the pipeline stopped at, if it got as far as running one.
    pub fn step(&self) -> Option<Step> {
        match self {
            Self::Context(_) | Self::Build(_) => Some(Step::Build),
            Self::Tag(_) => Some(Step::Tag),
            Self::Push(_) => Some(Step::Push),
            Self::Config(_) | Self::Output(_) => None,
        }
    }

    /// Exit status for the process: the failing tool's own code when there is one.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Build(BuildError::Build { source })
            | Self::Tag(TagError::Tag { source })
            | Self::Push(PushError::Push { source }) => source.exit_code(),
            _ => 1,
        }
    }
}
