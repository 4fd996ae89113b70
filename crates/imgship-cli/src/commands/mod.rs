mod doctor;
mod eject;
mod init;
mod publish;
mod recipe;

use imgship_docker::PipelineError;

pub use doctor::doctor;
pub use eject::eject;
pub use init::init_project;
pub use publish::publish;
pub use recipe::recipe;

/// Exit status for a failed command: the container tool's own code when a
/// pipeline step failed, otherwise `1`.
pub(crate) fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<PipelineError>()
        .map(PipelineError::exit_code)
        .and_then(|code| u8::try_from(code).ok())
        .filter(|code| *code != 0)
        .unwrap_or(1)
}
