pub mod client;
pub mod docker;
pub mod executor;
pub mod pipeline;

pub use client::{BuildError, CheckResult, DockerClient, DoctorReport, PushError, TagError};
pub use docker::DockerError;
pub use executor::{DockerExecutor, RealExecutor};
pub use pipeline::{COMPLETION_MESSAGE, PipelineError, PublishOutcome, PublishPlan, Publisher, Step};
