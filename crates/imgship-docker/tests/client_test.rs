use std::path::Path;

use imgship_core::ImageRef;
use imgship_docker::client::{BuildError, DockerClient, PushError, TagError};
use imgship_docker::docker::DockerError;
use imgship_docker::executor::DockerExecutor;
use mockall::mock;

mock! {
    Executor {}

    impl DockerExecutor for Executor {
        async fn exec(&self, args: &[String]) -> Result<String, DockerError>;
        async fn exec_streaming(&self, args: &[String]) -> Result<(), DockerError>;
    }
}

fn local() -> ImageRef {
    ImageRef::local("reconciliation-service", "dev").unwrap()
}

fn remote() -> ImageRef {
    ImageRef::parse("localhost:5000/reconciliation-service:dev").unwrap()
}

fn is(args: &[String], expected: &[&str]) -> bool {
    args.iter().map(String::as_str).eq(expected.iter().copied())
}

fn failed(args: &[&str], code: i32, stderr: &str) -> DockerError {
    DockerError::CommandFailed {
        program: "docker".to_owned(),
        args: args.iter().map(|s| (*s).to_owned()).collect(),
        code: Some(code),
        stderr: stderr.to_owned(),
    }
}

// ── Build Tests ──

#[tokio::test]
async fn build_passes_recipe_tag_and_context() {
    let mut mock = MockExecutor::new();

    mock.expect_exec_streaming()
        .withf(|args| {
            is(args, &[
                "build",
                "--file",
                "/work/.imgship/Dockerfile",
                "--tag",
                "reconciliation-service:dev",
                "/work",
            ])
        })
        .times(1)
        .returning(|_| Ok(()));

    let client = DockerClient::with_executor(mock);
    client
        .build(
            Path::new("/work"),
            Path::new("/work/.imgship/Dockerfile"),
            &local(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn build_failure_keeps_exit_code() {
    let mut mock = MockExecutor::new();

    mock.expect_exec_streaming()
        .returning(|_| Err(failed(&["build"], 17, "")));

    let client = DockerClient::with_executor(mock);
    let result = client
        .build(Path::new("/work"), Path::new("/work/Dockerfile"), &local())
        .await;

    match result {
        Err(BuildError::Build { source }) => assert_eq!(source.exit_code(), 17),
        other => panic!("expected build error, got {other:?}"),
    }
}

// ── Tag Tests ──

#[tokio::test]
async fn tag_uses_source_then_target() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| {
            is(args, &[
                "tag",
                "reconciliation-service:dev",
                "localhost:5000/reconciliation-service:dev",
            ])
        })
        .times(1)
        .returning(|_| Ok(String::new()));

    let client = DockerClient::with_executor(mock);
    client.tag(&local(), &remote()).await.unwrap();
}

#[tokio::test]
async fn tag_missing_source_image_fails() {
    let mut mock = MockExecutor::new();

    mock.expect_exec().returning(|args| {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        Err(failed(
            &args,
            1,
            "Error response from daemon: No such image: reconciliation-service:dev",
        ))
    });

    let client = DockerClient::with_executor(mock);
    let result = client.tag(&local(), &remote()).await;

    let Err(TagError::Tag { source }) = result else {
        panic!("expected tag error");
    };
    assert!(source.to_string().contains("No such image"));
}

// ── Push Tests ──

#[tokio::test]
async fn push_streams_qualified_reference() {
    let mut mock = MockExecutor::new();

    mock.expect_exec_streaming()
        .withf(|args| is(args, &["push", "localhost:5000/reconciliation-service:dev"]))
        .times(1)
        .returning(|_| Ok(()));

    let client = DockerClient::with_executor(mock);
    client.push(&remote()).await.unwrap();
}

#[tokio::test]
async fn push_rejected_by_registry_is_not_retried() {
    let mut mock = MockExecutor::new();

    mock.expect_exec_streaming()
        .times(1)
        .returning(|_| Err(failed(&["push"], 1, "")));

    let client = DockerClient::with_executor(mock);
    let result = client.push(&remote()).await;

    assert!(matches!(result, Err(PushError::Push { .. })));
}

// ── Local image Tests ──

#[tokio::test]
async fn image_exists_reflects_inspect_result() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| args.first().map(String::as_str) == Some("image") && args[1] == "inspect")
        .returning(|args| {
            if args.last().is_some_and(|a| a.starts_with("localhost:5000/")) {
                Err(failed(&["image", "inspect"], 1, "No such image"))
            } else {
                Ok("sha256:abc\n".to_owned())
            }
        });

    let client = DockerClient::with_executor(mock);
    assert!(client.image_exists(&local()).await);
    assert!(!client.image_exists(&remote()).await);
}

#[tokio::test]
async fn remove_image_uses_image_rm() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| is(args, &["image", "rm", "reconciliation-service:dev"]))
        .times(1)
        .returning(|_| Ok("Untagged: reconciliation-service:dev\n".to_owned()));

    let client = DockerClient::with_executor(mock);
    client.remove_image(&local()).await.unwrap();
}

// ── Doctor Tests ──

#[tokio::test]
async fn doctor_reports_cli_and_engine_versions() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| args.first().map(String::as_str) == Some("version"))
        .returning(|_| Ok("27.3.1\n".to_owned()));
    mock.expect_exec()
        .withf(|args| args.first().map(String::as_str) == Some("info"))
        .returning(|_| Ok("27.3.1\n".to_owned()));

    let client = DockerClient::with_executor(mock);
    let report = client.doctor().await;

    assert!(report.cli.passed);
    assert_eq!(report.cli.detail, "27.3.1");
    assert!(report.engine.passed);
}

#[tokio::test]
async fn doctor_cli_missing_skips_engine() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| args.first().map(String::as_str) == Some("version"))
        .returning(|_| {
            Err(DockerError::NotFound {
                program: "docker".to_owned(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            })
        });
    mock.expect_exec()
        .withf(|args| args.first().map(String::as_str) == Some("info"))
        .never();

    let client = DockerClient::with_executor(mock);
    let report = client.doctor().await;

    assert!(!report.cli.passed);
    assert!(!report.engine.passed);
    assert!(!report.all_passed());
}

#[tokio::test]
async fn doctor_engine_down() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| args.first().map(String::as_str) == Some("version"))
        .returning(|_| Err(failed(&["version"], 1, "Cannot connect to the Docker daemon")));
    mock.expect_exec()
        .withf(|args| args.first().map(String::as_str) == Some("info"))
        .returning(|_| Err(failed(&["info"], 1, "Cannot connect to the Docker daemon")));

    let client = DockerClient::with_executor(mock);
    let report = client.doctor().await;

    assert!(report.cli.passed);
    assert!(!report.engine.passed);
    assert!(report.engine.detail.contains("daemon"));
}

// ── Error Tests ──

#[test]
fn exit_code_falls_back_to_one() {
    let not_found = DockerError::NotFound {
        program: "docker".to_owned(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
    };
    assert_eq!(not_found.exit_code(), 1);

    let signalled = DockerError::CommandFailed {
        program: "docker".to_owned(),
        args: vec![],
        code: None,
        stderr: String::new(),
    };
    assert_eq!(signalled.exit_code(), 1);
}

#[test]
fn command_failed_message_includes_stderr() {
    let err = failed(&["push", "x"], 1, "  denied: requested access to the resource is denied\n");
    let msg = err.to_string();

    assert!(msg.starts_with("docker command failed"));
    assert!(msg.ends_with("denied: requested access to the resource is denied"));
}
