use imgship_core::ImgshipConfig;
use tempfile::TempDir;

#[test]
fn load_defaults_when_no_config() {
    let tmp = TempDir::new().unwrap();
    let config = ImgshipConfig::load(tmp.path()).unwrap();

    assert_eq!(config.image.name, "reconciliation-service");
    assert_eq!(config.image.tag, "dev");
    assert_eq!(config.registry.endpoint, "localhost:5000");
    assert!(config.registry.repository.is_none());
    assert_eq!(config.recipe.base_image, "python:3.11-slim");
    assert_eq!(config.recipe.workdir, "/app");
    assert_eq!(config.recipe.requirements, "requirements.txt");
    assert_eq!(config.recipe.app, "app.py");
    assert_eq!(config.recipe.host, "0.0.0.0");
    assert_eq!(config.recipe.port, 5786);
    assert_eq!(config.docker.program, "docker");
}

#[test]
fn load_full_config() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[image]
name = "billing"
tag = "staging"

[registry]
endpoint = "registry.example.com:8443"
repository = "team/billing"
tag = "v3"

[recipe]
base_image = "python:3.12-slim"
port = 9000
extra_packages = ["libpq-dev"]

[recipe.env]
LOG_LEVEL = "debug"

[docker]
program = "podman"
"#;
    std::fs::write(tmp.path().join("imgship.toml"), toml).unwrap();

    let config = ImgshipConfig::load(tmp.path()).unwrap();

    assert_eq!(config.image.name, "billing");
    assert_eq!(config.registry.repository.as_deref(), Some("team/billing"));
    assert_eq!(config.recipe.base_image, "python:3.12-slim");
    assert_eq!(config.recipe.port, 9000);
    assert_eq!(config.recipe.extra_packages, vec!["libpq-dev"]);
    assert_eq!(config.recipe.env["LOG_LEVEL"], "debug");
    assert_eq!(config.docker.program, "podman");

    let remote = config.remote_image().unwrap();
    assert_eq!(remote.to_string(), "registry.example.com:8443/team/billing:v3");
}

#[test]
fn load_partial_config_keeps_defaults() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("imgship.toml"),
        "[registry]\nendpoint = \"10.0.0.7:5786\"\n",
    )
    .unwrap();

    let config = ImgshipConfig::load(tmp.path()).unwrap();

    assert_eq!(config.registry.endpoint, "10.0.0.7:5786");
    assert_eq!(config.image.name, "reconciliation-service");
    assert_eq!(config.recipe.port, 5786);
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("imgship.toml"), "not valid {{{{ toml").unwrap();

    let result = ImgshipConfig::load(tmp.path());
    assert!(result.is_err());

    let err = result.unwrap_err().to_string();
    assert!(err.contains("parse"));
}

#[test]
fn load_empty_config_returns_defaults() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("imgship.toml"), "").unwrap();

    let config = ImgshipConfig::load(tmp.path()).unwrap();
    assert_eq!(config.registry.endpoint, "localhost:5000");
}

// ── Image references ──

#[test]
fn default_local_and_remote_share_repository_and_tag() {
    let config = ImgshipConfig::default();

    let local = config.local_image().unwrap();
    let remote = config.remote_image().unwrap();

    assert_eq!(local.to_string(), "reconciliation-service:dev");
    assert_eq!(remote.to_string(), "localhost:5000/reconciliation-service:dev");
    assert_eq!(local.tag, remote.tag);
}

#[test]
fn remote_image_rejects_bad_endpoint() {
    let mut config = ImgshipConfig::default();
    config.registry.endpoint = "registry:notaport".to_owned();

    let err = config.remote_image().unwrap_err().to_string();
    assert!(err.contains("port"), "got: {err}");
}

#[test]
fn local_image_rejects_uppercase_name() {
    let mut config = ImgshipConfig::default();
    config.image.name = "Recon".to_owned();

    assert!(config.local_image().is_err());
}

// ── Environment overrides ──

#[test]
fn overrides_replace_registry_and_tag() {
    let mut config = ImgshipConfig::default();
    config
        .apply_overrides(Some("ci.registry.io".to_owned()), Some("build-42".to_owned()))
        .unwrap();

    let remote = config.remote_image().unwrap();
    assert_eq!(remote.to_string(), "ci.registry.io/reconciliation-service:build-42");
    // local tag is unaffected
    assert_eq!(config.local_image().unwrap().tag, "dev");
}

#[test]
fn blank_overrides_are_ignored() {
    let mut config = ImgshipConfig::default();
    config
        .apply_overrides(Some("  ".to_owned()), Some(String::new()))
        .unwrap();

    assert_eq!(config.registry.endpoint, "localhost:5000");
    assert!(config.registry.tag.is_none());
}

#[test]
fn invalid_registry_override_names_the_variable() {
    let mut config = ImgshipConfig::default();
    let err = config
        .apply_overrides(Some("host:99999".to_owned()), None)
        .unwrap_err()
        .to_string();

    assert!(err.contains("IMGSHIP_REGISTRY"), "got: {err}");
}
