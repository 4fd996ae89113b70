use std::collections::BTreeMap;

use imgship_core::RecipeConfig;

/// Environment variables the recipe derives from `[recipe]`; user `env`
/// entries may not redefine them.
pub const RESERVED_ENV: &[&str] = &["FLASK_APP", "FLASK_RUN_HOST", "FLASK_RUN_PORT"];

/// Renders the single-stage Dockerfile that packages the Flask service.
pub struct RecipeGenerator<'a> {
    config: &'a RecipeConfig,
}

impl<'a> RecipeGenerator<'a> {
    pub fn new(config: &'a RecipeConfig) -> Self {
        Self { config }
    }

    /// Reject configurations that would produce a malformed recipe.
    pub fn validate(&self) -> Result<(), RecipeError> {
        let c = self.config;

        if c.port == 0 {
            return Err(RecipeError::InvalidPort);
        }
        if c.base_image.is_empty() || c.base_image.chars().any(char::is_whitespace) {
            return Err(RecipeError::InvalidField {
                field: "base_image",
                value: c.base_image.clone(),
                reason: "must be a non-empty image reference without whitespace",
            });
        }
        if !c.workdir.starts_with('/') {
            return Err(RecipeError::InvalidField {
                field: "workdir",
                value: c.workdir.clone(),
                reason: "must be an absolute path",
            });
        }
        if c.requirements.is_empty()
            || c.requirements.starts_with('/')
            || c.requirements.split('/').any(|part| part == "..")
        {
            return Err(RecipeError::InvalidField {
                field: "requirements",
                value: c.requirements.clone(),
                reason: "must be a path relative to the build context",
            });
        }
        if c.requirements.chars().any(char::is_whitespace) {
            return Err(RecipeError::InvalidField {
                field: "requirements",
                value: c.requirements.clone(),
                reason: "may not contain whitespace",
            });
        }
        for (field, value) in [("app", &c.app), ("host", &c.host)] {
            if value.is_empty() || value.chars().any(char::is_whitespace) {
                return Err(RecipeError::InvalidField {
                    field,
                    value: value.clone(),
                    reason: "must be non-empty and contain no whitespace",
                });
            }
        }
        if let Some(pkg) = c
            .extra_packages
            .iter()
            .find(|p| !is_apt_package(p))
        {
            return Err(RecipeError::InvalidField {
                field: "extra_packages",
                value: pkg.clone(),
                reason: "must be a Debian package name ([a-z0-9.+-]) with an optional =version",
            });
        }
        for (key, value) in &c.env {
            if RESERVED_ENV.contains(&key.as_str()) {
                return Err(RecipeError::ReservedEnv(key.clone()));
            }
            if !is_env_name(key) {
                return Err(RecipeError::InvalidEnvName(key.clone()));
            }
            if value.contains('\n') {
                return Err(RecipeError::InvalidField {
                    field: "env",
                    value: key.clone(),
                    reason: "values may not span multiple lines",
                });
            }
        }

        Ok(())
    }

    pub fn render(&self) -> Result<String, RecipeError> {
        self.validate()?;
        let c = self.config;

        let extra_packages = if c.extra_packages.is_empty() {
            String::new()
        } else {
            format!(
                "RUN apt-get update && apt-get install -y --no-install-recommends {} && rm -rf /var/lib/apt/lists/*\n",
                c.extra_packages.join(" ")
            )
        };

        let extra_env: String = c
            .env
            .iter()
            .map(|(k, v)| format!("ENV {k}=\"{}\"\n", escape_env_value(v)))
            .collect();

        tracing::debug!(
            base = %c.base_image,
            port = c.port,
            extra_packages = c.extra_packages.len(),
            extra_env = c.env.len(),
            "rendering image recipe"
        );

        Ok(format!(
            r#"FROM {base}
{extra_packages}WORKDIR {workdir}

COPY . .
RUN pip install --no-cache-dir -r {requirements}

EXPOSE {port}

ENV FLASK_APP={app}
ENV FLASK_RUN_HOST={host}
ENV FLASK_RUN_PORT={port}
{extra_env}
CMD ["flask", "run"]
"#,
            base = c.base_image,
            workdir = c.workdir,
            requirements = c.requirements,
            port = c.port,
            app = c.app,
            host = c.host,
        ))
    }
}

/// What a Dockerfile declares about its network surface.
///
/// Only `EXPOSE` and `ENV` instructions are inspected; line continuations
/// are not followed and `$VAR` references are kept literally.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecipeSummary {
    pub exposed_ports: Vec<u16>,
    pub env: BTreeMap<String, String>,
}

impl RecipeSummary {
    pub fn inspect(content: &str) -> Self {
        let mut summary = Self::default();

        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((instruction, rest)) = line.split_once(char::is_whitespace) else {
                continue;
            };
            let rest = rest.trim();

            if instruction.eq_ignore_ascii_case("EXPOSE") {
                summary.exposed_ports.extend(
                    rest.split_whitespace()
                        .filter_map(|p| p.split('/').next())
                        .filter_map(|p| p.parse::<u16>().ok()),
                );
            } else if instruction.eq_ignore_ascii_case("ENV") {
                summary.env.extend(parse_env(rest));
            }
        }

        summary
    }

    /// Port the web server is configured to listen on (`FLASK_RUN_PORT`).
    pub fn run_port(&self) -> Option<u16> {
        self.env
            .get("FLASK_RUN_PORT")
            .and_then(|p| p.parse::<u16>().ok())
    }

    /// Check that the configured run port is among the exposed ports.
    ///
    /// Returns the agreed port, or `None` when either side is undeclared.
    pub fn verify_port(&self) -> Result<Option<u16>, RecipeError> {
        match (self.run_port(), self.exposed_ports.as_slice()) {
            (None, _) | (_, []) => Ok(None),
            (Some(run), exposed) if exposed.contains(&run) => Ok(Some(run)),
            (Some(run), exposed) => Err(RecipeError::PortMismatch {
                exposed: exposed.to_vec(),
                configured: run,
            }),
        }
    }
}

fn parse_env(rest: &str) -> Vec<(String, String)> {
    // Legacy form: `ENV KEY value with spaces`
    if let Some((key, value)) = rest.split_once(char::is_whitespace)
        && !key.contains('=')
    {
        return vec![(key.to_owned(), unquote(value.trim()).to_owned())];
    }

    env_words(rest)
        .into_iter()
        .filter_map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
        })
        .collect()
}

/// Split on unquoted whitespace, dropping quotes and resolving backslash escapes.
fn env_words(rest: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = rest.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some('\''), '\'') => quote = None,
            (Some('\''), c) => word.push(c),
            (_, '\\') => {
                if let Some(escaped) = chars.next() {
                    word.push(escaped);
                }
                in_word = true;
            }
            (Some('"'), '"') => quote = None,
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            (_, c) => {
                word.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(word);
    }
    words
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn escape_env_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$")
}

fn is_apt_package(spec: &str) -> bool {
    let (name, version) = match spec.split_once('=') {
        Some((name, version)) => (name, Some(version)),
        None => (spec, None),
    };

    let mut chars = name.chars();
    let name_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "+-.".contains(c));
    let version_ok = version.is_none_or(|v| {
        !v.is_empty() && v.chars().all(|c| c.is_ascii_alphanumeric() || ".+~:-".contains(c))
    });

    name_ok && version_ok
}

fn is_env_name(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    #[error("recipe port must be between 1 and 65535")]
    InvalidPort,

    #[error("invalid [recipe].{field} {value:?}: {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("[recipe.env] may not set {0}; it is derived from [recipe]")]
    ReservedEnv(String),

    #[error("invalid environment variable name {0:?}")]
    InvalidEnvName(String),

    #[error(
        "recipe exposes port(s) {exposed:?} but FLASK_RUN_PORT is {configured}; they must match"
    )]
    PortMismatch { exposed: Vec<u16>, configured: u16 },
}
