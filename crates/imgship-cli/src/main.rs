mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "imgship",
    about = "Build, tag, and push the service image to a container registry"
)]
#[command(version)]
struct Cli {
    /// Project directory used as the build context
    #[arg(long, short = 'C', global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Runs `publish` when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the image, tag it for the registry, and push it
    Publish {
        /// Remove images created by this run if tag or push fails
        #[arg(long)]
        prune_on_failure: bool,
    },
    /// Print the generated Dockerfile
    Recipe,
    /// Write the generated Dockerfile to the project for manual editing
    Eject,
    /// Create imgship.toml in the project
    Init,
    /// Check toolchain, engine, and project readiness
    Doctor,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let project_dir = cli.project_dir.as_path();

    let result = match cli.command.unwrap_or(Commands::Publish {
        prune_on_failure: false,
    }) {
        Commands::Publish { prune_on_failure } => {
            commands::publish(project_dir, prune_on_failure).await
        }
        Commands::Recipe => commands::recipe(project_dir),
        Commands::Eject => commands::eject(project_dir),
        Commands::Init => commands::init_project(project_dir),
        Commands::Doctor => commands::doctor(project_dir).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(commands::exit_code(&e))
        }
    }
}
