//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// shareext - add an iOS share extension to an Expo-style native project
#[derive(Parser, Debug)]
#[command(name = "shareext")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the share extension and register it in the project
    Apply(ApplyArgs),

    /// Print the derived share extension identity
    Identity(IdentityArgs),

    /// Show version information
    Version(VersionArgs),
}

/// Where to find the app configuration and the native project
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Path to app.json / app.yaml (searched upward from the current directory by default)
    #[arg(long, env = "SHAREEXT_APP_CONFIG")]
    pub app_config: Option<Utf8PathBuf>,

    /// Native iOS directory (defaults to `ios/` next to the app configuration)
    #[arg(long)]
    pub platform_root: Option<Utf8PathBuf>,

    /// Host Xcode project name (discovered from the single *.xcodeproj by default)
    #[arg(long)]
    pub project_name: Option<String>,
}

// Apply command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Run against a scratch copy of the platform root and report the result
    #[arg(long)]
    pub dry_run: bool,
}

// Identity command
#[derive(Args, Debug)]
pub struct IdentityArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Version command
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_apply_flags() {
        let cli = Cli::parse_from([
            "shareext",
            "-vv",
            "apply",
            "--app-config",
            "app.json",
            "--project-name",
            "MyApp",
            "--dry-run",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Apply(args) => {
                assert!(args.dry_run);
                assert_eq!(
                    args.project.app_config.as_deref().map(|p| p.as_str()),
                    Some("app.json")
                );
                assert_eq!(args.project.project_name.as_deref(), Some("MyApp"));
                assert!(args.project.platform_root.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
