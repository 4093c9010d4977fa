//! CLI for the Bitbucket to GitHub migrator.
//!
//! Settings come from the environment (optionally loaded from `.env`) or the
//! matching command line flags. The repositories to migrate are listed one
//! per line in the file named by `REPO_FILE`.

use bitbucket_migrator::{
    load_repo_file, BitbucketSettings, CloneProtocol, ConfigError, GitHubSettings,
    MigrationConfig, Owner, RunSummary, Runner, RunnerError, StageToggles,
};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Value of `GITHUB_RUN_PROGRAM` meaning "no post-clone program".
const NO_PROGRAM: &str = "noop";

/// Bitbucket Migrator - Move Bitbucket Cloud repositories and PR history to GitHub.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bitbucket workspace owning the repositories.
    #[arg(long, env = "BITBUCKET_WORKSPACE")]
    bitbucket_workspace: String,

    /// Bitbucket username.
    #[arg(long, env = "BITBUCKET_USER")]
    bitbucket_user: String,

    /// Bitbucket app password or API token.
    #[arg(long, env = "BITBUCKET_TOKEN", hide_env_values = true)]
    bitbucket_token: String,

    /// Set every Bitbucket permission entry to read-only.
    #[arg(long, env = "BITBUCKET_REVOKEOLDPERMS", action = ArgAction::Set, value_parser = BoolishValueParser::new(), default_value_t = false)]
    revoke_permissions: bool,

    /// Clone protocol; `ssh` selects SSH, anything else HTTPS.
    #[arg(long, env = "CLONE_VIA", default_value = "https")]
    clone_via: String,

    /// GitHub Personal Access Token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: String,

    /// Destination organization. Mutually exclusive with `--github-user`.
    #[arg(long, env = "GITHUB_ORG")]
    github_org: Option<String>,

    /// Destination user. Mutually exclusive with `--github-org`.
    #[arg(long, env = "GITHUB_USER")]
    github_user: Option<String>,

    /// Preview without changing either platform.
    #[arg(long, env = "GITHUB_DRYRUN", action = ArgAction::Set, value_parser = BoolishValueParser::new(), default_value_t = false)]
    dry_run: bool,

    /// Push into destination repositories that already exist.
    #[arg(long, env = "GITHUB_OVERWRITE", action = ArgAction::Set, value_parser = BoolishValueParser::new(), default_value_t = false)]
    overwrite: bool,

    /// Visibility for repositories that are private on Bitbucket.
    #[arg(long, env = "GITHUB_PRIVATE_VISIBILITY", default_value = "internal")]
    private_visibility: String,

    /// Program run in the mirror checkout before pushing (`noop` for none).
    #[arg(long, env = "GITHUB_RUN_PROGRAM", default_value = NO_PROGRAM)]
    run_program: String,

    /// File listing the repositories to migrate, one per line.
    #[arg(long, env = "REPO_FILE")]
    repo_file: PathBuf,

    /// Mirror git contents.
    #[arg(long, env = "MIGRATE_REPO_CONTENTS", action = ArgAction::Set, value_parser = BoolishValueParser::new(), default_value_t = false)]
    migrate_contents: bool,

    /// Apply description, default branch, visibility, topics and custom properties.
    #[arg(long, env = "MIGRATE_REPO_SETTINGS", action = ArgAction::Set, value_parser = BoolishValueParser::new(), default_value_t = false)]
    migrate_settings: bool,

    /// Recreate open pull requests.
    #[arg(long, env = "MIGRATE_OPEN_PRS", action = ArgAction::Set, value_parser = BoolishValueParser::new(), default_value_t = false)]
    migrate_open_prs: bool,

    /// Record merged pull requests as closed issues.
    #[arg(long, env = "MIGRATE_CLOSED_PRS", action = ArgAction::Set, value_parser = BoolishValueParser::new(), default_value_t = false)]
    migrate_closed_prs: bool,

    /// Bitbucket API root.
    #[arg(long, env = "BITBUCKET_API_URL", default_value = bitbucket_migrator::config::DEFAULT_BITBUCKET_API_URL)]
    bitbucket_api_url: String,

    /// GitHub API root (defaults to the public API).
    #[arg(long, env = "GITHUB_API_URL")]
    github_api_url: Option<String>,
}

impl Args {
    /// Builds the frozen migration configuration.
    fn to_config(&self) -> Result<MigrationConfig, ConfigError> {
        let owner = Owner::from_parts(self.github_user.clone(), self.github_org.clone())?;
        let post_clone_program = match self.run_program.trim() {
            "" | NO_PROGRAM => None,
            program => Some(PathBuf::from(program)),
        };

        let config = MigrationConfig {
            bitbucket: BitbucketSettings {
                workspace: self.bitbucket_workspace.clone(),
                username: self.bitbucket_user.clone(),
                password: self.bitbucket_token.clone(),
                api_url: self.bitbucket_api_url.clone(),
            },
            github: GitHubSettings {
                token: self.github_token.clone(),
                owner,
                api_url: self.github_api_url.clone(),
            },
            dry_run: self.dry_run,
            overwrite: self.overwrite,
            private_visibility: self.private_visibility.clone(),
            clone_protocol: CloneProtocol::from_setting(&self.clone_via),
            post_clone_program,
            stages: StageToggles {
                contents: self.migrate_contents,
                settings: self.migrate_settings,
                open_prs: self.migrate_open_prs,
                closed_prs: self.migrate_closed_prs,
                revoke_permissions: self.revoke_permissions,
            },
        };
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; the environment may already be set.
    dotenvy::dotenv().ok();

    init_tracing();

    // Explicitly install aws-lc-rs as the default crypto provider for rustls
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let args = Args::parse();

    match run(args).await {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Migration aborted");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<RunSummary, RunnerError> {
    let config = args.to_config()?;
    let repos = load_repo_file(&args.repo_file)?;
    info!(path = %args.repo_file.display(), count = repos.len(), "Loaded repository list");

    let runner = Runner::new(config)?;
    runner.run(&repos).await
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.dry_run { "Dry Run" } else { "Live" }
    );
    println!("  Repositories migrated: {}", summary.repositories_migrated);
    println!("  Stages skipped: {}", summary.stages_skipped);

    if summary.dry_run {
        println!("  PRs previewed: {}", summary.records_previewed);
    } else {
        println!("  PRs created: {}", summary.prs_created);
        println!("  PRs skipped: {}", summary.prs_skipped);
        println!("  Issues created: {}", summary.issues_created);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [(&str, Option<&str>); 5] = [
        ("BITBUCKET_WORKSPACE", Some("acme-bb")),
        ("BITBUCKET_USER", Some("migrator")),
        ("BITBUCKET_TOKEN", Some("secret")),
        ("GITHUB_TOKEN", Some("ghp_test")),
        ("REPO_FILE", Some("repos.txt")),
    ];

    const OPTIONAL: [&str; 16] = [
        "BITBUCKET_REVOKEOLDPERMS",
        "CLONE_VIA",
        "GITHUB_ORG",
        "GITHUB_USER",
        "GITHUB_DRYRUN",
        "GITHUB_OVERWRITE",
        "GITHUB_PRIVATE_VISIBILITY",
        "GITHUB_RUN_PROGRAM",
        "MIGRATE_REPO_CONTENTS",
        "MIGRATE_REPO_SETTINGS",
        "MIGRATE_OPEN_PRS",
        "MIGRATE_CLOSED_PRS",
        "BITBUCKET_API_URL",
        "GITHUB_API_URL",
        "RUST_LOG",
        "NO_COLOR",
    ];

    fn with_env<F: FnOnce()>(vars: &[(&str, Option<&str>)], f: F) {
        let overridden = |key: &str| vars.iter().any(|(k, _)| *k == key);
        let mut all: Vec<(&str, Option<&str>)> = OPTIONAL
            .iter()
            .filter(|k| !overridden(**k))
            .map(|k| (*k, None))
            .collect();
        all.extend(REQUIRED);
        all.extend_from_slice(vars);
        temp_env::with_vars(all, f);
    }

    #[test]
    fn builds_config_from_environment() {
        with_env(
            &[
                ("GITHUB_ORG", Some("acme")),
                ("GITHUB_DRYRUN", Some("true")),
                ("MIGRATE_OPEN_PRS", Some("1")),
                ("CLONE_VIA", Some("ssh")),
            ],
            || {
                let args = Args::try_parse_from(["bitbucket-migrator"]).unwrap();
                let config = args.to_config().unwrap();

                assert_eq!(config.github.owner, Owner::Organization("acme".to_string()));
                assert!(config.dry_run);
                assert!(config.stages.open_prs);
                assert!(!config.stages.closed_prs);
                assert_eq!(config.clone_protocol, CloneProtocol::Ssh);
                assert_eq!(config.private_visibility, "internal");
                assert!(config.post_clone_program.is_none());
            },
        );
    }

    #[test]
    fn run_program_other_than_noop_is_kept() {
        with_env(
            &[
                ("GITHUB_USER", Some("alice")),
                ("GITHUB_RUN_PROGRAM", Some("/usr/local/bin/scrub")),
            ],
            || {
                let args = Args::try_parse_from(["bitbucket-migrator"]).unwrap();
                let config = args.to_config().unwrap();

                assert_eq!(
                    config.post_clone_program,
                    Some(PathBuf::from("/usr/local/bin/scrub"))
                );
            },
        );
    }

    #[test]
    fn rejects_both_owners() {
        with_env(
            &[("GITHUB_ORG", Some("acme")), ("GITHUB_USER", Some("alice"))],
            || {
                let args = Args::try_parse_from(["bitbucket-migrator"]).unwrap();
                assert!(matches!(args.to_config(), Err(ConfigError::AmbiguousOwner)));
            },
        );
    }

    #[test]
    fn rejects_unparsable_bool() {
        with_env(
            &[("GITHUB_ORG", Some("acme")), ("GITHUB_DRYRUN", Some("maybe"))],
            || {
                assert!(Args::try_parse_from(["bitbucket-migrator"]).is_err());
            },
        );
    }
}
