//! Mirroring of git contents from Bitbucket to GitHub.
//!
//! The orchestrator decides when each step runs; [`GitTransport`] only shells
//! out to `git` (and the optional post-clone program) and reports whether the
//! step succeeded.

mod error;

pub use error::TransferError;

use crate::config::{CloneProtocol, MigrationConfig};
use crate::repository::DestinationRepository;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info};

/// Name of the remote pointing at the destination repository.
pub const DESTINATION_REMOTE: &str = "destination";

/// A local mirror clone. Temporary clones are removed on drop.
#[derive(Debug)]
pub struct MirrorCheckout {
    path: PathBuf,
    _temp: Option<TempDir>,
}

impl MirrorCheckout {
    /// Refers to an existing directory that is not cleaned up.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _temp: None,
        }
    }

    fn temporary(temp: TempDir) -> Self {
        Self {
            path: temp.path().to_path_buf(),
            _temp: Some(temp),
        }
    }

    /// Returns the working directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Moves repository contents between the two platforms.
#[async_trait]
pub trait ContentTransport: Send + Sync {
    /// Mirror-clones the source repository.
    async fn clone_mirror(&self, slug: &str) -> Result<MirrorCheckout, TransferError>;

    /// Adds the destination remote and runs the post-clone program.
    async fn prepare_push(
        &self,
        checkout: &MirrorCheckout,
        destination: &DestinationRepository,
    ) -> Result<(), TransferError>;

    /// Pushes every ref to the destination remote.
    async fn push_mirror(&self, checkout: &MirrorCheckout) -> Result<(), TransferError>;
}

/// [`ContentTransport`] using the `git` command line.
#[derive(Debug, Clone)]
pub struct GitTransport {
    workspace: String,
    protocol: CloneProtocol,
    post_clone_program: Option<PathBuf>,
}

impl GitTransport {
    /// Creates a transport for the configured workspace and protocol.
    #[must_use]
    pub fn new(config: &MigrationConfig) -> Self {
        Self {
            workspace: config.bitbucket.workspace.clone(),
            protocol: config.clone_protocol,
            post_clone_program: config.post_clone_program.clone(),
        }
    }

    /// Returns the URL the source repository is cloned from.
    #[must_use]
    pub fn clone_url(&self, slug: &str) -> String {
        match self.protocol {
            CloneProtocol::Ssh => format!("git@bitbucket.org:{}/{slug}.git", self.workspace),
            CloneProtocol::Https => format!("https://bitbucket.org/{}/{slug}.git", self.workspace),
        }
    }
}

/// Returns the URL of the destination remote.
#[must_use]
pub fn destination_url(destination: &DestinationRepository) -> String {
    format!("https://github.com/{}.git", destination.full_name())
}

#[async_trait]
impl ContentTransport for GitTransport {
    async fn clone_mirror(&self, slug: &str) -> Result<MirrorCheckout, TransferError> {
        let temp = tempfile::Builder::new()
            .prefix(&format!("{}-{slug}-", self.workspace))
            .tempdir()
            .map_err(TransferError::TempDir)?;

        info!(repo = slug, path = %temp.path().display(), "Cloning repository");
        let target = temp.path().to_string_lossy().to_string();
        run_command("git", &["clone", "--mirror", &self.clone_url(slug), &target], None).await?;

        Ok(MirrorCheckout::temporary(temp))
    }

    async fn prepare_push(
        &self,
        checkout: &MirrorCheckout,
        destination: &DestinationRepository,
    ) -> Result<(), TransferError> {
        let url = destination_url(destination);
        run_command(
            "git",
            &["remote", "add", DESTINATION_REMOTE, &url],
            Some(checkout.path()),
        )
        .await?;

        if let Some(program) = &self.post_clone_program {
            info!(program = %program.display(), "Running post-clone program");
            let program = program.to_string_lossy();
            let dir = checkout.path().to_string_lossy();
            run_command(&program, &[&dir], Some(checkout.path())).await?;
        }

        Ok(())
    }

    async fn push_mirror(&self, checkout: &MirrorCheckout) -> Result<(), TransferError> {
        info!(path = %checkout.path().display(), "Pushing mirror");
        run_command(
            "git",
            &["push", DESTINATION_REMOTE, "--mirror"],
            Some(checkout.path()),
        )
        .await
    }
}

/// Runs a command, failing on a non-zero exit.
async fn run_command(program: &str, args: &[&str], dir: Option<&Path>) -> Result<(), TransferError> {
    let command_line = format!("{program} {}", args.join(" "));
    let mut command = Command::new(program);
    command
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = dir {
        command.current_dir(dir);
    }

    let output = command.output().await.map_err(|e| TransferError::Spawn {
        command: command_line.clone(),
        source: e,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() {
        return Err(TransferError::CommandFailed {
            command: command_line,
            status: output.status.to_string(),
            output: format!("{stdout}{stderr}").trim().to_string(),
        });
    }

    debug!(command = %command_line, output = %format!("{stdout}{stderr}").trim(), "Command finished");
    Ok(())
}
