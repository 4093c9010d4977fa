#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod bitbucket;
pub mod classify;
pub mod config;
pub mod github;
pub mod pacing;
pub mod permissions;
pub mod pull_requests;
pub mod records;
pub mod repository;
pub mod runner;
pub mod summary;
pub mod templates;
pub mod transfer;

#[cfg(test)]
mod testing;

pub use bitbucket::{BitbucketClient, SourceApi, SourceError, SourceRepository};
pub use classify::{classify, classify_text, Classification, ErrorClass};
pub use config::{
    load_repo_file, normalize_slug, parse_repo_list, BitbucketSettings, CloneProtocol,
    ConfigError, GitHubSettings, MigrationConfig, Owner, StageToggles,
};
pub use github::{ApiFailure, DestinationApi, GitHubClient};
pub use pacing::{Pacer, PacingTimings, Sleeper, TokioSleeper};
pub use permissions::{revoke_write_access, RevokedPermissions};
pub use pull_requests::{PassSummary, PrError, PrStatus, PullRequestMigrator};
pub use records::{decode_pull_requests, DecodeError, PrState, PullRequestRecord};
pub use repository::{build_descriptor, DestinationRepository, Replicator, ReplicatorError};
pub use runner::{Pipeline, Runner, RunnerError};
pub use summary::{RepositoryOutcome, RunSummary, Stage};
pub use templates::{generate_pr_title, sanitize_summary, TemplateError, TemplateRenderer};
pub use transfer::{ContentTransport, GitTransport, MirrorCheckout, TransferError};
