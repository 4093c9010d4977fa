//! Migration configuration.
//!
//! This module holds the frozen [`MigrationConfig`] shared by every stage and
//! the parser for the newline-delimited repository list.

mod error;
mod repo_list;
mod settings;

pub use error::ConfigError;
pub use repo_list::{load_repo_file, normalize_slug, parse_repo_list};
pub use settings::{
    BitbucketSettings, CloneProtocol, GitHubSettings, MigrationConfig, Owner, StageToggles,
    DEFAULT_BITBUCKET_API_URL, DEFAULT_PRIVATE_VISIBILITY,
};
