//! Decoding of Bitbucket pull request listings.
//!
//! The listing endpoint returns loosely shaped JSON. This module turns it into
//! an ordered list of [`PullRequestRecord`]s, keeping only open and merged
//! pull requests and failing loudly on anything structurally unexpected.

mod error;
mod record;
mod timestamp;

pub use error::DecodeError;
pub use record::{BranchRef, Participant, PrState, PullRequestRecord};
pub use timestamp::parse_timestamp;

use record::ApiPullRequest;
use serde_json::{Map, Value};
use tracing::debug;

/// Decodes a pull request listing into records sorted by ascending id.
///
/// Records in any state other than `OPEN` or `MERGED` are dropped. Merged
/// records must carry `closed_by.display_name` and `merge_commit.hash`.
///
/// # Errors
///
/// Returns [`DecodeError`] if the payload isn't a mapping, is error-shaped,
/// or holds a record missing a required field.
pub fn decode_pull_requests(listing: &Value) -> Result<Vec<PullRequestRecord>, DecodeError> {
    let object = listing.as_object().ok_or(DecodeError::NotAMapping)?;
    check_error_shape(object)?;

    let entries = object
        .get("values")
        .and_then(Value::as_array)
        .ok_or_else(|| DecodeError::MissingField {
            id: "listing".to_string(),
            field: "values",
        })?;

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let entry_object = entry.as_object().ok_or(DecodeError::NotAMapping)?;
        check_error_shape(entry_object)?;

        let raw_state = entry_object
            .get("state")
            .and_then(Value::as_str)
            .ok_or_else(|| DecodeError::MissingField {
                id: entry_id(entry_object, index),
                field: "state",
            })?;
        // Other states never reach a pass, so their shape is not checked.
        let Some(state) = PrState::parse(raw_state) else {
            debug!(pr_id = %entry_id(entry_object, index), state = raw_state, "Ignoring pull request state");
            continue;
        };

        let api: ApiPullRequest = serde_json::from_value(entry.clone())
            .map_err(|source| DecodeError::InvalidRecord { index, source })?;
        records.push(into_record(api, state)?);
    }

    records.sort_by_key(|record| record.id);
    Ok(records)
}

/// Surfaces `{"type": "error", "error": {"message": ...}}` payloads.
fn check_error_shape(object: &Map<String, Value>) -> Result<(), DecodeError> {
    if object.get("type").and_then(Value::as_str) != Some("error") {
        return Ok(());
    }

    let message = object
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    Err(DecodeError::Backend { message })
}

/// Identifies an entry in errors and logs: its `id`, else its position.
fn entry_id(entry: &Map<String, Value>, index: usize) -> String {
    entry
        .get("id")
        .and_then(Value::as_u64)
        .map_or_else(|| format!("#{index}"), |id| id.to_string())
}

fn into_record(api: ApiPullRequest, state: PrState) -> Result<PullRequestRecord, DecodeError> {

    let (merged_on, merge_commit, closed_by) = match state {
        PrState::Open => (None, None, None),
        PrState::Merged => {
            let merge_commit = api.merge_commit.ok_or_else(|| DecodeError::MissingField {
                id: api.id.to_string(),
                field: "merge_commit.hash",
            })?;
            let closed_by = api.closed_by.ok_or_else(|| DecodeError::MissingField {
                id: api.id.to_string(),
                field: "closed_by.display_name",
            })?;
            (api.updated_on, Some(merge_commit.hash), Some(closed_by))
        }
    };

    Ok(PullRequestRecord {
        id: api.id,
        title: api.title,
        state,
        author: api.author,
        source: api.source,
        destination: api.destination,
        created_on: api.created_on,
        merged_on,
        summary: api.summary.and_then(|s| s.raw).unwrap_or_default(),
        merge_commit,
        closed_by,
        draft: api.draft,
    })
}
