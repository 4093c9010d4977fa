//! Revocation of write access on the source repository.
//!
//! Once a repository is being migrated nobody should keep pushing to the
//! Bitbucket copy, so every explicit user and group entry is set to `read`.

use crate::bitbucket::{Permission, SourceApi, SourceError};
use crate::pacing::Pacer;
use serde::Serialize;
use tracing::info;

/// Number of permission entries downgraded (or listed, in dry-run).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RevokedPermissions {
    /// User entries.
    pub users: usize,
    /// Group entries.
    pub groups: usize,
}

/// Sets every user and group permission on `slug` to read-only.
///
/// Entries are written one at a time with a short pause in between. In
/// dry-run the entries are listed but not written.
///
/// # Errors
///
/// Returns [`SourceError`] if listing or writing an entry fails.
pub async fn revoke_write_access(
    source: &dyn SourceApi,
    slug: &str,
    dry_run: bool,
    pacer: &Pacer,
) -> Result<RevokedPermissions, SourceError> {
    let users = source.user_permissions(slug).await?;
    let groups = source.group_permissions(slug).await?;

    for user in &users {
        if dry_run {
            info!(repo = slug, user = %user.display_name, permission = ?user.permission, "Dry run: would set user permission to read");
            continue;
        }
        source
            .set_user_permission(slug, &user.account_id, Permission::Read)
            .await?;
        info!(repo = slug, user = %user.display_name, "Set user permission to read");
        pacer.between_permission_writes().await;
    }

    for group in &groups {
        if dry_run {
            info!(repo = slug, group = %group.group_slug, permission = ?group.permission, "Dry run: would set group permission to read");
            continue;
        }
        source
            .set_group_permission(slug, &group.group_slug, Permission::Read)
            .await?;
        info!(repo = slug, group = %group.group_slug, "Set group permission to read");
        pacer.between_permission_writes().await;
    }

    Ok(RevokedPermissions {
        users: users.len(),
        groups: groups.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::PERMISSION_DELAY;
    use crate::testing::{recording_pacer, FakeSource};

    #[tokio::test]
    async fn downgrades_every_entry() {
        let source = FakeSource::default();
        let (pacer, sleeper) = recording_pacer();

        let revoked = revoke_write_access(&source, "widgets", false, &pacer)
            .await
            .unwrap();

        assert_eq!(revoked, RevokedPermissions { users: 2, groups: 1 });
        assert_eq!(
            source.calls(),
            vec![
                "user_permissions widgets",
                "group_permissions widgets",
                "set_user_permission widgets u-1 Read",
                "set_user_permission widgets u-2 Read",
                "set_group_permission widgets developers Read",
            ]
        );
        assert_eq!(sleeper.recorded(), vec![PERMISSION_DELAY; 3]);
    }

    #[tokio::test]
    async fn dry_run_only_lists() {
        let source = FakeSource::default();
        let (pacer, sleeper) = recording_pacer();

        let revoked = revoke_write_access(&source, "widgets", true, &pacer)
            .await
            .unwrap();

        assert_eq!(revoked.users, 2);
        assert_eq!(
            source.calls(),
            vec!["user_permissions widgets", "group_permissions widgets"]
        );
        assert!(sleeper.recorded().is_empty());
    }
}
