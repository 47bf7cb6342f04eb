//! Revoked token store.
//!
//! Access and refresh tokens are stateless; logging out writes the token's
//! `jti` here so every server sharing the database rejects it until it would
//! have expired anyway.

use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::revoked_tokens;

/// Repository for revoked JWT ids.
#[derive(Debug, Clone)]
pub struct TokenRevocationRepository {
    db: DatabaseConnection,
}

impl TokenRevocationRepository {
    /// Creates a new revocation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Revokes a token. Revoking the same `jti` twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn revoke(
        &self,
        jti: Uuid,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        if self.is_revoked(jti).await? {
            return Ok(());
        }

        revoked_tokens::ActiveModel {
            jti: Set(jti),
            user_id: Set(user_id),
            expires_at: Set(expires_at.into()),
            revoked_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(%jti, %user_id, "Token revoked");
        Ok(())
    }

    /// Checks whether a token has been revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn is_revoked(&self, jti: Uuid) -> Result<bool, DbErr> {
        Ok(revoked_tokens::Entity::find_by_id(jti)
            .one(&self.db)
            .await?
            .is_some())
    }

    /// Deletes revocations whose token has expired by `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, DbErr> {
        let now: DateTimeWithTimeZone = now.into();
        let result = revoked_tokens::Entity::delete_many()
            .filter(revoked_tokens::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            tracing::debug!(purged = result.rows_affected, "Purged expired revocations");
        }
        Ok(result.rows_affected)
    }
}
