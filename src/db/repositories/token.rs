use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::domain::UserId;
use crate::entities::{email_tokens, prelude::*};

pub struct TokenRepository {
    conn: DatabaseConnection,
}

impl TokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Issues a fresh token for the (user, purpose) pair, dropping any
    /// previously issued ones so at most one token is live per purpose.
    pub async fn issue(
        &self,
        user_id: UserId,
        token: &str,
        purpose: &str,
        expires_at: &str,
    ) -> Result<email_tokens::Model> {
        EmailTokens::delete_many()
            .filter(email_tokens::Column::UserId.eq(user_id))
            .filter(email_tokens::Column::Purpose.eq(purpose))
            .exec(&self.conn)
            .await?;

        let row = email_tokens::ActiveModel {
            user_id: Set(user_id),
            token: Set(token.to_string()),
            purpose: Set(purpose.to_string()),
            expires_at: Set(expires_at.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        Ok(row)
    }

    pub async fn find(&self, token: &str) -> Result<Option<email_tokens::Model>> {
        let row = EmailTokens::find()
            .filter(email_tokens::Column::Token.eq(token))
            .one(&self.conn)
            .await?;
        Ok(row)
    }

    /// Tokens are single-use; consuming one deletes it.
    pub async fn consume(&self, id: i32) -> Result<()> {
        EmailTokens::delete_by_id(id).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn prune_expired(&self, now: &str) -> Result<u64> {
        let result = EmailTokens::delete_many()
            .filter(email_tokens::Column::ExpiresAt.lt(now))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }
}
