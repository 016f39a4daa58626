use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User};

const USER_COLUMNS: &str =
    "id, email, password_hash, role, is_verified, otp, otp_expires, created_at";

/// Identity store. Every method is a single round trip; `None` means no row
/// matched.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    /// Insert an unverified user. Returns `None` when the email is taken.
    async fn create(&self, new: NewUser) -> anyhow::Result<Option<User>>;

    /// Consume a live code: marks the user verified and clears the code.
    async fn verify_otp(
        &self,
        email: &str,
        otp: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<User>>;

    /// Replace any pending code with a fresh one.
    async fn set_otp(
        &self,
        email: &str,
        otp: &str,
        expires: OffsetDateTime,
    ) -> anyhow::Result<Option<User>>;

    /// Store a new hash, force verified and drop any pending code.
    async fn reset_password(&self, email: &str, password_hash: &str)
        -> anyhow::Result<Option<User>>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn create(&self, new: NewUser) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, password_hash, is_verified, otp, otp_expires)
            VALUES ($1, $2, $3, FALSE, $4, $5)
            ON CONFLICT (email) DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.otp)
        .bind(new.otp_expires)
        .fetch_optional(&self.db)
        .await
        .context("insert user")?;
        Ok(user)
    }

    async fn verify_otp(
        &self,
        email: &str,
        otp: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET is_verified = TRUE, otp = NULL, otp_expires = NULL
             WHERE email = $1 AND otp = $2 AND otp_expires > $3
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(otp)
        .bind(now)
        .fetch_optional(&self.db)
        .await
        .context("consume otp")?;
        Ok(user)
    }

    async fn set_otp(
        &self,
        email: &str,
        otp: &str,
        expires: OffsetDateTime,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET otp = $2, otp_expires = $3
             WHERE email = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(otp)
        .bind(expires)
        .fetch_optional(&self.db)
        .await
        .context("issue otp")?;
        Ok(user)
    }

    async fn reset_password(
        &self,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET password_hash = $2, is_verified = TRUE, otp = NULL, otp_expires = NULL
             WHERE email = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&self.db)
        .await
        .context("reset password")?;
        Ok(user)
    }
}
