use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Privilege level carried in the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,        // Argon2 hash, not exposed in JSON
    pub role: Role,
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub otp: Option<String>,          // set together with otp_expires
    #[serde(skip_serializing)]
    pub otp_expires: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl User {
    pub fn has_pending_otp(&self) -> bool {
        self.otp.is_some() && self.otp_expires.is_some()
    }
}

/// Fields written at signup.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub otp: String,
    pub otp_expires: OffsetDateTime,
}
