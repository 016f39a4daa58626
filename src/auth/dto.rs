use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::{Role, User};

/// Request body for signup.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

/// Request body for OTP verification. `purpose` is echoed back untouched.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
    #[serde(default)]
    pub purpose: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerifyOtpResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            role: u.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_request_reads_camel_case() {
        let req: ResetPasswordRequest =
            serde_json::from_str(r#"{"email":"a@x.com","newPassword":"pw2"}"#).unwrap();
        assert_eq!(req.new_password, "pw2");
    }

    #[test]
    fn verify_request_purpose_is_optional() {
        let req: VerifyOtpRequest =
            serde_json::from_str(r#"{"email":"a@x.com","otp":"123456"}"#).unwrap();
        assert!(req.purpose.is_none());
        let body = serde_json::to_value(VerifyOtpResponse {
            message: "ok".into(),
            purpose: req.purpose,
        })
        .unwrap();
        assert!(body.get("purpose").is_none());
    }

    #[test]
    fn public_user_serializes_role_lowercase() {
        let json = serde_json::to_value(PublicUser {
            id: Uuid::new_v4(),
            email: "test@example.com".into(),
            role: Role::Admin,
        })
        .unwrap();
        assert_eq!(json["role"], "admin");
        assert_eq!(json["email"], "test@example.com");
    }
}
