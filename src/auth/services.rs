use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest,
            SignupRequest, VerifyOtpRequest, VerifyOtpResponse,
        },
        jwt::JwtKeys,
        otp::{OtpChallenge, OtpPurpose},
        password::{hash_password, verify_password},
        repo_types::NewUser,
    },
    error::{AppError, AppResult},
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn signup(st: &AppState, req: SignupRequest) -> AppResult<()> {
    let email = normalize_email(&req.email);

    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }
    if req.password.is_empty() {
        return Err(AppError::Validation("Password is required".into()));
    }

    if st.users.find_by_email(&email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(AppError::Conflict("User already exists".into()));
    }

    let challenge = OtpChallenge::issue(OffsetDateTime::now_utc(), st.config.otp_ttl_minutes);
    let new = NewUser {
        email: email.clone(),
        password_hash: hash_password(&req.password)?,
        otp: challenge.code.clone(),
        otp_expires: challenge.expires,
    };

    // The unique index settles a race with a concurrent signup.
    let Some(user) = st.users.create(new).await? else {
        warn!(%email, "email registered concurrently");
        return Err(AppError::Conflict("User already exists".into()));
    };

    st.notifier
        .deliver(&user.email, &challenge.code, OtpPurpose::Signup)
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(())
}

pub async fn verify_otp(st: &AppState, req: VerifyOtpRequest) -> AppResult<VerifyOtpResponse> {
    let email = normalize_email(&req.email);
    let otp = req.otp.trim();

    let Some(user) = st
        .users
        .verify_otp(&email, otp, OffsetDateTime::now_utc())
        .await?
    else {
        warn!(%email, "otp rejected");
        return Err(AppError::InvalidOrExpired);
    };

    info!(user_id = %user.id, purpose = ?req.purpose, "user verified");
    Ok(VerifyOtpResponse {
        message: "Identity verified successfully".into(),
        purpose: req.purpose,
    })
}

pub async fn login(st: &AppState, req: LoginRequest) -> AppResult<AuthResponse> {
    let email = normalize_email(&req.email);
    let invalid = || AppError::Unauthorized("Invalid credentials".into());

    let Some(user) = st.users.find_by_email(&email).await? else {
        warn!(%email, "login unknown email");
        return Err(invalid());
    };

    if !verify_password(&req.password, &user.password_hash)? {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(invalid());
    }

    if !user.is_verified {
        warn!(user_id = %user.id, "login before verification");
        return Err(AppError::Forbidden("Please verify your email first".into()));
    }

    let token = JwtKeys::from_ref(st).sign(user.id, user.role)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(AuthResponse {
        token,
        user: user.into(),
    })
}

pub async fn forgot_password(st: &AppState, req: ForgotPasswordRequest) -> AppResult<()> {
    let email = normalize_email(&req.email);
    let challenge = OtpChallenge::issue(OffsetDateTime::now_utc(), st.config.otp_ttl_minutes);

    let Some(user) = st
        .users
        .set_otp(&email, &challenge.code, challenge.expires)
        .await?
    else {
        warn!(%email, "password reset for unknown email");
        return Err(AppError::NotFound("User not found".into()));
    };

    st.notifier
        .deliver(&user.email, &challenge.code, OtpPurpose::PasswordReset)
        .await?;

    info!(user_id = %user.id, "password reset code issued");
    Ok(())
}

pub async fn reset_password(st: &AppState, req: ResetPasswordRequest) -> AppResult<()> {
    let email = normalize_email(&req.email);
    let not_found = || AppError::NotFound("User not found".into());

    // Unknown accounts answer 404 whatever the new password looks like.
    if st.users.find_by_email(&email).await?.is_none() {
        warn!(%email, "password reset for unknown email");
        return Err(not_found());
    }

    if req.new_password.is_empty() {
        return Err(AppError::Validation("New password is required".into()));
    }

    let hash = hash_password(&req.new_password)?;
    let Some(user) = st.users.reset_password(&email, &hash).await? else {
        warn!(%email, "account vanished during password reset");
        return Err(not_found());
    };

    info!(user_id = %user.id, "password reset");
    Ok(())
}
