use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::{jwt::JwtKeys, repo_types::Role};
use crate::error::AppError;

/// Identity decoded from a valid bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        // Expect "Bearer <token>"
        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let claims = JwtKeys::from_ref(state).verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::Unauthorized("Invalid or expired token".into())
        })?;

        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}

/// An [`AuthUser`] whose token carries the admin role.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            warn!(user_id = %user.id, "admin route refused");
            return Err(AppError::Forbidden("Admin access required".into()));
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{header::AUTHORIZATION, Request};

    use super::*;
    use crate::config::JwtConfig;

    #[derive(Clone)]
    struct KeysOnly(JwtKeys);

    impl FromRef<KeysOnly> for JwtKeys {
        fn from_ref(s: &KeysOnly) -> Self {
            s.0.clone()
        }
    }

    fn state() -> KeysOnly {
        KeysOnly(JwtKeys::from(&JwtConfig {
            secret: "test".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 60,
        }))
    }

    fn parts(auth: Option<&str>) -> Parts {
        let mut req = Request::builder().uri("/api/products");
        if let Some(v) = auth {
            req = req.header(AUTHORIZATION, v);
        }
        req.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let err = AuthUser::from_request_parts(&mut parts(None), &state())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn wrong_scheme_is_unauthorized() {
        let err = AuthUser::from_request_parts(&mut parts(Some("Basic abc")), &state())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let err = AuthUser::from_request_parts(&mut parts(Some("Bearer nope")), &state())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn valid_token_yields_identity() {
        let st = state();
        let id = Uuid::new_v4();
        let token = st.0.sign(id, Role::User).unwrap();
        let header = format!("Bearer {token}");
        let user = AuthUser::from_request_parts(&mut parts(Some(&header)), &st)
            .await
            .unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn admin_only_refuses_plain_users() {
        let st = state();
        let token = st.0.sign(Uuid::new_v4(), Role::User).unwrap();
        let header = format!("Bearer {token}");
        let err = AdminUser::from_request_parts(&mut parts(Some(&header)), &st)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn admin_only_admits_admins() {
        let st = state();
        let id = Uuid::new_v4();
        let token = st.0.sign(id, Role::Admin).unwrap();
        let header = format!("Bearer {token}");
        let AdminUser(user) = AdminUser::from_request_parts(&mut parts(Some(&header)), &st)
            .await
            .unwrap();
        assert_eq!(user.id, id);
    }
}
