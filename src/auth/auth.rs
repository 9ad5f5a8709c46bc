use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AppError;
use crate::session::SessionStore;
use actix_web::http::header::HeaderMap;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

/// Signed-in identity. The session itself grants nothing; roles come from
/// the `manager_users` and `admin_users` rows of this email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub email: String,
    pub session_id: String,
}

/// Resolves the bearer token of a request into a live session.
pub fn authenticate(
    headers: &HeaderMap,
    config: &Config,
    sessions: &SessionStore,
) -> Result<AuthUser, AppError> {
    let header = headers
        .get("Authorization")
        .ok_or_else(|| AppError::Unauthenticated("Missing Authorization header".into()))?
        .to_str()
        .map_err(|_| AppError::Unauthenticated("Invalid Authorization header encoding".into()))?;

    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthenticated("Authorization header must start with Bearer".into())
    })?;

    let claims = verify_token(token, &config.jwt_secret)
        .map_err(|e| AppError::Unauthenticated(format!("Invalid or expired token: {e}")))?;

    if sessions.is_revoked(&claims.jti) {
        return Err(AppError::Unauthenticated("Signed out".into()));
    }

    Ok(AuthUser {
        email: claims.sub,
        session_id: claims.jti,
    })
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // already resolved by the middleware for the protected scope
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let (Some(config), Some(sessions)) = (
            req.app_data::<Data<Config>>(),
            req.app_data::<Data<SessionStore>>(),
        ) else {
            return ready(Err(AppError::Internal("App state missing".into()).into()));
        };

        ready(authenticate(req.headers(), config, sessions).map_err(Into::into))
    }
}
