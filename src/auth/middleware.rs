use crate::auth::auth::authenticate;
use crate::config::Config;
use crate::session::SessionStore;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;
    let sessions = req
        .app_data::<Data<SessionStore>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("Session store missing"))?;

    match authenticate(req.headers(), config, sessions) {
        Ok(auth_user) => {
            req.extensions_mut().insert(auth_user);
            next.call(req).await
        }
        Err(e) => {
            tracing::debug!(error = %e, path = req.path(), "Rejected unauthenticated request");
            let resp = e.error_response();
            Ok(req.into_response(resp))
        }
    }
}
