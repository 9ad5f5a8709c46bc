use crate::{
    auth::{
        auth::AuthUser,
        jwt::generate_access_token,
        magic_link::{LinkSender, build_link, sanitize_redirect},
    },
    config::Config,
    error::{AppError, AppResult},
    models::{MagicLinkReq, SessionResponse, VerifyQuery},
    session::SessionStore,
    utils::validation::validate_email,
};
use actix_web::{HttpResponse, Responder, get, web};
use serde_json::json;
use tracing::{debug, info, instrument};

/// Request a sign-in link
#[utoipa::path(
    post,
    path = "/auth/magic-link",
    request_body = MagicLinkReq,
    responses(
        (status = 200, description = "Link sent", body = Object, example = json!({
            "message": "Link sent. Open it on this device."
        })),
        (status = 400, description = "Missing or invalid email"),
        (status = 503, description = "Sign-in is not configured")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_magic_link", skip_all)]
pub async fn request_magic_link(
    payload: web::Json<MagicLinkReq>,
    config: web::Data<Config>,
    sessions: web::Data<SessionStore>,
    sender: web::Data<dyn LinkSender>,
) -> AppResult<impl Responder> {
    let Some(base_url) = config.magic_link_base_url.as_deref() else {
        return Err(AppError::NotConfigured(
            "Sign-in is not configured. Set MAGIC_LINK_BASE_URL.".into(),
        ));
    };

    let email = validate_email(&payload.email)?;
    let redirect_to = sanitize_redirect(payload.redirect_to.as_deref());

    let token = sessions.issue_link(&email, redirect_to).await;
    sender.send(&email, &build_link(base_url, &token))?;

    info!(email = %email, "Magic link requested");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Link sent. Open it on this device."
    })))
}

/// Exchange a one-time link for a session token
#[utoipa::path(
    get,
    path = "/auth/verify",
    params(VerifyQuery),
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 401, description = "Link expired or already used")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_verify", skip_all)]
pub async fn verify_magic_link(
    query: web::Query<VerifyQuery>,
    config: web::Data<Config>,
    sessions: web::Data<SessionStore>,
) -> AppResult<impl Responder> {
    let link = sessions
        .consume_link(query.token.trim())
        .await
        .ok_or_else(|| AppError::Unauthenticated("Link expired or already used".into()))?;

    debug!(email = %link.email, "Issuing session token");
    let (access_token, _) =
        generate_access_token(&link.email, &config.jwt_secret, config.access_token_ttl)?;

    info!(email = %link.email, "Signed in");
    Ok(HttpResponse::Ok().json(SessionResponse {
        access_token,
        email: link.email,
        redirect_to: link.redirect_to,
    }))
}

/// Sign out: revokes the session and forgets any PIN unlock
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Signed out")),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(auth: AuthUser, sessions: web::Data<SessionStore>) -> impl Responder {
    sessions.revoke(&auth.session_id).await;
    info!(email = %auth.email, "Signed out");
    HttpResponse::NoContent().finish()
}

#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Signed-in identity", body = Object, example = json!({
            "email": "lead@brink.eu"
        })),
        (status = 401, description = "Not signed in")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
#[get("/me")]
pub async fn me(auth: AuthUser) -> impl Responder {
    HttpResponse::Ok().json(json!({ "email": auth.email }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::magic_link::LogLinkSender;
    use actix_web::{App, http::StatusCode, test, web::Data};
    use std::sync::Arc;
    use std::time::Duration;

    fn sessions() -> SessionStore {
        SessionStore::new(Duration::from_secs(60), Duration::from_secs(60))
    }

    #[actix_web::test]
    async fn magic_link_flow_issues_a_usable_session() {
        let store = sessions();
        let sender: Arc<dyn LinkSender> = Arc::new(LogLinkSender);
        let app = test::init_service(
            App::new()
                .app_data(Data::new(Config::for_tests()))
                .app_data(Data::new(store.clone()))
                .app_data(Data::from(sender))
                .route("/auth/magic-link", web::post().to(request_magic_link))
                .route("/auth/verify", web::get().to(verify_magic_link))
                .route("/auth/logout", web::post().to(logout))
                .service(web::scope("/api").service(me)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/magic-link")
            .set_json(json!({ "email": " Lead@Brink.eu ", "redirect_to": "/manager" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        // the logging sender does not expose the token, so mint one directly
        let token = store.issue_link("lead@brink.eu", Some("/manager".into())).await;
        let req = test::TestRequest::get()
            .uri(&format!("/auth/verify?token={token}"))
            .to_request();
        let session: SessionResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(session.email, "lead@brink.eu");
        assert_eq!(session.redirect_to.as_deref(), Some("/manager"));

        let bearer = format!("Bearer {}", session.access_token);
        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/auth/logout")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", bearer))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn used_link_cannot_be_replayed() {
        let store = sessions();
        let app = test::init_service(
            App::new()
                .app_data(Data::new(Config::for_tests()))
                .app_data(Data::new(store.clone()))
                .route("/auth/verify", web::get().to(verify_magic_link)),
        )
        .await;

        let token = store.issue_link("lead@brink.eu", None).await;
        let uri = format!("/auth/verify?token={token}");
        let first = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(first.status(), StatusCode::OK);
        let second = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(second.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn sign_in_without_base_url_is_not_configured() {
        let mut config = Config::for_tests();
        config.magic_link_base_url = None;
        let sender: Arc<dyn LinkSender> = Arc::new(LogLinkSender);
        let app = test::init_service(
            App::new()
                .app_data(Data::new(config))
                .app_data(Data::new(sessions()))
                .app_data(Data::from(sender))
                .route("/auth/magic-link", web::post().to(request_magic_link)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/magic-link")
            .set_json(json!({ "email": "lead@brink.eu" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
