use crate::auth::auth::AuthUser;
use crate::error::AppResult;
use crate::overlay::{
    ANCHOR_TEXT, Affordance, Document, Element, MARKER_ID, Outcome, OverlayReconciler,
    PrimaryAdminLookup, Route, affordances,
};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct RouteQuery {
    /// `location.pathname` of the host page
    pub path: Option<String>,
    /// `location.hash` of the host page
    pub hash: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AffordanceSet {
    pub marker_id: String,
    pub anchor_text: String,
    /// Empty when nothing should be injected
    pub items: Vec<Affordance>,
    pub html: Option<String>,
}

/// The host page's "Admin Panel" card, bare.
fn admin_panel_card() -> Document {
    let mut doc = Document::new();
    let root = doc.root();
    let card = doc.append(root, Element::new("section"));
    doc.append(card, Element::new("h2").with_text(ANCHOR_TEXT));
    doc
}

async fn affordances_for<L: PrimaryAdminLookup>(
    lookup: &L,
    email: &str,
    route: &Route,
) -> AffordanceSet {
    let mut doc = admin_panel_card();
    let outcome = OverlayReconciler::new()
        .reconcile(&mut doc, route, Some(email), lookup)
        .await;
    let html = match outcome {
        Outcome::Injected(wrap) => Some(doc.to_html(wrap)),
        _ => None,
    };

    AffordanceSet {
        marker_id: MARKER_ID.to_string(),
        anchor_text: ANCHOR_TEXT.to_string(),
        items: if html.is_some() { affordances() } else { Vec::new() },
        html,
    }
}

/// Admin links for the host page's "Admin Panel" block
#[utoipa::path(
    get,
    path = "/api/overlay/affordances",
    params(RouteQuery),
    responses((status = 200, description = "OK", body = AffordanceSet)),
    security(("bearer_auth" = [])),
    tag = "Overlay"
)]
pub async fn get_affordances(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<RouteQuery>,
) -> AppResult<impl Responder> {
    let route = Route::new(
        query.path.as_deref().unwrap_or_default(),
        query.hash.as_deref().unwrap_or_default(),
    );
    let set = affordances_for(pool.get_ref(), &auth.email, &route).await;
    Ok(HttpResponse::Ok().json(set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};

    struct Fixed(AppResult<bool>);

    impl PrimaryAdminLookup for Fixed {
        async fn is_primary_admin(&self, _email: &str) -> AppResult<bool> {
            match &self.0 {
                Ok(v) => Ok(*v),
                Err(_) => Err(AppError::Internal("down".into())),
            }
        }
    }

    #[actix_web::test]
    async fn primary_admin_on_admin_route_gets_links() {
        let set = affordances_for(&Fixed(Ok(true)), "mark@brink.eu", &Route::new("/admin", "")).await;
        assert_eq!(set.items.len(), 3);
        let html = set.html.unwrap();
        assert!(html.starts_with(&format!("<div id=\"{MARKER_ID}\">")));
        assert!(html.contains("<a href=\"/admin-management\">Manage Admins</a>"));
    }

    #[actix_web::test]
    async fn everyone_else_gets_nothing() {
        let landing = affordances_for(&Fixed(Ok(true)), "mark@brink.eu", &Route::new("/", "")).await;
        assert!(landing.items.is_empty());

        let plain = affordances_for(&Fixed(Ok(false)), "ops@brink.eu", &Route::new("/admin", "")).await;
        assert!(plain.items.is_empty());
        assert!(plain.html.is_none());

        let broken = affordances_for(
            &Fixed(Err(AppError::Internal("down".into()))),
            "mark@brink.eu",
            &Route::new("/admin", ""),
        )
        .await;
        assert!(broken.items.is_empty());
    }
}
