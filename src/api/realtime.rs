use crate::error::{AppError, AppResult};
use crate::realtime::{ChangeFeed, EventFilter, Table};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct SubscribeQuery {
    /// Table to watch, e.g. `leave_requests`
    pub table: String,
    /// `insert`, `update`, `delete` or `*` (default)
    pub event: Option<String>,
}

fn frame(payload: &str) -> web::Bytes {
    web::Bytes::from(format!("event: change\ndata: {payload}\n\n"))
}

/// Server-sent change notifications. Events name the table, the event type
/// and the row id; clients re-fetch on every event.
#[utoipa::path(
    get,
    path = "/realtime",
    params(SubscribeQuery),
    responses(
        (status = 200, description = "text/event-stream of change events"),
        (status = 400, description = "Unknown table or event type"),
        (status = 403, description = "Admin and manager account tables")
    ),
    tag = "Realtime"
)]
pub async fn subscribe(
    feed: web::Data<ChangeFeed>,
    query: web::Query<SubscribeQuery>,
) -> AppResult<impl Responder> {
    let table: Table = query
        .table
        .parse()
        .map_err(|_| AppError::InvalidArgument(format!("Unknown table: {}", query.table)))?;
    if !table.is_public() {
        return Err(AppError::Forbidden(format!("{table} changes are not public")));
    }
    let filter: EventFilter = query
        .event
        .as_deref()
        .unwrap_or("*")
        .parse()
        .map_err(|_| AppError::InvalidArgument("Event must be insert, update, delete or *".into()))?;

    tracing::debug!(table = %table, ?filter, "Realtime subscriber connected");
    let subscription = feed.subscribe(table, filter);

    let stream = futures::stream::unfold(subscription, |mut sub| async move {
        let change = sub.next().await?;
        let payload = serde_json::to_string(&change).ok()?;
        Some((Ok::<_, actix_web::Error>(frame(&payload)), sub))
    });

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(stream))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::ChangeKind;
    use actix_web::{App, body::MessageBody, http::StatusCode, test, web::Data};

    #[actix_web::test]
    async fn unknown_table_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(ChangeFeed::new()))
                .route("/realtime", web::get().to(subscribe)),
        )
        .await;

        let req = test::TestRequest::get().uri("/realtime?table=payroll").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn account_tables_are_not_streamed() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(ChangeFeed::new()))
                .route("/realtime", web::get().to(subscribe)),
        )
        .await;

        for table in ["admin_users", "manager_users"] {
            let req = test::TestRequest::get()
                .uri(&format!("/realtime?table={table}"))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
        }

        let req = test::TestRequest::get().uri("/realtime?table=employees").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn stream_emits_matching_changes() {
        let feed = ChangeFeed::new();
        let app = test::init_service(
            App::new()
                .app_data(Data::new(feed.clone()))
                .route("/realtime", web::get().to(subscribe)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/realtime?table=leave_requests&event=insert")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        feed.publish(Table::Departments, ChangeKind::Insert, Some(1));
        feed.publish(Table::LeaveRequests, ChangeKind::Update, Some(2));
        feed.publish(Table::LeaveRequests, ChangeKind::Insert, Some(7));

        let mut body = Box::pin(resp.into_body());
        let chunk = futures::future::poll_fn(|cx| body.as_mut().poll_next(cx))
            .await
            .unwrap()
            .unwrap();
        let text = String::from_utf8(chunk.to_vec()).unwrap();
        assert!(text.starts_with("event: change\ndata: "));
        assert!(text.contains("\"id\":7"));
        assert!(text.contains("\"event\":\"insert\""));
    }
}
