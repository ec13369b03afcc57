use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Routes keep the paths the desktop client already calls.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .route("/attendance", post(handlers::record_attendance))
        .route("/attendance/{student_id}", get(handlers::get_attendance_history))
        .route("/realtime_attendance/{class_id}", get(handlers::get_presence))
        .route(
            "/schedule/{student_id}",
            get(handlers::get_schedule).put(handlers::put_schedule),
        )
        .route(
            "/tasks/{student_id}",
            get(handlers::get_tasks).put(handlers::put_tasks),
        )
        .route(
            "/goals/{student_id}",
            get(handlers::get_goals).put(handlers::put_goals),
        )
        .route("/daily_routine/{student_id}", get(handlers::get_daily_routine))
        .route("/update_data", post(handlers::update_data))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::attendance::AttendanceService;
    use crate::http::error::ApiError;
    use crate::registry::ActivitySourceRegistry;

    fn router() -> Router {
        create_router(AppState::new(
            Arc::new(AttendanceService::new()),
            Arc::new(ActivitySourceRegistry::seeded()),
        ))
    }

    fn json_request(method: Method, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn bad_bodies_are_json_bad_requests() {
        let cases = [
            (Method::POST, "/attendance", r#"{"student_id":"S001"}"#),
            (Method::PUT, "/schedule/S001", r#"[{"class":"X"}]"#),
            (Method::PUT, "/tasks/S001", "not json"),
            (Method::POST, "/update_data", r#"{"students":[1,2]}"#),
        ];
        for (method, uri, body) in cases {
            let (status, body) = send(router(), json_request(method, uri, body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            let error: ApiError = serde_json::from_slice(&body).unwrap();
            assert_eq!(error.code, "BAD_REQUEST");
            assert!(!error.message.is_empty());
        }
    }

    #[tokio::test]
    async fn malformed_schedule_time_is_a_json_bad_request() {
        let (status, body) = send(
            router(),
            json_request(
                Method::PUT,
                "/schedule/S001",
                r#"[{"class":"Lab","time":"2pm"}]"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "BAD_REQUEST");
    }

    #[tokio::test]
    async fn history_is_keyed_by_class() {
        let router = router();
        let (status, _) = send(
            router.clone(),
            json_request(
                Method::POST,
                "/attendance",
                r#"{"student_id":"S001","class_id":"C101"}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let request = Request::get("/attendance/S001").body(Body::empty()).unwrap();
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
        let history: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(history["C101"].as_array().map(Vec::len), Some(1));
        assert!(history.get("S001").is_none());
    }
}
