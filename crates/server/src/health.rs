use axum::{http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

pub const SERVICE_NAME: &str = "deadline-server";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub checked_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub status: &'static str,
    pub endpoints: Vec<&'static str>,
}

pub fn router() -> Router {
    Router::new().route("/", get(index)).route("/health", get(health))
}

pub async fn health() -> (StatusCode, Json<HealthResponse>) {
    let payload = HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        checked_at: Utc::now().to_rfc3339(),
    };
    (StatusCode::OK, Json(payload))
}

pub async fn index() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Slack Conference Deadlines Bot",
        status: "running",
        endpoints: vec!["/slack/command", "/health"],
    })
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, Json};
    use chrono::DateTime;

    use crate::health::{health, index, SERVICE_NAME};

    #[tokio::test]
    async fn health_reports_healthy_with_timestamp() {
        let (status, Json(payload)) = health().await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "healthy");
        assert_eq!(payload.service, SERVICE_NAME);
        assert!(DateTime::parse_from_rfc3339(&payload.checked_at).is_ok());
    }

    #[tokio::test]
    async fn index_lists_public_endpoints() {
        let Json(info) = index().await;

        assert_eq!(info.status, "running");
        assert_eq!(info.endpoints, vec!["/slack/command", "/health"]);
    }
}
