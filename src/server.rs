//! HTTP service for batch remediation.
//!
//! Routes:
//! - `POST /remediate-array`: JSON array of units in, remediated units out
//! - `GET /health`: liveness and version

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::detect::Scanner;
use crate::remediate::{remediate_units, RemediatedUnit, Unit};

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error body for failed requests.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create the router. The scanner is shared read-only across requests.
pub fn create_router(scanner: Arc<Scanner>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/remediate-array", post(remediate_array))
        .with_state(scanner)
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn remediate_array(
    State(scanner): State<Arc<Scanner>>,
    Json(units): Json<Vec<Unit>>,
) -> Result<Json<Vec<RemediatedUnit>>, (StatusCode, Json<ErrorResponse>)> {
    let count = units.len();
    tracing::debug!(units = count, "remediate-array request");

    let result = tokio::task::spawn_blocking(move || remediate_units(&scanner, units)).await;

    match result {
        Ok(remediated) => {
            let findings: usize = remediated.iter().map(|u| u.selects.len()).sum();
            tracing::info!(units = count, findings, "remediated batch");
            Ok(Json(remediated))
        }
        Err(e) => {
            tracing::error!(error = %e, "remediation task failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "remediation failed".to_string(),
                }),
            ))
        }
    }
}

/// Serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, scanner: Arc<Scanner>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(scanner))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::default_scanner;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router() -> Router {
        create_router(Arc::new(default_scanner().clone()))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_remediate_array() {
        let payload = json!([
            {"pgm_name": "ZP", "inc_name": "ZP_TOP", "type": "INCLUDE",
             "code": "DATA gv_lsobs TYPE mard-lsobs."},
            {"pgm_name": "ZP", "inc_name": "ZP_F01", "type": "FORM", "name": "LOAD",
             "start_line": 5, "end_line": 9, "code": "SELECT matnr FROM mara."}
        ]);

        let response = router()
            .oneshot(
                Request::post("/remediate-array")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[0]["inc_name"], "ZP_TOP");
        assert_eq!(body[0]["selects"][0]["table"], "MARD");
        assert_eq!(body[0]["selects"][0]["field"], "LSOBS");
        assert_eq!(body[1]["name"], "LOAD");
        assert_eq!(body[1]["start_line"], 5);
        assert_eq!(body[1]["selects"], json!([]));
    }

    #[tokio::test]
    async fn test_remediate_array_rejects_bad_payload() {
        let response = router()
            .oneshot(
                Request::post("/remediate-array")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"[{"code": "x"}]"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }
}
