// dosetrack-api — HTTP surface for the medicine-precautions reference data.
//
// Endpoints:
//   GET /api/medicine/precautions?name=<string>
//   GET /api/health

use adhere_core::{Config, Error, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use clap::Parser;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "dosetrack-api")]
#[command(about = "Medicine precautions HTTP API", long_about = None)]
struct Cli {
    /// Override the configured bind address
    #[arg(long)]
    bind: Option<String>,
}

struct AppContext {
    started_at: Instant,
}

#[tokio::main]
async fn main() -> Result<()> {
    adhere_core::logging::init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let bind = cli.bind.unwrap_or(config.server.bind_addr);
    let addr: SocketAddr = bind
        .parse()
        .map_err(|e| Error::Config(format!("Invalid bind address {}: {}", bind, e)))?;

    let ctx = Arc::new(AppContext {
        started_at: Instant::now(),
    });
    let router = build_router(ctx);

    tracing::info!("API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/api/medicine/precautions", get(precautions))
        .route("/api/health", get(health))
        .with_state(ctx)
}

#[derive(Deserialize)]
struct PrecautionsQuery {
    name: Option<String>,
}

async fn precautions(
    Query(params): Query<PrecautionsQuery>,
) -> std::result::Result<Json<Value>, (StatusCode, Json<Value>)> {
    let name = params
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let Some(name) = name else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Name parameter is required" })),
        ));
    };

    match adhere_core::lookup_medicine(name) {
        Some(record) => {
            let body = serde_json::to_value(record).map_err(|e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": e.to_string() })),
                )
            })?;
            Ok(Json(body))
        }
        None => Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Medication not found" })),
        )),
    }
}

async fn health(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    let uptime = ctx.started_at.elapsed().as_secs();
    Json(json!({
        "status": "ok",
        "uptime_secs": uptime,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_precautions_found() {
        let result = precautions(Query(PrecautionsQuery {
            name: Some("aspirin".into()),
        }))
        .await;

        let Json(body) = result.expect("lookup should succeed");
        assert_eq!(body["name"], "Aspirin");
        assert!(body["precautions"].as_array().unwrap().len() > 0);
    }

    #[tokio::test]
    async fn test_precautions_substring_match() {
        let result = precautions(Query(PrecautionsQuery {
            name: Some("metfor".into()),
        }))
        .await;

        let Json(body) = result.expect("substring lookup should succeed");
        assert_eq!(body["name"], "Metformin");
    }

    #[tokio::test]
    async fn test_precautions_missing_name_is_400() {
        let result = precautions(Query(PrecautionsQuery { name: None })).await;

        let (status, Json(body)) = result.expect_err("missing name should fail");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Name parameter is required");
    }

    #[tokio::test]
    async fn test_precautions_empty_name_is_400() {
        let result = precautions(Query(PrecautionsQuery {
            name: Some("   ".into()),
        }))
        .await;

        let (status, _) = result.expect_err("blank name should fail");
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_precautions_unknown_is_404() {
        let result = precautions(Query(PrecautionsQuery {
            name: Some("unobtainium".into()),
        }))
        .await;

        let (status, Json(body)) = result.expect_err("unknown medicine should fail");
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Medication not found");
    }

    #[tokio::test]
    async fn test_health() {
        let ctx = Arc::new(AppContext {
            started_at: Instant::now(),
        });
        let Json(body) = health(State(ctx)).await;
        assert_eq!(body["status"], "ok");
    }
}
