use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::anyhow;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio::task;
use tracing::{error, info};

use frontdesk_core::{
    AppointmentRecord, FieldUpdates, LedgerStore, LogOutcome, RoutingPolicy, SearchCriteria,
    UpdateOutcome, DEFAULT_SHEET,
};

#[derive(Clone)]
struct AppState {
    store: LedgerStore,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();
    let ledger_path =
        std::env::var("FRONTDESK_LEDGER_PATH").unwrap_or_else(|_| "appointments.json".to_string());
    let sheet_name =
        std::env::var("FRONTDESK_SHEET_NAME").unwrap_or_else(|_| DEFAULT_SHEET.to_string());
    let selector = std::env::var("FRONTDESK_ROUTING").unwrap_or_else(|_| "single".to_string());
    let routing = parse_routing(&selector, &sheet_name)?;
    let store = LedgerStore::new(&ledger_path, routing);
    let state = Arc::new(AppState { store });
    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/tools/log_appointment", post(handle_log))
        .route("/tools/update_appointment", post(handle_update))
        .with_state(state);
    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
        .parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening" = %addr, "ledger" = %ledger_path);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Flat tool-call payload: search criteria plus the fields to merge.
#[derive(Debug, Deserialize)]
struct UpdateRequest {
    #[serde(default)]
    action: String,
    search_name: Option<String>,
    search_phone: Option<String>,
    search_date: Option<String>,
    search_time: Option<String>,
    #[serde(flatten)]
    updates: FieldUpdates,
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

async fn handle_log(
    State(state): State<Arc<AppState>>,
    Json(record): Json<AppointmentRecord>,
) -> Result<Json<LogOutcome>, AppError> {
    let store = state.store.clone();
    let outcome = task::spawn_blocking(move || store.log_appointment(&record))
        .await
        .map_err(AppError::internal)?;
    match &outcome {
        LogOutcome::Logged { sheet, .. } => info!("appointment_logged" = %sheet),
        LogOutcome::Error { code, message } => {
            error!("ledger_error" = %code, "detail" = %message)
        }
    }
    Ok(Json(outcome))
}

async fn handle_update(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateRequest>,
) -> Result<Json<UpdateOutcome>, AppError> {
    let store = state.store.clone();
    let outcome = task::spawn_blocking(move || {
        let criteria = SearchCriteria {
            name: body.search_name,
            phone: body.search_phone,
            date: body.search_date,
            time: body.search_time,
        };
        store.update_appointment(&criteria, &body.action, &body.updates)
    })
    .await
    .map_err(AppError::internal)?;
    match &outcome {
        UpdateOutcome::Updated { sheet, moved, .. } => {
            info!("appointment_updated" = %sheet, "moved" = %moved)
        }
        UpdateOutcome::Error { code, message } => {
            error!("ledger_error" = %code, "detail" = %message)
        }
        _ => {}
    }
    Ok(Json(outcome))
}

fn parse_routing(selector: &str, sheet: &str) -> Result<RoutingPolicy, anyhow::Error> {
    match selector.trim().to_lowercase().as_str() {
        "single" | "single-sheet" => Ok(RoutingPolicy::SingleSheet(sheet.to_string())),
        "by-date" | "by_date" => Ok(RoutingPolicy::ByDate),
        other => Err(anyhow!("unknown routing policy {other}")),
    }
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn internal<E: Into<anyhow::Error>>(err: E) -> Self {
        Self::Internal(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let AppError::Internal(err) = self;
        error!("internal_error" = %err);
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn update_requests_flatten_search_and_update_fields() {
        let body: UpdateRequest = serde_json::from_str(
            r#"{"action":"reschedule","search_name":"Maria","preferred_date":"2026-04-01"}"#,
        )
        .unwrap();
        assert_eq!(body.action, "reschedule");
        assert_eq!(body.search_name.as_deref(), Some("Maria"));
        assert_eq!(body.updates.preferred_date.as_deref(), Some("2026-04-01"));
        assert!(body.updates.notes.is_none());
    }

    #[test]
    fn routing_selector_parses_both_policies() {
        assert_eq!(
            parse_routing("single", "Front").unwrap(),
            RoutingPolicy::SingleSheet("Front".to_string())
        );
        assert_eq!(
            parse_routing("BY-DATE", "Front").unwrap(),
            RoutingPolicy::ByDate
        );
        assert!(parse_routing("weekly", "Front").is_err());
    }

    #[tokio::test]
    async fn log_endpoint_appends_through_the_shared_store() {
        let dir = TempDir::new().unwrap();
        let store = LedgerStore::new(dir.path().join("ledger.json"), RoutingPolicy::default());
        let state = Arc::new(AppState {
            store: store.clone(),
        });
        let record: AppointmentRecord =
            serde_json::from_str(r#"{"action":"book","patient_name":"Maria Lopez"}"#).unwrap();
        let response = handle_log(State(state), Json(record)).await.unwrap();
        assert!(matches!(response.0, LogOutcome::Logged { .. }));
        let book = store.snapshot().unwrap();
        assert_eq!(book.sheets["Appointments"].data_rows().len(), 1);
    }
}
