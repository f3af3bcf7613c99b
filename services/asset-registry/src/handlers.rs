// HTTP handlers for the asset routes
//
// POST   /assets       append body as-is                 201 {message, asset}
// GET    /assets       whole sequence in order           200 [asset]
// GET    /assets/:id   first record with matching id     200 asset | 404 {message}
// PUT    /assets/:id   shallow-merge onto first match    200 {message, asset} | 404
// DELETE /assets/:id   remove first match                200 {message} | 404

use crate::error::RegistryError;
use crate::metrics::METRICS;
use crate::models::{Asset, MessageResponse};
use crate::store::StoreHandle;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

#[derive(Clone)]
pub struct AppState {
    pub store: StoreHandle,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub assets: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/assets", get(list_assets).post(create_asset))
        .route(
            "/assets/:id",
            get(get_asset).put(update_asset).delete(delete_asset),
        )
        .with_state(state)
}

// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, RegistryError> {
    let assets = state.store.len().await?;

    Ok(Json(HealthResponse {
        status: "healthy",
        service: "asset-registry",
        version: env!("CARGO_PKG_VERSION"),
        assets,
    }))
}

// Prometheus metrics endpoint
async fn metrics_handler() -> Result<String, RegistryError> {
    METRICS
        .export()
        .map_err(|e| RegistryError::Internal(format!("Failed to export metrics: {}", e)))
}

async fn create_asset(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<MessageResponse>), RegistryError> {
    let _timer = METRICS.http_request_duration_seconds.start_timer();
    METRICS.track_request("POST /assets");

    let asset = state.store.insert(Asset::new(body)).await?;
    info!("Asset created (id: {:?})", asset.id());

    METRICS.assets_created_total.inc();
    METRICS.assets_stored.inc();

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::with_asset("Asset created successfully", asset)),
    ))
}

async fn list_assets(State(state): State<AppState>) -> Result<Json<Vec<Asset>>, RegistryError> {
    let _timer = METRICS.http_request_duration_seconds.start_timer();
    METRICS.track_request("GET /assets");

    let assets = state.store.list().await?;
    debug!("Listing {} assets", assets.len());

    Ok(Json(assets))
}

async fn get_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Asset>, RegistryError> {
    let _timer = METRICS.http_request_duration_seconds.start_timer();
    METRICS.track_request("GET /assets/:id");

    debug!("Fetching asset {}", id);
    match state.store.get(id).await? {
        Some(asset) => Ok(Json(asset)),
        None => {
            debug!("Asset not found");
            METRICS.asset_lookups_missed_total.inc();
            Err(RegistryError::NotFound)
        }
    }
}

async fn update_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Result<Json<MessageResponse>, RegistryError> {
    let _timer = METRICS.http_request_duration_seconds.start_timer();
    METRICS.track_request("PUT /assets/:id");

    debug!("Updating asset {}", id);
    match state.store.update(id, patch).await? {
        Some(asset) => {
            info!("Asset updated (id: {:?})", asset.id());
            METRICS.assets_updated_total.inc();
            Ok(Json(MessageResponse::with_asset(
                "Asset updated successfully",
                asset,
            )))
        }
        None => {
            debug!("Asset not found for update");
            METRICS.asset_lookups_missed_total.inc();
            Err(RegistryError::NotFound)
        }
    }
}

async fn delete_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, RegistryError> {
    let _timer = METRICS.http_request_duration_seconds.start_timer();
    METRICS.track_request("DELETE /assets/:id");

    debug!("Deleting asset {}", id);
    match state.store.remove(id).await? {
        Some(asset) => {
            info!("Asset deleted (id: {:?})", asset.id());
            METRICS.assets_deleted_total.inc();
            METRICS.assets_stored.dec();
            Ok(Json(MessageResponse::new("Asset deleted successfully")))
        }
        None => {
            debug!("Asset not found for delete");
            METRICS.asset_lookups_missed_total.inc();
            Err(RegistryError::NotFound)
        }
    }
}
