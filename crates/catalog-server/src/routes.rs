//! HTTP handlers. Each one builds an operation value and dispatches it.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use catalog_api::ApiError;
use catalog_core::{BigDecimal, PRODUCT_NOT_FOUND, parse_id};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::operations::{
    CreateProduct, DeleteProduct, GetAllProducts, GetProductById, Request, UpdateProduct,
};
use crate::server::AppState;

/// Which tier a read is served through.
pub const CACHE_SOURCE_HEADER: &str = "x-cache-source";

fn cache_source(tier: &'static str) -> [(HeaderName, HeaderValue); 1] {
    [(
        HeaderName::from_static(CACHE_SOURCE_HEADER),
        HeaderValue::from_static(tier),
    )]
}

/// Body of `PUT /api/products/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductBody {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: BigDecimal,
    pub stock: i32,
}

/// Runs the operation on its own task.
///
/// If the client disconnects, this future is dropped and the guard cancels
/// the token. The task keeps running and stops at its next boundary check,
/// so a write is never cut off before its invalidation.
async fn dispatch<R: Request>(state: &AppState, request: R) -> Result<R::Response, ApiError> {
    let registry = state.registry.clone();
    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();

    let task = tokio::spawn(async move { registry.send(request, &cancel).await });
    let joined = task.await;
    guard.disarm();

    match joined {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(e)) => {
            tracing::error!(operation = %R::KIND, error = %e, "operation failed");
            Err(e.into())
        }
        Err(e) => {
            tracing::error!(operation = %R::KIND, error = %e, "operation task failed");
            Err(ApiError::internal(e.to_string()))
        }
    }
}

fn parse_product_id(raw: &str) -> Result<Uuid, ApiError> {
    parse_id(raw).map_err(|_| ApiError::bad_request(format!("Invalid product id: {raw}")))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_product_id(&id)?;
    let result = dispatch(&state, GetProductById { id }).await?;

    if result.is_success {
        Ok((cache_source("Memory"), Json(result)).into_response())
    } else {
        Ok((StatusCode::NOT_FOUND, Json(result)).into_response())
    }
}

pub async fn list_products(State(state): State<AppState>) -> Result<Response, ApiError> {
    let result = dispatch(&state, GetAllProducts).await?;
    Ok((cache_source("Redis"), Json(result)).into_response())
}

pub async fn create_product(
    State(state): State<AppState>,
    body: Result<Json<CreateProduct>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let result = dispatch(&state, request).await?;

    let location = result
        .data
        .as_ref()
        .and_then(|dto| HeaderValue::from_str(&format!("/api/products/{}", dto.id)).ok());
    let mut response = (StatusCode::CREATED, Json(result)).into_response();
    if let Some(location) = location {
        response.headers_mut().insert(header::LOCATION, location);
    }
    Ok(response)
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateProductBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = parse_product_id(&id)?;
    let Json(body) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let request = UpdateProduct {
        id,
        name: body.name,
        description: body.description,
        price: body.price,
        stock: body.stock,
    };

    let result = dispatch(&state, request).await?;
    let status = if result.is_success {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    Ok((status, Json(result)).into_response())
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_product_id(&id)?;
    let result = dispatch(&state, DeleteProduct { id }).await?;

    if result.is_success {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        let message = result
            .error
            .unwrap_or_else(|| PRODUCT_NOT_FOUND.to_string());
        Err(ApiError::not_found(message))
    }
}

pub async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "store": state.store_backend,
        "cache": state.tiers.shared().backend_name(),
    }))
}

pub async fn metrics() -> Response {
    match crate::metrics::render_metrics() {
        Some(body) => (
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            )],
            body,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
