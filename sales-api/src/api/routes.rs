//! API routes for the sales server

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sales_cache::{
    CacheStats, CancelSignal, CreateSaleCommand, CreateUserCommand, MemoryCache, SaleService,
    UserService,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::error::ApiError;

/// Application state
pub struct AppState {
    pub sales: Arc<SaleService>,
    pub users: Arc<UserService>,
    /// Set when the in-process cache backs the services
    pub memory_cache: Option<Arc<MemoryCache>>,
}

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheHealth>,
}

/// In-process cache statistics reported by the health check
#[derive(Serialize)]
pub struct CacheHealth {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_rate: f64,
    pub total_evictions: u64,
}

impl From<CacheStats> for CacheHealth {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            total_evictions: stats.total_evictions(),
            stats,
        }
    }
}

/// Sale listing query parameters
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSalesQuery {
    pub customer: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedSales<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub page_size: u32,
}

fn parse_id(entity: &'static str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidId {
        entity,
        value: raw.to_string(),
    })
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cache = match &state.memory_cache {
        Some(cache) => Some(CacheHealth::from(cache.stats().await)),
        None => None,
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache,
    })
}

pub async fn create_sale(
    State(state): State<Arc<AppState>>,
    Json(command): Json<CreateSaleCommand>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .sales
        .create_sale(command, &CancelSignal::never())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(result, "Sale created successfully")),
    ))
}

pub async fn get_sale(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id("Sale", &id)?;
    let sale = state.sales.get_sale(id, &CancelSignal::never()).await?;
    Ok(Json(ApiResponse::ok(sale)))
}

pub async fn list_sales(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListSalesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = params.page.unwrap_or(1);
    let page_size = params.page_size.unwrap_or(10);

    let items = state
        .sales
        .list_sales(params.customer.as_deref(), page, page_size, &CancelSignal::never())
        .await?;

    Ok(Json(ApiResponse::ok(PagedSales {
        items,
        current_page: page,
        page_size,
    })))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(command): Json<CreateUserCommand>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .users
        .create_user(command, &CancelSignal::never())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(result, "User created successfully")),
    ))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id("User", &id)?;
    let user = state.users.get_user(id, &CancelSignal::never()).await?;
    Ok(Json(ApiResponse::ok(user)))
}
