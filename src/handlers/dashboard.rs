// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::{
        dashboard::{DashboardEvolution, DashboardPerformance},
        filters::DashboardFilter,
    },
};

// POST /api/dashboard/evolution
#[utoipa::path(
    post,
    path = "/api/dashboard/evolution",
    tag = "Dashboard",
    request_body = DashboardFilter,
    responses(
        (status = 200, description = "Saldo inicial, entradas, saldo final e variação no período", body = DashboardEvolution),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_evolution(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(filter): Json<DashboardFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let evolution = app_state
        .dashboard_service
        .get_evolution(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(evolution)))
}

// POST /api/dashboard/performance
#[utoipa::path(
    post,
    path = "/api/dashboard/performance",
    tag = "Dashboard",
    request_body = DashboardFilter,
    responses(
        (status = 200, description = "Receita e participação de cada item no período", body = DashboardPerformance),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_performance(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(filter): Json<DashboardFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let performance = app_state
        .dashboard_service
        .get_performance(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(performance)))
}
