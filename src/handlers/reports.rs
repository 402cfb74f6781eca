// src/handlers/reports.rs

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        client::{Client, ClientStatus},
        filters::{ClientFilter, DashboardFilter},
        order::OrderResponse,
    },
};

/// Mesmo filtro do dashboard, só que vindo da query string.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExportParams {
    #[param(value_type = Option<String>, format = Date, example = "2024-01-01")]
    pub start_date: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date, example = "2024-12-31")]
    pub end_date: Option<NaiveDate>,
    /// IDs separados por vírgula
    pub item_ids: Option<String>,
}

impl ExportParams {
    pub fn into_filter(self) -> Result<DashboardFilter, AppError> {
        let item_ids = match self.item_ids.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let parsed: Result<Vec<Uuid>, _> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(Uuid::parse_str)
                    .collect();

                match parsed {
                    Ok(ids) => Some(ids),
                    Err(_) => {
                        let mut errors = ValidationErrors::new();
                        let mut error = ValidationError::new("invalid_uuid");
                        error.message = Some("Lista de itens inválida.".into());
                        errors.add("itemIds", error);
                        return Err(AppError::ValidationError(errors));
                    }
                }
            }
        };

        Ok(DashboardFilter {
            start_date: self.start_date,
            end_date: self.end_date,
            item_ids,
        })
    }
}

/// Filtro da planilha de clientes (?status=ATIVO&search=padaria).
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ClientExportParams {
    #[param(value_type = Option<String>, example = "ATIVO")]
    pub status: Option<ClientStatus>,
    pub search: Option<String>,
}

impl From<ClientExportParams> for ClientFilter {
    fn from(params: ClientExportParams) -> Self {
        ClientFilter {
            search: params.search,
            status: params.status,
            ..Default::default()
        }
    }
}

fn csv_attachment(file_name: &str, bytes: Vec<u8>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file_name)),
        ],
        bytes,
    )
}

#[utoipa::path(
    get,
    path = "/api/export/orders.csv",
    tag = "Reports",
    params(ExportParams),
    responses(
        (status = 200, description = "Relatório de pedidos com bloco de resumo", content_type = "text/csv"),
        (status = 400, description = "Filtro inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = params.into_filter().map_err(|e| e.to_api_error(&locale))?;

    let bytes = app_state
        .report_service
        .export_orders(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(csv_attachment("pedidos.csv", bytes))
}

#[utoipa::path(
    get,
    path = "/api/export/performance.csv",
    tag = "Reports",
    params(ExportParams),
    responses(
        (status = 200, description = "Desempenho por item", content_type = "text/csv"),
        (status = 400, description = "Filtro inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_performance(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = params.into_filter().map_err(|e| e.to_api_error(&locale))?;

    let bytes = app_state
        .report_service
        .export_performance(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(csv_attachment("desempenho_itens.csv", bytes))
}

#[utoipa::path(
    get,
    path = "/api/export/clients.csv",
    tag = "Reports",
    params(ClientExportParams),
    responses(
        (status = 200, description = "Clientes cadastrados, opcionalmente filtrados por status", content_type = "text/csv"),
        (status = 400, description = "Filtro inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_clients(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(params): Query<ClientExportParams>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = app_state
        .report_service
        .export_clients(&ClientFilter::from(params))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(csv_attachment("clientes.csv", bytes))
}

// O corpo da requisição é o próprio CSV
#[utoipa::path(
    post,
    path = "/api/import/orders",
    tag = "Reports",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 201, description = "Pedidos importados", body = Vec<OrderResponse>),
        (status = 400, description = "Linha inválida no arquivo")
    ),
    security(("api_jwt" = []))
)]
pub async fn import_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let orders = app_state
        .report_service
        .import_orders(&body)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(orders)))
}

#[utoipa::path(
    post,
    path = "/api/import/clients",
    tag = "Reports",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 201, description = "Clientes criados (documentos já existentes são ignorados)", body = Vec<Client>),
        (status = 400, description = "Linha inválida no arquivo")
    ),
    security(("api_jwt" = []))
)]
pub async fn import_clients(
    State(app_state): State<AppState>,
    locale: Locale,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let clients = app_state
        .report_service
        .import_clients(&body)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(clients)))
}
