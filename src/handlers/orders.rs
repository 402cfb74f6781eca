// src/handlers/orders.rs

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        filters::{ClientOrderFilter, OrderFilter},
        order::{OrderPayload, OrderResponse, OrderValuation, PaidInstallmentsPayload},
    },
};

/// Formulário multipart do upload de contrato.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ContractUpload {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    responses(
        (status = 200, description = "Todos os pedidos com valores calculados", body = Vec<OrderResponse>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let orders = app_state
        .order_service
        .list_orders()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(orders)))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = OrderPayload,
    responses(
        (status = 201, description = "Pedido criado", body = OrderResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 422, description = "Cliente ou item inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<OrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let order = app_state
        .order_service
        .create_order(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido", body = OrderResponse),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .order_service
        .get_order(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(order)))
}

// Refaz os snapshots com os preços atuais do catálogo; o contrato é mantido
#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = OrderPayload,
    responses(
        (status = 200, description = "Pedido atualizado", body = OrderResponse),
        (status = 404, description = "Pedido não encontrado"),
        (status = 422, description = "Cliente ou item inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_order(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<OrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let order = app_state
        .order_service
        .update_order(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(order)))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 204, description = "Pedido removido"),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_order(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .order_service
        .delete_order(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/valuation",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Valores bruto, líquido, pago e restante", body = OrderValuation),
        (status = 404, description = "Pedido não encontrado"),
        (status = 422, description = "Quantidade de parcelas inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_valuation(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let valuation = app_state
        .order_service
        .get_valuation(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(valuation)))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/installments",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = PaidInstallmentsPayload,
    responses(
        (status = 200, description = "Parcelas pagas atualizadas", body = OrderResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_paid_installments(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaidInstallmentsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let order = app_state
        .order_service
        .update_paid_installments(id, payload.paid_installments_count)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(order)))
}

#[utoipa::path(
    post,
    path = "/api/orders/filter",
    tag = "Orders",
    request_body = OrderFilter,
    responses(
        (status = 200, description = "Pedidos filtrados e ordenados", body = Vec<OrderResponse>)
    ),
    security(("api_jwt" = []))
)]
pub async fn filter_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(filter): Json<OrderFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = app_state
        .order_service
        .filter_orders(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(orders)))
}

#[utoipa::path(
    post,
    path = "/api/orders/client/{client_id}/filter",
    tag = "Orders",
    params(("client_id" = Uuid, Path, description = "ID do cliente")),
    request_body = ClientOrderFilter,
    responses(
        (status = 200, description = "Pedidos do cliente", body = Vec<OrderResponse>),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn filter_client_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(client_id): Path<Uuid>,
    Json(filter): Json<ClientOrderFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = app_state
        .order_service
        .filter_client_orders(client_id, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(orders)))
}

// =========================================================================
//  CONTRATO
// =========================================================================

#[utoipa::path(
    post,
    path = "/api/orders/{id}/contract",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body(content = ContractUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Contrato anexado", body = OrderResponse),
        (status = 400, description = "Arquivo ausente, formato inválido ou maior que 10MB"),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_contract(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidContractFile(e.body_text()).to_api_error(&locale))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidContractFile(e.body_text()).to_api_error(&locale))?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) = upload.ok_or_else(|| {
        AppError::InvalidContractFile("Nenhum arquivo enviado.".into()).to_api_error(&locale)
    })?;

    let order = app_state
        .order_service
        .upload_contract(id, &file_name, &bytes)
        .await
        .map_err(|e| {
            if let AppError::InvalidContractFile(reason) = &e {
                tracing::warn!("⚠️ Contrato recusado para o pedido {}: {}", id, reason);
            }
            e.to_api_error(&locale)
        })?;

    Ok((StatusCode::OK, Json(order)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/contract",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Arquivo do contrato", content_type = "application/octet-stream"),
        (status = 404, description = "Pedido ou contrato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn download_contract(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let (file_name, bytes) = app_state
        .order_service
        .get_contract(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let disposition = format!("attachment; filename=\"{}\"", file_name.replace('"', ""));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}/contract",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 204, description = "Contrato removido"),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_contract(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .order_service
        .delete_contract(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
