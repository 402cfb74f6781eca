// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::change_password,

        // --- Items ---
        handlers::items::list_items,
        handlers::items::get_item,
        handlers::items::create_item,
        handlers::items::update_item,
        handlers::items::delete_item,

        // --- Clients ---
        handlers::clients::list_clients,
        handlers::clients::filter_clients,
        handlers::clients::get_client,
        handlers::clients::create_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,

        // --- Orders ---
        handlers::orders::list_orders,
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::update_order,
        handlers::orders::delete_order,
        handlers::orders::get_valuation,
        handlers::orders::update_paid_installments,
        handlers::orders::filter_orders,
        handlers::orders::filter_client_orders,
        handlers::orders::upload_contract,
        handlers::orders::download_contract,
        handlers::orders::delete_contract,

        // --- Dashboard ---
        handlers::dashboard::get_evolution,
        handlers::dashboard::get_performance,

        // --- Reports ---
        handlers::reports::export_orders,
        handlers::reports::export_performance,
        handlers::reports::export_clients,
        handlers::reports::import_orders,
        handlers::reports::import_clients,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            handlers::auth::ChangePasswordPayload,

            // --- Items ---
            models::item::Item,
            models::item::ItemPayload,

            // --- Clients ---
            models::client::ClientStatus,
            models::client::Representative,
            models::client::Address,
            models::client::Client,
            models::client::ClientPayload,

            // --- Orders ---
            models::order::OrderLineItem,
            models::order::GrossBasis,
            models::order::Order,
            models::order::OrderValuation,
            models::order::OrderResponse,
            models::order::OrderItemEntry,
            models::order::OrderPayload,
            models::order::PaidInstallmentsPayload,
            handlers::orders::ContractUpload,

            // --- Filtros ---
            models::filters::OrderFilter,
            models::filters::ClientOrderFilter,
            models::filters::ClientFilter,
            models::filters::DashboardFilter,

            // --- Dashboard ---
            models::dashboard::DashboardEvolution,
            models::dashboard::ItemPerformance,
            models::dashboard::DashboardPerformance,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Senha"),
        (name = "Items", description = "Catálogo de Itens"),
        (name = "Clients", description = "Cadastro de Clientes"),
        (name = "Orders", description = "Pedidos, Parcelas e Contratos"),
        (name = "Dashboard", description = "Evolução do Saldo e Desempenho por Item"),
        (name = "Reports", description = "Exportação e Importação de Planilhas (CSV)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/users/password",
            "/api/orders/{id}/contract",
            "/api/orders/client/{client_id}/filter",
            "/api/dashboard/performance",
            "/api/export/orders.csv",
            "/api/export/clients.csv",
            "/api/import/clients",
        ] {
            assert!(doc.paths.paths.contains_key(path), "rota sem documentação: {}", path);
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
