// src/routes.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::auth::auth_guard,
    services::contract_storage::MAX_CONTRACT_BYTES,
};

// Folga para os cabeçalhos do multipart além do próprio arquivo
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Monta o router completo (rotas públicas, protegidas e Swagger).
pub fn app(app_state: AppState) -> Router {
    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/password", put(handlers::auth::change_password));

    let item_routes = Router::new()
        .route(
            "/",
            get(handlers::items::list_items).post(handlers::items::create_item),
        )
        .route(
            "/{id}",
            get(handlers::items::get_item)
                .put(handlers::items::update_item)
                .delete(handlers::items::delete_item),
        );

    let client_routes = Router::new()
        .route(
            "/",
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route("/filter", post(handlers::clients::filter_clients))
        .route(
            "/{id}",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        );

    let order_routes = Router::new()
        .route(
            "/",
            get(handlers::orders::list_orders).post(handlers::orders::create_order),
        )
        .route("/filter", post(handlers::orders::filter_orders))
        .route(
            "/client/{client_id}/filter",
            post(handlers::orders::filter_client_orders),
        )
        .route(
            "/{id}",
            get(handlers::orders::get_order)
                .put(handlers::orders::update_order)
                .delete(handlers::orders::delete_order),
        )
        .route("/{id}/valuation", get(handlers::orders::get_valuation))
        .route(
            "/{id}/installments",
            patch(handlers::orders::update_paid_installments),
        )
        .route(
            "/{id}/contract",
            post(handlers::orders::upload_contract)
                .get(handlers::orders::download_contract)
                .delete(handlers::orders::delete_contract)
                .layer(DefaultBodyLimit::max(MAX_CONTRACT_BYTES + MULTIPART_OVERHEAD)),
        );

    let dashboard_routes = Router::new()
        .route("/evolution", post(handlers::dashboard::get_evolution))
        .route("/performance", post(handlers::dashboard::get_performance));

    let report_routes = Router::new()
        .route("/export/orders.csv", get(handlers::reports::export_orders))
        .route(
            "/export/performance.csv",
            get(handlers::reports::export_performance),
        )
        .route("/export/clients.csv", get(handlers::reports::export_clients))
        .route("/import/orders", post(handlers::reports::import_orders))
        .route("/import/clients", post(handlers::reports::import_clients));

    // Tudo aqui passa pelo auth_guard
    let protected = Router::new()
        .nest("/users", user_routes)
        .nest("/items", item_routes)
        .nest("/clients", client_routes)
        .nest("/orders", order_routes)
        .nest("/dashboard", dashboard_routes)
        .merge(report_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected)
        .with_state(app_state)
}
