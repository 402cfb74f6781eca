// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{ClientRepository, ItemRepository, OrderRepository, PgStore, Store, UserRepository},
    services::{
        auth::AuthService, client_service::ClientService, contract_storage::ContractStorage,
        dashboard_service::DashboardService, item_service::ItemService, order_service::OrderService,
        report_service::ReportService,
    },
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub upload_dir: String,
    pub database_max_connections: u32,
    pub jwt_ttl_days: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de qualquer fonte chave -> valor.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| anyhow!("{} deve ser definida", key));
        let number = |key: &str, default: &str| {
            let raw = lookup(key).unwrap_or_else(|| default.to_string());
            raw.trim()
                .parse::<i64>()
                .with_context(|| format!("{} inválido: '{}'", key, raw))
        };

        let database_max_connections = number("DATABASE_MAX_CONNECTIONS", "5")?;
        let jwt_ttl_days = number("JWT_TTL_DAYS", "7")?;
        if database_max_connections < 1 || jwt_ttl_days < 1 {
            return Err(anyhow!("DATABASE_MAX_CONNECTIONS e JWT_TTL_DAYS devem ser positivos"));
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            upload_dir: lookup("UPLOAD_DIR").unwrap_or_else(|| "./uploads".to_string()),
            database_max_connections: database_max_connections as u32,
            jwt_ttl_days,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<AppConfig>,
    pub auth_service: AuthService,
    pub item_service: ItemService,
    pub client_service: ClientService,
    pub order_service: OrderService,
    pub dashboard_service: DashboardService,
    pub report_service: ReportService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, config))
    }

    /// Monta o gráfico de dependências em cima de um pool já criado.
    pub fn from_pool(db_pool: PgPool, config: AppConfig) -> Self {
        let client_repo = ClientRepository::new(db_pool.clone());
        let item_repo = ItemRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());

        let store: Arc<dyn Store> = Arc::new(PgStore::new(
            client_repo.clone(),
            item_repo.clone(),
            order_repo.clone(),
        ));
        Self::with_store(db_pool, config, store)
    }

    /// Igual a `from_pool`, mas com as leituras vindas de outro `Store`.
    pub fn with_store(db_pool: PgPool, config: AppConfig, store: Arc<dyn Store>) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let client_repo = ClientRepository::new(db_pool.clone());
        let item_repo = ItemRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());
        let contracts = ContractStorage::new(&config.upload_dir);

        let auth_service = AuthService::new(user_repo, config.jwt_secret.clone(), config.jwt_ttl_days, db_pool.clone());
        let item_service = ItemService::new(item_repo.clone(), db_pool.clone());
        let client_service = ClientService::new(client_repo.clone(), store.clone(), db_pool.clone());
        let order_service = OrderService::new(order_repo.clone(), store.clone(), contracts, db_pool.clone());
        let dashboard_service = DashboardService::new(store.clone());
        let report_service = ReportService::new(store, client_repo, item_repo, order_repo, db_pool.clone());

        Self {
            db_pool,
            config: Arc::new(config),
            auth_service,
            item_service,
            client_service,
            order_service,
            dashboard_service,
            report_service,
        }
    }
}
