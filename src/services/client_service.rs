// src/services/client_service.rs

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ClientRepository, Store},
    models::{
        client::{Client, ClientPayload},
        filters::ClientFilter,
    },
    services::listing,
};

#[derive(Clone)]
pub struct ClientService {
    repo: ClientRepository,
    store: Arc<dyn Store>,
    pool: PgPool,
}

impl ClientService {
    pub fn new(repo: ClientRepository, store: Arc<dyn Store>, pool: PgPool) -> Self {
        Self { repo, store, pool }
    }

    pub async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        self.store.fetch_all_clients().await
    }

    pub async fn filter_clients(&self, filter: &ClientFilter) -> Result<Vec<Client>, AppError> {
        let clients = self.store.fetch_all_clients().await?;
        Ok(listing::filter_clients(clients, filter))
    }

    pub async fn get_client(&self, id: Uuid) -> Result<Client, AppError> {
        self.store
            .fetch_client_by_id(id)
            .await?
            .ok_or(AppError::ClientNotFound(id))
    }

    /// O payload já chega sanitizado e validado pelo handler.
    pub async fn create_client(&self, payload: &ClientPayload) -> Result<Client, AppError> {
        let client = self.repo.create(&self.pool, payload).await?;
        tracing::info!("🏢 Cliente cadastrado: {} ({})", client.name, client.id);
        Ok(client)
    }

    pub async fn update_client(&self, id: Uuid, payload: &ClientPayload) -> Result<Client, AppError> {
        self.repo.update(&self.pool, id, payload).await
    }

    pub async fn delete_client(&self, id: Uuid) -> Result<(), AppError> {
        self.repo.delete(&self.pool, id).await
    }
}
