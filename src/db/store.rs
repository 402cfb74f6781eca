// src/db/store.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ClientRepository, ItemRepository, OrderRepository},
    models::{client::Client, item::Item, order::Order},
};

/// Leituras em lote usadas por listagens, dashboard e relatórios.
///
/// Não há filtro nem ordenação aqui: tudo isso acontece em memória depois
/// da leitura, então qualquer implementação só precisa devolver os dados.
#[async_trait]
pub trait Store: Send + Sync {
    async fn fetch_all_orders(&self) -> Result<Vec<Order>, AppError>;

    async fn fetch_order_by_id(&self, id: Uuid) -> Result<Option<Order>, AppError>;

    /// Ids desconhecidos são omitidos; quem chama decide se isso é erro.
    async fn fetch_items_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Item>, AppError>;

    async fn fetch_all_clients(&self) -> Result<Vec<Client>, AppError>;

    async fn fetch_client_by_id(&self, id: Uuid) -> Result<Option<Client>, AppError>;
}

// Implementação real, em cima dos repositórios do PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    clients: ClientRepository,
    items: ItemRepository,
    orders: OrderRepository,
}

impl PgStore {
    pub fn new(clients: ClientRepository, items: ItemRepository, orders: OrderRepository) -> Self {
        Self { clients, items, orders }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn fetch_all_orders(&self) -> Result<Vec<Order>, AppError> {
        self.orders.list_all().await
    }

    async fn fetch_order_by_id(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        self.orders.find_by_id(id).await
    }

    async fn fetch_items_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Item>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.items.find_by_ids(ids).await
    }

    async fn fetch_all_clients(&self) -> Result<Vec<Client>, AppError> {
        self.clients.list().await
    }

    async fn fetch_client_by_id(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        self.clients.find_by_id(id).await
    }
}
