// src/db/memory_store.rs

//! Store em memória, para testes e demonstrações sem banco de dados.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::Store,
    models::{client::Client, item::Item, order::Order},
};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    orders: Vec<Order>,
    items: Vec<Item>,
    clients: Vec<Client>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }

    pub fn with_orders(mut self, orders: Vec<Order>) -> Self {
        self.orders.extend(orders);
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items.extend(items);
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.clients.push(client);
        self
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn fetch_all_orders(&self) -> Result<Vec<Order>, AppError> {
        Ok(self.orders.clone())
    }

    async fn fetch_order_by_id(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        Ok(self.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn fetch_items_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Item>, AppError> {
        Ok(self.items.iter().filter(|i| ids.contains(&i.id)).cloned().collect())
    }

    async fn fetch_all_clients(&self) -> Result<Vec<Client>, AppError> {
        Ok(self.clients.clone())
    }

    async fn fetch_client_by_id(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        Ok(self.clients.iter().find(|c| c.id == id).cloned())
    }
}
