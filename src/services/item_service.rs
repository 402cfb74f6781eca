// src/services/item_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ItemRepository,
    models::item::{Item, ItemPayload},
};

#[derive(Clone)]
pub struct ItemService {
    repo: ItemRepository,
    pool: PgPool,
}

impl ItemService {
    pub fn new(repo: ItemRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn list_items(&self) -> Result<Vec<Item>, AppError> {
        self.repo.list().await
    }

    pub async fn get_item(&self, id: Uuid) -> Result<Item, AppError> {
        self.repo.find_by_id(id).await?.ok_or(AppError::ItemNotFound(id))
    }

    // Mudar o preço aqui não altera pedidos existentes (eles têm snapshot)
    pub async fn create_item(&self, payload: &ItemPayload) -> Result<Item, AppError> {
        self.repo.create(&self.pool, payload.name.trim(), payload.price).await
    }

    pub async fn update_item(&self, id: Uuid, payload: &ItemPayload) -> Result<Item, AppError> {
        self.repo.update(&self.pool, id, payload.name.trim(), payload.price).await
    }

    pub async fn delete_item(&self, id: Uuid) -> Result<(), AppError> {
        self.repo.delete(&self.pool, id).await
    }
}
