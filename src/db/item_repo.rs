// src/db/item_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::item::Item};

#[derive(Clone)]
pub struct ItemRepository {
    pool: PgPool,
}

// Nome duplicado vira 409; item usado por pedido não pode ser apagado.
fn map_item_error(e: sqlx::Error, id: Option<Uuid>, name: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::ItemNameAlreadyExists(name.to_string());
        }
        if db_err.is_foreign_key_violation() {
            if let Some(id) = id {
                return AppError::ItemInUse(id);
            }
        }
    }
    e.into()
}

impl ItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Item>, AppError> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, name, price, created_at FROM items ORDER BY LOWER(name) ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Item>, AppError> {
        let item = sqlx::query_as::<_, Item>("SELECT id, name, price, created_at FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    /// Busca em lote; ids inexistentes simplesmente não aparecem no resultado.
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Item>, AppError> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, name, price, created_at FROM items WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Procura pelo nome sem diferenciar maiúsculas (usado pela importação).
    pub async fn find_by_name<'e, E>(&self, executor: E, name: &str) -> Result<Option<Item>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, Item>(
            "SELECT id, name, price, created_at FROM items WHERE LOWER(name) = LOWER($1)",
        )
        .bind(name)
        .fetch_optional(executor)
        .await?;
        Ok(item)
    }

    pub async fn create<'e, E>(&self, executor: E, name: &str, price: Decimal) -> Result<Item, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (name, price)
            VALUES ($1, $2)
            RETURNING id, name, price, created_at
            "#,
        )
        .bind(name)
        .bind(price)
        .fetch_one(executor)
        .await
        .map_err(|e| map_item_error(e, None, name))
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        price: Decimal,
    ) -> Result<Item, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Item>(
            r#"
            UPDATE items SET name = $2, price = $3
            WHERE id = $1
            RETURNING id, name, price, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(price)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_item_error(e, Some(id), name))?
        .ok_or(AppError::ItemNotFound(id))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| map_item_error(e, Some(id), ""))?;

        if result.rows_affected() == 0 {
            return Err(AppError::ItemNotFound(id));
        }
        Ok(())
    }
}
