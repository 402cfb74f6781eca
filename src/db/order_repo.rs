// src/db/order_repo.rs

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::order::{GrossBasis, NewOrder, Order, OrderLineItem},
};

#[derive(FromRow)]
struct OrderRow {
    id: Uuid,
    display_id: i32,
    client_id: Uuid,
    client_name: String,
    fixed_value: Option<Decimal>,
    discount: Decimal,
    installment_count: i32,
    installment_day: i32,
    paid_installments_count: i32,
    contract_start_date: NaiveDate,
    contract_end_date: NaiveDate,
    emission_date: NaiveDate,
    contract_file_path: Option<String>,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderLineItem>) -> Order {
        Order {
            id: self.id,
            display_id: self.display_id,
            client_id: self.client_id,
            client_name: self.client_name,
            items,
            gross_basis: GrossBasis::from_fixed_value(self.fixed_value),
            discount: self.discount,
            installment_count: self.installment_count,
            installment_day: self.installment_day,
            paid_installments_count: self.paid_installments_count,
            contract_start_date: self.contract_start_date,
            contract_end_date: self.contract_end_date,
            emission_date: self.emission_date,
            contract_file_path: self.contract_file_path,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct LineRow {
    order_id: Uuid,
    item_id: Uuid,
    item_name: String,
    quantity: i32,
    unit_price: Decimal,
}

const ORDER_SELECT: &str = r#"
    SELECT
        o.id, o.display_id, o.client_id, c.name AS client_name,
        o.fixed_value, o.discount, o.installment_count, o.installment_day,
        o.paid_installments_count, o.contract_start_date, o.contract_end_date,
        o.emission_date, o.contract_file_path, o.created_at
    FROM orders o
    JOIN clients c ON c.id = o.client_id
"#;

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn list_all(&self) -> Result<Vec<Order>, AppError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!("{} ORDER BY o.display_id ASC", ORDER_SELECT))
            .fetch_all(&self.pool)
            .await?;
        self.attach_lines(rows).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{} WHERE o.id = $1", ORDER_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.attach_lines(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Carrega os itens de todos os pedidos numa única consulta e distribui.
    async fn attach_lines(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let lines = sqlx::query_as::<_, LineRow>(
            r#"
            SELECT oi.order_id, oi.item_id, i.name AS item_name, oi.quantity, oi.unit_price
            FROM order_items oi
            JOIN items i ON i.id = oi.item_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.order_id, oi.position ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<Uuid, Vec<OrderLineItem>> = HashMap::new();
        for line in lines {
            by_order.entry(line.order_id).or_default().push(OrderLineItem {
                item_id: line.item_id,
                item_name: line.item_name,
                quantity: line.quantity,
                unit_price: line.unit_price,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect())
    }

    // =========================================================================
    //  ESCRITA (o Service controla a transação)
    // =========================================================================

    /// Grava o cabeçalho do pedido e devolve o id gerado.
    pub async fn insert_order<'e, E>(&self, executor: E, order: &NewOrder) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO orders (
                client_id, fixed_value, discount, installment_count, installment_day,
                paid_installments_count, contract_start_date, contract_end_date,
                emission_date, contract_file_path
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(order.client_id)
        .bind(order.gross_basis.fixed_value())
        .bind(order.discount)
        .bind(order.installment_count)
        .bind(order.installment_day)
        .bind(order.paid_installments_count)
        .bind(order.contract_start_date)
        .bind(order.contract_end_date)
        .bind(order.emission_date)
        .bind(order.contract_file_path.as_deref())
        .fetch_one(executor)
        .await?;

        Ok(id)
    }

    /// Regrava o cabeçalho. O contrato anexado não é tocado aqui.
    pub async fn update_order<'e, E>(&self, executor: E, id: Uuid, order: &NewOrder) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                client_id = $2, fixed_value = $3, discount = $4, installment_count = $5,
                installment_day = $6, paid_installments_count = $7, contract_start_date = $8,
                contract_end_date = $9, emission_date = $10
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(order.client_id)
        .bind(order.gross_basis.fixed_value())
        .bind(order.discount)
        .bind(order.installment_count)
        .bind(order.installment_day)
        .bind(order.paid_installments_count)
        .bind(order.contract_start_date)
        .bind(order.contract_end_date)
        .bind(order.emission_date)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::OrderNotFound(id));
        }
        Ok(())
    }

    pub async fn insert_line<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        position: i32,
        line: &OrderLineItem,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, item_id, position, quantity, unit_price)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(order_id)
        .bind(line.item_id)
        .bind(position)
        .bind(line.quantity)
        .bind(line.unit_price)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn delete_lines<'e, E>(&self, executor: E, order_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(order_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn update_paid_installments<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        paid_installments_count: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE orders SET paid_installments_count = $2 WHERE id = $1")
            .bind(id)
            .bind(paid_installments_count)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::OrderNotFound(id));
        }
        Ok(())
    }

    /// `None` remove a referência ao contrato.
    pub async fn set_contract_path<'e, E>(&self, executor: E, id: Uuid, path: Option<&str>) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE orders SET contract_file_path = $2 WHERE id = $1")
            .bind(id)
            .bind(path)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::OrderNotFound(id));
        }
        Ok(())
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::OrderNotFound(id));
        }
        Ok(())
    }
}
