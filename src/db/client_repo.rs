// src/db/client_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{types::Json, Executor, FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::client::{Address, Client, ClientPayload, ClientStatus, Representative},
};

// Linha crua da tabela: representante e endereço chegam como JSONB
#[derive(FromRow)]
struct ClientRow {
    id: Uuid,
    name: String,
    document_number: String,
    representative: Json<Representative>,
    address: Json<Address>,
    status: ClientStatus,
    created_at: DateTime<Utc>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: row.id,
            name: row.name,
            document_number: row.document_number,
            representative: row.representative.0,
            address: row.address.0,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

const CLIENT_COLUMNS: &str = "id, name, document_number, representative, address, status, created_at";

fn map_client_error(e: sqlx::Error, id: Option<Uuid>, document_number: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::DocumentAlreadyExists(document_number.to_string());
        }
        if db_err.is_foreign_key_violation() {
            if let Some(id) = id {
                return AppError::ClientInUse(id);
            }
        }
    }
    e.into()
}

#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Client>, AppError> {
        let rows = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {} FROM clients ORDER BY created_at ASC",
            CLIENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Client::from).collect())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        let row = sqlx::query_as::<_, ClientRow>(&format!("SELECT {} FROM clients WHERE id = $1", CLIENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Client::from))
    }

    /// O documento já deve chegar só com dígitos.
    pub async fn find_by_document<'e, E>(&self, executor: E, document_number: &str) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {} FROM clients WHERE document_number = $1",
            CLIENT_COLUMNS
        ))
        .bind(document_number)
        .fetch_optional(executor)
        .await?;
        Ok(row.map(Client::from))
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &ClientPayload) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            r#"
            INSERT INTO clients (name, document_number, representative, address, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            CLIENT_COLUMNS
        ))
        .bind(&payload.name)
        .bind(&payload.document_number)
        .bind(Json(&payload.representative))
        .bind(Json(&payload.address))
        .bind(payload.status)
        .fetch_one(executor)
        .await
        .map_err(|e| map_client_error(e, None, &payload.document_number))?;

        Ok(row.into())
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &ClientPayload) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            r#"
            UPDATE clients
            SET name = $2, document_number = $3, representative = $4, address = $5, status = $6
            WHERE id = $1
            RETURNING {}
            "#,
            CLIENT_COLUMNS
        ))
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.document_number)
        .bind(Json(&payload.representative))
        .bind(Json(&payload.address))
        .bind(payload.status)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_client_error(e, Some(id), &payload.document_number))?;

        row.map(Client::from).ok_or(AppError::ClientNotFound(id))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| map_client_error(e, Some(id), ""))?;

        if result.rows_affected() == 0 {
            return Err(AppError::ClientNotFound(id));
        }
        Ok(())
    }
}
