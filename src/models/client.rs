// src/models/client.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- ENUMS ---

// Mapeia o CREATE TYPE client_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "client_status")]
pub enum ClientStatus {
    #[serde(rename = "ATIVO")]
    #[sqlx(rename = "ATIVO")]
    Active,
    #[serde(rename = "INATIVO")]
    #[sqlx(rename = "INATIVO")]
    Inactive,
}

impl Default for ClientStatus {
    fn default() -> Self {
        ClientStatus::Active
    }
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Active => "ATIVO",
            ClientStatus::Inactive => "INATIVO",
        }
    }
}

// --- SUB-OBJETOS (vivem e morrem com o cliente) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Representative {
    #[validate(length(min = 1, max = 100, message = "required"))]
    #[schema(example = "João Souza")]
    pub name: String,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "joao@empresa.com.br")]
    pub email: String,

    #[validate(length(min = 10, max = 11, message = "invalid_phone"))]
    #[schema(example = "11987654321")]
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[validate(length(equal = 8, message = "invalid_zip_code"))]
    #[schema(example = "01310100")]
    pub zip_code: String,

    #[validate(length(equal = 2, message = "invalid_state"))]
    #[schema(example = "SP")]
    pub state: String,

    #[validate(length(min = 1, max = 100, message = "required"))]
    pub city: String,

    #[validate(length(min = 1, max = 100, message = "required"))]
    pub neighbourhood: String,

    #[validate(length(min = 1, max = 100, message = "required"))]
    pub street: String,

    #[validate(length(min = 1, max = 5, message = "required"))]
    pub number: String,

    pub complement: Option<String>,
    pub reference: Option<String>,
}

// --- CLIENTE ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    #[schema(example = "Padaria Pão Quente")]
    pub name: String,
    #[schema(example = "12345678000199")]
    pub document_number: String,
    pub representative: Representative,
    pub address: Address,
    pub status: ClientStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    #[validate(length(min = 1, max = 100, message = "required"))]
    pub name: String,

    // CPF ou CNPJ; pontuação é removida antes de salvar
    #[validate(custom(function = "validate_document"))]
    #[schema(example = "12.345.678/0001-99")]
    pub document_number: String,

    #[validate(nested)]
    pub representative: Representative,

    #[validate(nested)]
    pub address: Address,

    #[serde(default)]
    pub status: ClientStatus,
}

/// Mantém só os dígitos ("123.456.789-00" -> "12345678900").
pub fn digits_only(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

impl ClientPayload {
    /// Normaliza documento, CEP e número antes da validação.
    pub fn sanitized(mut self) -> Self {
        self.document_number = digits_only(&self.document_number);
        self.address.zip_code = digits_only(&self.address.zip_code);
        self.address.number = digits_only(&self.address.number);
        self.name = self.name.trim().to_string();
        self
    }

}

// CPF (11) ou CNPJ (14), contando só os dígitos
fn validate_document(document_number: &str) -> Result<(), ValidationError> {
    if (11..=14).contains(&digits_only(document_number).len()) {
        return Ok(());
    }
    let mut err = ValidationError::new("invalid_document");
    err.message = Some("Informe um CPF ou CNPJ válido.".into());
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> ClientPayload {
        ClientPayload {
            name: "  Padaria Pão Quente ".into(),
            document_number: "12.345.678/0001-99".into(),
            representative: Representative {
                name: "João".into(),
                email: "joao@empresa.com.br".into(),
                phone: "11987654321".into(),
            },
            address: Address {
                zip_code: "01310-100".into(),
                state: "SP".into(),
                city: "São Paulo".into(),
                neighbourhood: "Bela Vista".into(),
                street: "Av. Paulista".into(),
                number: "1.000".into(),
                complement: None,
                reference: None,
            },
            status: ClientStatus::default(),
        }
    }

    #[test]
    fn sanitizes_documents_and_address() {
        let clean = payload().sanitized();
        assert_eq!(clean.document_number, "12345678000199");
        assert_eq!(clean.address.zip_code, "01310100");
        assert_eq!(clean.address.number, "1000");
        assert_eq!(clean.name, "Padaria Pão Quente");
        assert!(clean.validate().is_ok());
    }

    #[test]
    fn short_document_is_rejected() {
        let mut bad = payload();
        bad.document_number = "123.456".into();
        let errors = bad.sanitized().validate().unwrap_err();
        assert!(errors.field_errors().contains_key("document_number"));
    }

    #[test]
    fn status_serializes_in_portuguese() {
        let json = serde_json::to_string(&ClientStatus::Inactive).unwrap();
        assert_eq!(json, "\"INATIVO\"");
        assert_eq!(ClientStatus::default(), ClientStatus::Active);
    }
}
