// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::middleware::i18n::Locale;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Documento '{0}' já cadastrado")]
    DocumentAlreadyExists(String),

    #[error("Item '{0}' já cadastrado")]
    ItemNameAlreadyExists(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    // --- Exclusão bloqueada por pedidos que ainda referenciam a linha ---
    #[error("Cliente {0} possui pedidos")]
    ClientInUse(Uuid),

    #[error("Item {0} está em pedidos")]
    ItemInUse(Uuid),

    // --- Não encontrados (404) ---
    #[error("Cliente {0} não encontrado")]
    ClientNotFound(Uuid),

    #[error("Item {0} não encontrado")]
    ItemNotFound(Uuid),

    #[error("Pedido {0} não encontrado")]
    OrderNotFound(Uuid),

    #[error("Nenhum contrato anexado ao pedido")]
    ContractNotFound,

    // --- Erros de dados (falham a requisição inteira) ---
    #[error("Pedido referencia cliente inexistente: {0}")]
    UnknownClientReference(Uuid),

    #[error("Pedido referencia item inexistente: {0}")]
    UnknownItemReference(Uuid),

    #[error("Quantidade de parcelas inválida: {0}")]
    InvalidInstallmentCount(i32),

    #[error("Linha {line} inválida: {reason}")]
    MalformedImport { line: usize, reason: String },

    #[error("Arquivo de contrato inválido: {0}")]
    InvalidContractFile(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro de CSV: {0}")]
    Csv(#[from] csv::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// Erro já traduzido, pronto para virar resposta HTTP.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::MalformedImport { .. }
            | AppError::InvalidContractFile(_) => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists
            | AppError::DocumentAlreadyExists(_)
            | AppError::ItemNameAlreadyExists(_)
            | AppError::ClientInUse(_)
            | AppError::ItemInUse(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound
            | AppError::ClientNotFound(_)
            | AppError::ItemNotFound(_)
            | AppError::OrderNotFound(_)
            | AppError::ContractNotFound => StatusCode::NOT_FOUND,
            AppError::UnknownClientReference(_)
            | AppError::UnknownItemReference(_)
            | AppError::InvalidInstallmentCount(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Mensagem para o usuário final no idioma pedido ("pt" ou "en").
    fn message(&self, lang: &str) -> String {
        let pt = lang == "pt";
        match self {
            AppError::ValidationError(_) => pick(pt, "Um ou mais campos são inválidos.", "One or more fields are invalid."),
            AppError::EmailAlreadyExists => pick(pt, "Este e-mail já está em uso.", "This e-mail is already in use."),
            AppError::DocumentAlreadyExists(doc) => if pt {
                format!("Documento '{}' já cadastrado.", doc)
            } else {
                format!("Document '{}' is already registered.", doc)
            },
            AppError::ItemNameAlreadyExists(name) => if pt {
                format!("Já existe um item chamado '{}'.", name)
            } else {
                format!("An item named '{}' already exists.", name)
            },
            AppError::ClientInUse(_) => pick(pt, "O cliente possui pedidos e não pode ser excluído.", "The client has orders and cannot be deleted."),
            AppError::ItemInUse(_) => pick(pt, "O item está em pedidos e não pode ser excluído.", "The item is used by orders and cannot be deleted."),
            AppError::InvalidCredentials => pick(pt, "E-mail ou senha inválidos.", "Invalid e-mail or password."),
            AppError::InvalidToken => pick(pt, "Token de autenticação inválido ou ausente.", "Missing or invalid authentication token."),
            AppError::UserNotFound => pick(pt, "Usuário não encontrado.", "User not found."),
            AppError::ClientNotFound(_) => pick(pt, "Cliente não encontrado.", "Client not found."),
            AppError::ItemNotFound(_) => pick(pt, "Item não encontrado.", "Item not found."),
            AppError::OrderNotFound(_) => pick(pt, "Pedido não encontrado.", "Order not found."),
            AppError::ContractNotFound => pick(pt, "Nenhum contrato anexado a este pedido.", "No contract uploaded for this order."),
            AppError::UnknownClientReference(id) => if pt {
                format!("Cliente {} não encontrado.", id)
            } else {
                format!("Client {} not found.", id)
            },
            AppError::UnknownItemReference(id) => if pt {
                format!("Item {} não encontrado.", id)
            } else {
                format!("Item id {} not found.", id)
            },
            AppError::InvalidInstallmentCount(count) => if pt {
                format!("Quantidade de parcelas inválida: {}.", count)
            } else {
                format!("Invalid installment count: {}.", count)
            },
            AppError::MalformedImport { line, reason } => if pt {
                format!("Erro ao importar linha {}: {}", line, reason)
            } else {
                format!("Import failed at line {}: {}", line, reason)
            },
            AppError::InvalidContractFile(reason) => reason.clone(),
            _ => pick(pt, "Ocorreu um erro inesperado.", "An unexpected error occurred."),
        }
    }

    pub fn to_api_error(self, locale: &Locale) -> ApiError {
        let status = self.status();
        if status.is_server_error() {
            // O `tracing` loga a mensagem detalhada que o `thiserror` montou.
            tracing::error!("Erro Interno do Servidor: {:?}", self);
        }

        let details = match &self {
            AppError::ValidationError(errors) => Some(validation_details(errors)),
            _ => None,
        };

        ApiError {
            status,
            error: self.message(&locale.0),
            details,
        }
    }
}

fn pick(pt: bool, pt_msg: &str, en_msg: &str) -> String {
    if pt { pt_msg.to_string() } else { en_msg.to_string() }
}

// Campo -> lista de mensagens (ou códigos) de erro.
// Objetos aninhados viram "representative.email", listas "items[0].quantity".
fn validation_details(errors: &validator::ValidationErrors) -> Value {
    let mut details = serde_json::Map::new();
    collect_validation_details(errors, "", &mut details);
    Value::Object(details)
}

fn collect_validation_details(
    errors: &validator::ValidationErrors,
    prefix: &str,
    details: &mut serde_json::Map<String, Value>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = format!("{}{}", prefix, field);
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages: Vec<Value> = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                            .into()
                    })
                    .collect();
                details.insert(path, Value::Array(messages));
            }
            ValidationErrorsKind::Struct(inner) => {
                collect_validation_details(inner, &format!("{}.", path), details);
            }
            ValidationErrorsKind::List(entries) => {
                for (index, inner) in entries {
                    collect_validation_details(inner, &format!("{}[{}].", path, index), details);
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}
