// src/models/item.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// Item do catálogo. O preço aqui é o preço ATUAL; pedidos guardam o seu
// próprio snapshot e nunca relêem este valor.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    #[schema(example = "Outdoor 9x3")]
    pub name: String,
    #[schema(example = "1500.00")]
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

pub(crate) fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    #[validate(length(min = 1, max = 100, message = "required"))]
    #[schema(example = "Outdoor 9x3")]
    pub name: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "1500.00")]
    pub price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_price_is_rejected() {
        let payload = ItemPayload {
            name: "Painel".into(),
            price: "-1".parse().unwrap(),
        };
        assert!(payload.validate().is_err());

        let payload = ItemPayload {
            name: "Painel".into(),
            price: Decimal::ZERO,
        };
        assert!(payload.validate().is_ok());
    }
}
