// src/models/order.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::item::validate_not_negative;

// --- Itens do pedido (snapshot congelado na criação) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub item_id: Uuid,
    #[schema(example = "Outdoor 9x3")]
    pub item_name: String,
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(example = "1500.00")]
    pub unit_price: Decimal,
}

impl OrderLineItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// De onde vem o valor bruto do pedido.
///
/// `LineItems` é o formato canônico (soma dos snapshots). `FixedValue`
/// existe para pedidos antigos que só guardavam um valor total; os itens
/// continuam dizendo quais produtos o pedido cobre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Default)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GrossBasis {
    #[default]
    LineItems,
    FixedValue { value: Decimal },
}

impl GrossBasis {
    pub fn from_fixed_value(value: Option<Decimal>) -> Self {
        match value {
            Some(value) => GrossBasis::FixedValue { value },
            None => GrossBasis::LineItems,
        }
    }

    pub fn fixed_value(&self) -> Option<Decimal> {
        match self {
            GrossBasis::LineItems => None,
            GrossBasis::FixedValue { value } => Some(*value),
        }
    }
}

// --- Pedido / Contrato ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    #[schema(example = 1024)]
    pub display_id: i32,
    pub client_id: Uuid,
    #[schema(example = "Padaria Pão Quente")]
    pub client_name: String,
    pub items: Vec<OrderLineItem>,
    #[serde(default)]
    pub gross_basis: GrossBasis,
    #[schema(example = "10.00")]
    pub discount: Decimal,
    #[schema(example = 12)]
    pub installment_count: i32,
    #[schema(example = 10)]
    pub installment_day: i32,
    #[schema(example = 3)]
    pub paid_installments_count: i32,
    #[schema(value_type = String, format = Date, example = "2024-01-01")]
    pub contract_start_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2024-12-31")]
    pub contract_end_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2024-01-01")]
    pub emission_date: NaiveDate,
    pub contract_file_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn contains_any_item(&self, item_ids: &[Uuid]) -> bool {
        self.items.iter().any(|line| item_ids.contains(&line.item_id))
    }
}

// --- Valores derivados (calculados na leitura, nunca persistidos) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderValuation {
    /// Valor Bruto
    #[schema(example = "150.00")]
    pub total_value: Decimal,
    /// Valor Líquido (após desconto)
    #[schema(example = "135.00")]
    pub discounted_value: Decimal,
    #[schema(example = "45.00")]
    pub installment_value: Decimal,
    /// Valor Pago
    #[schema(example = "45.00")]
    pub paid_value: Decimal,
    /// Valor Restante
    #[schema(example = "90.00")]
    pub remaining_value: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: Order,
    #[serde(flatten)]
    pub valuation: OrderValuation,
}

// --- Payloads ---

fn validate_percentage(val: &Decimal) -> Result<(), ValidationError> {
    validate_not_negative(val)?;
    if *val > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("range");
        err.message = Some("O desconto deve estar entre 0 e 100.".into());
        return Err(err);
    }
    Ok(())
}

// Serialize: o validador de `length` anexa o valor ao erro
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemEntry {
    pub item_id: Uuid,
    #[validate(range(min = 1, message = "invalid_quantity"))]
    #[schema(example = 1)]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub client_id: Uuid,

    #[validate(length(min = 1, message = "required"), nested)]
    pub items: Vec<OrderItemEntry>,

    // Só para pedidos no formato antigo (valor fechado)
    #[validate(custom(function = "validate_not_negative"))]
    pub fixed_value: Option<Decimal>,

    #[validate(custom(function = "validate_percentage"))]
    #[serde(default)]
    #[schema(example = "10.00")]
    pub discount: Decimal,

    #[validate(range(min = 1, message = "invalid_installment_count"))]
    #[schema(example = 12)]
    pub installment_count: i32,

    #[validate(range(min = 1, max = 31, message = "invalid_installment_day"))]
    #[schema(example = 10)]
    pub installment_day: i32,

    #[validate(range(min = 0, message = "invalid_paid_installments"))]
    #[serde(default)]
    pub paid_installments_count: i32,

    #[schema(value_type = String, format = Date, example = "2024-01-01")]
    pub contract_start_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2024-12-31")]
    pub contract_end_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2024-01-01")]
    pub emission_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaidInstallmentsPayload {
    #[validate(range(min = 0, message = "invalid_paid_installments"))]
    #[schema(example = 4)]
    pub paid_installments_count: i32,
}

/// Pedido pronto para ser gravado: cliente e snapshots já resolvidos.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub client_id: Uuid,
    pub items: Vec<OrderLineItem>,
    pub gross_basis: GrossBasis,
    pub discount: Decimal,
    pub installment_count: i32,
    pub installment_day: i32,
    pub paid_installments_count: i32,
    pub contract_start_date: NaiveDate,
    pub contract_end_date: NaiveDate,
    pub emission_date: NaiveDate,
    pub contract_file_path: Option<String>,
}
