// src/services/valuation.rs

//! Valores derivados de um pedido: bruto, líquido, parcela, pago e restante.
//!
//! Tudo sai dos snapshots gravados no próprio pedido, então mudar o preço de
//! um item no catálogo nunca altera pedidos já emitidos.

use rust_decimal::Decimal;

use crate::{
    common::{
        error::AppError,
        money::{percent_to_fraction, safe_div, sum},
    },
    models::order::{GrossBasis, Order, OrderResponse, OrderValuation},
};

/// Valor bruto conforme o formato do pedido.
pub fn gross_value(order: &Order) -> Decimal {
    match &order.gross_basis {
        GrossBasis::LineItems => sum(order.items.iter().map(|line| line.line_total())),
        GrossBasis::FixedValue { value } => *value,
    }
}

pub fn valuate(order: &Order) -> Result<OrderValuation, AppError> {
    if order.installment_count < 1 {
        return Err(AppError::InvalidInstallmentCount(order.installment_count));
    }

    let total_value = gross_value(order);
    let discount_fraction = percent_to_fraction(order.discount);
    let discounted_value = total_value - total_value * discount_fraction;

    let installment_value = safe_div(discounted_value, Decimal::from(order.installment_count));
    let paid_value = installment_value * Decimal::from(order.paid_installments_count);
    let remaining_value = discounted_value - paid_value;

    Ok(OrderValuation {
        total_value,
        discounted_value,
        installment_value,
        paid_value,
        remaining_value,
    })
}

/// Pedido + valores, no formato que a API e os relatórios expõem.
pub fn to_response(order: Order) -> Result<OrderResponse, AppError> {
    let valuation = valuate(&order)?;
    Ok(OrderResponse { order, valuation })
}

pub fn to_responses(orders: Vec<Order>) -> Result<Vec<OrderResponse>, AppError> {
    orders.into_iter().map(to_response).collect()
}
