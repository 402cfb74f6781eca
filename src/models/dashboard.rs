// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::order::OrderResponse;

// 1. Evolução do saldo no período (os cards do topo + lista de pedidos)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardEvolution {
    pub initial_balance: Decimal,   // Saldo antes do início da janela
    pub total_income: Decimal,      // Entradas no período
    pub final_balance: Decimal,     // Saldo inicial + entradas
    pub total_orders: usize,        // Nº de pedidos no período
    pub variation_percent: Decimal, // Variação (%) sobre o saldo inicial
    pub orders: Vec<OrderResponse>,
}

// 2. Desempenho por item (receita e participação no total)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemPerformance {
    pub item_id: Uuid,
    pub item_name: String,
    pub total_revenue: Decimal,
    pub percentage_of_total: Decimal,
    // Sempre zero: não existe período anterior de comparação
    pub variation: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPerformance {
    pub final_balance: Decimal,
    pub item_performances: Vec<ItemPerformance>,
}
