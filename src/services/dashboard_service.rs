// src/services/dashboard_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        money::{percent_of, safe_div, sum},
    },
    db::Store,
    models::{
        dashboard::{DashboardEvolution, DashboardPerformance, ItemPerformance},
        filters::DashboardFilter,
        order::Order,
    },
    services::{listing::retain_with_items, valuation},
};

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn Store>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn get_evolution(&self, filter: &DashboardFilter) -> Result<DashboardEvolution, AppError> {
        let orders = self.store.fetch_all_orders().await?;
        evolution(orders, filter)
    }

    pub async fn get_performance(&self, filter: &DashboardFilter) -> Result<DashboardPerformance, AppError> {
        let orders = self.store.fetch_all_orders().await?;
        performance(orders, filter)
    }
}

// =========================================================================
//  1. EVOLUÇÃO DO SALDO
// =========================================================================

/// Saldo inicial (antes da janela), entradas no período e variação.
///
/// Um pedido emitido exatamente no dia de início conta como entrada do
/// período, nunca como saldo inicial.
pub fn evolution(mut orders: Vec<Order>, filter: &DashboardFilter) -> Result<DashboardEvolution, AppError> {
    retain_with_items(&mut orders, filter.item_ids());
    let window = filter.window();

    let mut initial_balance = Decimal::ZERO;
    let mut period = Vec::new();

    for order in orders {
        let emission_date = order.emission_date;
        let response = valuation::to_response(order)?;

        if window.is_before(emission_date) {
            initial_balance += response.valuation.discounted_value;
        } else if window.contains(emission_date) {
            period.push(response);
        }
    }

    let total_income = sum(period.iter().map(|r| r.valuation.discounted_value));
    let final_balance = initial_balance + total_income;
    let variation_percent = percent_of(final_balance - initial_balance, initial_balance);

    Ok(DashboardEvolution {
        initial_balance,
        total_income,
        final_balance,
        total_orders: period.len(),
        variation_percent,
        orders: period,
    })
}

// =========================================================================
//  2. DESEMPENHO POR ITEM
// =========================================================================

/// Rateia o valor líquido de cada pedido igualmente entre os seus itens e
/// calcula a participação de cada item no total do período.
///
/// A saída segue a ordem em que cada item apareceu pela primeira vez.
pub fn performance(mut orders: Vec<Order>, filter: &DashboardFilter) -> Result<DashboardPerformance, AppError> {
    retain_with_items(&mut orders, filter.item_ids());
    let window = filter.window();

    let mut item_performances: Vec<ItemPerformance> = Vec::new();
    let mut position_by_item: HashMap<Uuid, usize> = HashMap::new();

    for order in orders.iter().filter(|o| window.contains(o.emission_date)) {
        if order.items.is_empty() {
            continue;
        }

        let discounted = valuation::valuate(order)?.discounted_value;
        let share = safe_div(discounted, Decimal::from(order.items.len()));

        for line in &order.items {
            let position = *position_by_item.entry(line.item_id).or_insert_with(|| {
                item_performances.push(ItemPerformance {
                    item_id: line.item_id,
                    item_name: line.item_name.clone(),
                    total_revenue: Decimal::ZERO,
                    percentage_of_total: Decimal::ZERO,
                    variation: Decimal::ZERO,
                });
                item_performances.len() - 1
            });
            item_performances[position].total_revenue += share;
        }
    }

    let final_balance = sum(item_performances.iter().map(|p| p.total_revenue));

    for perf in &mut item_performances {
        perf.percentage_of_total = percent_of(perf.total_revenue, final_balance);
    }

    Ok(DashboardPerformance {
        final_balance,
        item_performances,
    })
}
