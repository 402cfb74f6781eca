// tests/dashboard_test.rs

mod common;

use std::sync::Arc;

use rust_decimal::Decimal;

use common::{client, date, item, line, money, order};
use finance_tracker::{
    db::MemoryStore,
    models::filters::DashboardFilter,
    services::dashboard_service::DashboardService,
};

fn service(store: MemoryStore) -> DashboardService {
    DashboardService::new(Arc::new(store))
}

#[tokio::test]
async fn evolution_without_start_has_no_initial_balance() {
    let padaria = client("Padaria Pão Quente", "12345678000199");
    let outdoor = item("Outdoor", "150.00");
    let banner = item("Banner", "65.00");

    let mut january = order(1, &padaria, vec![line(&outdoor, 1)], "2024-01-10");
    january.discount = money("10");
    let february = order(2, &padaria, vec![line(&banner, 1)], "2024-02-05");

    let evolution = service(MemoryStore::new().with_orders(vec![january, february]))
        .get_evolution(&DashboardFilter::default())
        .await
        .unwrap();

    assert_eq!(evolution.initial_balance, Decimal::ZERO);
    assert_eq!(evolution.total_income, money("200"));
    assert_eq!(evolution.final_balance, money("200"));
    assert_eq!(evolution.variation_percent, Decimal::ZERO);
    assert_eq!(evolution.total_orders, 2);
}

#[tokio::test]
async fn evolution_carries_earlier_orders_into_the_initial_balance() {
    let padaria = client("Padaria Pão Quente", "12345678000199");
    let outdoor = item("Outdoor", "150.00");
    let banner = item("Banner", "65.00");

    let mut january = order(1, &padaria, vec![line(&outdoor, 1)], "2024-01-10");
    january.discount = money("10");
    // Emitido exatamente no início: entra no período, não no saldo inicial
    let february = order(2, &padaria, vec![line(&banner, 1)], "2024-02-01");

    let filter = DashboardFilter {
        start_date: Some(date("2024-02-01")),
        ..Default::default()
    };
    let evolution = service(MemoryStore::new().with_orders(vec![january, february]))
        .get_evolution(&filter)
        .await
        .unwrap();

    assert_eq!(evolution.initial_balance, money("135"));
    assert_eq!(evolution.total_income, money("65"));
    assert_eq!(evolution.final_balance, money("200"));
    assert_eq!(evolution.variation_percent, money("48.15"));
    assert_eq!(evolution.orders.len(), 1);
    assert_eq!(evolution.orders[0].order.display_id, 2);
}

#[tokio::test]
async fn performance_splits_an_order_evenly_between_its_items() {
    let padaria = client("Padaria Pão Quente", "12345678000199");
    let outdoor = item("Outdoor", "50.00");
    let banner = item("Banner", "50.00");
    let folder = item("Folder", "50.00");

    let mut single = order(
        1,
        &padaria,
        vec![line(&outdoor, 1), line(&banner, 1), line(&folder, 1)],
        "2024-03-01",
    );
    single.discount = money("10");

    let performance = service(MemoryStore::new().with_order(single))
        .get_performance(&DashboardFilter::default())
        .await
        .unwrap();

    assert_eq!(performance.final_balance, money("135"));
    assert_eq!(performance.item_performances.len(), 3);
    for entry in &performance.item_performances {
        assert_eq!(entry.total_revenue, money("45"));
        assert_eq!(entry.percentage_of_total, money("33.33"));
        assert_eq!(entry.variation, Decimal::ZERO);
    }

    let total: Decimal = performance.item_performances.iter().map(|p| p.total_revenue).sum();
    assert_eq!(total, performance.final_balance);
}

#[tokio::test]
async fn item_filter_restricts_both_aggregations() {
    let padaria = client("Padaria Pão Quente", "12345678000199");
    let outdoor = item("Outdoor", "100.00");
    let banner = item("Banner", "40.00");

    let orders = vec![
        order(1, &padaria, vec![line(&outdoor, 1)], "2024-03-01"),
        order(2, &padaria, vec![line(&banner, 1)], "2024-03-02"),
    ];
    let filter = DashboardFilter {
        item_ids: Some(vec![banner.id]),
        ..Default::default()
    };
    let dashboard = service(MemoryStore::new().with_orders(orders));

    let evolution = dashboard.get_evolution(&filter).await.unwrap();
    assert_eq!(evolution.total_income, money("40"));

    let performance = dashboard.get_performance(&filter).await.unwrap();
    assert_eq!(performance.item_performances.len(), 1);
    assert_eq!(performance.item_performances[0].item_name, "Banner");
    assert_eq!(performance.item_performances[0].percentage_of_total, money("100"));
}

#[tokio::test]
async fn empty_store_yields_zeroed_dashboards() {
    let dashboard = service(MemoryStore::new());

    let evolution = dashboard.get_evolution(&DashboardFilter::default()).await.unwrap();
    assert_eq!(evolution.final_balance, Decimal::ZERO);
    assert!(evolution.orders.is_empty());

    let performance = dashboard.get_performance(&DashboardFilter::default()).await.unwrap();
    assert_eq!(performance.final_balance, Decimal::ZERO);
    assert!(performance.item_performances.is_empty());
}
