// tests/orders_test.rs

mod common;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use common::{client, date, item, line, money, order};
use finance_tracker::{
    common::error::AppError,
    db::{MemoryStore, OrderRepository},
    models::{
        filters::{ClientOrderFilter, OrderFilter},
        order::Order,
    },
    services::{contract_storage::ContractStorage, order_service::OrderService},
};

// Só as leituras são exercitadas; o pool nunca chega a conectar
fn service(orders: Vec<Order>, store: MemoryStore) -> OrderService {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://ninguem@127.0.0.1:1/inexistente")
        .expect("pool preguiçoso");
    OrderService::new(
        OrderRepository::new(pool.clone()),
        Arc::new(store.with_orders(orders)),
        ContractStorage::new(std::env::temp_dir()),
        pool,
    )
}

#[tokio::test]
async fn valuation_of_a_discounted_order_in_installments() {
    let padaria = client("Padaria Pão Quente", "12345678000199");
    let outdoor = item("Outdoor", "50.00");

    let mut contract = order(7, &padaria, vec![line(&outdoor, 3)], "2024-01-10");
    contract.discount = money("10");
    contract.installment_count = 3;
    contract.paid_installments_count = 1;
    let id = contract.id;

    let valuation = service(vec![contract], MemoryStore::new())
        .get_valuation(id)
        .await
        .unwrap();

    assert_eq!(valuation.total_value, money("150"));
    assert_eq!(valuation.discounted_value, money("135"));
    assert_eq!(valuation.installment_value, money("45"));
    assert_eq!(valuation.paid_value, money("45"));
    assert_eq!(valuation.remaining_value, money("90"));
    assert_eq!(valuation.paid_value + valuation.remaining_value, valuation.discounted_value);
}

#[tokio::test]
async fn unknown_order_is_not_found() {
    let result = service(Vec::new(), MemoryStore::new()).get_order(Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::OrderNotFound(_))));
}

#[tokio::test]
async fn zero_installments_fail_the_valuation() {
    let padaria = client("Padaria Pão Quente", "12345678000199");
    let mut broken = order(1, &padaria, vec![line(&item("Outdoor", "10.00"), 1)], "2024-01-10");
    broken.installment_count = 0;
    let id = broken.id;

    let result = service(vec![broken], MemoryStore::new()).get_valuation(id).await;
    assert!(matches!(result, Err(AppError::InvalidInstallmentCount(0))));
}

#[tokio::test]
async fn filter_searches_client_names_and_sorts_descending() {
    let padaria = client("Padaria Pão Quente", "12345678000199");
    let mercado = client("Mercado Central", "98765432000111");
    let outdoor = item("Outdoor", "100.00");

    let orders = vec![
        order(1, &padaria, vec![line(&outdoor, 1)], "2024-01-10"),
        order(2, &mercado, vec![line(&outdoor, 1)], "2024-02-10"),
        order(3, &padaria, vec![line(&outdoor, 1)], "2024-03-10"),
    ];
    let filter = OrderFilter {
        search: Some("  PADARIA ".into()),
        sort_by: Some("emissionDate".into()),
        direction: Some("desc".into()),
        ..Default::default()
    };

    let found = service(orders, MemoryStore::new()).filter_orders(&filter).await.unwrap();
    let ids: Vec<i32> = found.iter().map(|o| o.order.display_id).collect();
    assert_eq!(ids, vec![3, 1]);
}

#[tokio::test]
async fn filter_is_idempotent() {
    let padaria = client("Padaria Pão Quente", "12345678000199");
    let outdoor = item("Outdoor", "100.00");
    let orders = vec![
        order(1, &padaria, vec![line(&outdoor, 1)], "2024-01-10"),
        order(2, &padaria, vec![line(&outdoor, 2)], "2024-05-10"),
    ];
    let filter = OrderFilter {
        start_date: Some(date("2024-01-01")),
        end_date: Some(date("2024-03-31")),
        ..Default::default()
    };

    let orders_service = service(orders, MemoryStore::new());
    let first = orders_service.filter_orders(&filter).await.unwrap();
    let second = orders_service.filter_orders(&filter).await.unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(
        first.iter().map(|o| o.order.id).collect::<Vec<_>>(),
        second.iter().map(|o| o.order.id).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn client_orders_require_an_existing_client() {
    let padaria = client("Padaria Pão Quente", "12345678000199");
    let outdoor = item("Outdoor", "100.00");
    let banner = item("Banner Lona", "40.00");
    let orders = vec![
        order(1, &padaria, vec![line(&outdoor, 1)], "2024-02-10"),
        order(2, &padaria, vec![line(&banner, 1)], "2024-01-10"),
    ];
    let orders_service = service(orders, MemoryStore::new().with_client(padaria.clone()));

    let missing = orders_service
        .filter_client_orders(Uuid::new_v4(), &ClientOrderFilter::default())
        .await;
    assert!(matches!(missing, Err(AppError::ClientNotFound(_))));

    // Padrão: data de emissão ascendente
    let all = orders_service
        .filter_client_orders(padaria.id, &ClientOrderFilter::default())
        .await
        .unwrap();
    assert_eq!(all.iter().map(|o| o.order.display_id).collect::<Vec<_>>(), vec![2, 1]);

    let banners = orders_service
        .filter_client_orders(
            padaria.id,
            &ClientOrderFilter {
                item_search: Some("lona".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(banners.len(), 1);
    assert_eq!(banners[0].order.display_id, 2);
}

#[tokio::test]
async fn missing_contract_is_reported() {
    let padaria = client("Padaria Pão Quente", "12345678000199");
    let plain = order(1, &padaria, vec![line(&item("Outdoor", "10.00"), 1)], "2024-01-10");
    let id = plain.id;

    let result = service(vec![plain], MemoryStore::new()).get_contract(id).await;
    assert!(matches!(result, Err(AppError::ContractNotFound)));
}
