// tests/common/mod.rs

#![allow(dead_code)]

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use finance_tracker::{
    config::{AppConfig, AppState},
    models::{
        client::{Address, Client, ClientStatus, Representative},
        item::Item,
        order::{GrossBasis, Order, OrderLineItem},
    },
};

pub const TEST_SECRET: &str = "segredo-de-teste";

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("data de teste")
}

pub fn money(raw: &str) -> Decimal {
    raw.parse().expect("valor de teste")
}

pub fn item(name: &str, price: &str) -> Item {
    Item {
        id: Uuid::new_v4(),
        name: name.to_string(),
        price: money(price),
        created_at: Utc::now(),
    }
}

pub fn client(name: &str, document: &str) -> Client {
    Client {
        id: Uuid::new_v4(),
        name: name.to_string(),
        document_number: document.to_string(),
        representative: Representative {
            name: "Maria Lima".into(),
            email: "maria@example.com".into(),
            phone: "11987654321".into(),
        },
        address: Address {
            zip_code: "01310100".into(),
            state: "SP".into(),
            city: "São Paulo".into(),
            neighbourhood: "Bela Vista".into(),
            street: "Avenida Paulista".into(),
            number: "1000".into(),
            complement: None,
            reference: None,
        },
        status: ClientStatus::Active,
        created_at: Utc::now(),
    }
}

pub fn line(item: &Item, quantity: i32) -> OrderLineItem {
    OrderLineItem {
        item_id: item.id,
        item_name: item.name.clone(),
        quantity,
        unit_price: item.price,
    }
}

/// Pedido com parcelas ainda em aberto; ajuste os campos pelo `..`.
pub fn order(display_id: i32, client: &Client, lines: Vec<OrderLineItem>, emission: &str) -> Order {
    Order {
        id: Uuid::new_v4(),
        display_id,
        client_id: client.id,
        client_name: client.name.clone(),
        items: lines,
        gross_basis: GrossBasis::LineItems,
        discount: Decimal::ZERO,
        installment_count: 1,
        installment_day: 10,
        paid_installments_count: 0,
        contract_start_date: date(emission),
        contract_end_date: date(emission),
        emission_date: date(emission),
        contract_file_path: None,
        created_at: Utc::now(),
    }
}

pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://ninguem@127.0.0.1:1/inexistente".to_string()),
        "JWT_SECRET" => Some(TEST_SECRET.to_string()),
        "UPLOAD_DIR" => Some(std::env::temp_dir().join("finance-tracker-tests").to_string_lossy().into_owned()),
        _ => None,
    })
    .expect("configuração de teste")
}

/// Estado com pool preguiçoso: nenhuma conexão é aberta até alguém consultar o banco.
pub fn lazy_state() -> AppState {
    let config = test_config();
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(&config.database_url)
        .expect("pool preguiçoso");
    AppState::from_pool(pool, config)
}
