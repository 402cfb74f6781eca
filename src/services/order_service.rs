// src/services/order_service.rs

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    db::{OrderRepository, Store},
    models::{
        client::Client,
        filters::{ClientOrderFilter, OrderFilter},
        item::Item,
        order::{GrossBasis, NewOrder, Order, OrderLineItem, OrderPayload, OrderResponse, OrderValuation},
    },
    services::{contract_storage::ContractStorage, listing, valuation},
};

/// Monta o pedido a gravar: confere o cliente e congela o preço atual de
/// cada item. Itens repetidos no payload viram uma linha só (quantidades
/// somadas).
pub fn build_new_order(payload: &OrderPayload, client: Option<&Client>, catalog: &[Item]) -> Result<NewOrder, AppError> {
    if client.is_none() {
        return Err(AppError::UnknownClientReference(payload.client_id));
    }

    let mut lines: Vec<OrderLineItem> = Vec::with_capacity(payload.items.len());
    for entry in &payload.items {
        if let Some(line) = lines.iter_mut().find(|l| l.item_id == entry.item_id) {
            line.quantity = line
                .quantity
                .checked_add(entry.quantity)
                .ok_or_else(quantity_overflow)?;
            continue;
        }

        let item = catalog
            .iter()
            .find(|i| i.id == entry.item_id)
            .ok_or(AppError::UnknownItemReference(entry.item_id))?;

        lines.push(OrderLineItem {
            item_id: item.id,
            item_name: item.name.clone(),
            quantity: entry.quantity,
            unit_price: item.price,
        });
    }

    Ok(NewOrder {
        client_id: payload.client_id,
        items: lines,
        gross_basis: GrossBasis::from_fixed_value(payload.fixed_value),
        discount: payload.discount,
        installment_count: payload.installment_count,
        installment_day: payload.installment_day,
        paid_installments_count: payload.paid_installments_count,
        contract_start_date: payload.contract_start_date,
        contract_end_date: payload.contract_end_date,
        emission_date: payload.emission_date,
        contract_file_path: None,
    })
}

// Soma das quantidades repetidas não cabe em i32
fn quantity_overflow() -> AppError {
    let mut errors = ValidationErrors::new();
    let mut error = ValidationError::new("invalid_quantity");
    error.message = Some("Quantidade total do item excede o limite.".into());
    errors.add("items", error);
    AppError::ValidationError(errors)
}

#[derive(Clone)]
pub struct OrderService {
    repo: OrderRepository,
    store: Arc<dyn Store>,
    contracts: ContractStorage,
    pool: PgPool,
}

impl OrderService {
    pub fn new(repo: OrderRepository, store: Arc<dyn Store>, contracts: ContractStorage, pool: PgPool) -> Self {
        Self { repo, store, contracts, pool }
    }

    // =========================================================================
    //  CONSULTAS
    // =========================================================================

    pub async fn list_orders(&self) -> Result<Vec<OrderResponse>, AppError> {
        let orders = self.store.fetch_all_orders().await?;
        valuation::to_responses(orders)
    }

    pub async fn filter_orders(&self, filter: &OrderFilter) -> Result<Vec<OrderResponse>, AppError> {
        let orders = self.store.fetch_all_orders().await?;
        valuation::to_responses(listing::filter_orders(orders, filter))
    }

    pub async fn filter_client_orders(
        &self,
        client_id: Uuid,
        filter: &ClientOrderFilter,
    ) -> Result<Vec<OrderResponse>, AppError> {
        if self.store.fetch_client_by_id(client_id).await?.is_none() {
            return Err(AppError::ClientNotFound(client_id));
        }

        let orders = self.store.fetch_all_orders().await?;
        valuation::to_responses(listing::filter_client_orders(orders, client_id, filter))
    }

    pub async fn get_order(&self, id: Uuid) -> Result<OrderResponse, AppError> {
        valuation::to_response(self.find(id).await?)
    }

    pub async fn get_valuation(&self, id: Uuid) -> Result<OrderValuation, AppError> {
        valuation::valuate(&self.find(id).await?)
    }

    async fn find(&self, id: Uuid) -> Result<Order, AppError> {
        self.store
            .fetch_order_by_id(id)
            .await?
            .ok_or(AppError::OrderNotFound(id))
    }

    async fn resolve(&self, payload: &OrderPayload) -> Result<NewOrder, AppError> {
        let client = self.store.fetch_client_by_id(payload.client_id).await?;
        let item_ids: Vec<Uuid> = payload.items.iter().map(|e| e.item_id).collect();
        let catalog = self.store.fetch_items_by_ids(&item_ids).await?;
        build_new_order(payload, client.as_ref(), &catalog)
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    pub async fn create_order(&self, payload: &OrderPayload) -> Result<OrderResponse, AppError> {
        let new_order = self.resolve(payload).await?;

        let mut tx = self.pool.begin().await?;
        let order_id = self.repo.insert_order(&mut *tx, &new_order).await?;
        for (position, line) in new_order.items.iter().enumerate() {
            self.repo.insert_line(&mut *tx, order_id, position as i32, line).await?;
        }
        tx.commit().await?;

        tracing::info!("🧾 Pedido {} criado com {} item(ns)", order_id, new_order.items.len());
        self.get_order(order_id).await
    }

    /// Regrava o pedido inteiro. Os preços são congelados de novo a partir
    /// do catálogo atual; o contrato anexado é preservado.
    pub async fn update_order(&self, id: Uuid, payload: &OrderPayload) -> Result<OrderResponse, AppError> {
        self.find(id).await?;
        let new_order = self.resolve(payload).await?;

        let mut tx = self.pool.begin().await?;
        self.repo.update_order(&mut *tx, id, &new_order).await?;
        self.repo.delete_lines(&mut *tx, id).await?;
        for (position, line) in new_order.items.iter().enumerate() {
            self.repo.insert_line(&mut *tx, id, position as i32, line).await?;
        }
        tx.commit().await?;

        self.get_order(id).await
    }

    pub async fn update_paid_installments(&self, id: Uuid, paid_installments_count: i32) -> Result<OrderResponse, AppError> {
        self.repo
            .update_paid_installments(&self.pool, id, paid_installments_count)
            .await?;
        self.get_order(id).await
    }

    pub async fn delete_order(&self, id: Uuid) -> Result<(), AppError> {
        let order = self.find(id).await?;
        self.repo.delete(&self.pool, id).await?;

        if let Some(path) = order.contract_file_path {
            self.contracts.remove(&path).await?;
        }
        Ok(())
    }

    // =========================================================================
    //  CONTRATO
    // =========================================================================

    pub async fn upload_contract(&self, id: Uuid, file_name: &str, bytes: &[u8]) -> Result<OrderResponse, AppError> {
        let order = self.find(id).await?;

        let path = self.contracts.save(order.display_id, file_name, bytes).await?;
        self.repo.set_contract_path(&self.pool, id, Some(&path)).await?;

        // O arquivo antigo só sai depois que a nova referência foi gravada
        if let Some(previous) = order.contract_file_path {
            self.contracts.remove(&previous).await?;
        }

        tracing::info!("📎 Contrato anexado ao pedido {}: {}", order.display_id, path);
        self.get_order(id).await
    }

    /// Devolve (nome do arquivo, conteúdo).
    pub async fn get_contract(&self, id: Uuid) -> Result<(String, Vec<u8>), AppError> {
        let order = self.find(id).await?;
        let path = order.contract_file_path.ok_or(AppError::ContractNotFound)?;

        let bytes = self.contracts.read(&path).await?;
        let file_name = std::path::Path::new(&path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("contrato_{}", order.display_id));
        Ok((file_name, bytes))
    }

    /// Sem contrato anexado é no-op.
    pub async fn delete_contract(&self, id: Uuid) -> Result<(), AppError> {
        let order = self.find(id).await?;

        if let Some(path) = order.contract_file_path {
            self.contracts.remove(&path).await?;
            self.repo.set_contract_path(&self.pool, id, None).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        client::{Address, ClientStatus, Representative},
        order::OrderItemEntry,
    };
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use validator::Validate;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn item(name: &str, price: &str) -> Item {
        Item { id: Uuid::new_v4(), name: name.into(), price: d(price), created_at: Utc::now() }
    }

    fn client() -> Client {
        Client {
            id: Uuid::new_v4(),
            name: "Padaria".into(),
            document_number: "12345678000199".into(),
            representative: Representative {
                name: "João".into(),
                email: "joao@padaria.com".into(),
                phone: "11987654321".into(),
            },
            address: Address {
                zip_code: "01310100".into(),
                state: "SP".into(),
                city: "São Paulo".into(),
                neighbourhood: "Centro".into(),
                street: "Rua A".into(),
                number: "10".into(),
                complement: None,
                reference: None,
            },
            status: ClientStatus::Active,
            created_at: Utc::now(),
        }
    }

    fn payload(client_id: Uuid, entries: &[(Uuid, i32)]) -> OrderPayload {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        OrderPayload {
            client_id,
            items: entries
                .iter()
                .map(|(item_id, quantity)| OrderItemEntry { item_id: *item_id, quantity: *quantity })
                .collect(),
            fixed_value: None,
            discount: d("10"),
            installment_count: 3,
            installment_day: 5,
            paid_installments_count: 1,
            contract_start_date: date,
            contract_end_date: date,
            emission_date: date,
        }
    }

    #[test]
    fn freezes_catalog_prices_into_lines() {
        let c = client();
        let (a, b) = (item("Outdoor", "100.00"), item("Panfleto", "50.00"));
        let order = build_new_order(&payload(c.id, &[(a.id, 1), (b.id, 1)]), Some(&c), &[a.clone(), b]).unwrap();

        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].item_name, "Outdoor");
        assert_eq!(order.items[0].unit_price, d("100.00"));
        assert_eq!(order.gross_basis, GrossBasis::LineItems);
        assert!(order.contract_file_path.is_none());
    }

    #[test]
    fn repeated_items_are_merged() {
        let c = client();
        let a = item("Outdoor", "100.00");
        let order = build_new_order(&payload(c.id, &[(a.id, 1), (a.id, 2)]), Some(&c), &[a]).unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 3);
    }

    #[test]
    fn merged_quantity_overflow_is_a_validation_error() {
        let c = client();
        let a = item("Outdoor", "100.00");
        let p = payload(c.id, &[(a.id, i32::MAX), (a.id, 1)]);
        assert!(p.validate().is_ok());

        let err = build_new_order(&p, Some(&c), &[a]).unwrap_err();
        match err {
            AppError::ValidationError(errors) => assert!(errors.errors().contains_key("items")),
            other => panic!("erro inesperado: {:?}", other),
        }
    }

    #[test]
    fn totals_survive_catalog_price_changes() {
        let c = client();
        let (mut a, b) = (item("Outdoor", "100.00"), item("Panfleto", "50.00"));
        let new_order = build_new_order(&payload(c.id, &[(a.id, 1), (b.id, 1)]), Some(&c), &[a.clone(), b.clone()]).unwrap();

        let order = Order {
            id: Uuid::new_v4(),
            display_id: 1,
            client_id: c.id,
            client_name: c.name.clone(),
            items: new_order.items,
            gross_basis: new_order.gross_basis,
            discount: new_order.discount,
            installment_count: new_order.installment_count,
            installment_day: new_order.installment_day,
            paid_installments_count: new_order.paid_installments_count,
            contract_start_date: new_order.contract_start_date,
            contract_end_date: new_order.contract_end_date,
            emission_date: new_order.emission_date,
            contract_file_path: None,
            created_at: Utc::now(),
        };
        let before = valuation::valuate(&order).unwrap();

        // Reajuste no catálogo depois da emissão
        a.price = d("250.00");
        let repriced = build_new_order(&payload(c.id, &[(a.id, 1), (b.id, 1)]), Some(&c), &[a, b]).unwrap();
        assert_eq!(repriced.items[0].unit_price, d("250.00"));

        let after = valuation::valuate(&order).unwrap();
        assert_eq!(before, after);
        assert_eq!(after.total_value, d("150.00"));
        assert_eq!(after.discounted_value, d("135.00"));
        assert_eq!(after.paid_value, d("45.00"));
    }

    #[test]
    fn unknown_references_fail_the_whole_order() {
        let c = client();
        let a = item("Outdoor", "100.00");
        let missing = Uuid::new_v4();

        let err = build_new_order(&payload(c.id, &[(a.id, 1), (missing, 1)]), Some(&c), &[a.clone()]).unwrap_err();
        assert!(matches!(err, AppError::UnknownItemReference(id) if id == missing));

        let err = build_new_order(&payload(c.id, &[(a.id, 1)]), None, &[a]).unwrap_err();
        assert!(matches!(err, AppError::UnknownClientReference(id) if id == c.id));
    }

    #[test]
    fn fixed_value_payload_keeps_legacy_basis() {
        let c = client();
        let a = item("Outdoor", "100.00");
        let mut p = payload(c.id, &[(a.id, 1)]);
        p.fixed_value = Some(d("999.90"));

        let order = build_new_order(&p, Some(&c), &[a]).unwrap();
        assert_eq!(order.gross_basis.fixed_value(), Some(d("999.90")));
    }
}
