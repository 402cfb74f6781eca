// src/services/listing.rs

//! Filtros e ordenação em memória para listagens de pedidos e clientes.
//!
//! Os predicados se combinam com E. A ordenação usa `sort_by`, que é
//! estável: chaves iguais preservam a ordem de entrada nos dois sentidos.

use std::cmp::Ordering;

use uuid::Uuid;

use crate::models::{
    client::Client,
    filters::{
        search_term, ClientFilter, ClientOrderFilter, ClientSortKey, DateWindow, OrderFilter,
        OrderSortKey, SortDirection,
    },
    order::Order,
};

type Comparator<T> = fn(&T, &T) -> Ordering;

fn case_insensitive(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn first_item_name(order: &Order) -> String {
    order
        .items
        .first()
        .map(|line| line.item_name.to_lowercase())
        .unwrap_or_default()
}

impl OrderSortKey {
    pub fn comparator(self) -> Comparator<Order> {
        match self {
            OrderSortKey::EmissionDate => |a, b| a.emission_date.cmp(&b.emission_date),
            OrderSortKey::ClientName => |a, b| case_insensitive(&a.client_name, &b.client_name),
            OrderSortKey::Id => |a, b| a.display_id.cmp(&b.display_id),
            OrderSortKey::ItemName => |a, b| first_item_name(a).cmp(&first_item_name(b)),
        }
    }
}

impl ClientSortKey {
    pub fn comparator(self) -> Comparator<Client> {
        match self {
            ClientSortKey::CreatedAt => |a, b| a.created_at.cmp(&b.created_at),
            ClientSortKey::Name => |a, b| case_insensitive(&a.name, &b.name),
        }
    }
}

/// Ordenação estável; `Desc` inverte o comparador, não a lista.
pub fn stable_sort<T>(items: &mut [T], comparator: Comparator<T>, direction: SortDirection) {
    match direction {
        SortDirection::Asc => items.sort_by(comparator),
        SortDirection::Desc => items.sort_by(|a, b| comparator(b, a)),
    }
}

// =========================================================================
//  PREDICADOS
// =========================================================================

pub fn matches_client_name(order: &Order, term: &str) -> bool {
    order.client_name.to_lowercase().contains(term)
}

pub fn matches_item_name(order: &Order, term: &str) -> bool {
    order
        .items
        .iter()
        .any(|line| line.item_name.to_lowercase().contains(term))
}

/// Mantém pedidos que tenham pelo menos um item da lista.
/// Lista vazia não filtra nada.
pub fn retain_with_items(orders: &mut Vec<Order>, item_ids: Option<&[Uuid]>) {
    if let Some(ids) = item_ids.filter(|ids| !ids.is_empty()) {
        orders.retain(|order| order.contains_any_item(ids));
    }
}

// =========================================================================
//  LISTAGENS
// =========================================================================

/// Listagem geral de pedidos. Padrão: nome do cliente, ascendente.
pub fn filter_orders(mut orders: Vec<Order>, filter: &OrderFilter) -> Vec<Order> {
    if let Some(term) = search_term(filter.search.as_deref()) {
        orders.retain(|order| matches_client_name(order, &term));
    }

    let window = DateWindow::new(filter.start_date, filter.end_date);
    orders.retain(|order| window.contains(order.emission_date));

    retain_with_items(&mut orders, filter.item_ids.as_deref());

    let key = OrderSortKey::parse(filter.sort_by.as_deref()).unwrap_or(OrderSortKey::ClientName);
    stable_sort(&mut orders, key.comparator(), SortDirection::parse(filter.direction.as_deref()));
    orders
}

/// Pedidos de um cliente. Padrão: data de emissão, ascendente.
pub fn filter_client_orders(
    mut orders: Vec<Order>,
    client_id: Uuid,
    filter: &ClientOrderFilter,
) -> Vec<Order> {
    orders.retain(|order| order.client_id == client_id);

    if let Some(term) = search_term(filter.item_search.as_deref()) {
        orders.retain(|order| matches_item_name(order, &term));
    }

    let key = OrderSortKey::parse(filter.sort_by.as_deref()).unwrap_or(OrderSortKey::EmissionDate);
    stable_sort(&mut orders, key.comparator(), SortDirection::parse(filter.direction.as_deref()));
    orders
}

/// Listagem de clientes. Padrão: nome, ascendente.
pub fn filter_clients(mut clients: Vec<Client>, filter: &ClientFilter) -> Vec<Client> {
    if let Some(term) = search_term(filter.search.as_deref()) {
        clients.retain(|client| client.name.to_lowercase().contains(&term));
    }

    if let Some(status) = filter.status {
        clients.retain(|client| client.status == status);
    }

    let key = ClientSortKey::parse(filter.sort_by.as_deref()).unwrap_or(ClientSortKey::Name);
    stable_sort(&mut clients, key.comparator(), SortDirection::parse(filter.direction.as_deref()));
    clients
}
