// src/models/filters.rs

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::client::ClientStatus;

// =========================================================================
//  ORDENAÇÃO
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Só "desc" (qualquer caixa) inverte; o resto é ascendente.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.trim().eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSortKey {
    EmissionDate,
    ClientName,
    /// Número sequencial do pedido
    Id,
    /// Nome do primeiro item do pedido
    ItemName,
}

impl OrderSortKey {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let key = raw?.trim();
        [
            ("emissionDate", OrderSortKey::EmissionDate),
            ("clientName", OrderSortKey::ClientName),
            ("id", OrderSortKey::Id),
            ("itemName", OrderSortKey::ItemName),
        ]
        .into_iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, sort_key)| sort_key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientSortKey {
    CreatedAt,
    Name,
}

impl ClientSortKey {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let key = raw?.trim();
        if key.eq_ignore_ascii_case("createdAt") {
            Some(ClientSortKey::CreatedAt)
        } else if key.eq_ignore_ascii_case("name") {
            Some(ClientSortKey::Name)
        } else {
            None
        }
    }
}

// =========================================================================
//  JANELA DE DATAS
// =========================================================================

/// Intervalo [start, end] fechado. Limites ausentes viram MIN/MAX.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            start: start.unwrap_or(NaiveDate::MIN),
            end: end.unwrap_or(NaiveDate::MAX),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Estritamente antes do início (o próprio dia do início é do período).
    pub fn is_before(&self, date: NaiveDate) -> bool {
        date < self.start
    }
}

// =========================================================================
//  FILTROS (payloads)
// =========================================================================

/// Texto de busca útil: `None` se vazio ou só espaços.
pub fn search_term(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    #[schema(example = "padaria")]
    pub search: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub start_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,
    pub item_ids: Option<Vec<Uuid>>,
    #[schema(example = "emissionDate")]
    pub sort_by: Option<String>,
    #[schema(example = "desc")]
    pub direction: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientOrderFilter {
    #[schema(example = "outdoor")]
    pub item_search: Option<String>,
    #[schema(example = "itemName")]
    pub sort_by: Option<String>,
    pub direction: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientFilter {
    pub search: Option<String>,
    pub status: Option<ClientStatus>,
    #[schema(example = "createdAt")]
    pub sort_by: Option<String>,
    pub direction: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardFilter {
    #[schema(value_type = Option<String>, format = Date, example = "2024-01-01")]
    pub start_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date, example = "2024-12-31")]
    pub end_date: Option<NaiveDate>,
    pub item_ids: Option<Vec<Uuid>>,
}

impl DashboardFilter {
    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.start_date, self.end_date)
    }

    /// IDs de item para pré-filtro; lista vazia conta como "sem filtro".
    pub fn item_ids(&self) -> Option<&[Uuid]> {
        self.item_ids.as_deref().filter(|ids| !ids.is_empty())
    }
}
