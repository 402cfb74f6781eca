// src/services/report_service.rs

//! Exportação de relatórios e importação de planilhas em CSV.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    common::{error::AppError, money::round_money},
    db::{ClientRepository, ItemRepository, OrderRepository, Store},
    models::{
        client::{digits_only, Address, Client, ClientPayload, ClientStatus, Representative},
        dashboard::{DashboardEvolution, DashboardPerformance},
        filters::{ClientFilter, DashboardFilter},
        order::{GrossBasis, NewOrder, OrderLineItem, OrderResponse},
    },
    services::{dashboard_service, listing, valuation},
};

pub const ORDERS_HEADER: [&str; 13] = [
    "ID",
    "Cliente",
    "Itens",
    "Emissão",
    "Início",
    "Fim",
    "Parcelas",
    "Pagas",
    "Desconto %",
    "Valor Bruto",
    "Valor Líquido",
    "Valor Pago",
    "Valor Restante",
];

pub const PERFORMANCE_HEADER: [&str; 4] = ["ID", "Item", "Total (R$)", "% do Total"];

pub const CLIENTS_HEADER: [&str; 9] = [
    "ID",
    "Nome",
    "Documento",
    "Representante",
    "Email",
    "Telefone",
    "Cidade",
    "Estado",
    "Status",
];

// Colunas fixas da planilha de pedidos (a nona é o caminho do contrato);
// depois vêm pares (item, preço)
const ORDER_CONTRACT_COLUMN: usize = 8;
const ORDER_FIXED_COLUMNS: usize = 9;
const CLIENT_COLUMNS: usize = 13;

// Centavos com arredondamento meio para cima, igual aos cálculos
fn money(value: Decimal) -> String {
    format!("{:.2}", round_money(value))
}

fn br_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, AppError> {
    writer
        .into_inner()
        .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("Falha ao finalizar CSV: {}", e)))
}

// =========================================================================
//  1. EXPORTAÇÃO
// =========================================================================

/// Pedidos do período (já em ordem de emissão) seguidos do bloco "Resumo".
pub fn write_orders_csv(evolution: &DashboardEvolution) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
    writer.write_record(ORDERS_HEADER)?;

    for response in &evolution.orders {
        let order = &response.order;
        let v = &response.valuation;
        let items = order
            .items
            .iter()
            .map(|line| format!("{} (x{})", line.item_name, line.quantity))
            .collect::<Vec<_>>()
            .join(", ");

        writer.write_record([
            order.display_id.to_string(),
            order.client_name.clone(),
            items,
            br_date(order.emission_date),
            br_date(order.contract_start_date),
            br_date(order.contract_end_date),
            order.installment_count.to_string(),
            order.paid_installments_count.to_string(),
            money(order.discount),
            money(v.total_value),
            money(v.discounted_value),
            money(v.paid_value),
            money(v.remaining_value),
        ])?;
    }

    writer.write_record([""])?;
    writer.write_record(["Resumo"])?;
    writer.write_record(["Saldo Inicial".to_string(), money(evolution.initial_balance)])?;
    writer.write_record(["Entradas no Período".to_string(), money(evolution.total_income)])?;
    writer.write_record(["Saldo Final".to_string(), money(evolution.final_balance)])?;
    writer.write_record(["Variação %".to_string(), money(evolution.variation_percent)])?;

    finish(writer)
}

pub fn write_performance_csv(performance: &DashboardPerformance) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(PERFORMANCE_HEADER)?;

    for item in &performance.item_performances {
        writer.write_record([
            item.item_id.to_string(),
            item.item_name.clone(),
            money(item.total_revenue),
            money(item.percentage_of_total),
        ])?;
    }

    finish(writer)
}

pub fn write_clients_csv(clients: &[Client]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CLIENTS_HEADER)?;

    for client in clients {
        writer.write_record([
            client.id.to_string(),
            client.name.clone(),
            client.document_number.clone(),
            client.representative.name.clone(),
            client.representative.email.clone(),
            client.representative.phone.clone(),
            client.address.city.clone(),
            client.address.state.clone(),
            client.status.as_str().to_string(),
        ])?;
    }

    finish(writer)
}

// =========================================================================
//  2. LEITURA DAS PLANILHAS (sem tocar no banco)
// =========================================================================

/// Uma linha da planilha de pedidos, já convertida.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedOrderRow {
    pub line: usize,
    pub document_number: String,
    pub emission_date: NaiveDate,
    pub contract_start_date: NaiveDate,
    pub contract_end_date: NaiveDate,
    pub installment_day: i32,
    pub installment_count: i32,
    pub discount: Decimal,
    pub paid_installments_count: i32,
    pub contract_file_path: Option<String>,
    pub items: Vec<(String, Decimal)>,
}

fn malformed(line: usize, reason: impl Into<String>) -> AppError {
    AppError::MalformedImport { line, reason: reason.into() }
}

struct Cells<'a> {
    record: &'a csv::StringRecord,
    line: usize,
}

impl<'a> Cells<'a> {
    fn text(&self, index: usize) -> &'a str {
        self.record.get(index).unwrap_or("").trim()
    }

    fn required(&self, index: usize, column: &str) -> Result<&'a str, AppError> {
        let value = self.text(index);
        if value.is_empty() {
            return Err(malformed(self.line, format!("coluna '{}' vazia", column)));
        }
        Ok(value)
    }

    fn optional(&self, index: usize) -> Option<String> {
        Some(self.text(index)).filter(|v| !v.is_empty()).map(str::to_string)
    }

    // Aceita ISO (2024-01-31) e o formato brasileiro (31/01/2024)
    fn date(&self, index: usize, column: &str) -> Result<NaiveDate, AppError> {
        let raw = self.required(index, column)?;
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
            .map_err(|_| malformed(self.line, format!("data inválida em '{}': {}", column, raw)))
    }

    fn int(&self, index: usize, column: &str, min: i32, max: i32) -> Result<i32, AppError> {
        let raw = self.required(index, column)?;
        match raw.parse::<i32>() {
            Ok(value) if (min..=max).contains(&value) => Ok(value),
            _ => Err(malformed(self.line, format!("número inválido em '{}': {}", column, raw))),
        }
    }

    fn decimal(&self, index: usize, column: &str) -> Result<Decimal, AppError> {
        let raw = self.required(index, column)?;
        match raw.parse::<Decimal>() {
            Ok(value) if !value.is_sign_negative() || value.is_zero() => Ok(value),
            _ => Err(malformed(self.line, format!("valor inválido em '{}': {}", column, raw))),
        }
    }
}

fn reader(bytes: &[u8]) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes)
}

/// Lê a planilha inteira antes de gravar qualquer coisa: um erro em
/// qualquer linha aborta a importação.
pub fn parse_order_rows(bytes: &[u8]) -> Result<Vec<ImportedOrderRow>, AppError> {
    let mut rows = Vec::new();

    for (index, result) in reader(bytes).records().enumerate() {
        // Linha 1 é o cabeçalho
        let line = index + 2;
        let record = result.map_err(|e| malformed(line, e.to_string()))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let cells = Cells { record: &record, line };
        let document_number = digits_only(cells.required(0, "documentNumber")?);

        let discount = cells.decimal(6, "discount")?;
        if discount > Decimal::ONE_HUNDRED {
            return Err(malformed(line, format!("desconto acima de 100: {}", discount)));
        }

        let mut items = Vec::new();
        let mut column = ORDER_FIXED_COLUMNS;
        while column < record.len() {
            let name = cells.text(column);
            if !name.is_empty() {
                let price = cells.decimal(column + 1, "unitPrice")?;
                items.push((name.to_string(), price));
            }
            column += 2;
        }

        rows.push(ImportedOrderRow {
            line,
            document_number,
            emission_date: cells.date(1, "emissionDate")?,
            contract_start_date: cells.date(2, "contractStartDate")?,
            contract_end_date: cells.date(3, "contractEndDate")?,
            installment_day: cells.int(4, "installmentDay", 1, 31)?,
            installment_count: cells.int(5, "installmentCount", 1, i32::MAX)?,
            discount,
            paid_installments_count: cells.int(7, "paidInstallmentsCount", 0, i32::MAX)?,
            contract_file_path: cells.optional(ORDER_CONTRACT_COLUMN),
            items,
        });
    }

    Ok(rows)
}

/// Clientes da planilha, sanitizados e validados como no cadastro normal.
pub fn parse_client_rows(bytes: &[u8]) -> Result<Vec<(usize, ClientPayload)>, AppError> {
    let mut rows = Vec::new();

    for (index, result) in reader(bytes).records().enumerate() {
        let line = index + 2;
        let record = result.map_err(|e| malformed(line, e.to_string()))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        if record.len() < CLIENT_COLUMNS - 2 {
            return Err(malformed(line, format!("esperadas {} colunas, encontradas {}", CLIENT_COLUMNS, record.len())));
        }

        let cells = Cells { record: &record, line };
        let payload = ClientPayload {
            name: cells.text(0).to_string(),
            document_number: cells.text(1).to_string(),
            representative: Representative {
                name: cells.text(2).to_string(),
                email: cells.text(3).to_string(),
                phone: digits_only(cells.text(4)),
            },
            address: Address {
                zip_code: cells.text(5).to_string(),
                state: cells.text(6).to_uppercase(),
                city: cells.text(7).to_string(),
                neighbourhood: cells.text(8).to_string(),
                street: cells.text(9).to_string(),
                number: cells.text(10).to_string(),
                complement: cells.optional(11),
                reference: cells.optional(12),
            },
            status: ClientStatus::Active,
        }
        .sanitized();

        if let Err(errors) = payload.validate() {
            let fields: Vec<String> = errors.errors().keys().map(|k| k.to_string()).collect();
            return Err(malformed(line, format!("campos inválidos: {}", fields.join(", "))));
        }

        rows.push((line, payload));
    }

    Ok(rows)
}

// =========================================================================
//  3. SERVIÇO
// =========================================================================

#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn Store>,
    clients: ClientRepository,
    items: ItemRepository,
    orders: OrderRepository,
    pool: PgPool,
}

impl ReportService {
    pub fn new(
        store: Arc<dyn Store>,
        clients: ClientRepository,
        items: ItemRepository,
        orders: OrderRepository,
        pool: PgPool,
    ) -> Self {
        Self { store, clients, items, orders, pool }
    }

    pub async fn export_orders(&self, filter: &DashboardFilter) -> Result<Vec<u8>, AppError> {
        let orders = self.store.fetch_all_orders().await?;
        let mut evolution = dashboard_service::evolution(orders, filter)?;
        evolution
            .orders
            .sort_by(|a, b| a.order.emission_date.cmp(&b.order.emission_date));
        write_orders_csv(&evolution)
    }

    /// Clientes filtrados (busca/status) e ordenados como na listagem.
    pub async fn export_clients(&self, filter: &ClientFilter) -> Result<Vec<u8>, AppError> {
        let clients = self.store.fetch_all_clients().await?;
        write_clients_csv(&listing::filter_clients(clients, filter))
    }

    pub async fn export_performance(&self, filter: &DashboardFilter) -> Result<Vec<u8>, AppError> {
        let orders = self.store.fetch_all_orders().await?;
        write_performance_csv(&dashboard_service::performance(orders, filter)?)
    }

    /// Tudo ou nada: qualquer linha com problema desfaz a importação inteira.
    pub async fn import_orders(&self, bytes: &[u8]) -> Result<Vec<OrderResponse>, AppError> {
        let rows = parse_order_rows(bytes)?;

        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(rows.len());

        for row in &rows {
            let client = self
                .clients
                .find_by_document(&mut *tx, &row.document_number)
                .await?
                .ok_or_else(|| malformed(row.line, format!("cliente não encontrado: {}", row.document_number)))?;

            let mut lines: Vec<OrderLineItem> = Vec::new();
            for (name, price) in &row.items {
                let item = match self.items.find_by_name(&mut *tx, name).await? {
                    Some(item) => item,
                    None => self.items.create(&mut *tx, name, *price).await?,
                };

                // Mesmo item duas vezes na linha: soma a quantidade
                if let Some(line) = lines.iter_mut().find(|l| l.item_id == item.id) {
                    line.quantity += 1;
                    continue;
                }
                lines.push(OrderLineItem {
                    item_id: item.id,
                    item_name: item.name,
                    quantity: 1,
                    unit_price: *price,
                });
            }

            let new_order = NewOrder {
                client_id: client.id,
                items: lines,
                gross_basis: GrossBasis::LineItems,
                discount: row.discount,
                installment_count: row.installment_count,
                installment_day: row.installment_day,
                paid_installments_count: row.paid_installments_count,
                contract_start_date: row.contract_start_date,
                contract_end_date: row.contract_end_date,
                emission_date: row.emission_date,
                contract_file_path: row.contract_file_path.clone(),
            };

            let order_id = self.orders.insert_order(&mut *tx, &new_order).await?;
            for (position, line) in new_order.items.iter().enumerate() {
                self.orders.insert_line(&mut *tx, order_id, position as i32, line).await?;
            }
            created.push(order_id);
        }

        tx.commit().await?;
        tracing::info!("📥 Importação concluída: {} pedido(s)", created.len());

        let mut responses = Vec::with_capacity(created.len());
        for id in created {
            if let Some(order) = self.store.fetch_order_by_id(id).await? {
                responses.push(valuation::to_response(order)?);
            }
        }
        Ok(responses)
    }

    /// Documentos já cadastrados são ignorados; devolve só os novos.
    pub async fn import_clients(&self, bytes: &[u8]) -> Result<Vec<Client>, AppError> {
        let rows = parse_client_rows(bytes)?;

        let mut tx = self.pool.begin().await?;
        let mut created: Vec<Client> = Vec::new();

        for (_, payload) in &rows {
            let exists = self
                .clients
                .find_by_document(&mut *tx, &payload.document_number)
                .await?
                .is_some();
            if exists || created.iter().any(|c| c.document_number == payload.document_number) {
                continue;
            }
            created.push(self.clients.create(&mut *tx, payload).await?);
        }

        tx.commit().await?;
        tracing::info!("📥 Importação concluída: {} cliente(s) novos de {}", created.len(), rows.len());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{dashboard::ItemPerformance, order::Order};
    use chrono::Utc;
    use uuid::Uuid;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    const ORDERS_CSV: &str = "\
documentNumber,emissionDate,contractStartDate,contractEndDate,installmentDay,installmentCount,discount,paidInstallmentsCount,contractFilePath,item1,price1,item2,price2
12.345.678/0001-99,2024-03-01,2024-03-01,2025-02-28,10,12,10,2,uploads/contrato.pdf,Outdoor 9x3,1500.00,Panfleto,200.50
98765432100,15/04/2024,15/04/2024,15/10/2024,5,6,0,0,,Busdoor,800,,
";

    #[test]
    fn parses_order_rows() {
        let rows = parse_order_rows(ORDERS_CSV.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first.line, 2);
        assert_eq!(first.document_number, "12345678000199");
        assert_eq!(first.emission_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(first.installment_count, 12);
        assert_eq!(first.discount, d("10"));
        assert_eq!(first.contract_file_path.as_deref(), Some("uploads/contrato.pdf"));
        assert_eq!(
            first.items,
            vec![("Outdoor 9x3".to_string(), d("1500.00")), ("Panfleto".to_string(), d("200.50"))]
        );

        // Data no formato brasileiro e par de item em branco ignorado
        let second = &rows[1];
        assert_eq!(second.emission_date, NaiveDate::from_ymd_opt(2024, 4, 15).unwrap());
        assert_eq!(second.items, vec![("Busdoor".to_string(), d("800"))]);
        assert_eq!(second.contract_file_path, None);
    }

    #[test]
    fn malformed_number_reports_line() {
        let csv = "\
documentNumber,emissionDate,contractStartDate,contractEndDate,installmentDay,installmentCount,discount,paidInstallmentsCount
11122233344,2024-01-01,2024-01-01,2024-12-31,10,12,0,0
11122233344,2024-01-01,2024-01-01,2024-12-31,10,doze,0,0
";
        let err = parse_order_rows(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::MalformedImport { line: 3, .. }));
    }

    #[test]
    fn zero_installments_are_rejected_on_import() {
        let csv = "\
h1,h2,h3,h4,h5,h6,h7,h8
11122233344,2024-01-01,2024-01-01,2024-12-31,10,0,0,0
";
        assert!(matches!(
            parse_order_rows(csv.as_bytes()),
            Err(AppError::MalformedImport { line: 2, .. })
        ));
    }

    #[test]
    fn invalid_date_is_malformed() {
        let csv = "\
h1,h2,h3,h4,h5,h6,h7,h8
11122233344,2024-13-01,2024-01-01,2024-12-31,10,1,0,0
";
        let err = parse_order_rows(csv.as_bytes()).unwrap_err();
        match err {
            AppError::MalformedImport { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("emissionDate"));
            }
            other => panic!("erro inesperado: {:?}", other),
        }
    }

    #[test]
    fn parses_and_validates_clients() {
        let csv = "\
name,documentNumber,repName,repEmail,repPhone,zip,state,city,neighbourhood,street,number,complement,reference
Padaria Pão Quente,123.456.789-00,João,joao@padaria.com,(11) 98765-4321,01310-100,sp,São Paulo,Bela Vista,Av. Paulista,1000,,
";
        let rows = parse_client_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        let (line, payload) = &rows[0];
        assert_eq!(*line, 2);
        assert_eq!(payload.document_number, "12345678900");
        assert_eq!(payload.representative.phone, "11987654321");
        assert_eq!(payload.address.state, "SP");
        assert_eq!(payload.address.complement, None);

        let bad = csv.replace("joao@padaria.com", "sem-arroba");
        assert!(matches!(
            parse_client_rows(bad.as_bytes()),
            Err(AppError::MalformedImport { line: 2, .. })
        ));
    }

    fn order(display_id: i32, day: u32) -> Order {
        let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        Order {
            id: Uuid::new_v4(),
            display_id,
            client_id: Uuid::new_v4(),
            client_name: "Padaria".into(),
            items: vec![OrderLineItem {
                item_id: Uuid::new_v4(),
                item_name: "Outdoor".into(),
                quantity: 2,
                unit_price: d("75.00"),
            }],
            gross_basis: GrossBasis::LineItems,
            discount: d("10"),
            installment_count: 3,
            installment_day: 10,
            paid_installments_count: 1,
            contract_start_date: date,
            contract_end_date: date,
            emission_date: date,
            contract_file_path: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn orders_report_has_header_rows_and_summary() {
        let evolution = dashboard_service::evolution(vec![order(7, 5)], &DashboardFilter::default()).unwrap();
        let text = String::from_utf8(write_orders_csv(&evolution).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], ORDERS_HEADER.join(","));
        assert_eq!(
            lines[1],
            "7,Padaria,Outdoor (x2),05/03/2024,05/03/2024,05/03/2024,3,1,10.00,150.00,135.00,45.00,90.00"
        );
        assert!(lines.contains(&"Resumo"));
        assert!(lines.contains(&"Saldo Final,135.00"));
    }

    #[test]
    fn report_money_rounds_half_up() {
        assert_eq!(money(d("1.125")), "1.13");
        assert_eq!(money(d("0.025")), "0.03");
        assert_eq!(money(d("-0.005")), "-0.01");
        assert_eq!(money(d("10")), "10.00");
    }

    #[test]
    fn four_decimal_discounted_value_is_rounded_in_the_report() {
        // 10.05 com 50% de desconto -> líquido 5.025
        let mut half = order(8, 6);
        half.items[0].quantity = 1;
        half.items[0].unit_price = d("10.05");
        half.discount = d("50");
        half.installment_count = 1;
        half.paid_installments_count = 0;

        let evolution = dashboard_service::evolution(vec![half], &DashboardFilter::default()).unwrap();
        assert_eq!(evolution.orders[0].valuation.discounted_value, d("5.025"));

        let text = String::from_utf8(write_orders_csv(&evolution).unwrap()).unwrap();
        let row: Vec<&str> = text.lines().nth(1).unwrap().split(',').collect();
        assert_eq!(&row[9..], ["10.05", "5.03", "0.00", "5.03"]);
    }

    #[test]
    fn clients_report_lists_status_and_contact() {
        let id = Uuid::new_v4();
        let client = Client {
            id,
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
                neighbourhood: "Bela Vista".into(),
                street: "Av. Paulista".into(),
                number: "1000".into(),
                complement: None,
                reference: None,
            },
            status: ClientStatus::Inactive,
            created_at: Utc::now(),
        };

        let text = String::from_utf8(write_clients_csv(&[client]).unwrap()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(CLIENTS_HEADER.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some(format!("{},Padaria,12345678000199,João,joao@padaria.com,11987654321,São Paulo,SP,INATIVO", id).as_str())
        );
    }

    #[test]
    fn performance_report_lists_items() {
        let id = Uuid::new_v4();
        let performance = DashboardPerformance {
            final_balance: d("135"),
            item_performances: vec![ItemPerformance {
                item_id: id,
                item_name: "Outdoor".into(),
                total_revenue: d("135"),
                percentage_of_total: d("100"),
                variation: Decimal::ZERO,
            }],
        };
        let text = String::from_utf8(write_performance_csv(&performance).unwrap()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("ID,Item,Total (R$),% do Total"));
        assert_eq!(lines.next(), Some(format!("{},Outdoor,135.00,100.00", id).as_str()));
    }
}
