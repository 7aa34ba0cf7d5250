//! Reporting view - Denormalized `sales_records` view over the loaded tables.
//!
//! One row per order item, joined through order → branch and menu → category. Every
//! column is exposed twice: a machine name and the Korean label the reporting layer
//! shows to users. The view is replaced on every run, even when nothing was imported.

use crate::errors::Result;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use tracing::info;

/// Name of the reporting view.
pub const SALES_VIEW: &str = "sales_records";

/// (expression, machine name, display label)
type ViewColumn = (&'static str, &'static str, &'static str);

const SHARED_COLUMNS: [ViewColumn; 17] = [
    ("oi.id", "id", "레코드ID"),
    ("o.id", "order_id", "주문ID"),
    ("o.order_number", "order_number", "주문번호"),
    ("o.order_date", "order_date", "주문일자"),
    ("b.name", "branch_name", "지점명"),
    ("b.area_type", "area_type", "지역유형"),
    ("m.name", "menu_name", "메뉴명"),
    ("c.name", "category", "카테고리"),
    ("oi.quantity", "quantity", "수량"),
    ("oi.unit_price", "price", "단가"),
    ("oi.total_amount", "amount", "실판매금액"),
    (
        "oi.product_discount + oi.order_discount",
        "discount_amount",
        "할인금액",
    ),
    ("'card'", "payment_method", "결제수단"),
    ("o.order_channel", "order_channel", "주문채널"),
    ("o.order_status", "order_status", "주문상태"),
    ("oi.created_at", "created_at", "생성일시"),
    ("oi.updated_at", "updated_at", "수정일시"),
];

fn order_time_expr(backend: DatabaseBackend) -> &'static str {
    match backend {
        DatabaseBackend::Postgres => "to_char(o.ordered_at, 'HH24:MI:SS')",
        DatabaseBackend::MySql => "DATE_FORMAT(o.ordered_at, '%H:%i:%s')",
        DatabaseBackend::Sqlite => "strftime('%H:%M:%S', o.ordered_at)",
    }
}

/// The `SELECT` behind the view for `backend`.
#[must_use]
pub fn view_select(backend: DatabaseBackend) -> String {
    let mut columns: Vec<ViewColumn> = SHARED_COLUMNS.to_vec();
    // order_time sits right after order_date.
    columns.insert(4, (order_time_expr(backend), "order_time", "주문시간"));

    let machine = columns
        .iter()
        .map(|(expr, name, _)| format!("    {expr} AS {name}"));
    let labelled = columns
        .iter()
        .map(|(expr, _, label)| format!("    {expr} AS \"{label}\""));
    let select_list: Vec<String> = machine.chain(labelled).collect();

    format!(
        "SELECT\n{}\nFROM order_items oi\n\
         JOIN orders o ON o.id = oi.order_id\n\
         JOIN branches b ON b.id = o.branch_id\n\
         JOIN menus m ON m.id = oi.menu_id\n\
         JOIN categories c ON c.id = m.category_id",
        select_list.join(",\n")
    )
}

/// Statements that (re)define the view. PostgreSQL replaces in place; SQLite has no
/// `CREATE OR REPLACE VIEW`, so the old view is dropped first.
#[must_use]
pub fn view_statements(backend: DatabaseBackend) -> Vec<String> {
    let select = view_select(backend);
    match backend {
        DatabaseBackend::Postgres | DatabaseBackend::MySql => {
            vec![format!("CREATE OR REPLACE VIEW {SALES_VIEW} AS\n{select}")]
        }
        DatabaseBackend::Sqlite => vec![
            format!("DROP VIEW IF EXISTS {SALES_VIEW}"),
            format!("CREATE VIEW {SALES_VIEW} AS\n{select}"),
        ],
    }
}

/// Replaces the reporting view.
pub async fn refresh_sales_view(db: &DatabaseConnection) -> Result<()> {
    let backend = db.get_database_backend();
    for sql in view_statements(backend) {
        db.execute(Statement::from_string(backend, sql)).await?;
    }
    info!("Reporting view '{}' refreshed", SALES_VIEW);
    Ok(())
}
