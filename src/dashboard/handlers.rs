use std::collections::BTreeMap;

use axum::{extract::State, routing::get, Json, Router};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use super::repo;
use crate::{
    auth::AdminUser,
    error::AppResult,
    i18n::{self, Lang, Locale},
    orders::{Order, OrderStatus},
    products::{self, LOW_STOCK_THRESHOLD},
    state::AppState,
};

const RECENT_ORDERS: i64 = 5;

pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/dashboard", get(dashboard_stats))
}

#[derive(Debug, Serialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct RecentOrder {
    pub id: Uuid,
    pub customer_name: String,
    pub total: Decimal,
    pub total_display: String,
    pub status: OrderStatus,
    pub status_label: String,
}

#[derive(Debug, Serialize)]
pub struct LowStockProduct {
    pub id: Uuid,
    pub display_name: String,
    pub stock: i32,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub products: i64,
    pub categories: i64,
    pub users: i64,
    pub orders: i64,
    pub revenue: Decimal,
    pub revenue_display: String,
    pub orders_by_status: Vec<StatusCount>,
    pub recent_orders: Vec<RecentOrder>,
    pub low_stock: Vec<LowStockProduct>,
}

/// Every status appears once, zero-filled, in lifecycle order.
pub(crate) fn status_breakdown(rows: &[(OrderStatus, i64)], locale: Locale) -> Vec<StatusCount> {
    let counts: BTreeMap<usize, i64> = rows
        .iter()
        .filter_map(|(s, n)| OrderStatus::ALL.iter().position(|x| x == s).map(|i| (i, *n)))
        .collect();
    OrderStatus::ALL
        .iter()
        .enumerate()
        .map(|(i, &status)| StatusCount {
            status,
            label: i18n::t(locale, status.label_key()),
            count: counts.get(&i).copied().unwrap_or(0),
        })
        .collect()
}

fn recent(order: Order, locale: Locale) -> RecentOrder {
    RecentOrder {
        id: order.id,
        total_display: i18n::format_price(order.total, locale),
        status_label: i18n::t(locale, order.status.label_key()),
        customer_name: order.customer_name,
        total: order.total,
        status: order.status,
    }
}

#[instrument(skip(state))]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Lang(locale): Lang,
) -> AppResult<Json<DashboardStats>> {
    let counts = repo::counts(&state.db).await?;
    let by_status = repo::orders_by_status(&state.db).await?;
    let recent_orders = repo::recent_orders(&state.db, RECENT_ORDERS).await?;
    let low_stock = products::repo::low_stock(&state.db, LOW_STOCK_THRESHOLD).await?;

    Ok(Json(DashboardStats {
        products: counts.products,
        categories: counts.categories,
        users: counts.users,
        orders: counts.orders,
        revenue: counts.revenue,
        revenue_display: i18n::format_price(counts.revenue, locale),
        orders_by_status: status_breakdown(&by_status, locale),
        recent_orders: recent_orders.into_iter().map(|o| recent(o, locale)).collect(),
        low_stock: low_stock
            .into_iter()
            .map(|p| LowStockProduct {
                id: p.id,
                display_name: i18n::pick(locale, &p.name, Some(&p.name_ar)).to_string(),
                stock: p.stock,
            })
            .collect(),
    }))
}
