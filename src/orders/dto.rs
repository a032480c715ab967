use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::{Order, OrderItem, OrderStatus};
use crate::cart::pricing;
use crate::i18n::{self, Locale};

#[derive(Debug, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ShippingAddress {
    pub line: String,
    pub city: String,
    pub country: String,
    #[serde(default)]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OrderLineInput {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub customer: CustomerInfo,
    pub shipping_address: ShippingAddress,
    /// Guest checkout only; signed-in users check out their cart.
    #[serde(default)]
    pub items: Option<Vec<OrderLineInput>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    #[serde(flatten)]
    pub item: OrderItem,
    pub display_name: String,
    pub line_total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: Order,
    pub status_label: String,
    pub total_display: String,
    pub guest: bool,
    pub items: Vec<OrderItemResponse>,
}

impl OrderResponse {
    pub fn new(order: Order, items: Vec<OrderItem>, locale: Locale) -> Self {
        let items = items
            .into_iter()
            .map(|item| OrderItemResponse {
                display_name: i18n::pick(locale, &item.product_name, Some(&item.product_name_ar))
                    .to_string(),
                line_total: pricing::line_total(item.unit_price, item.quantity),
                item,
            })
            .collect();
        Self {
            status_label: i18n::t(locale, order.status.label_key()),
            total_display: i18n::format_price(order.total, locale),
            guest: order.is_guest(),
            items,
            order,
        }
    }
}
