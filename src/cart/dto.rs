use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::pricing::{self, Totals};
use super::repo_types::CartLine;
use crate::i18n::{self, Locale};

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct CartLineResponse {
    pub product_id: Uuid,
    pub name: String,
    pub name_ar: String,
    pub display_name: String,
    pub image: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
    pub in_stock: bool,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartLineResponse>,
    pub item_count: i64,
    #[serde(flatten)]
    pub totals: Totals,
    pub total_display: String,
    /// Localized notice shown instead of the item list.
    pub empty_message: Option<String>,
}

impl CartResponse {
    pub fn new(lines: Vec<CartLine>, locale: Locale) -> Self {
        let totals = pricing::compute(lines.iter().map(|l| (l.price, l.quantity)));
        let item_count = lines.iter().map(|l| i64::from(l.quantity)).sum();
        let empty_message = lines
            .is_empty()
            .then(|| i18n::t(locale, "cart.empty"));
        let items = lines
            .into_iter()
            .map(|l| CartLineResponse {
                display_name: i18n::pick(locale, &l.name, Some(&l.name_ar)).to_string(),
                image: l.images.first().cloned(),
                line_total: pricing::line_total(l.price, l.quantity),
                in_stock: l.active && l.stock >= l.quantity,
                product_id: l.product_id,
                name: l.name,
                name_ar: l.name_ar,
                unit_price: l.price,
                quantity: l.quantity,
            })
            .collect();
        Self {
            items,
            item_count,
            total_display: i18n::format_price(totals.total, locale),
            totals,
            empty_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn line(price: &str, quantity: i32) -> CartLine {
        CartLine {
            product_id: Uuid::new_v4(),
            quantity,
            name: "Dates".into(),
            name_ar: "تمر".into(),
            price: Decimal::from_str(price).unwrap(),
            images: vec!["products/a.jpg".into()],
            stock: 3,
            active: true,
        }
    }

    #[test]
    fn builds_lines_and_totals() {
        let cart = CartResponse::new(vec![line("20.00", 2), line("15.00", 4)], Locale::En);
        assert_eq!(cart.item_count, 6);
        assert_eq!(cart.totals.subtotal, Decimal::from(100));
        assert_eq!(cart.totals.shipping, Decimal::ZERO);
        assert_eq!(cart.items[0].line_total, Decimal::from(40));
        assert!(cart.items[0].in_stock);
        assert!(!cart.items[1].in_stock);
        assert_eq!(cart.total_display, "$108.00");
        assert!(cart.empty_message.is_none());
    }

    #[test]
    fn empty_cart_has_localized_notice() {
        let cart = CartResponse::new(vec![], Locale::Ar);
        assert_eq!(cart.item_count, 0);
        assert_eq!(cart.empty_message.as_deref(), Some("سلة التسوق فارغة"));
    }

    #[test]
    fn add_defaults_to_one() {
        let id = Uuid::new_v4();
        let req: AddToCartRequest =
            serde_json::from_str(&format!(r#"{{"product_id":"{id}"}}"#)).unwrap();
        assert_eq!(req.quantity, 1);
    }
}
