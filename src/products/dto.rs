use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::repo_types::Product;
use crate::i18n::{self, Locale};

#[derive(Debug, Default, Deserialize)]
pub struct CatalogScope {
    /// Admin-only: include deactivated products.
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub name_ar: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_ar: String,
    pub price: Decimal,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_active")]
    pub active: bool,
    pub category_id: Option<Uuid>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub name_ar: Option<String>,
    pub description: Option<String>,
    pub description_ar: Option<String>,
    pub price: Option<Decimal>,
    pub images: Option<Vec<String>>,
    pub stock: Option<i32>,
    pub featured: Option<bool>,
    pub active: Option<bool>,
    /// Absent: unchanged. `null`: uncategorized. Id: move.
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<Uuid>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Uuid>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    #[serde(flatten)]
    pub product: Product,
    pub image_urls: Vec<String>,
    pub display_name: String,
    pub display_description: String,
    pub category_display_name: String,
    pub price_display: String,
    pub stock_label: String,
}

impl ProductResponse {
    pub fn new(product: Product, image_urls: Vec<String>, locale: Locale) -> Self {
        let category_display_name = match &product.category_name {
            Some(en) => i18n::pick(locale, en, product.category_name_ar.as_deref()).to_string(),
            None => i18n::t(locale, "category.uncategorized"),
        };
        Self {
            display_name: i18n::pick(locale, &product.name, Some(&product.name_ar)).to_string(),
            display_description: i18n::pick(
                locale,
                &product.description,
                Some(&product.description_ar),
            )
            .to_string(),
            category_display_name,
            price_display: i18n::format_price(product.price, locale),
            stock_label: i18n::t(locale, product.stock_key()),
            image_urls,
            product,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_id_tristate() {
        let absent: UpdateProductRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.category_id, None);

        let cleared: UpdateProductRequest =
            serde_json::from_str(r#"{"category_id": null}"#).unwrap();
        assert_eq!(cleared.category_id, Some(None));

        let id = Uuid::new_v4();
        let moved: UpdateProductRequest =
            serde_json::from_str(&format!(r#"{{"category_id": "{id}"}}"#)).unwrap();
        assert_eq!(moved.category_id, Some(Some(id)));
    }

    #[test]
    fn price_accepts_string_and_number() {
        let req: CreateProductRequest =
            serde_json::from_str(r#"{"name":"a","name_ar":"ب","price":"19.99","category_id":null}"#)
                .unwrap();
        assert_eq!(req.price.to_string(), "19.99");
        assert!(req.active);
        let req: CreateProductRequest =
            serde_json::from_str(r#"{"name":"a","name_ar":"ب","price":5,"category_id":null}"#)
                .unwrap();
        assert_eq!(req.price, Decimal::from(5));
    }
}
