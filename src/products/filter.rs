//! Catalog filtering: search text, price bucket and category, ANDed.

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::repo_types::Product;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum PriceBucket {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "under-50")]
    Under50,
    #[serde(rename = "50-100")]
    From50To100,
    #[serde(rename = "100-200")]
    From100To200,
    #[serde(rename = "over-200")]
    Over200,
}

impl PriceBucket {
    /// Lower bound inclusive, upper bound exclusive.
    fn bounds(self) -> (Option<Decimal>, Option<Decimal>) {
        let d = Decimal::from;
        match self {
            Self::All => (None, None),
            Self::Under50 => (None, Some(d(50))),
            Self::From50To100 => (Some(d(50)), Some(d(100))),
            Self::From100To200 => (Some(d(100)), Some(d(200))),
            Self::Over200 => (Some(d(200)), None),
        }
    }

    pub fn contains(self, price: Decimal) -> bool {
        let (lo, hi) = self.bounds();
        lo.map_or(true, |lo| price >= lo) && hi.map_or(true, |hi| price < hi)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Uuid),
}

impl<'de> Deserialize<'de> for CategoryFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        Uuid::parse_str(&raw)
            .map(Self::Only)
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub price: PriceBucket,
    #[serde(default)]
    pub category: CategoryFilter,
    #[serde(default)]
    pub featured: Option<bool>,
}

impl ProductFilter {
    fn matches_search(&self, p: &Product) -> bool {
        let Some(needle) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return true;
        };
        let needle = needle.to_lowercase();
        [&p.name, &p.name_ar, &p.description, &p.description_ar]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn matches_category(&self, p: &Product) -> bool {
        match self.category {
            CategoryFilter::All => true,
            CategoryFilter::Only(id) => p.category_id == Some(id),
        }
    }

    pub fn matches(&self, p: &Product) -> bool {
        self.matches_search(p)
            && self.price.contains(p.price)
            && self.matches_category(p)
            && self.featured.map_or(true, |f| p.featured == f)
    }

    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        products.into_iter().filter(|p| self.matches(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use time::OffsetDateTime;

    fn product(name: &str, name_ar: &str, price: &str, category: Option<Uuid>) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.into(),
            name_ar: name_ar.into(),
            description: format!("{name} description"),
            description_ar: String::new(),
            price: Decimal::from_str(price).unwrap(),
            images: vec![],
            stock: 10,
            featured: false,
            active: true,
            category_id: category,
            category_name: None,
            category_name_ar: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn catalog(phones: Uuid, books: Uuid) -> Vec<Product> {
        vec![
            product("Galaxy Phone", "هاتف جالكسي", "499.00", Some(phones)),
            product("Budget Phone", "هاتف اقتصادي", "49.99", Some(phones)),
            product("Arabic Novel", "رواية عربية", "12.00", Some(books)),
            product("Cookbook", "كتاب طبخ", "50.00", Some(books)),
            product("Gift Card", "بطاقة هدية", "100.00", None),
        ]
    }

    #[test]
    fn default_filter_returns_everything() {
        let all = catalog(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(ProductFilter::default().apply(all.clone()).len(), all.len());
    }

    #[test]
    fn category_filter_returns_only_that_category() {
        let (phones, books) = (Uuid::new_v4(), Uuid::new_v4());
        let filter = ProductFilter {
            category: CategoryFilter::Only(books),
            ..Default::default()
        };
        let out = filter.apply(catalog(phones, books));
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|p| p.category_id == Some(books)));
    }

    #[test]
    fn search_is_case_insensitive_and_bilingual() {
        let items = catalog(Uuid::new_v4(), Uuid::new_v4());
        let en = ProductFilter {
            search: Some("PHONE".into()),
            ..Default::default()
        };
        assert_eq!(en.apply(items.clone()).len(), 2);

        let ar = ProductFilter {
            search: Some("رواية".into()),
            ..Default::default()
        };
        let out = ar.apply(items);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Arabic Novel");
    }

    #[test]
    fn price_buckets_are_half_open() {
        let d = |s: &str| Decimal::from_str(s).unwrap();
        assert!(PriceBucket::Under50.contains(d("49.99")));
        assert!(!PriceBucket::Under50.contains(d("50.00")));
        assert!(PriceBucket::From50To100.contains(d("50.00")));
        assert!(!PriceBucket::From50To100.contains(d("100.00")));
        assert!(PriceBucket::From100To200.contains(d("100.00")));
        assert!(PriceBucket::Over200.contains(d("200.00")));
        assert!(PriceBucket::All.contains(d("0")));
    }

    #[test]
    fn predicates_are_anded() {
        let (phones, books) = (Uuid::new_v4(), Uuid::new_v4());
        let filter = ProductFilter {
            search: Some("phone".into()),
            price: PriceBucket::Under50,
            category: CategoryFilter::Only(phones),
            featured: None,
        };
        let out = filter.apply(catalog(phones, books));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Budget Phone");
    }

    #[test]
    fn query_string_parsing() {
        let id = Uuid::new_v4();
        let json = serde_json::json!({"price": "50-100", "category": id.to_string()});
        let f: ProductFilter = serde_json::from_value(json).unwrap();
        assert_eq!(f.price, PriceBucket::From50To100);
        assert_eq!(f.category, CategoryFilter::Only(id));

        let f: ProductFilter = serde_json::from_value(serde_json::json!({"category": "All"})).unwrap();
        assert_eq!(f.category, CategoryFilter::All);

        assert!(serde_json::from_value::<ProductFilter>(serde_json::json!({"category": "x"})).is_err());
    }
}
