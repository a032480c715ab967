//! Locale resolution, static message dictionaries and price formatting.
//!
//! Arabic and English are the only supported languages. Lookups never fail:
//! a key missing from the Arabic table falls back to English, and a key
//! missing from both comes back unchanged.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::{header::ACCEPT_LANGUAGE, request::Parts},
    Json,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ar,
}

impl Locale {
    pub fn parse(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Self::En),
            "ar" => Some(Self::Ar),
            _ => None,
        }
    }

    /// First supported language in an `Accept-Language` value, honoring q-weights.
    pub fn from_accept_language(header: &str) -> Option<Self> {
        let mut candidates: Vec<(f32, Self)> = header
            .split(',')
            .filter_map(|part| {
                let mut pieces = part.split(';');
                let locale = Self::parse(pieces.next()?)?;
                let q = pieces
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.parse::<f32>().ok())
                    .unwrap_or(1.0);
                // q=0 marks a language as not acceptable
                (q > 0.0).then_some((q, locale))
            })
            .collect();
        // stable sort keeps header order between equal weights
        candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        candidates.first().map(|(_, l)| *l)
    }

    pub fn is_rtl(self) -> bool {
        matches!(self, Self::Ar)
    }
}

#[derive(Debug, Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

/// Request locale: `?lang=` wins over `Accept-Language`, default English.
#[derive(Debug, Clone, Copy)]
pub struct Lang(pub Locale);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Lang {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let from_query = Query::<LangQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.lang)
            .and_then(|tag| Locale::parse(&tag));
        let locale = from_query
            .or_else(|| {
                parts
                    .headers
                    .get(ACCEPT_LANGUAGE)
                    .and_then(|h| h.to_str().ok())
                    .and_then(Locale::from_accept_language)
            })
            .unwrap_or_default();
        Ok(Lang(locale))
    }
}

#[derive(Debug, Serialize)]
pub struct LocaleInfo {
    pub locale: Locale,
    pub dir: &'static str,
}

/// GET /locale: the language the server resolved for this request.
pub async fn current_locale(Lang(locale): Lang) -> Json<LocaleInfo> {
    Json(LocaleInfo {
        locale,
        dir: if locale.is_rtl() { "rtl" } else { "ltr" },
    })
}

const EN: &[(&str, &str)] = &[
    ("status.pending", "Pending"),
    ("status.processing", "Processing"),
    ("status.shipped", "Shipped"),
    ("status.delivered", "Delivered"),
    ("status.cancelled", "Cancelled"),
    ("role.admin", "Admin"),
    ("role.client", "Client"),
    ("category.uncategorized", "Uncategorized"),
    ("cart.empty", "Your cart is empty"),
    ("stock.out", "Out of stock"),
    ("stock.low", "Low stock"),
    ("stock.in", "In stock"),
];

const AR: &[(&str, &str)] = &[
    ("status.pending", "قيد الانتظار"),
    ("status.processing", "قيد المعالجة"),
    ("status.shipped", "تم الشحن"),
    ("status.delivered", "تم التوصيل"),
    ("status.cancelled", "ملغي"),
    ("role.admin", "مسؤول"),
    ("role.client", "عميل"),
    ("category.uncategorized", "غير مصنف"),
    ("cart.empty", "سلة التسوق فارغة"),
    ("stock.out", "نفد من المخزون"),
    ("stock.low", "مخزون منخفض"),
    ("stock.in", "متوفر"),
];

fn table(locale: Locale) -> &'static [(&'static str, &'static str)] {
    match locale {
        Locale::En => EN,
        Locale::Ar => AR,
    }
}

fn lookup(locale: Locale, key: &str) -> Option<&'static str> {
    table(locale)
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

pub fn t(locale: Locale, key: &str) -> String {
    lookup(locale, key)
        .or_else(|| lookup(Locale::En, key))
        .map(str::to_string)
        .unwrap_or_else(|| key.to_string())
}

/// Arabic variant when asked for and present, English otherwise.
pub fn pick<'a>(locale: Locale, en: &'a str, ar: Option<&'a str>) -> &'a str {
    match (locale, ar) {
        (Locale::Ar, Some(ar)) if !ar.trim().is_empty() => ar,
        _ => en,
    }
}

pub fn format_price(amount: Decimal, locale: Locale) -> String {
    let fixed = format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    );
    match locale {
        Locale::En => format!("${fixed}"),
        Locale::Ar => format!("{} $", to_arabic_digits(&fixed)),
    }
}

fn to_arabic_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '0'..='9' => char::from_u32('\u{0660}' as u32 + (c as u32 - '0' as u32)).unwrap_or(c),
            '.' => '\u{066B}',
            _ => c,
        })
        .collect()
}
