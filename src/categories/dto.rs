use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::Category;
use crate::i18n::{self, Locale};

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub name_ar: String,
    pub description: Option<String>,
    pub description_ar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub name_ar: Option<String>,
    pub description: Option<String>,
    pub description_ar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    #[serde(flatten)]
    pub category: Category,
    pub display_name: String,
    pub display_description: Option<String>,
}

impl CategoryResponse {
    pub fn new(category: Category, locale: Locale) -> Self {
        let display_name = i18n::pick(locale, &category.name, Some(&category.name_ar)).to_string();
        let display_description = category.description.as_deref().map(|en| {
            i18n::pick(locale, en, category.description_ar.as_deref()).to_string()
        });
        Self {
            category,
            display_name,
            display_description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteCategoryResponse {
    pub id: Uuid,
    pub detached_products: u64,
}
