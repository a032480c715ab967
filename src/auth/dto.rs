use jsonwebtoken::{DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Role, User};
use crate::i18n::{self, Locale};

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    #[serde(default)]
    pub name_ar: Option<String>,
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Protected route the client was bounced from, if any.
    #[serde(default)]
    pub redirect_to: Option<String>,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub name_ar: Option<String>,
    pub avatar: Option<String>,
}

/// Response returned after login, register or refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
    /// Where the client should navigate next.
    pub redirect: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub name_ar: Option<String>,
    pub display_name: String,
    pub email: String,
    pub role: Role,
    pub role_label: String,
    pub avatar: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub joined_at: OffsetDateTime,
}

impl PublicUser {
    pub fn from_user(user: User, locale: Locale) -> Self {
        Self {
            display_name: i18n::pick(locale, &user.name, user.name_ar.as_deref()).to_string(),
            role_label: i18n::t(locale, user.role.label_key()),
            id: user.id,
            name: user.name,
            name_ar: user.name_ar,
            email: user.email,
            role: user.role,
            avatar: user.avatar,
            joined_at: user.created_at,
        }
    }
}
