use std::time::Duration;

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::Serialize;
use uuid::Uuid;

use crate::model::{role::Role, user::User};

const MAX_SESSIONS: u64 = 100_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub user_id: u64,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub login_time: DateTime<Utc>,
}

/// token => session, expired after the configured TTL
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<String, Session>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(MAX_SESSIONS)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Opens a session for the user and returns its bearer token.
    pub async fn create(&self, user: &User) -> String {
        let token = Uuid::new_v4().to_simple().to_string();
        let session = Session {
            user_id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            login_time: Utc::now(),
        };

        self.sessions.insert(token.clone(), session).await;
        token
    }

    pub async fn lookup(&self, token: &str) -> Option<Session> {
        self.sessions.get(token).await
    }

    pub async fn revoke(&self, token: &str) {
        self.sessions.invalidate(token).await;
    }
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
