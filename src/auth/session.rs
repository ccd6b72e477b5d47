//! Server-side sessions for the admin UI.
//!
//! Sessions are opaque random ids in an in-memory map; the cookie carries the
//! id only. Restarting the process logs everyone out, which is acceptable for
//! an operator dashboard.

use axum::http::HeaderMap;
use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::Rng;

pub const SESSION_COOKIE: &str = "curator_session";

#[derive(Clone, Debug)]
pub struct SessionData {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
}

#[derive(Default)]
pub struct SessionStore {
    inner: DashMap<String, SessionData>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session and return its id.
    pub fn create(&self, data: SessionData) -> String {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        self.inner.insert(id.clone(), data);
        id
    }

    pub fn get(&self, id: &str) -> Option<SessionData> {
        self.inner.get(id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, id: &str) {
        self.inner.remove(id);
    }
}

/// Set-Cookie value for a fresh session. HttpOnly prevents script access,
/// SameSite=Lax covers the form posts.
pub fn session_cookie(id: &str) -> String {
    format!("{}={}; HttpOnly; Path=/; SameSite=Lax", SESSION_COOKIE, id)
}

/// Set-Cookie value that clears the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Read one cookie value out of the Cookie header(s).
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    for pair in header.split(';') {
        let mut parts = pair.trim().splitn(2, '=');
        if parts.next() == Some(name) {
            return parts.next().map(|v| v.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    #[test]
    fn create_get_remove_round_trip() {
        let store = SessionStore::new();
        let id = store.create(SessionData {
            user_id: 5,
            username: "test".into(),
            is_admin: true,
        });
        let data = store.get(&id).unwrap();
        assert_eq!(data.user_id, 5);
        store.remove(&id);
        assert!(store.get(&id).is_none());
    }

    #[test]
    fn cookie_header_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            format!("other=1; {}=abc123; third=x", SESSION_COOKIE).parse().unwrap(),
        );
        assert_eq!(cookie_value(&headers, SESSION_COOKIE).as_deref(), Some("abc123"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }
}
