use crate::guard::RequestGuard;
use crate::prediction::Digit;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc, time::Instant};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "digit_canvas_session";

/// Per-browser state: the last successful prediction and the in-flight guard.
#[derive(Debug, Default)]
pub struct Session {
    last_prediction: Mutex<Option<Digit>>,
    guard: RequestGuard,
}

impl Session {
    pub fn record(&self, digit: Digit) {
        *self.last_prediction.lock() = Some(digit);
    }

    pub fn last_prediction(&self) -> Option<Digit> {
        *self.last_prediction.lock()
    }

    pub fn guard(&self) -> &RequestGuard {
        &self.guard
    }
}

struct Entry {
    session: Arc<Session>,
    last_seen: Instant,
}

/// Sessions keyed by the id in the session cookie.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<Uuid, Entry>>>,
    capacity: usize,
}

impl SessionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Resolves the caller's session from its cookie, issuing a fresh id when
    /// the cookie is missing, malformed or refers to an evicted session.
    pub fn open(&self, jar: CookieJar) -> (CookieJar, Arc<Session>) {
        let known = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());

        let mut sessions = self.sessions.lock();
        if let Some(entry) = known.and_then(|id| sessions.get_mut(&id)) {
            entry.last_seen = Instant::now();
            return (jar, entry.session.clone());
        }

        if sessions.len() >= self.capacity {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id);
            if let Some(id) = oldest {
                sessions.remove(&id);
                tracing::debug!(session = %id, "evicted idle session");
            }
        }

        let id = Uuid::new_v4();
        let session = Arc::new(Session::default());
        sessions.insert(
            id,
            Entry {
                session: session.clone(),
                last_seen: Instant::now(),
            },
        );
        tracing::debug!(session = %id, open = sessions.len(), "session opened");
        drop(sessions);

        let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax);
        (jar.add(cookie), session)
    }
}
