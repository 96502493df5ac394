use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha512};

pub const SESSION_COOKIE: &str = "admin_session";
const SESSION_TTL_HOURS: i64 = 8;
const MIN_SECRET_LEN: usize = 64;

/// Operator session carried in a signed cookie; the signature is checked by the jar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub username: String,
    pub issued_at: DateTime<Utc>,
}

impl AdminSession {
    pub fn new(username: &str, now: DateTime<Utc>) -> Self {
        Self {
            username: username.to_string(),
            issued_at: now,
        }
    }

    pub fn from_jar(jar: &SignedCookieJar, now: DateTime<Utc>) -> Option<Self> {
        let cookie = jar.get(SESSION_COOKIE)?;
        let session = Self::decode(cookie.value())?;
        session.is_fresh(now).then_some(session)
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        let age = now - self.issued_at;
        age >= Duration::zero() && age < Duration::hours(SESSION_TTL_HOURS)
    }

    fn encode(&self) -> String {
        format!("{}|{}", self.issued_at.timestamp(), self.username)
    }

    fn decode(value: &str) -> Option<Self> {
        let (ts, username) = value.split_once('|')?;
        let issued_at = DateTime::<Utc>::from_timestamp(ts.parse().ok()?, 0)?;
        Some(Self {
            username: username.to_string(),
            issued_at,
        })
    }

    pub fn into_cookie(self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, self.encode()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build()
    }
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// Signing key for session cookies. Secrets are stretched to the 64 bytes the key needs;
/// without one a random per-process key is used and sessions end on restart.
pub fn signing_key(secret: Option<&str>) -> Key {
    match secret {
        Some(s) if s.len() >= MIN_SECRET_LEN => Key::from(&Sha512::digest(s.as_bytes())),
        Some(_) => {
            tracing::warn!(
                min_len = MIN_SECRET_LEN,
                "SESSION_SECRET too short; using a random session key"
            );
            Key::generate()
        }
        None => {
            tracing::warn!("SESSION_SECRET missing; using a random session key");
            Key::generate()
        }
    }
}
