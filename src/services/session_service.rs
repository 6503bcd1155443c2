// ==================== SESSIONS ====================
// The cookie holds a signed JWT naming a server-side session record.
// Signature + expiry are checked first, then the record must still exist,
// so deleting the record (logout) revokes the cookie immediately.

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SessionSettings;
use crate::database::Store;
use crate::models::Session;
use crate::utils::AppError;

pub const SESSION_COOKIE_NAME: &str = "editor_session";

const SESSION_ISSUER: &str = "asciidoc-editor-service";
const SESSION_AUDIENCE: &str = "asciidoc-editor-web";

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: String,           // user_id
    pub jti: String,           // session_id
    pub iat: usize,            // issued at
    pub exp: usize,            // expiration
    pub aud: String,           // audience
    pub iss: String,           // issuer
}

/// The signed-in user, attached to requests by the session middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: String,
    pub session_id: String,
}

pub struct SessionManager {
    secret: String,
    ttl_days: i64,
    cookie_secure: bool,
}

impl SessionManager {
    pub fn new(settings: &SessionSettings) -> Self {
        SessionManager {
            secret: settings.secret.clone(),
            ttl_days: settings.ttl_days,
            cookie_secure: settings.cookie_secure,
        }
    }

    /// Records a new session for `user_id` and returns the signed cookie value.
    pub async fn start(&self, store: &dyn Store, user_id: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let expires = Duration::try_days(self.ttl_days)
            .filter(|ttl| *ttl > Duration::zero())
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| AppError::Internal(format!("unusable session TTL: {} days", self.ttl_days)))?;

        let session = Session {
            session_id: Uuid::new_v4().simple().to_string(),
            user_id: user_id.to_string(),
            created_at: now.timestamp(),
            expires_at: BsonDateTime::from_millis(expires.timestamp_millis()),
        };

        let claims = SessionClaims {
            sub: session.user_id.clone(),
            jti: session.session_id.clone(),
            iat: now.timestamp() as usize,
            exp: expires.timestamp() as usize,
            aud: SESSION_AUDIENCE.to_string(),
            iss: SESSION_ISSUER.to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign session: {}", e)))?;

        store.insert_session(&session).await?;

        Ok(token)
    }

    /// Checks signature, issuer, audience and expiry.
    pub fn verify_token(&self, token: &str) -> Result<SessionClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[SESSION_AUDIENCE]);
        validation.set_issuer(&[SESSION_ISSUER]);

        decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            log::debug!("🔒 Rejected session token: {}", e);
            AppError::NotAuthenticated
        })
    }

    /// Resolves a cookie value to the signed-in user, or `NotAuthenticated`.
    pub async fn resolve(&self, store: &dyn Store, token: &str) -> Result<CurrentUser, AppError> {
        let claims = self.verify_token(token)?;

        let session = store
            .find_session(&claims.jti)
            .await?
            .ok_or(AppError::NotAuthenticated)?;

        if session.user_id != claims.sub || session.is_expired() {
            return Err(AppError::NotAuthenticated);
        }

        Ok(CurrentUser {
            user_id: session.user_id,
            session_id: session.session_id,
        })
    }

    pub async fn end(&self, store: &dyn Store, session_id: &str) -> Result<(), AppError> {
        store.delete_session(session_id).await
    }

    pub fn cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE_NAME, token)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.cookie_secure)
            .max_age(CookieDuration::seconds(self.ttl_days.saturating_mul(SECONDS_PER_DAY)))
            .finish()
    }

    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE_NAME, "")
            .path("/")
            .http_only(true)
            .finish();
        cookie.make_removal();
        cookie
    }
}
