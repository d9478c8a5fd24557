//! Session token resolution from request headers and cookies

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use quickie_core::config::SessionConfig;
use tracing::{debug, warn};
use uuid::Uuid;

/// A token resolved for a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSession {
    pub token: String,
    /// Set when the token was minted for this request
    pub minted: bool,
}

/// Derives the session token of a request and issues new ones.
///
/// An explicit header wins over the cookie. Nothing here touches the cache.
#[derive(Debug, Clone)]
pub struct SessionResolver {
    cookie_name: String,
    header_name: String,
    max_age_secs: u64,
    secure: bool,
}

impl SessionResolver {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            cookie_name: config.cookie_name.clone(),
            header_name: config.header_name.to_ascii_lowercase(),
            max_age_secs: config.ttl_secs,
            secure: config.cookie_secure,
        }
    }

    /// Header carrying the token, lowercased
    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    /// Existing token of the request, if any; never mints
    pub fn lookup(&self, headers: &HeaderMap) -> Option<String> {
        if let Some(token) = headers
            .get(self.header_name.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            debug!("Session token taken from header");
            return Some(token.to_string());
        }

        self.cookie_token(headers)
    }

    /// Existing token, or a freshly minted one
    pub fn resolve_or_mint(&self, headers: &HeaderMap) -> ResolvedSession {
        match self.lookup(headers) {
            Some(token) => ResolvedSession {
                token,
                minted: false,
            },
            None => {
                let token = Uuid::new_v4().to_string();
                debug!(session_id = %token, "Minted session token");
                ResolvedSession {
                    token,
                    minted: true,
                }
            }
        }
    }

    /// Attach the session cookie for `token` to outgoing headers
    pub fn set_cookie(&self, headers: &mut HeaderMap, token: &str) {
        match HeaderValue::from_str(&self.cookie_value(token)) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(e) => warn!(error = %e, "Cannot encode session cookie"),
        }
    }

    fn cookie_value(&self, token: &str) -> String {
        // Browsers drop SameSite=None cookies that are not Secure
        let site_policy = if self.secure {
            "SameSite=None; Secure"
        } else {
            "SameSite=Lax"
        };
        format!(
            "{}={}; Max-Age={}; Path=/; HttpOnly; {}",
            self.cookie_name, token, self.max_age_secs, site_policy
        )
    }

    fn cookie_token(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|raw| raw.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == self.cookie_name && !value.trim().is_empty())
            .map(|(_, value)| value.trim().trim_matches('"').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> SessionResolver {
        SessionResolver::from_config(&SessionConfig::default())
    }

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_header_takes_precedence_over_cookie() {
        let h = headers(&[("x-session-id", "from-header"), ("cookie", "session_id=from-cookie")]);
        assert_eq!(resolver().lookup(&h).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_cookie_used_when_header_absent_or_blank() {
        let h = headers(&[
            ("x-session-id", "   "),
            ("cookie", "theme=dark; session_id=abc-123; lang=en"),
        ]);
        assert_eq!(resolver().lookup(&h).as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_cookie_name_must_match_exactly() {
        let h = headers(&[("cookie", "old_session_id=nope")]);
        assert!(resolver().lookup(&h).is_none());
    }

    #[test]
    fn test_mint_when_nothing_supplied() {
        let resolved = resolver().resolve_or_mint(&HeaderMap::new());
        assert!(resolved.minted);
        assert!(Uuid::parse_str(&resolved.token).is_ok());

        let other = resolver().resolve_or_mint(&HeaderMap::new());
        assert_ne!(resolved.token, other.token);
    }

    #[test]
    fn test_existing_token_is_not_minted() {
        let h = headers(&[("cookie", "session_id=abc")]);
        assert_eq!(
            resolver().resolve_or_mint(&h),
            ResolvedSession {
                token: "abc".to_string(),
                minted: false
            }
        );
    }

    #[test]
    fn test_set_cookie_attributes() {
        let mut out = HeaderMap::new();
        resolver().set_cookie(&mut out, "tok");

        let cookie = out.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert_eq!(
            cookie,
            "session_id=tok; Max-Age=86400; Path=/; HttpOnly; SameSite=None; Secure"
        );
    }

    #[test]
    fn test_insecure_cookie_falls_back_to_lax() {
        let config = SessionConfig {
            cookie_secure: false,
            ..SessionConfig::default()
        };
        let mut out = HeaderMap::new();
        SessionResolver::from_config(&config).set_cookie(&mut out, "tok");

        let cookie = out.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.ends_with("SameSite=Lax"));
        assert!(!cookie.contains("Secure"));
    }
}
