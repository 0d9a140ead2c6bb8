//! OAuth2 access-token cache for France Travail
//!
//! Tokens are reused until a safety margin before their announced expiry.

use std::time::{Duration, Instant};

/// Refresh this long before the upstream expiry
pub const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Lifetime assumed when the token response has no `expires_in`
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

/// Single cached token; wrap in a mutex when shared
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    current: Option<CachedToken>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached token if it is still usable at `now`
    pub fn valid_token(&self, now: Instant) -> Option<&str> {
        self.current
            .as_ref()
            .filter(|t| now < t.refresh_at)
            .map(|t| t.access_token.as_str())
    }

    /// Store a freshly issued token
    pub fn store(&mut self, access_token: String, expires_in: Option<Duration>, now: Instant) {
        let lifetime = expires_in.unwrap_or(DEFAULT_LIFETIME);
        self.current = Some(CachedToken {
            access_token,
            refresh_at: now + lifetime.saturating_sub(EXPIRY_MARGIN),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cache() {
        assert!(TokenCache::new().valid_token(Instant::now()).is_none());
    }

    #[test]
    fn test_token_valid_until_margin() {
        let now = Instant::now();
        let mut cache = TokenCache::new();
        cache.store("tok".to_string(), Some(Duration::from_secs(1500)), now);

        assert_eq!(cache.valid_token(now), Some("tok"));
        assert_eq!(cache.valid_token(now + Duration::from_secs(1439)), Some("tok"));
        assert!(cache.valid_token(now + Duration::from_secs(1440)).is_none());
    }

    #[test]
    fn test_default_lifetime() {
        let now = Instant::now();
        let mut cache = TokenCache::new();
        cache.store("tok".to_string(), None, now);
        assert!(cache.valid_token(now + Duration::from_secs(3500)).is_some());
        assert!(cache.valid_token(now + Duration::from_secs(3540)).is_none());
    }

    #[test]
    fn test_short_lifetime_never_cached() {
        let now = Instant::now();
        let mut cache = TokenCache::new();
        cache.store("tok".to_string(), Some(Duration::from_secs(30)), now);
        assert!(cache.valid_token(now).is_none());

        cache.store("tok2".to_string(), Some(Duration::from_secs(120)), now);
        assert_eq!(cache.valid_token(now), Some("tok2"));
    }
}
