// Session Port - where the bearer token and tenant come from

use crate::cookie::CookieJar;

/// Default cookie holding the access token
pub const DEFAULT_AUTH_COOKIE: &str = "imhotep_token";

/// Default cookie holding the tenant id
pub const DEFAULT_TENANT_COOKIE: &str = "imhotep_tenant";

/// Read-only access to an externally managed session
///
/// Token acquisition and refresh belong to the identity provider; this
/// port only exposes what is attached to outgoing requests.
pub trait SessionProvider: Send + Sync {
    fn access_token(&self) -> Option<String>;

    fn tenant_id(&self) -> Option<String> {
        None
    }
}

/// Fixed credentials (CLI flags, environment, tests)
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    token: Option<String>,
    tenant: Option<String>,
}

impl StaticSession {
    pub fn new(token: Option<String>, tenant: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
            tenant: tenant.filter(|t| !t.is_empty()),
        }
    }

    /// No credentials at all
    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl SessionProvider for StaticSession {
    fn access_token(&self) -> Option<String> {
        self.token.clone()
    }

    fn tenant_id(&self) -> Option<String> {
        self.tenant.clone()
    }
}

/// Session read from a cookie header
#[derive(Debug, Clone)]
pub struct CookieSession {
    jar: CookieJar,
    auth_cookie: String,
    tenant_cookie: String,
}

impl CookieSession {
    pub fn new(
        header: &str,
        auth_cookie: impl Into<String>,
        tenant_cookie: impl Into<String>,
    ) -> Self {
        Self {
            jar: CookieJar::parse(header),
            auth_cookie: auth_cookie.into(),
            tenant_cookie: tenant_cookie.into(),
        }
    }

    /// Cookie session using the default cookie names
    pub fn with_default_names(header: &str) -> Self {
        Self::new(header, DEFAULT_AUTH_COOKIE, DEFAULT_TENANT_COOKIE)
    }
}

impl SessionProvider for CookieSession {
    fn access_token(&self) -> Option<String> {
        self.jar
            .get(&self.auth_cookie)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn tenant_id(&self) -> Option<String> {
        self.jar
            .get(&self.tenant_cookie)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}
