use std::env;

/// Default bind address for the HTTP transport.
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8000";

/// Runtime configuration for the server transports, read from the process
/// environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bearer token protecting the HTTP routes. `None` disables the auth
    /// gate entirely; only acceptable for local use.
    pub auth_token: Option<String>,

    /// Address the HTTP transport binds to.
    pub http_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            auth_token: None,
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
        }
    }
}

impl ServerConfig {
    /// Read `MCP_AUTH_TOKEN` and `MCP_HTTP_ADDR` from the environment.
    /// An empty or whitespace-only token counts as unset.
    pub fn from_env() -> Self {
        let auth_token = env::var("MCP_AUTH_TOKEN")
            .ok()
            .map(|raw| normalize_token(&raw))
            .filter(|token| !token.is_empty());

        let http_addr = env::var("MCP_HTTP_ADDR")
            .ok()
            .map(|addr| addr.trim().to_string())
            .filter(|addr| !addr.is_empty())
            .unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());

        Self { auth_token, http_addr }
    }

    pub fn auth_required(&self) -> bool {
        self.auth_token.is_some()
    }
}

/// Strip surrounding whitespace and quotes, the same way tokens pasted into
/// shell profiles usually need it.
pub(crate) fn normalize_token(raw: &str) -> String {
    raw.trim().trim_matches('"').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_token() {
        let cfg = ServerConfig::default();
        assert!(cfg.auth_token.is_none());
        assert!(!cfg.auth_required());
        assert_eq!(cfg.http_addr, DEFAULT_HTTP_ADDR);
    }

    #[test]
    fn normalize_token_strips_quotes_and_whitespace() {
        assert_eq!(normalize_token("secret"), "secret");
        assert_eq!(normalize_token("  secret  "), "secret");
        assert_eq!(normalize_token("\"secret\""), "secret");
        assert_eq!(normalize_token(" \" secret \" "), "secret");
        assert_eq!(normalize_token("   "), "");
    }

    #[test]
    fn auth_required_follows_token_presence() {
        let cfg = ServerConfig {
            auth_token: Some("secret".to_string()),
            ..ServerConfig::default()
        };
        assert!(cfg.auth_required());
    }
}
