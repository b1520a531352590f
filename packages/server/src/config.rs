//! Server configuration.

use crate::usecase::DEFAULT_HISTORY_LIMIT;

/// Runtime settings collected from CLI flags and environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound (and default) for a history page.
    pub history_limit: usize,
    /// When set, only this origin is allowed by CORS.
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            history_limit: DEFAULT_HISTORY_LIMIT,
            cors_origin: None,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // テスト項目: 既定値はローカルの 8080 番で履歴 50 件、CORS なし
        // given (前提条件):
        let config = ServerConfig::default();

        // when (操作):
        let addr = config.bind_addr();

        // then (期待する結果):
        assert_eq!(addr, "127.0.0.1:8080");
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.cors_origin, None);
    }
}
