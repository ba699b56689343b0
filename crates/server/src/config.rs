use std::fmt;
use std::str::FromStr;

/// Which transport the tool server listens on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Transport {
    /// Newline-delimited JSON-RPC on stdin/stdout.
    #[default]
    Stdio,
    /// JSON-RPC over `POST /mcp`, plus `GET /health`.
    Http,
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "http" => Ok(Transport::Http),
            other => Err(format!("Unknown transport '{other}'. Must be 'stdio' or 'http'")),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transport::Stdio => "stdio",
            Transport::Http => "http",
        })
    }
}

/// Database connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Full connection URL.
    pub url: String,
    /// Pool size upper bound (default: `20`).
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Load database settings from environment variables.
    ///
    /// `DATABASE_URL` wins when set; otherwise the URL is assembled from the
    /// individual parts.
    ///
    /// | Env Var              | Default          |
    /// |----------------------|------------------|
    /// | `DATABASE_URL`       | (assembled)      |
    /// | `DB_HOST`            | `localhost`      |
    /// | `DB_PORT`            | `5432`           |
    /// | `DB_NAME`            | `video_metadata` |
    /// | `DB_USER`            | `postgres`       |
    /// | `DB_PASSWORD`        | (empty)          |
    /// | `DB_MAX_CONNECTIONS` | `20`             |
    pub fn from_env() -> Self {
        let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            let host = std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".into());
            let port = std::env::var("DB_PORT").unwrap_or_else(|_| "5432".into());
            let name = std::env::var("DB_NAME").unwrap_or_else(|_| "video_metadata".into());
            let user = std::env::var("DB_USER").unwrap_or_else(|_| "postgres".into());
            let password = std::env::var("DB_PASSWORD").unwrap_or_default();
            build_database_url(&host, &port, &name, &user, &password)
        });

        let max_connections: u32 = std::env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| vidcat_db::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse()
            .expect("DB_MAX_CONNECTIONS must be a valid u32");

        Self {
            url,
            max_connections,
        }
    }
}

fn build_database_url(host: &str, port: &str, name: &str, user: &str, password: &str) -> String {
    if password.is_empty() {
        format!("postgres://{user}@{host}:{port}/{name}")
    } else {
        format!("postgres://{user}:{password}@{host}:{port}/{name}")
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Transport to serve on (default: `stdio`).
    pub transport: Transport,
    /// Bind address for the HTTP transport (default: `0.0.0.0`).
    pub host: String,
    /// Bind port for the HTTP transport (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `MCP_TRANSPORT`        | `stdio`                    |
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Self {
        let transport: Transport = std::env::var("MCP_TRANSPORT")
            .unwrap_or_else(|_| "stdio".into())
            .parse()
            .expect("MCP_TRANSPORT must be 'stdio' or 'http'");

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            transport,
            host,
            port,
            cors_origins,
            request_timeout_secs,
        }
    }
}
