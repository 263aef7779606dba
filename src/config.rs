/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, JWT 署名鍵, 公開パス/ロール制限, CORS など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
    TooShort { key: &'static str, min_len: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
            ConfigError::TooShort { key, min_len } => {
                write!(f, "invalid configuration: {} must be at least {} bytes", key, min_len)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

pub const DEFAULT_PUBLIC_PATH_PREFIXES: &[&str] = &[
    "/health",
    "/api/v1/auth/",
    "/api-docs",
    "/v3/api-docs",
    "/swagger-ui",
    "/swagger-ui.html",
];

pub const DEFAULT_ROLE_PATH_RULES: &str = "/api/v1/admin/=ADMIN";

pub const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: u64 = 3600;

/// Must equal the cost of the hashes in the credential store, otherwise
/// unknown-user logins take measurably longer or shorter than wrong-password ones.
/// Existing user rows were hashed at cost 10.
pub const DEFAULT_PASSWORD_HASH_COST: u32 = 10;

/// Path prefix → role name. The required authority is derived as `ROLE_<NAME>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePathRule {
    pub prefix: String,
    pub role: String,
}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout_seconds: u64,
    pub request_body_limit_bytes: usize,

    // HS256 signing secret. Never printed.
    pub jwt_secret: String,
    pub access_token_ttl_seconds: u64,
    pub password_hash_cost: u32,

    pub public_path_prefixes: Vec<String>,
    pub role_path_rules: Vec<RolePathRule>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("public_path_prefixes", &self.public_path_prefixes)
            .field("role_path_rules", &self.role_path_rules)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = split_list(&std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let request_timeout_seconds = std::env::var("REQUEST_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let request_body_limit_bytes = std::env::var("REQUEST_BODY_LIMIT_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);

        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;

        let access_token_ttl_seconds =
            parse_token_ttl(std::env::var("ACCESS_TOKEN_TTL_SECONDS").ok().as_deref())?;

        let password_hash_cost =
            parse_password_hash_cost(std::env::var("PASSWORD_HASH_COST").ok().as_deref())?;

        let public_path_prefixes = match std::env::var("PUBLIC_PATH_PREFIXES") {
            Ok(v) => split_list(&v),
            Err(_) => DEFAULT_PUBLIC_PATH_PREFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        let role_path_rules = parse_role_path_rules(
            &std::env::var("ROLE_PATH_RULES")
                .unwrap_or_else(|_| DEFAULT_ROLE_PATH_RULES.to_string()),
        )?;

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            request_timeout_seconds,
            request_body_limit_bytes,
            jwt_secret,
            access_token_ttl_seconds,
            password_hash_cost,
            public_path_prefixes,
            role_path_rules,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Unset means one hour. Zero, or anything that does not fit unix-seconds
/// arithmetic, is rejected.
pub fn parse_token_ttl(raw: Option<&str>) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_ACCESS_TOKEN_TTL_SECONDS);
    };
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|ttl| *ttl > 0 && i64::try_from(*ttl).is_ok())
        .ok_or(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"))
}

pub fn parse_password_hash_cost(raw: Option<&str>) -> Result<u32, ConfigError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_PASSWORD_HASH_COST);
    };
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|c| (4..=31).contains(c))
        .ok_or(ConfigError::Invalid("PASSWORD_HASH_COST"))
}

/// Parse `prefix=ROLE` pairs separated by commas.
pub fn parse_role_path_rules(raw: &str) -> Result<Vec<RolePathRule>, ConfigError> {
    split_list(raw)
        .into_iter()
        .map(|pair| {
            let (prefix, role) = pair
                .split_once('=')
                .ok_or(ConfigError::Invalid("ROLE_PATH_RULES"))?;
            let (prefix, role) = (prefix.trim(), role.trim());
            if !prefix.starts_with('/') || role.is_empty() {
                return Err(ConfigError::Invalid("ROLE_PATH_RULES"));
            }
            Ok(RolePathRule {
                prefix: prefix.to_string(),
                role: role.to_string(),
            })
        })
        .collect()
}
