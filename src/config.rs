// 应用配置
//
// 从环境变量读取（启动时先加载 .env），无效的数值回退为默认值并记录警告。

use std::path::PathBuf;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATABASE_URL: &str = "sqlite:./fleet_catalog.db?mode=rwc";
const DEFAULT_STORAGE_DIR: &str = "./storage";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_BOOKING_PHONE: &str = "905550000000";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_SITE_NAME: &str = "Fleet Rental";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub storage_dir: PathBuf,
    /// 不带结尾斜杠
    pub public_base_url: String,
    /// 预订渠道（WhatsApp）号码，仅数字
    pub booking_phone: String,
    pub max_upload_bytes: usize,
    pub site_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            booking_phone: DEFAULT_BOOKING_PHONE.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            site_name: DEFAULT_SITE_NAME.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过任意查找函数构建配置，便于测试
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = parse_or_default(&lookup, "PORT", defaults.port);
        let max_upload_bytes = parse_or_default(&lookup, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes);

        let public_base_url = lookup("PUBLIC_BASE_URL")
            .and_then(|raw| match url::Url::parse(raw.trim()) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
                    Some(raw.trim().trim_end_matches('/').to_string())
                }
                _ => {
                    tracing::warn!("Invalid PUBLIC_BASE_URL {:?}, using default", raw);
                    None
                }
            })
            .unwrap_or(defaults.public_base_url);

        let booking_phone = lookup("BOOKING_PHONE")
            .map(|phone| phone.chars().filter(char::is_ascii_digit).collect())
            .unwrap_or(defaults.booking_phone);

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            storage_dir: lookup("STORAGE_DIR").map(PathBuf::from).unwrap_or(defaults.storage_dir),
            public_base_url,
            booking_phone,
            max_upload_bytes,
            site_name: lookup("SITE_NAME").unwrap_or(defaults.site_name),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value for {}: {:?}, using default {}", key, raw, default);
            default
        }),
        None => default,
    }
}
