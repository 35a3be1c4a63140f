use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub verification: VerificationConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 远程核验服务
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    /// None 表示使用 HTTP 客户端默认行为
    pub timeout_secs: Option<u64>,
}

/// 上传限制
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_bytes: usize,
    /// 支持 `image/*` 这样的通配
    pub allowed_content_types: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            api_token: None,
            timeout_secs: None,
        }
    }
}

// token 不进日志
impl std::fmt::Debug for VerificationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            allowed_content_types: vec!["image/*".to_string(), "application/pdf".to_string()],
        }
    }
}

impl UploadConfig {
    /// 检查 MIME 类型是否在允许列表中
    pub fn accepts(&self, content_type: &str) -> bool {
        let content_type = content_type.trim().to_ascii_lowercase();
        self.allowed_content_types.iter().any(|allowed| {
            match allowed.strip_suffix("/*") {
                Some(prefix) => content_type
                    .split_once('/')
                    .is_some_and(|(major, _)| major == prefix),
                None => *allowed == content_type,
            }
        })
    }
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server: ServerConfig {
                host: std::env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: std::env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(defaults.server.port),
            },
            verification: VerificationConfig {
                base_url: std::env::var("VERIFY_BASE_URL")
                    .unwrap_or(defaults.verification.base_url),
                api_token: std::env::var("VERIFY_API_TOKEN")
                    .ok()
                    .filter(|t| !t.trim().is_empty()),
                timeout_secs: std::env::var("VERIFY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok()),
            },
            upload: UploadConfig {
                max_bytes: std::env::var("UPLOAD_MAX_BYTES")
                    .ok()
                    .and_then(|b| b.parse().ok())
                    .unwrap_or(defaults.upload.max_bytes),
                allowed_content_types: defaults.upload.allowed_content_types,
            },
        }
    }

    /// 配置文件 (TOML, 可选) + `SCAN_` 前缀环境变量, 例如 `SCAN_SERVER__PORT=9000`
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        builder
            .add_source(config::Environment::with_prefix("SCAN").separator("__"))
            .build()
            .and_then(|c| c.try_deserialize::<AppConfig>())
            .map_err(|e| AppError::Config(e.to_string()))
    }
}
