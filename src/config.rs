use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 可选配置文件 (工作目录下 invoice-validator.toml)
const CONFIG_FILE: &str = "invoice-validator";

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// 上传请求体上限 (字节)
    pub max_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub sheet_name: String,
    /// 设置后导出文件同时写入该目录
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            upload: UploadConfig {
                max_bytes: 10 * 1024 * 1024,
            },
            export: ExportConfig::default(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sheet_name: "Validated Invoices".to_string(),
            output_dir: None,
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 -> 配置文件 -> 环境变量 (APP__SERVER__PORT 等)
    ///
    /// SERVER_HOST / SERVER_PORT 仍然有效, 优先级最高
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(CONFIG_FILE)
    }

    /// 指定配置文件 (可省略扩展名, 文件不存在时跳过)
    pub fn load(config_file: &str) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port as i64)?
            .set_default("upload.max_bytes", defaults.upload.max_bytes as i64)?
            .set_default("export.sheet_name", defaults.export.sheet_name)?
            .add_source(File::with_name(config_file).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option(
                "server.port",
                std::env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse::<u16>().ok())
                    .map(i64::from),
            )?
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.upload.max_bytes, 10 * 1024 * 1024);
        assert_eq!(config.export.sheet_name, "Validated Invoices");
        assert!(config.export.output_dir.is_none());
    }
}
