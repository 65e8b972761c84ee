use config::{Config, ConfigError, Environment, File};
use std::sync::OnceLock;

use super::AppConfig;
use crate::models::graph::threshold::DEFAULT_MIN_SIMILARITY;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

impl AppConfig {
    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // 内置默认值，保证没有配置文件也能启动
            .set_default("app.system_name", "Radar")?
            .set_default("app.environment", "development")?
            .set_default("app.log_level", "info")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.unix_socket_path", "")?
            .set_default("server.workers", 0)?
            .set_default("server.max_workers", 16)?
            .set_default("server.timeouts.client_request", 30_000)?
            .set_default("server.timeouts.client_disconnect", 5_000)?
            .set_default("server.timeouts.keep_alive", 75)?
            .set_default("server.limits.max_payload_size", 1_048_576)?
            .set_default("database.url", "radar.db")?
            .set_default("database.pool_size", 10)?
            .set_default("database.timeout", 10)?
            .set_default("cache.graph.max_capacity", 1_000)?
            .set_default("cache.graph.build_timeout_ms", 30_000)?
            .set_default("cors.allowed_origins", Vec::<String>::new())?
            .set_default("cors.max_age", 3600)?
            .set_default("review.max_score", 10)?
            .set_default("review.flagged_cutoff", 5)?
            .set_default("review.top_comparisons", 50)?
            .set_default("graph.default_min_similarity", DEFAULT_MIN_SIMILARITY)?
            .set_default("rate_limit.graph_build_requests", 30)?
            .set_default("rate_limit.window_secs", 60)?
            // 首先加载默认配置文件
            .add_source(File::with_name("config").required(false))
            // 然后根据环境加载特定配置文件
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // 最后加载环境变量覆盖
            .add_source(
                Environment::with_prefix("RADAR")
                    .separator("__")
                    .try_parsing(true),
            );

        // 支持从常用环境变量加载
        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("server.unix_socket_path", std::env::var("UNIX_SOCKET").ok())?
            .set_override_option("server.workers", std::env::var("CPU_COUNT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?;

        let config = builder.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;

        // 处理工作线程数
        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get().min(app_config.server.max_workers);
        }

        app_config.validate()?;

        Ok(app_config)
    }

    /// 校验策略常量之间的约束
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.review.max_score < 1 {
            return Err(ConfigError::Message(format!(
                "review.max_score must be at least 1, got {}",
                self.review.max_score
            )));
        }
        if self.review.flagged_cutoff < 1 || self.review.flagged_cutoff > self.review.max_score {
            return Err(ConfigError::Message(format!(
                "review.flagged_cutoff must be within 1..={}, got {}",
                self.review.max_score, self.review.flagged_cutoff
            )));
        }
        let min_similarity = self.graph.default_min_similarity;
        if !min_similarity.is_finite() || min_similarity < 0.0 {
            return Err(ConfigError::Message(format!(
                "graph.default_min_similarity must be a non-negative number, got {min_similarity}"
            )));
        }
        if self.cache.graph.build_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "cache.graph.build_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// 获取全局配置实例
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 初始化配置 (在应用启动时调用)
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// 获取服务器绑定地址
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 获取 Unix 套接字路径 (如果配置了)
    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        if self.server.unix_socket_path.is_empty() {
            None
        } else {
            Some(&self.server.unix_socket_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load_without_files() {
        let config = AppConfig::load().expect("defaults should deserialize");
        assert_eq!(config.review.max_score, 10);
        assert_eq!(config.review.flagged_cutoff, 5);
        assert!(config.server.workers >= 1);
        assert_eq!(config.graph.default_min_similarity, DEFAULT_MIN_SIMILARITY);
    }

    #[test]
    fn test_validate_rejects_cutoff_above_scale() {
        let mut config = AppConfig::load().expect("defaults should deserialize");
        config.review.flagged_cutoff = config.review.max_score + 1;
        assert!(config.validate().is_err());

        config.review.flagged_cutoff = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_default_similarity() {
        let mut config = AppConfig::load().expect("defaults should deserialize");
        config.graph.default_min_similarity = -0.1;
        assert!(config.validate().is_err());
    }
}
