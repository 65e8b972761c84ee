use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub cors: CorsConfig,
    pub review: ReviewConfig,
    pub graph: GraphConfig,
    pub rate_limit: RateLimitConfig,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub system_name: String,
    pub environment: String,
    pub log_level: String,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub unix_socket_path: String,
    pub workers: usize,
    pub max_workers: usize,
    pub timeouts: TimeoutConfig,
    pub limits: LimitConfig,
}

/// 超时配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub client_request: u64,
    pub client_disconnect: u64,
    pub keep_alive: u64,
}

/// 限制配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitConfig {
    pub max_payload_size: usize,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,    // 数据库连接 URL（从 scheme 自动推断类型，memory:// 为内存存储）
    pub pool_size: u32, // 连接池大小
    pub timeout: u64,   // 连接超时 (秒)
}

/// 缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub graph: GraphCacheConfig,
}

/// 匹配图缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphCacheConfig {
    pub max_capacity: u64,    // 最多缓存的图数量
    pub build_timeout_ms: u64, // 等待构建完成的最长时间 (毫秒)
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub max_age: usize,
}

/// 审阅评分配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    pub max_score: i32,       // 评分上限，0 表示未审阅
    pub flagged_cutoff: i32,  // 达到该分数的比对计入嫌疑名单
    pub top_comparisons: u64, // 练习页默认展示的比对数量
}

/// 匹配图配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    pub default_min_similarity: f64,
}

/// 速率限制配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub graph_build_requests: u32,
    pub window_secs: u64,
}
