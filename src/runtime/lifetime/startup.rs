use crate::cache::GraphCache;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::services::review::ReviewScale;
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub graph_cache: Arc<GraphCache>,
}

/// 准备服务器启动的上下文
/// 包括存储、匹配图缓存和审阅评分配置检查
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let config = AppConfig::get();

    // 评分范围或阈值非法时拒绝启动
    let scale = ReviewScale::from_config(&config.review)?;
    debug!(
        "Review scale 0..={}, flagged cutoff {}",
        scale.max_score, scale.flagged_cutoff
    );

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    let graph_cache = Arc::new(GraphCache::from_config(&config.cache.graph));
    warn!(
        "Graph cache initialized (capacity {}, build timeout {} ms)",
        config.cache.graph.max_capacity, config.cache.graph.build_timeout_ms
    );

    Ok(StartupContext {
        storage,
        graph_cache,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_review_scale_is_accepted() {
        let scale = ReviewScale::from_config(&AppConfig::get().review).unwrap();
        assert!(scale.flagged_cutoff <= scale.max_score);
    }
}
