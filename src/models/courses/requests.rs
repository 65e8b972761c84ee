use serde::Deserialize;

/// 相似度分布查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistogramQuery {
    /// 区间个数，默认 10
    pub buckets: Option<u32>,
}
