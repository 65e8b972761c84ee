use serde::Deserialize;

/// 构建匹配图的表单参数
#[derive(Debug, Deserialize)]
pub struct BuildGraphForm {
    #[serde(rename = "minSimilarity", default)]
    pub min_similarity: Option<String>,
}
