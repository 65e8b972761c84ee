use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    // 唯一 ID
    pub id: i64,
    // 课程标识，用于路由
    pub key: String,
    // 课程名称
    pub name: String,
    // 数据提供方（如 aplus），由外部集成使用
    pub provider: Option<String>,
    // 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub course_id: i64,
    pub key: String,
    pub name: String,
    // 相似度引擎的分词器，本服务只透传
    pub tokenizer: String,
    // 相似度引擎的最小匹配 token 数，本服务只透传
    pub minimum_match_tokens: i32,
    // 是否暂停比对
    pub paused: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
