use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::{
    comparisons::{entities::ComparisonRecord, requests::CreateComparisonRequest},
    courses::entities::{Course, Exercise},
};

pub mod memory;
pub mod sea_orm_storage;

/// 比对存储
///
/// 核心算法只通过该 trait 读取比对数据，唯一的业务写操作是持久化审阅评分；
/// 新增和清空比对供相似度引擎的回调使用。
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 课程管理方法
    // 列出全部课程
    async fn list_courses(&self) -> Result<Vec<Course>>;
    // 通过课程标识获取课程
    async fn get_course_by_key(&self, course_key: &str) -> Result<Option<Course>>;

    /// 练习管理方法
    // 列出课程下的练习
    async fn list_course_exercises(&self, course_id: i64) -> Result<Vec<Exercise>>;
    // 通过练习标识获取练习
    async fn get_exercise_by_key(
        &self,
        course_id: i64,
        exercise_key: &str,
    ) -> Result<Option<Exercise>>;

    /// 比对查询方法
    // 课程内相似度不低于阈值的全部比对
    async fn list_course_comparisons(
        &self,
        course_id: i64,
        min_similarity: f64,
    ) -> Result<Vec<ComparisonRecord>>;
    // 课程内审阅评分不低于 cutoff 的比对，按主提交创建时间、比对 ID 升序
    async fn list_flagged_comparisons(
        &self,
        course_id: i64,
        cutoff: i32,
    ) -> Result<Vec<ComparisonRecord>>;
    // 练习内相似度最高的比对
    async fn list_exercise_comparisons(
        &self,
        exercise_id: i64,
        limit: u64,
    ) -> Result<Vec<ComparisonRecord>>;
    // 练习内涉及某学生的比对
    async fn list_student_comparisons(
        &self,
        exercise_id: i64,
        student_key: &str,
    ) -> Result<Vec<ComparisonRecord>>;
    // 获取练习内的单个比对
    async fn get_comparison(
        &self,
        exercise_id: i64,
        comparison_id: i64,
    ) -> Result<Option<ComparisonRecord>>;

    /// 比对写入方法
    // 持久化审阅评分，比对不存在时返回 false
    async fn update_comparison_review(&self, comparison_id: i64, review: i32) -> Result<bool>;
    // 写入新比对，同一对提交只允许一条
    async fn create_comparison(
        &self,
        exercise_id: i64,
        req: CreateComparisonRequest,
    ) -> Result<ComparisonRecord>;
    // 清空练习的全部比对，返回删除数量
    async fn clear_exercise_comparisons(&self, exercise_id: i64) -> Result<u64>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let config = AppConfig::get();
    if config.database.url.starts_with(memory::MEMORY_URL_SCHEME) {
        tracing::warn!("Using in-memory comparison store, data is lost on restart");
        return Ok(Arc::new(memory::MemoryStorage::new()));
    }
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}

/// 按主提交创建时间、比对 ID 排序
pub(crate) fn sort_by_submission_time(records: &mut [ComparisonRecord]) {
    records.sort_by(|a, b| {
        a.submitted_at
            .cmp(&b.submitted_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// 按相似度降序、比对 ID 升序排序
pub(crate) fn sort_by_similarity_desc(records: &mut [ComparisonRecord]) {
    records.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.id.cmp(&b.id))
    });
}
