//! SeaORM 存储实现
//!
//! 比对存储的数据库实现，支持 SQLite、PostgreSQL 和 MySQL。

mod comparisons;
mod courses;

use crate::config::AppConfig;
use crate::errors::{RadarError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| RadarError::store_unavailable(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| RadarError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| RadarError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| RadarError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(RadarError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, memory://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    comparisons::{entities::ComparisonRecord, requests::CreateComparisonRequest},
    courses::entities::{Course, Exercise},
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 课程模块
    async fn list_courses(&self) -> Result<Vec<Course>> {
        self.list_courses_impl().await
    }

    async fn get_course_by_key(&self, course_key: &str) -> Result<Option<Course>> {
        self.get_course_by_key_impl(course_key).await
    }

    // 练习模块
    async fn list_course_exercises(&self, course_id: i64) -> Result<Vec<Exercise>> {
        self.list_course_exercises_impl(course_id).await
    }

    async fn get_exercise_by_key(
        &self,
        course_id: i64,
        exercise_key: &str,
    ) -> Result<Option<Exercise>> {
        self.get_exercise_by_key_impl(course_id, exercise_key).await
    }

    // 比对模块
    async fn list_course_comparisons(
        &self,
        course_id: i64,
        min_similarity: f64,
    ) -> Result<Vec<ComparisonRecord>> {
        self.list_course_comparisons_impl(course_id, min_similarity)
            .await
    }

    async fn list_flagged_comparisons(
        &self,
        course_id: i64,
        cutoff: i32,
    ) -> Result<Vec<ComparisonRecord>> {
        self.list_flagged_comparisons_impl(course_id, cutoff).await
    }

    async fn list_exercise_comparisons(
        &self,
        exercise_id: i64,
        limit: u64,
    ) -> Result<Vec<ComparisonRecord>> {
        self.list_exercise_comparisons_impl(exercise_id, limit)
            .await
    }

    async fn list_student_comparisons(
        &self,
        exercise_id: i64,
        student_key: &str,
    ) -> Result<Vec<ComparisonRecord>> {
        self.list_student_comparisons_impl(exercise_id, student_key)
            .await
    }

    async fn get_comparison(
        &self,
        exercise_id: i64,
        comparison_id: i64,
    ) -> Result<Option<ComparisonRecord>> {
        self.get_comparison_impl(exercise_id, comparison_id).await
    }

    async fn update_comparison_review(&self, comparison_id: i64, review: i32) -> Result<bool> {
        self.update_comparison_review_impl(comparison_id, review)
            .await
    }

    async fn create_comparison(
        &self,
        exercise_id: i64,
        req: CreateComparisonRequest,
    ) -> Result<ComparisonRecord> {
        self.create_comparison_impl(exercise_id, req).await
    }

    async fn clear_exercise_comparisons(&self, exercise_id: i64) -> Result<u64> {
        self.clear_exercise_comparisons_impl(exercise_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("radar.db").unwrap(),
            "sqlite://radar.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://radar@localhost/radar").unwrap(),
            "postgres://radar@localhost/radar"
        );
        assert!(SeaOrmStorage::build_database_url("ftp://nowhere").is_err());
    }
}
