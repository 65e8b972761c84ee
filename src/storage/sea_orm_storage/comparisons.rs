//! 比对存储操作
//!
//! 比对只记录两份提交的 ID，读模型中的学生和练习信息在这里批量查询后拼接。
//! 范围过滤一律通过连接或子查询完成，不绑定 ID 列表，课程规模不受数据库参数个数限制。

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::comparisons::{
    ActiveModel, Column, Entity as Comparisons, Model as ComparisonModel,
};
use crate::entity::exercises::{Column as ExerciseColumn, Entity as Exercises, Model as ExerciseModel};
use crate::entity::students::{Column as StudentColumn, Entity as Students};
use crate::entity::submissions::{
    Column as SubmissionColumn, Entity as Submissions, Model as SubmissionModel,
};
use crate::errors::{RadarError, Result};
use crate::models::comparisons::{
    entities::ComparisonRecord, requests::CreateComparisonRequest,
};
use crate::storage::{sort_by_similarity_desc, sort_by_submission_time};
use sea_orm::sea_query::SelectStatement;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, QueryTrait, Set, SqlErr,
};
use tracing::warn;

/// 拼接读模型所需的练习、提交和学生信息
struct RecordContext {
    /// 练习范围
    scope: Condition,
    exercises: HashMap<i64, ExerciseModel>,
    submissions: HashMap<i64, SubmissionModel>,
    students: HashMap<i64, String>,
}

impl RecordContext {
    fn empty(scope: Condition) -> Self {
        Self {
            scope,
            exercises: HashMap::new(),
            submissions: HashMap::new(),
            students: HashMap::new(),
        }
    }

    /// 范围内全部提交 ID 的子查询
    fn submission_ids(&self) -> SelectStatement {
        submissions_in(self.scope.clone())
            .select_only()
            .column(SubmissionColumn::Id)
            .into_query()
    }

    fn to_record(&self, model: ComparisonModel) -> Option<ComparisonRecord> {
        let sub_a = self.submissions.get(&model.submission_a_id)?;
        let sub_b = self.submissions.get(&model.submission_b_id)?;
        let exercise = self.exercises.get(&sub_a.exercise_id)?;
        let student_a = self.students.get(&sub_a.student_id)?;
        let student_b = self.students.get(&sub_b.student_id)?;

        Some(ComparisonRecord {
            id: model.id,
            exercise_id: exercise.id,
            exercise_key: exercise.key.clone(),
            exercise_name: exercise.name.clone(),
            submission_a: sub_a.id,
            submission_b: sub_b.id,
            student_a: student_a.clone(),
            student_b: student_b.clone(),
            similarity: model.similarity,
            review: model.review,
            submitted_at: chrono::DateTime::<chrono::Utc>::from_timestamp(sub_a.created_at, 0)
                .unwrap_or_default(),
        })
    }

    fn to_records(&self, models: Vec<ComparisonModel>) -> Vec<ComparisonRecord> {
        models
            .into_iter()
            .filter_map(|m| {
                let id = m.id;
                let record = self.to_record(m);
                if record.is_none() {
                    warn!("Comparison {} references missing submissions, skipped", id);
                }
                record
            })
            .collect()
    }
}

fn submissions_in(scope: Condition) -> sea_orm::Select<Submissions> {
    Submissions::find().inner_join(Exercises).filter(scope)
}

fn map_db_err(action: &str) -> impl Fn(DbErr) -> RadarError + '_ {
    move |e| RadarError::store_unavailable(format!("{action}失败: {e}"))
}

impl SeaOrmStorage {
    /// 加载一组练习的提交与学生
    async fn load_context(&self, scope: Condition) -> Result<RecordContext> {
        let exercises = Exercises::find()
            .filter(scope.clone())
            .all(&self.db)
            .await
            .map_err(map_db_err("查询练习"))?;

        if exercises.is_empty() {
            return Ok(RecordContext::empty(scope));
        }

        let submissions = submissions_in(scope.clone())
            .all(&self.db)
            .await
            .map_err(map_db_err("查询提交"))?;

        let student_ids = submissions_in(scope.clone())
            .select_only()
            .column(SubmissionColumn::StudentId)
            .into_query();
        let students = Students::find()
            .filter(StudentColumn::Id.in_subquery(student_ids))
            .all(&self.db)
            .await
            .map_err(map_db_err("查询学生"))?;

        Ok(RecordContext {
            scope,
            exercises: exercises.into_iter().map(|e| (e.id, e)).collect(),
            submissions: submissions.into_iter().map(|s| (s.id, s)).collect(),
            students: students.into_iter().map(|s| (s.id, s.key)).collect(),
        })
    }

    async fn load_course_context(&self, course_id: i64) -> Result<RecordContext> {
        self.load_context(Condition::all().add(ExerciseColumn::CourseId.eq(course_id)))
            .await
    }

    async fn load_exercise_context(&self, exercise_id: i64) -> Result<RecordContext> {
        self.load_context(Condition::all().add(ExerciseColumn::Id.eq(exercise_id)))
            .await
    }

    /// 课程内相似度不低于阈值的比对
    pub async fn list_course_comparisons_impl(
        &self,
        course_id: i64,
        min_similarity: f64,
    ) -> Result<Vec<ComparisonRecord>> {
        let ctx = self.load_course_context(course_id).await?;
        if ctx.submissions.is_empty() {
            return Ok(Vec::new());
        }

        let models = Comparisons::find()
            .filter(Column::SubmissionAId.in_subquery(ctx.submission_ids()))
            .filter(Column::Similarity.gte(min_similarity))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| RadarError::store_unavailable(format!("查询比对失败: {e}")))?;

        Ok(ctx.to_records(models))
    }

    /// 课程内已标记的比对
    pub async fn list_flagged_comparisons_impl(
        &self,
        course_id: i64,
        cutoff: i32,
    ) -> Result<Vec<ComparisonRecord>> {
        let ctx = self.load_course_context(course_id).await?;
        if ctx.submissions.is_empty() {
            return Ok(Vec::new());
        }

        let models = Comparisons::find()
            .filter(Column::SubmissionAId.in_subquery(ctx.submission_ids()))
            .filter(Column::Review.gte(cutoff))
            .all(&self.db)
            .await
            .map_err(|e| RadarError::store_unavailable(format!("查询已标记比对失败: {e}")))?;

        let mut records = ctx.to_records(models);
        sort_by_submission_time(&mut records);
        Ok(records)
    }

    /// 练习内相似度最高的比对
    pub async fn list_exercise_comparisons_impl(
        &self,
        exercise_id: i64,
        limit: u64,
    ) -> Result<Vec<ComparisonRecord>> {
        let ctx = self.load_exercise_context(exercise_id).await?;
        if ctx.submissions.is_empty() {
            return Ok(Vec::new());
        }

        let models = Comparisons::find()
            .filter(Column::SubmissionAId.in_subquery(ctx.submission_ids()))
            .order_by_desc(Column::Similarity)
            .order_by_asc(Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| RadarError::store_unavailable(format!("查询练习比对失败: {e}")))?;

        Ok(ctx.to_records(models))
    }

    /// 练习内涉及某学生的比对
    pub async fn list_student_comparisons_impl(
        &self,
        exercise_id: i64,
        student_key: &str,
    ) -> Result<Vec<ComparisonRecord>> {
        let ctx = self.load_exercise_context(exercise_id).await?;
        let own_submissions: Vec<i64> = ctx
            .submissions
            .values()
            .filter(|s| ctx.students.get(&s.student_id).map(String::as_str) == Some(student_key))
            .map(|s| s.id)
            .collect();
        if own_submissions.is_empty() {
            return Ok(Vec::new());
        }

        let models = Comparisons::find()
            .filter(
                Condition::any()
                    .add(Column::SubmissionAId.is_in(own_submissions.clone()))
                    .add(Column::SubmissionBId.is_in(own_submissions)),
            )
            .all(&self.db)
            .await
            .map_err(|e| RadarError::store_unavailable(format!("查询学生比对失败: {e}")))?;

        let mut records = ctx.to_records(models);
        sort_by_similarity_desc(&mut records);
        Ok(records)
    }

    /// 获取练习内的单个比对
    pub async fn get_comparison_impl(
        &self,
        exercise_id: i64,
        comparison_id: i64,
    ) -> Result<Option<ComparisonRecord>> {
        let model = Comparisons::find_by_id(comparison_id)
            .one(&self.db)
            .await
            .map_err(|e| RadarError::store_unavailable(format!("查询比对失败: {e}")))?;

        let Some(model) = model else {
            return Ok(None);
        };

        let ctx = self.load_exercise_context(exercise_id).await?;
        Ok(ctx.to_record(model))
    }

    /// 持久化审阅评分
    pub async fn update_comparison_review_impl(
        &self,
        comparison_id: i64,
        review: i32,
    ) -> Result<bool> {
        let model = Comparisons::find_by_id(comparison_id)
            .one(&self.db)
            .await
            .map_err(|e| RadarError::store_unavailable(format!("查询比对失败: {e}")))?;

        let Some(model) = model else {
            return Ok(false);
        };

        let mut active: ActiveModel = model.into();
        active.review = Set(review);
        active
            .update(&self.db)
            .await
            .map_err(|e| RadarError::store_unavailable(format!("更新审阅评分失败: {e}")))?;

        Ok(true)
    }

    /// 写入新比对
    pub async fn create_comparison_impl(
        &self,
        exercise_id: i64,
        req: CreateComparisonRequest,
    ) -> Result<ComparisonRecord> {
        let ctx = self.load_exercise_context(exercise_id).await?;
        for submission_id in [req.submission_a, req.submission_b] {
            if !ctx.submissions.contains_key(&submission_id) {
                return Err(RadarError::not_found(format!(
                    "提交 {submission_id} 不属于该练习"
                )));
            }
        }

        let (low, high) = req.ordered_pair().ok_or_else(|| {
            RadarError::invalid_argument(format!("提交 {} 不能与自身比对", req.submission_a))
        })?;
        let conflict = |id: Option<i64>| {
            let existing = id.map(|id| format!(" {id}")).unwrap_or_default();
            RadarError::conflict(format!(
                "提交 {} 与 {} 已存在比对{existing}",
                req.submission_a, req.submission_b
            ))
        };

        // 提交对按升序保存，(low, high) 唯一索引覆盖两种先后顺序
        let existing = Comparisons::find()
            .filter(Column::SubmissionAId.eq(low))
            .filter(Column::SubmissionBId.eq(high))
            .one(&self.db)
            .await
            .map_err(map_db_err("查询比对"))?;
        if let Some(existing) = existing {
            return Err(conflict(Some(existing.id)));
        }

        let model = ActiveModel {
            submission_a_id: Set(low),
            submission_b_id: Set(high),
            similarity: Set(req.similarity),
            review: Set(0),
            ..Default::default()
        };

        // 并发写入同一对时由唯一索引兜底
        let result = model.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => conflict(None),
            _ => RadarError::store_unavailable(format!("创建比对失败: {e}")),
        })?;

        ctx.to_record(result)
            .ok_or_else(|| RadarError::store_unavailable("新建比对无法关联到提交"))
    }

    /// 清空练习的全部比对
    pub async fn clear_exercise_comparisons_impl(&self, exercise_id: i64) -> Result<u64> {
        let ctx = self.load_exercise_context(exercise_id).await?;
        if ctx.submissions.is_empty() {
            return Ok(0);
        }

        let result = Comparisons::delete_many()
            .filter(Column::SubmissionAId.in_subquery(ctx.submission_ids()))
            .exec(&self.db)
            .await
            .map_err(|e| RadarError::store_unavailable(format!("清空比对失败: {e}")))?;

        Ok(result.rows_affected)
    }
}
