//! 课程与练习存储操作

use super::SeaOrmStorage;
use crate::entity::courses::{Column as CourseColumn, Entity as Courses};
use crate::entity::exercises::{Column as ExerciseColumn, Entity as Exercises};
use crate::errors::{RadarError, Result};
use crate::models::courses::entities::{Course, Exercise};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

impl SeaOrmStorage {
    /// 列出全部课程
    pub async fn list_courses_impl(&self) -> Result<Vec<Course>> {
        let results = Courses::find()
            .order_by_asc(CourseColumn::Key)
            .all(&self.db)
            .await
            .map_err(|e| RadarError::store_unavailable(format!("查询课程列表失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_course()).collect())
    }

    /// 通过课程标识获取课程
    pub async fn get_course_by_key_impl(&self, course_key: &str) -> Result<Option<Course>> {
        let result = Courses::find()
            .filter(CourseColumn::Key.eq(course_key))
            .one(&self.db)
            .await
            .map_err(|e| RadarError::store_unavailable(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 列出课程下的练习
    pub async fn list_course_exercises_impl(&self, course_id: i64) -> Result<Vec<Exercise>> {
        let results = Exercises::find()
            .filter(ExerciseColumn::CourseId.eq(course_id))
            .order_by_asc(ExerciseColumn::Key)
            .all(&self.db)
            .await
            .map_err(|e| RadarError::store_unavailable(format!("查询练习列表失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_exercise()).collect())
    }

    /// 通过练习标识获取练习
    pub async fn get_exercise_by_key_impl(
        &self,
        course_id: i64,
        exercise_key: &str,
    ) -> Result<Option<Exercise>> {
        let result = Exercises::find()
            .filter(ExerciseColumn::CourseId.eq(course_id))
            .filter(ExerciseColumn::Key.eq(exercise_key))
            .one(&self.db)
            .await
            .map_err(|e| RadarError::store_unavailable(format!("查询练习失败: {e}")))?;

        Ok(result.map(|m| m.into_exercise()))
    }
}
