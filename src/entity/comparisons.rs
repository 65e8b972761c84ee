//! 比对实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "comparisons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub submission_a_id: i64,
    pub submission_b_id: i64,
    #[sea_orm(column_type = "Double")]
    pub similarity: f64,
    pub review: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::submissions::Entity",
        from = "Column::SubmissionAId",
        to = "super::submissions::Column::Id"
    )]
    SubmissionA,
    #[sea_orm(
        belongs_to = "super::submissions::Entity",
        from = "Column::SubmissionBId",
        to = "super::submissions::Column::Id"
    )]
    SubmissionB,
}

impl ActiveModelBehavior for ActiveModel {}
