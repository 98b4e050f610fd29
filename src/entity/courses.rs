//! 课程实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub branch_id: i64,
    pub session_id: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::academic_sessions::Entity",
        from = "Column::SessionId",
        to = "super::academic_sessions::Column::Id"
    )]
    AcademicSession,
    #[sea_orm(has_many = "super::teacher_courses::Entity")]
    TeacherCourses,
    #[sea_orm(has_many = "super::class_courses::Entity")]
    ClassCourses,
    #[sea_orm(has_many = "super::exams::Entity")]
    Exams,
}

impl Related<super::academic_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AcademicSession.def()
    }
}

impl Related<super::teacher_courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeacherCourses.def()
    }
}

impl Related<super::class_courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassCourses.def()
    }
}

impl Related<super::exams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exams.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_course(self) -> crate::models::courses::entities::Course {
        crate::models::courses::entities::Course {
            id: self.id,
            name: self.name,
            branch_id: self.branch_id,
            session_id: self.session_id,
            created_at: super::timestamp_to_datetime(self.created_at),
            updated_at: super::timestamp_to_datetime(self.updated_at),
        }
    }
}
