//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。

pub mod prelude;

pub mod academic_sessions;
pub mod attendance_records;
pub mod branches;
pub mod class_courses;
pub mod classes;
pub mod courses;
pub mod exams;
pub mod grades;
pub mod student_classes;
pub mod students;
pub mod teacher_courses;
pub mod users;

/// 秒级时间戳转换为 UTC 时间
pub(crate) fn timestamp_to_datetime(ts: i64) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::<chrono::Utc>::from_timestamp(ts, 0).unwrap_or_default()
}
