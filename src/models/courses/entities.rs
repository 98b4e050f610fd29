use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub branch_id: i64,
    pub session_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 教师视角的课程（附带学年和分校名称）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct TeacherCourse {
    pub id: i64,
    pub name: String,
    pub session_id: i64,
    pub session_name: Option<String>,
    pub branch_id: i64,
    pub branch_name: Option<String>,
}
