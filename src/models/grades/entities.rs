use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 成绩：(exam_id, student_id) 唯一
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct Grade {
    pub id: i64,
    pub exam_id: i64,
    pub student_id: i64,
    pub marks_obtained: i32,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
