use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 学年，例如 "2025-2026"
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/academic_session.ts")]
pub struct AcademicSession {
    pub id: i64,
    pub name: String,
    pub branch_id: i64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}
