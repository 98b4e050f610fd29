use super::entities::StudentListItem;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentListResponse {
    pub items: Vec<StudentListItem>,
    pub pagination: PaginationInfo,
}

// 报名 / 升班影响的学生数
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct EnrollmentResult {
    pub class_id: i64,
    pub affected: i64,
}
