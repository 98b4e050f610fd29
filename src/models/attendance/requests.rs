use std::collections::HashSet;

use serde::Deserialize;
use ts_rs::TS;

use super::entities::AttendanceStatus;
use crate::utils::validate::validate_iso_date;

#[derive(Debug, Clone, Copy, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceEntry {
    pub student_id: i64,
    pub status: AttendanceStatus,
}

// 按日点名请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct RecordAttendanceRequest {
    pub date: String,
    pub records: Vec<AttendanceEntry>,
}

impl RecordAttendanceRequest {
    /// 日期为 `YYYY-MM-DD`，记录非空，同一学生只出现一次
    pub fn validate(&self) -> Result<(), String> {
        validate_iso_date(&self.date)?;

        if self.records.is_empty() {
            return Err("records must not be empty".to_string());
        }

        let mut seen = HashSet::new();
        for entry in &self.records {
            if entry.student_id <= 0 {
                return Err("student_id must be a positive integer".to_string());
            }
            if !seen.insert(entry.student_id) {
                return Err(format!("Duplicate student_id {}", entry.student_id));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceQuery {
    pub date: Option<String>,
}
