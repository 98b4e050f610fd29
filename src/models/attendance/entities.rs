use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
        }
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            _ => Err(format!("Invalid attendance status: {s}")),
        }
    }
}

// 考勤记录：(student_id, class_id, date) 唯一
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceRecord {
    pub id: i64,
    pub class_id: i64,
    pub student_id: i64,
    pub date: String,
    pub status: AttendanceStatus,
    pub teacher_id: Option<i64>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 单个学生的出勤计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceTally {
    pub present: u64,
    pub total: u64,
}

impl AttendanceTally {
    pub fn add(&mut self, status: AttendanceStatus) {
        self.total += 1;
        if status == AttendanceStatus::Present {
            self.present += 1;
        }
    }

    /// 出勤率百分比，保留两位小数；没有记录时为 0
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        ((self.present as f64 / self.total as f64) * 10000.0).round() / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_rate() {
        let mut tally = AttendanceTally::default();
        assert_eq!(tally.rate(), 0.0);

        tally.add(AttendanceStatus::Present);
        tally.add(AttendanceStatus::Present);
        tally.add(AttendanceStatus::Absent);
        assert_eq!(tally, AttendanceTally { present: 2, total: 3 });
        assert_eq!(tally.rate(), 66.67);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("present".parse::<AttendanceStatus>(), Ok(AttendanceStatus::Present));
        assert!("late".parse::<AttendanceStatus>().is_err());
    }
}
