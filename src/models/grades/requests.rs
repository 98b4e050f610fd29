use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::numeric::deserialize_optional_i64;

// 录入成绩请求；数字字段也接受数字字符串
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct UpsertGradeRequest {
    #[serde(default, alias = "exam_id", deserialize_with = "deserialize_optional_i64")]
    pub exam_id: Option<i64>,
    #[serde(default, alias = "student_id", deserialize_with = "deserialize_optional_i64")]
    pub student_id: Option<i64>,
    #[serde(
        default,
        alias = "marks_obtained",
        deserialize_with = "deserialize_optional_i64"
    )]
    pub marks_obtained: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct BatchUpsertGradesRequest {
    pub grades: Vec<UpsertGradeRequest>,
}

/// 校验通过的成绩写入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeUpsert {
    pub exam_id: i64,
    pub student_id: i64,
    pub marks_obtained: i32,
}

impl UpsertGradeRequest {
    pub fn validate(&self) -> Result<GradeUpsert, String> {
        let (Some(exam_id), Some(student_id), Some(marks)) =
            (self.exam_id, self.student_id, self.marks_obtained)
        else {
            return Err("Missing required fields: examId, studentId, marksObtained".to_string());
        };

        if exam_id <= 0 || student_id <= 0 {
            return Err("examId and studentId must be positive integers".to_string());
        }

        // 不与考试满分比较
        let marks_obtained = i32::try_from(marks)
            .ok()
            .filter(|m| *m >= 0)
            .ok_or_else(|| "marksObtained must be a non-negative integer".to_string())?;

        Ok(GradeUpsert {
            exam_id,
            student_id,
            marks_obtained,
        })
    }
}

impl BatchUpsertGradesRequest {
    /// 任一条目非法则整体拒绝
    pub fn validate(&self) -> Result<Vec<GradeUpsert>, String> {
        if self.grades.is_empty() {
            return Err("grades must not be empty".to_string());
        }
        self.grades
            .iter()
            .enumerate()
            .map(|(i, g)| g.validate().map_err(|e| format!("grades[{i}]: {e}")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> UpsertGradeRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_valid_upsert() {
        let g = parse(r#"{"examId": 1, "studentId": 5, "marksObtained": 78}"#)
            .validate()
            .unwrap();
        assert_eq!(
            g,
            GradeUpsert {
                exam_id: 1,
                student_id: 5,
                marks_obtained: 78
            }
        );
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let g = parse(r#"{"examId": "1", "studentId": "5", "marksObtained": "82"}"#)
            .validate()
            .unwrap();
        assert_eq!(g.marks_obtained, 82);
    }

    #[test]
    fn test_zero_marks_allowed() {
        let g = parse(r#"{"examId": 1, "studentId": 5, "marksObtained": 0}"#)
            .validate()
            .unwrap();
        assert_eq!(g.marks_obtained, 0);
    }

    #[test]
    fn test_each_missing_field_rejected() {
        for json in [
            r#"{"studentId": 5, "marksObtained": 78}"#,
            r#"{"examId": 1, "marksObtained": 78}"#,
            r#"{"examId": 1, "studentId": 5}"#,
            r#"{"examId": null, "studentId": 5, "marksObtained": 78}"#,
        ] {
            let err = parse(json).validate().unwrap_err();
            assert!(err.starts_with("Missing required fields"), "{json}: {err}");
        }
    }

    #[test]
    fn test_out_of_range_values() {
        assert!(parse(r#"{"examId": 0, "studentId": 5, "marksObtained": 1}"#)
            .validate()
            .is_err());
        assert!(parse(r#"{"examId": 1, "studentId": -5, "marksObtained": 1}"#)
            .validate()
            .is_err());
        assert!(parse(r#"{"examId": 1, "studentId": 5, "marksObtained": -1}"#)
            .validate()
            .is_err());
        // 超过满分不在此处校验
        assert!(parse(r#"{"examId": 1, "studentId": 5, "marksObtained": 1000}"#)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_batch_rejects_whole_batch() {
        let batch: BatchUpsertGradesRequest = serde_json::from_str(
            r#"{"grades": [
                {"examId": 1, "studentId": 5, "marksObtained": 78},
                {"examId": 1, "studentId": 6}
            ]}"#,
        )
        .unwrap();
        let err = batch.validate().unwrap_err();
        assert!(err.starts_with("grades[1]"));

        let empty: BatchUpsertGradesRequest = serde_json::from_str(r#"{"grades": []}"#).unwrap();
        assert!(empty.validate().is_err());
    }
}
