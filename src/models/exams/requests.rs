use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::numeric::deserialize_optional_i64;
use crate::utils::validate::validate_iso_date;

// 创建考试请求，字段缺失由服务层统一返回 400
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/exam.ts")]
pub struct CreateExamRequest {
    #[serde(default, alias = "course_id", deserialize_with = "deserialize_optional_i64")]
    pub course_id: Option<i64>,
    #[serde(default, alias = "session_id", deserialize_with = "deserialize_optional_i64")]
    pub session_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "max_marks", deserialize_with = "deserialize_optional_i64")]
    pub max_marks: Option<i64>,
    #[serde(default, alias = "exam_date")]
    pub exam_date: Option<String>,
}

/// 校验通过的考试输入
#[derive(Debug, Clone, PartialEq)]
pub struct NewExam {
    pub course_id: i64,
    pub session_id: i64,
    pub name: String,
    pub max_marks: i32,
    pub exam_date: Option<String>,
}

impl CreateExamRequest {
    pub fn validate(self) -> Result<NewExam, String> {
        let name = self.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        let (Some(course_id), Some(session_id), Some(name), Some(max_marks)) =
            (self.course_id, self.session_id, name, self.max_marks)
        else {
            return Err("Missing required fields: courseId, sessionId, name, maxMarks".to_string());
        };

        if course_id <= 0 || session_id <= 0 {
            return Err("courseId and sessionId must be positive integers".to_string());
        }
        let max_marks = i32::try_from(max_marks)
            .ok()
            .filter(|m| *m > 0)
            .ok_or_else(|| "maxMarks must be a positive integer".to_string())?;

        let exam_date = match self.exam_date.map(|d| d.trim().to_string()) {
            Some(d) if d.is_empty() => None,
            Some(d) => {
                validate_iso_date(&d)?;
                Some(d)
            }
            None => None,
        };

        Ok(NewExam {
            course_id,
            session_id,
            name,
            max_marks,
            exam_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> CreateExamRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_valid_exam_camel_case() {
        let exam = parse(
            r#"{"courseId": 3, "sessionId": "1", "name": " Midterm ", "maxMarks": 100, "examDate": "2025-10-01"}"#,
        )
        .validate()
        .unwrap();
        assert_eq!(
            exam,
            NewExam {
                course_id: 3,
                session_id: 1,
                name: "Midterm".into(),
                max_marks: 100,
                exam_date: Some("2025-10-01".into()),
            }
        );
    }

    #[test]
    fn test_missing_fields() {
        assert!(parse(r#"{"courseId": 3, "sessionId": 1, "name": "Final"}"#)
            .validate()
            .unwrap_err()
            .contains("Missing"));
        assert!(parse(r#"{"courseId": 3, "sessionId": 1, "name": "  ", "maxMarks": 10}"#)
            .validate()
            .is_err());
    }

    #[test]
    fn test_invalid_values() {
        assert!(parse(r#"{"courseId": 3, "sessionId": 1, "name": "Q", "maxMarks": 0}"#)
            .validate()
            .is_err());
        assert!(parse(r#"{"courseId": 0, "sessionId": 1, "name": "Q", "maxMarks": 5}"#)
            .validate()
            .is_err());
        assert!(
            parse(r#"{"courseId": 1, "sessionId": 1, "name": "Q", "maxMarks": 5, "examDate": "01/10/2025"}"#)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_snake_case_aliases() {
        let exam = parse(r#"{"course_id": 2, "session_id": 4, "name": "Quiz", "max_marks": 20}"#)
            .validate()
            .unwrap();
        assert_eq!(exam.course_id, 2);
        assert_eq!(exam.max_marks, 20);
        assert_eq!(exam.exam_date, None);
    }
}
