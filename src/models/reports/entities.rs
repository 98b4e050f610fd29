use serde::Serialize;
use ts_rs::TS;

use crate::models::exams::entities::Exam;
use crate::models::grades::entities::Grade;
use crate::models::students::entities::Student;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct ReportRow {
    pub exam_id: i64,
    pub exam: String,
    pub max_marks: i32,
    pub marks_obtained: Option<i32>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct StudentReport {
    pub student: Student,
    pub rows: Vec<ReportRow>,
    pub total_obtained: i64,
    pub total_max: i64,
    pub percentage: f64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct ReportResponse {
    pub items: Vec<StudentReport>,
}

impl StudentReport {
    /// 汇总一名学生在所选考试上的成绩，缺考不计入得分但计入满分
    pub fn build(student: Student, exams: &[Exam], grades: &[Grade]) -> Self {
        let rows: Vec<ReportRow> = exams
            .iter()
            .map(|exam| ReportRow {
                exam_id: exam.id,
                exam: exam.name.clone(),
                max_marks: exam.max_marks,
                marks_obtained: grades
                    .iter()
                    .find(|g| g.exam_id == exam.id && g.student_id == student.id)
                    .map(|g| g.marks_obtained),
            })
            .collect();

        let total_obtained: i64 = rows
            .iter()
            .filter_map(|r| r.marks_obtained)
            .map(i64::from)
            .sum();
        let total_max: i64 = rows.iter().map(|r| i64::from(r.max_marks)).sum();
        let percentage = if total_max > 0 {
            ((total_obtained as f64 / total_max as f64) * 10000.0).round() / 100.0
        } else {
            0.0
        };

        Self {
            student,
            rows,
            total_obtained,
            total_max,
            percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exam(id: i64, max: i32) -> Exam {
        Exam {
            id,
            course_id: 1,
            session_id: 1,
            name: format!("Exam {id}"),
            max_marks: max,
            exam_date: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn grade(exam_id: i64, student_id: i64, marks: i32) -> Grade {
        Grade {
            id: exam_id * 100 + student_id,
            exam_id,
            student_id,
            marks_obtained: marks,
            updated_at: chrono::Utc::now(),
        }
    }

    fn student(id: i64) -> Student {
        Student {
            id,
            name: format!("Student {id}"),
            dob: None,
            gender: None,
            branch_id: 1,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_report_totals_and_percentage() {
        let exams = vec![exam(1, 100), exam(2, 50), exam(3, 50)];
        let grades = vec![grade(1, 5, 82), grade(2, 5, 40), grade(1, 6, 10)];

        let report = StudentReport::build(student(5), &exams, &grades);
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[2].marks_obtained, None);
        assert_eq!(report.total_obtained, 122);
        assert_eq!(report.total_max, 200);
        assert_eq!(report.percentage, 61.0);
    }

    #[test]
    fn test_report_without_exams() {
        let report = StudentReport::build(student(5), &[], &[]);
        assert_eq!(report.total_max, 0);
        assert_eq!(report.percentage, 0.0);
    }
}
