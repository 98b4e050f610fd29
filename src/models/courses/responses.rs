use serde::Serialize;
use ts_rs::TS;

use super::entities::TeacherCourse;
use crate::models::exams::entities::Exam;
use crate::models::grades::entities::Grade;
use crate::models::students::entities::Student;

// 成绩册：选修该课程的学生、课程考试、以及这些考试的全部成绩
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct GradebookResponse {
    pub course: TeacherCourse,
    pub students: Vec<Student>,
    pub exams: Vec<Exam>,
    pub grades: Vec<Grade>,
}
