use super::SeaOrmStorage;
use crate::entity::grades::{ActiveModel, Column, Entity as Grades};
use crate::errors::{PortalError, Result};
use crate::models::grades::{entities::Grade, requests::GradeUpsert};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// INSERT ... ON CONFLICT (exam_id, student_id) DO UPDATE，后写者覆盖
    async fn upsert_grade_on<C: ConnectionTrait>(conn: &C, grade: GradeUpsert) -> Result<Grade> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            exam_id: Set(grade.exam_id),
            student_id: Set(grade.student_id),
            marks_obtained: Set(grade.marks_obtained),
            updated_at: Set(now),
            ..Default::default()
        };

        Grades::insert(model)
            .on_conflict(
                OnConflict::columns([Column::ExamId, Column::StudentId])
                    .update_columns([Column::MarksObtained, Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(|e| PortalError::database_operation(format!("保存成绩失败: {e}")))?;

        let row = Grades::find()
            .filter(Column::ExamId.eq(grade.exam_id))
            .filter(Column::StudentId.eq(grade.student_id))
            .one(conn)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询成绩失败: {e}")))?
            .ok_or_else(|| {
                PortalError::not_found(format!(
                    "成绩不存在: exam={}, student={}",
                    grade.exam_id, grade.student_id
                ))
            })?;

        Ok(row.into_grade())
    }

    pub async fn upsert_grade_impl(&self, grade: GradeUpsert) -> Result<Grade> {
        Self::upsert_grade_on(&self.db, grade).await
    }

    /// 按顺序批量写入，任一失败则整体回滚
    pub async fn upsert_grades_impl(&self, grades: &[GradeUpsert]) -> Result<Vec<Grade>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PortalError::database_operation(format!("开启事务失败: {e}")))?;

        let mut saved = Vec::with_capacity(grades.len());
        for grade in grades {
            saved.push(Self::upsert_grade_on(&txn, *grade).await?);
        }

        txn.commit()
            .await
            .map_err(|e| PortalError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(saved)
    }

    pub async fn list_grades_by_exams_impl(&self, exam_ids: &[i64]) -> Result<Vec<Grade>> {
        if exam_ids.is_empty() {
            return Ok(Vec::new());
        }

        let grades = Grades::find()
            .filter(Column::ExamId.is_in(exam_ids.iter().copied()))
            .order_by_asc(Column::ExamId)
            .order_by_asc(Column::StudentId)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询成绩失败: {e}")))?;

        Ok(grades.into_iter().map(|m| m.into_grade()).collect())
    }

    pub async fn list_grades_for_students_impl(
        &self,
        student_ids: &[i64],
        exam_ids: &[i64],
    ) -> Result<Vec<Grade>> {
        if student_ids.is_empty() || exam_ids.is_empty() {
            return Ok(Vec::new());
        }

        let grades = Grades::find()
            .filter(Column::StudentId.is_in(student_ids.iter().copied()))
            .filter(Column::ExamId.is_in(exam_ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询成绩失败: {e}")))?;

        Ok(grades.into_iter().map(|m| m.into_grade()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        academic_sessions::requests::CreateAcademicSessionRequest,
        branches::requests::CreateBranchRequest,
        classes::requests::CreateClassRequest,
        courses::requests::{CourseAssignment, CreateCourseRequest},
        exams::requests::NewExam,
        students::requests::CreateStudentRequest,
        users::{entities::UserRole, requests::NewUser},
    };
    use crate::storage::Storage;

    struct Fixture {
        storage: SeaOrmStorage,
        branch_id: i64,
        teacher_id: i64,
        class_id: i64,
        course_id: i64,
        exam_id: i64,
        student_id: i64,
    }

    async fn fixture() -> Fixture {
        let storage = SeaOrmStorage::in_memory().await.unwrap();
        let branch = storage
            .create_branch(CreateBranchRequest {
                name: "Central".into(),
                address: None,
            })
            .await
            .unwrap();
        let session = storage
            .create_academic_session(
                branch.id,
                CreateAcademicSessionRequest {
                    name: "2025-2026".into(),
                    start_date: Some("2025-09-01".into()),
                    end_date: Some("2026-06-30".into()),
                },
            )
            .await
            .unwrap();
        let teacher = storage
            .create_user(NewUser {
                email: "teacher@school.test".into(),
                password_hash: "hash".into(),
                first_name: None,
                last_name: None,
                role: UserRole::Teacher,
                branch_id: Some(branch.id),
            })
            .await
            .unwrap();
        let class = storage
            .create_class(
                branch.id,
                CreateClassRequest {
                    name: "Grade 7".into(),
                    session_id: session.id,
                    class_teacher_id: Some(teacher.id),
                },
            )
            .await
            .unwrap();
        let course = storage
            .create_course(
                branch.id,
                CreateCourseRequest {
                    name: "Mathematics".into(),
                    session_id: session.id,
                },
            )
            .await
            .unwrap();
        let exam = storage
            .create_exam(NewExam {
                course_id: course.id,
                session_id: session.id,
                name: "Midterm".into(),
                max_marks: 100,
                exam_date: Some("2025-11-10".into()),
            })
            .await
            .unwrap();
        let student = storage
            .create_student(
                branch.id,
                CreateStudentRequest {
                    name: "Lin".into(),
                    dob: None,
                    gender: None,
                },
            )
            .await
            .unwrap();

        Fixture {
            storage,
            branch_id: branch.id,
            teacher_id: teacher.id,
            class_id: class.id,
            course_id: course.id,
            exam_id: exam.id,
            student_id: student.id,
        }
    }

    #[actix_web::test]
    async fn test_upsert_twice_keeps_latest_value() {
        let f = fixture().await;
        let first = f
            .storage
            .upsert_grade(GradeUpsert {
                exam_id: f.exam_id,
                student_id: f.student_id,
                marks_obtained: 78,
            })
            .await
            .unwrap();
        let second = f
            .storage
            .upsert_grade(GradeUpsert {
                exam_id: f.exam_id,
                student_id: f.student_id,
                marks_obtained: 82,
            })
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.marks_obtained, 82);

        let rows = f.storage.list_grades_by_exams(&[f.exam_id]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].marks_obtained, 82);
    }

    #[actix_web::test]
    async fn test_marks_above_max_are_stored() {
        let f = fixture().await;
        let grade = f
            .storage
            .upsert_grade(GradeUpsert {
                exam_id: f.exam_id,
                student_id: f.student_id,
                marks_obtained: 150,
            })
            .await
            .unwrap();
        assert_eq!(grade.marks_obtained, 150);
    }

    #[actix_web::test]
    async fn test_upsert_missing_exam_is_fk_error() {
        let f = fixture().await;
        let err = f
            .storage
            .upsert_grade(GradeUpsert {
                exam_id: 9999,
                student_id: f.student_id,
                marks_obtained: 50,
            })
            .await
            .unwrap_err();
        assert!(err.is_foreign_key_violation(), "{err}");
    }

    #[actix_web::test]
    async fn test_batch_rolls_back_on_failure() {
        let f = fixture().await;
        let result = f
            .storage
            .upsert_grades(&[
                GradeUpsert {
                    exam_id: f.exam_id,
                    student_id: f.student_id,
                    marks_obtained: 60,
                },
                GradeUpsert {
                    exam_id: 9999,
                    student_id: f.student_id,
                    marks_obtained: 70,
                },
            ])
            .await;
        assert!(result.is_err());
        assert!(f
            .storage
            .list_grades_by_exams(&[f.exam_id])
            .await
            .unwrap()
            .is_empty());
    }

    #[actix_web::test]
    async fn test_assignment_is_idempotent_and_feeds_gradebook() {
        let f = fixture().await;
        let assignment = [CourseAssignment {
            class_id: f.class_id,
            teacher_id: f.teacher_id,
        }];
        f.storage.assign_course(f.course_id, &assignment).await.unwrap();
        f.storage.assign_course(f.course_id, &assignment).await.unwrap();

        let courses = f.storage.list_teacher_courses(f.teacher_id).await.unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].session_name.as_deref(), Some("2025-2026"));
        assert_eq!(courses[0].branch_name.as_deref(), Some("Central"));

        assert!(f
            .storage
            .get_teacher_course(f.teacher_id + 100, f.course_id)
            .await
            .unwrap()
            .is_none());

        f.storage
            .enroll_students(f.class_id, &[f.student_id])
            .await
            .unwrap();
        let students = f.storage.list_course_students(f.course_id).await.unwrap();
        assert_eq!(students.len(), 1);

        let class_exams = f.storage.list_class_exams(f.class_id).await.unwrap();
        assert_eq!(class_exams.len(), 1);
        assert_eq!(
            f.storage
                .get_exams_by_ids(f.branch_id, &[f.exam_id])
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(f
            .storage
            .get_exams_by_ids(f.branch_id + 1, &[f.exam_id])
            .await
            .unwrap()
            .is_empty());
    }

    #[actix_web::test]
    async fn test_deleting_teacher_unsets_class_teacher() {
        let f = fixture().await;
        assert!(f.storage.delete_user(f.teacher_id).await.unwrap());
        let class = f.storage.get_class_by_id(f.class_id).await.unwrap().unwrap();
        assert_eq!(class.class_teacher_id, None);
    }
}
