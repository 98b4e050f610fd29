use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::attendance_records::{ActiveModel, Column, Entity as AttendanceRecords};
use crate::entity::class_courses::{Column as ClassCourseColumn, Entity as ClassCourses};
use crate::entity::classes::Entity as Classes;
use crate::entity::teacher_courses::{Column as TeacherCourseColumn, Entity as TeacherCourses};
use crate::errors::{PortalError, Result};
use crate::models::attendance::{
    entities::{AttendanceRecord, AttendanceStatus, AttendanceTally},
    requests::AttendanceEntry,
};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 班主任或任教该班课程的教师
    pub async fn teacher_can_access_class_impl(
        &self,
        teacher_id: i64,
        class_id: i64,
    ) -> Result<bool> {
        let class = Classes::find_by_id(class_id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询班级失败: {e}")))?;

        let Some(class) = class else {
            return Ok(false);
        };
        if class.class_teacher_id == Some(teacher_id) {
            return Ok(true);
        }

        let course_ids: Vec<i64> = ClassCourses::find()
            .select_only()
            .column(ClassCourseColumn::CourseId)
            .filter(ClassCourseColumn::ClassId.eq(class_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询班级课程失败: {e}")))?;

        if course_ids.is_empty() {
            return Ok(false);
        }

        let assigned = TeacherCourses::find()
            .filter(TeacherCourseColumn::TeacherId.eq(teacher_id))
            .filter(TeacherCourseColumn::CourseId.is_in(course_ids))
            .count(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询教师课程失败: {e}")))?;

        Ok(assigned > 0)
    }

    /// 按日点名：INSERT ... ON CONFLICT (student_id, class_id, date) DO UPDATE，单事务
    pub async fn record_attendance_impl(
        &self,
        class_id: i64,
        teacher_id: i64,
        date: &str,
        entries: &[AttendanceEntry],
    ) -> Result<Vec<AttendanceRecord>> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PortalError::database_operation(format!("开启事务失败: {e}")))?;

        let models = entries.iter().map(|entry| ActiveModel {
            class_id: Set(class_id),
            student_id: Set(entry.student_id),
            date: Set(date.to_string()),
            status: Set(entry.status.to_string()),
            teacher_id: Set(Some(teacher_id)),
            updated_at: Set(now),
            ..Default::default()
        });

        AttendanceRecords::insert_many(models)
            .on_conflict(
                OnConflict::columns([Column::StudentId, Column::ClassId, Column::Date])
                    .update_columns([Column::Status, Column::TeacherId, Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(|e| PortalError::database_operation(format!("保存考勤失败: {e}")))?;

        let rows = AttendanceRecords::find()
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::Date.eq(date))
            .filter(Column::StudentId.is_in(entries.iter().map(|e| e.student_id)))
            .order_by_asc(Column::StudentId)
            .all(&txn)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询考勤失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| PortalError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_attendance_record()).collect())
    }

    pub async fn list_class_attendance_impl(
        &self,
        class_id: i64,
        date: Option<&str>,
    ) -> Result<Vec<AttendanceRecord>> {
        let mut select = AttendanceRecords::find().filter(Column::ClassId.eq(class_id));
        if let Some(date) = date {
            select = select.filter(Column::Date.eq(date));
        }

        let rows = select
            .order_by_desc(Column::Date)
            .order_by_asc(Column::StudentId)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询考勤失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_attendance_record()).collect())
    }

    /// 按学生汇总出勤，`class_id` 为 None 时统计全部班级
    pub async fn attendance_tallies_impl(
        &self,
        student_ids: &[i64],
        class_id: Option<i64>,
    ) -> Result<HashMap<i64, AttendanceTally>> {
        let mut tallies = HashMap::new();
        if student_ids.is_empty() {
            return Ok(tallies);
        }

        let mut select = AttendanceRecords::find()
            .select_only()
            .column(Column::StudentId)
            .column(Column::Status)
            .filter(Column::StudentId.is_in(student_ids.iter().copied()));
        if let Some(class_id) = class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }

        let rows: Vec<(i64, String)> = select
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("统计出勤失败: {e}")))?;

        for (student_id, status) in rows {
            let status = status
                .parse::<AttendanceStatus>()
                .unwrap_or(AttendanceStatus::Absent);
            tallies
                .entry(student_id)
                .or_insert_with(AttendanceTally::default)
                .add(status);
        }
        Ok(tallies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        academic_sessions::requests::CreateAcademicSessionRequest,
        branches::requests::CreateBranchRequest,
        classes::requests::CreateClassRequest,
        students::requests::{CreateStudentRequest, StudentListQuery},
        users::{entities::UserRole, requests::NewUser},
    };

    struct Setup {
        storage: SeaOrmStorage,
        branch: i64,
        class_id: i64,
        teacher: i64,
        students: Vec<i64>,
    }

    async fn setup() -> Setup {
        let storage = SeaOrmStorage::in_memory().await.unwrap();
        let branch = storage
            .create_branch_impl(CreateBranchRequest {
                name: "Central".into(),
                address: None,
            })
            .await
            .unwrap()
            .id;
        let session = storage
            .create_academic_session_impl(
                branch,
                CreateAcademicSessionRequest {
                    name: "2025-2026".into(),
                    start_date: None,
                    end_date: None,
                },
            )
            .await
            .unwrap()
            .id;
        let teacher = storage
            .create_user_impl(NewUser {
                email: "class.teacher@school.test".into(),
                password_hash: "x".into(),
                first_name: None,
                last_name: None,
                role: UserRole::Teacher,
                branch_id: Some(branch),
            })
            .await
            .unwrap()
            .id;
        let class_id = storage
            .create_class_impl(
                branch,
                CreateClassRequest {
                    name: "6B".into(),
                    session_id: session,
                    class_teacher_id: Some(teacher),
                },
            )
            .await
            .unwrap()
            .id;
        let mut students = Vec::new();
        for name in ["Asha", "Bilal"] {
            let student = storage
                .create_student_impl(
                    branch,
                    CreateStudentRequest {
                        name: name.into(),
                        dob: None,
                        gender: None,
                    },
                )
                .await
                .unwrap();
            students.push(student.id);
        }
        storage.enroll_students_impl(class_id, &students).await.unwrap();

        Setup {
            storage,
            branch,
            class_id,
            teacher,
            students,
        }
    }

    fn entry(student_id: i64, status: AttendanceStatus) -> AttendanceEntry {
        AttendanceEntry { student_id, status }
    }

    #[actix_web::test]
    async fn test_same_day_is_overwritten() {
        let s = setup().await;
        let (asha, bilal) = (s.students[0], s.students[1]);

        s.storage
            .record_attendance_impl(
                s.class_id,
                s.teacher,
                "2025-09-01",
                &[entry(asha, AttendanceStatus::Absent), entry(bilal, AttendanceStatus::Present)],
            )
            .await
            .unwrap();
        let saved = s
            .storage
            .record_attendance_impl(
                s.class_id,
                s.teacher,
                "2025-09-01",
                &[entry(asha, AttendanceStatus::Present)],
            )
            .await
            .unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].status, AttendanceStatus::Present);

        let day = s
            .storage
            .list_class_attendance_impl(s.class_id, Some("2025-09-01"))
            .await
            .unwrap();
        assert_eq!(day.len(), 2);
        assert!(day.iter().all(|r| r.status == AttendanceStatus::Present));
    }

    #[actix_web::test]
    async fn test_rates_on_student_lists() {
        let s = setup().await;
        let (asha, bilal) = (s.students[0], s.students[1]);

        for (date, status) in [
            ("2025-09-01", AttendanceStatus::Present),
            ("2025-09-02", AttendanceStatus::Absent),
            ("2025-09-03", AttendanceStatus::Present),
            ("2025-09-04", AttendanceStatus::Present),
        ] {
            s.storage
                .record_attendance_impl(s.class_id, s.teacher, date, &[entry(asha, status)])
                .await
                .unwrap();
        }

        let tallies = s.storage.attendance_tallies_impl(&[asha, bilal], None).await.unwrap();
        assert_eq!(tallies[&asha].rate(), 75.0);
        assert!(!tallies.contains_key(&bilal));

        let roster = s.storage.list_class_students_impl(s.class_id).await.unwrap();
        let rate_of = |id: i64| {
            roster
                .iter()
                .find(|c| c.student.id == id)
                .map(|c| c.attendance_rate)
        };
        assert_eq!(rate_of(asha), Some(75.0));
        assert_eq!(rate_of(bilal), Some(0.0));

        let page = s
            .storage
            .list_students_with_pagination_impl(s.branch, StudentListQuery::default())
            .await
            .unwrap();
        let asha_item = page.items.iter().find(|i| i.student.id == asha).unwrap();
        assert_eq!(asha_item.attendance_rate, 75.0);
    }

    #[actix_web::test]
    async fn test_teacher_class_access() {
        let s = setup().await;
        assert!(s.storage.teacher_can_access_class_impl(s.teacher, s.class_id).await.unwrap());
        assert!(!s.storage.teacher_can_access_class_impl(s.teacher + 100, s.class_id).await.unwrap());
        assert!(!s.storage.teacher_can_access_class_impl(s.teacher, s.class_id + 100).await.unwrap());
    }
}
