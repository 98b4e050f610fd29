use super::SeaOrmStorage;
use crate::entity::class_courses::{Column as ClassCourseColumn, Entity as ClassCourses};
use crate::entity::classes::{ActiveModel, Column, Entity as Classes};
use crate::entity::exams::{Column as ExamColumn, Entity as Exams};
use crate::entity::student_classes::{Column as StudentClassColumn, Entity as StudentClasses};
use crate::entity::students::{Column as StudentColumn, Entity as Students};
use crate::errors::{PortalError, Result};
use crate::models::{
    classes::{entities::Class, requests::CreateClassRequest},
    exams::entities::Exam,
    students::entities::ClassStudent,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 列出分校下的班级，可按学年筛选
    pub async fn list_classes_impl(
        &self,
        branch_id: i64,
        session_id: Option<i64>,
    ) -> Result<Vec<Class>> {
        let mut select = Classes::find().filter(Column::BranchId.eq(branch_id));
        if let Some(session_id) = session_id {
            select = select.filter(Column::SessionId.eq(session_id));
        }

        let classes = select
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询班级列表失败: {e}")))?;

        Ok(classes.into_iter().map(|m| m.into_class()).collect())
    }

    pub async fn get_class_by_id_impl(&self, id: i64) -> Result<Option<Class>> {
        let result = Classes::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.into_class()))
    }

    pub async fn create_class_impl(&self, branch_id: i64, req: CreateClassRequest) -> Result<Class> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            name: Set(req.name),
            branch_id: Set(branch_id),
            session_id: Set(req.session_id),
            class_teacher_id: Set(req.class_teacher_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("创建班级失败: {e}")))?;

        Ok(result.into_class())
    }

    /// 设置或取消班主任
    pub async fn set_class_teacher_impl(
        &self,
        class_id: i64,
        teacher_id: Option<i64>,
    ) -> Result<Option<Class>> {
        if self.get_class_by_id_impl(class_id).await?.is_none() {
            return Ok(None);
        }

        let model = ActiveModel {
            id: Set(class_id),
            class_teacher_id: Set(teacher_id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("更新班主任失败: {e}")))?;

        Ok(Some(result.into_class()))
    }

    pub async fn delete_class_impl(&self, id: i64) -> Result<bool> {
        let result = Classes::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("删除班级失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 班级学生及其在读状态
    pub async fn list_class_students_impl(&self, class_id: i64) -> Result<Vec<ClassStudent>> {
        let rows = StudentClasses::find()
            .filter(StudentClassColumn::ClassId.eq(class_id))
            .find_also_related(Students)
            .order_by_asc(StudentColumn::Name)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询班级学生失败: {e}")))?;

        let ids: Vec<i64> = rows.iter().map(|(enrollment, _)| enrollment.student_id).collect();
        let tallies = self.attendance_tallies_impl(&ids, Some(class_id)).await?;

        Ok(rows
            .into_iter()
            .filter_map(|(enrollment, student)| {
                student.map(|s| ClassStudent {
                    attendance_rate: tallies.get(&s.id).map(|t| t.rate()).unwrap_or(0.0),
                    status: enrollment.into_enrollment().status,
                    student: s.into_student(),
                })
            })
            .collect())
    }

    /// 班级考试：该班级所分配课程的全部考试
    pub async fn list_class_exams_impl(&self, class_id: i64) -> Result<Vec<Exam>> {
        let course_ids: Vec<i64> = ClassCourses::find()
            .select_only()
            .column(ClassCourseColumn::CourseId)
            .filter(ClassCourseColumn::ClassId.eq(class_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询班级课程失败: {e}")))?;

        if course_ids.is_empty() {
            return Ok(Vec::new());
        }

        let exams = Exams::find()
            .filter(ExamColumn::CourseId.is_in(course_ids))
            .order_by_asc(ExamColumn::ExamDate)
            .order_by_asc(ExamColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询班级考试失败: {e}")))?;

        Ok(exams.into_iter().map(|m| m.into_exam()).collect())
    }
}
