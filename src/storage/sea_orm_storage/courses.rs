use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::academic_sessions::{Column as SessionColumn, Entity as AcademicSessions};
use crate::entity::branches::{Column as BranchColumn, Entity as Branches};
use crate::entity::class_courses::{
    ActiveModel as ClassCourseActiveModel, Column as ClassCourseColumn, Entity as ClassCourses,
};
use crate::entity::courses::{ActiveModel, Column, Entity as Courses, Model as CourseModel};
use crate::entity::student_classes::{Column as StudentClassColumn, Entity as StudentClasses};
use crate::entity::students::{Column as StudentColumn, Entity as Students};
use crate::entity::teacher_courses::{
    ActiveModel as TeacherCourseActiveModel, Column as TeacherCourseColumn,
    Entity as TeacherCourses,
};
use crate::errors::{PortalError, Result};
use crate::models::{
    courses::{
        entities::{Course, TeacherCourse},
        requests::{CourseAssignment, CreateCourseRequest},
    },
    students::entities::{EnrollmentStatus, Student},
};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    pub async fn list_courses_impl(&self, branch_id: i64) -> Result<Vec<Course>> {
        let courses = Courses::find()
            .filter(Column::BranchId.eq(branch_id))
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询课程列表失败: {e}")))?;

        Ok(courses.into_iter().map(|m| m.into_course()).collect())
    }

    pub async fn get_course_by_id_impl(&self, id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    pub async fn create_course_impl(
        &self,
        branch_id: i64,
        req: CreateCourseRequest,
    ) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            name: Set(req.name),
            branch_id: Set(branch_id),
            session_id: Set(req.session_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("创建课程失败: {e}")))?;

        Ok(result.into_course())
    }

    pub async fn delete_course_impl(&self, id: i64) -> Result<bool> {
        let result = Courses::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("删除课程失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 分配课程到 (班级, 教师)，已存在的关联保持不变
    pub async fn assign_course_impl(
        &self,
        course_id: i64,
        assignments: &[CourseAssignment],
    ) -> Result<()> {
        if assignments.is_empty() {
            return Ok(());
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PortalError::database_operation(format!("开启事务失败: {e}")))?;

        let class_links = assignments.iter().map(|a| ClassCourseActiveModel {
            class_id: Set(a.class_id),
            course_id: Set(course_id),
            ..Default::default()
        });
        ClassCourses::insert_many(class_links)
            .on_conflict(
                OnConflict::columns([ClassCourseColumn::ClassId, ClassCourseColumn::CourseId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(|e| PortalError::database_operation(format!("分配班级课程失败: {e}")))?;

        let teacher_links = assignments.iter().map(|a| TeacherCourseActiveModel {
            teacher_id: Set(a.teacher_id),
            course_id: Set(course_id),
            ..Default::default()
        });
        TeacherCourses::insert_many(teacher_links)
            .on_conflict(
                OnConflict::columns([
                    TeacherCourseColumn::TeacherId,
                    TeacherCourseColumn::CourseId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(|e| PortalError::database_operation(format!("分配教师课程失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| PortalError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(())
    }

    /// 附加学年与分校名称
    async fn attach_course_names(&self, courses: Vec<CourseModel>) -> Result<Vec<TeacherCourse>> {
        let session_ids: Vec<i64> = courses.iter().map(|c| c.session_id).collect();
        let branch_ids: Vec<i64> = courses.iter().map(|c| c.branch_id).collect();

        let session_names: HashMap<i64, String> = AcademicSessions::find()
            .filter(SessionColumn::Id.is_in(session_ids))
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询学年失败: {e}")))?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();

        let branch_names: HashMap<i64, String> = Branches::find()
            .filter(BranchColumn::Id.is_in(branch_ids))
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询分校失败: {e}")))?
            .into_iter()
            .map(|b| (b.id, b.name))
            .collect();

        Ok(courses
            .into_iter()
            .map(|c| TeacherCourse {
                id: c.id,
                session_name: session_names.get(&c.session_id).cloned(),
                branch_name: branch_names.get(&c.branch_id).cloned(),
                name: c.name,
                session_id: c.session_id,
                branch_id: c.branch_id,
            })
            .collect())
    }

    async fn find_teacher_course_models(
        &self,
        teacher_id: i64,
        course_id: Option<i64>,
    ) -> Result<Vec<CourseModel>> {
        let mut links = TeacherCourses::find()
            .select_only()
            .column(TeacherCourseColumn::CourseId)
            .filter(TeacherCourseColumn::TeacherId.eq(teacher_id));
        if let Some(course_id) = course_id {
            links = links.filter(TeacherCourseColumn::CourseId.eq(course_id));
        }

        let course_ids: Vec<i64> = links
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询教师课程失败: {e}")))?;

        if course_ids.is_empty() {
            return Ok(Vec::new());
        }

        Courses::find()
            .filter(Column::Id.is_in(course_ids))
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询课程失败: {e}")))
    }

    pub async fn list_teacher_courses_impl(&self, teacher_id: i64) -> Result<Vec<TeacherCourse>> {
        let courses = self.find_teacher_course_models(teacher_id, None).await?;
        self.attach_course_names(courses).await
    }

    pub async fn get_teacher_course_impl(
        &self,
        teacher_id: i64,
        course_id: i64,
    ) -> Result<Option<TeacherCourse>> {
        let courses = self
            .find_teacher_course_models(teacher_id, Some(course_id))
            .await?;
        Ok(self.attach_course_names(courses).await?.into_iter().next())
    }

    /// 在分配了该课程的班级中在读的学生
    pub async fn list_course_students_impl(&self, course_id: i64) -> Result<Vec<Student>> {
        let class_ids: Vec<i64> = ClassCourses::find()
            .select_only()
            .column(ClassCourseColumn::ClassId)
            .filter(ClassCourseColumn::CourseId.eq(course_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询课程班级失败: {e}")))?;

        if class_ids.is_empty() {
            return Ok(Vec::new());
        }

        let student_ids: Vec<i64> = StudentClasses::find()
            .select_only()
            .column(StudentClassColumn::StudentId)
            .filter(StudentClassColumn::ClassId.is_in(class_ids))
            .filter(StudentClassColumn::Status.eq(EnrollmentStatus::Active.as_str()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询课程学生失败: {e}")))?;

        if student_ids.is_empty() {
            return Ok(Vec::new());
        }

        let students = Students::find()
            .filter(StudentColumn::Id.is_in(student_ids))
            .order_by_asc(StudentColumn::Name)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询学生失败: {e}")))?;

        Ok(students.into_iter().map(|m| m.into_student()).collect())
    }
}
