use super::SeaOrmStorage;
use crate::entity::courses::{Column as CourseColumn, Entity as Courses};
use crate::entity::exams::{ActiveModel, Column, Entity as Exams};
use crate::errors::{PortalError, Result};
use crate::models::exams::{entities::Exam, requests::NewExam};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 创建考试，课程或学年不存在时由外键约束报错
    pub async fn create_exam_impl(&self, exam: NewExam) -> Result<Exam> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            course_id: Set(exam.course_id),
            session_id: Set(exam.session_id),
            name: Set(exam.name),
            max_marks: Set(exam.max_marks),
            exam_date: Set(exam.exam_date),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("创建考试失败: {e}")))?;

        Ok(result.into_exam())
    }

    pub async fn list_exams_by_course_impl(&self, course_id: i64) -> Result<Vec<Exam>> {
        let exams = Exams::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::ExamDate)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询考试列表失败: {e}")))?;

        Ok(exams.into_iter().map(|m| m.into_exam()).collect())
    }

    /// 仅返回属于该分校课程的考试
    pub async fn get_exams_by_ids_impl(&self, branch_id: i64, ids: &[i64]) -> Result<Vec<Exam>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let course_ids: Vec<i64> = Courses::find()
            .select_only()
            .column(CourseColumn::Id)
            .filter(CourseColumn::BranchId.eq(branch_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询课程失败: {e}")))?;

        if course_ids.is_empty() {
            return Ok(Vec::new());
        }

        let exams = Exams::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .filter(Column::CourseId.is_in(course_ids))
            .order_by_asc(Column::ExamDate)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询考试失败: {e}")))?;

        Ok(exams.into_iter().map(|m| m.into_exam()).collect())
    }
}
