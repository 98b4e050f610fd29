use super::SeaOrmStorage;
use crate::entity::student_classes::{
    ActiveModel as StudentClassActiveModel, Column as StudentClassColumn,
    Entity as StudentClasses,
};
use crate::entity::students::{ActiveModel, Column, Entity as Students};
use crate::errors::{PortalError, Result};
use crate::models::{
    PaginationInfo,
    students::{
        entities::{EnrollmentStatus, Student, StudentListItem},
        requests::{CreateStudentRequest, StudentListQuery},
        responses::StudentListResponse,
    },
};
use crate::utils::sql::contains_pattern;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 分页列出分校学生
    pub async fn list_students_with_pagination_impl(
        &self,
        branch_id: i64,
        query: StudentListQuery,
    ) -> Result<StudentListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Students::find().filter(Column::BranchId.eq(branch_id));

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(Column::Name.like(contains_pattern(search.trim())));
        }

        let paginator = select
            .order_by_asc(Column::Name)
            .order_by_asc(Column::Id)
            .paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| PortalError::database_operation(format!("查询学生总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| PortalError::database_operation(format!("查询学生页数失败: {e}")))?;

        let students = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询学生列表失败: {e}")))?;

        let ids: Vec<i64> = students.iter().map(|m| m.id).collect();
        let tallies = self.attendance_tallies_impl(&ids, None).await?;

        Ok(StudentListResponse {
            items: students
                .into_iter()
                .map(|m| StudentListItem {
                    attendance_rate: tallies.get(&m.id).map(|t| t.rate()).unwrap_or(0.0),
                    student: m.into_student(),
                })
                .collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    pub async fn get_students_by_ids_impl(
        &self,
        branch_id: i64,
        ids: &[i64],
    ) -> Result<Vec<Student>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let students = Students::find()
            .filter(Column::BranchId.eq(branch_id))
            .filter(Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询学生失败: {e}")))?;

        Ok(students.into_iter().map(|m| m.into_student()).collect())
    }

    pub async fn create_student_impl(
        &self,
        branch_id: i64,
        req: CreateStudentRequest,
    ) -> Result<Student> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            name: Set(req.name),
            dob: Set(req.dob),
            gender: Set(req.gender),
            branch_id: Set(branch_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("创建学生失败: {e}")))?;

        Ok(result.into_student())
    }

    /// 写入 active 报名记录，已存在则恢复为 active
    async fn upsert_active_enrollments<C: ConnectionTrait>(
        conn: &C,
        class_id: i64,
        student_ids: &[i64],
    ) -> Result<()> {
        let models = student_ids.iter().map(|&student_id| StudentClassActiveModel {
            student_id: Set(student_id),
            class_id: Set(class_id),
            status: Set(EnrollmentStatus::Active.to_string()),
            ..Default::default()
        });

        StudentClasses::insert_many(models)
            .on_conflict(
                OnConflict::columns([StudentClassColumn::StudentId, StudentClassColumn::ClassId])
                    .update_column(StudentClassColumn::Status)
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(|e| PortalError::database_operation(format!("写入报名记录失败: {e}")))?;

        Ok(())
    }

    /// 报名
    pub async fn enroll_students_impl(&self, class_id: i64, student_ids: &[i64]) -> Result<u64> {
        if student_ids.is_empty() {
            return Ok(0);
        }
        Self::upsert_active_enrollments(&self.db, class_id, student_ids).await?;
        Ok(student_ids.len() as u64)
    }

    /// 升班：其他班级的 active 记录置为 inactive，目标班级置为 active
    pub async fn promote_students_impl(&self, class_id: i64, student_ids: &[i64]) -> Result<u64> {
        if student_ids.is_empty() {
            return Ok(0);
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PortalError::database_operation(format!("开启事务失败: {e}")))?;

        StudentClasses::update_many()
            .col_expr(
                StudentClassColumn::Status,
                Expr::value(EnrollmentStatus::Inactive.as_str()),
            )
            .filter(StudentClassColumn::StudentId.is_in(student_ids.iter().copied()))
            .filter(StudentClassColumn::ClassId.ne(class_id))
            .filter(StudentClassColumn::Status.eq(EnrollmentStatus::Active.as_str()))
            .exec(&txn)
            .await
            .map_err(|e| PortalError::database_operation(format!("更新原报名记录失败: {e}")))?;

        Self::upsert_active_enrollments(&txn, class_id, student_ids).await?;

        txn.commit()
            .await
            .map_err(|e| PortalError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(student_ids.len() as u64)
    }
}
