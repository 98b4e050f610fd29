use super::SeaOrmStorage;
use crate::entity::academic_sessions::{ActiveModel, Column, Entity as AcademicSessions};
use crate::errors::{PortalError, Result};
use crate::models::academic_sessions::{
    entities::AcademicSession, requests::CreateAcademicSessionRequest,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 列出分校下的学年（最新在前）
    pub async fn list_academic_sessions_impl(
        &self,
        branch_id: i64,
    ) -> Result<Vec<AcademicSession>> {
        let sessions = AcademicSessions::find()
            .filter(Column::BranchId.eq(branch_id))
            .order_by_desc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询学年列表失败: {e}")))?;

        Ok(sessions
            .into_iter()
            .map(|m| m.into_academic_session())
            .collect())
    }

    pub async fn get_academic_session_by_id_impl(
        &self,
        id: i64,
    ) -> Result<Option<AcademicSession>> {
        let result = AcademicSessions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询学年失败: {e}")))?;

        Ok(result.map(|m| m.into_academic_session()))
    }

    pub async fn create_academic_session_impl(
        &self,
        branch_id: i64,
        req: CreateAcademicSessionRequest,
    ) -> Result<AcademicSession> {
        let model = ActiveModel {
            name: Set(req.name),
            branch_id: Set(branch_id),
            start_date: Set(req.start_date),
            end_date: Set(req.end_date),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("创建学年失败: {e}")))?;

        Ok(result.into_academic_session())
    }
}
