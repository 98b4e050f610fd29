use super::SeaOrmStorage;
use crate::entity::branches::{ActiveModel, Column, Entity as Branches};
use crate::errors::{PortalError, Result};
use crate::models::branches::{entities::Branch, requests::CreateBranchRequest};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};

impl SeaOrmStorage {
    /// 列出分校（按名称排序）
    pub async fn list_branches_impl(&self) -> Result<Vec<Branch>> {
        let branches = Branches::find()
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询分校列表失败: {e}")))?;

        Ok(branches.into_iter().map(|m| m.into_branch()).collect())
    }

    pub async fn get_branch_by_id_impl(&self, id: i64) -> Result<Option<Branch>> {
        let result = Branches::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询分校失败: {e}")))?;

        Ok(result.map(|m| m.into_branch()))
    }

    pub async fn create_branch_impl(&self, req: CreateBranchRequest) -> Result<Branch> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            name: Set(req.name),
            address: Set(req.address),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("创建分校失败: {e}")))?;

        Ok(result.into_branch())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn test_branches_sorted_by_name() {
        let storage = SeaOrmStorage::in_memory().await.unwrap();
        for name in ["Westside", "Central", "North"] {
            storage
                .create_branch_impl(CreateBranchRequest {
                    name: name.to_string(),
                    address: None,
                })
                .await
                .unwrap();
        }

        let names: Vec<String> = storage
            .list_branches_impl()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["Central", "North", "Westside"]);
        assert!(storage.get_branch_by_id_impl(42).await.unwrap().is_none());
    }
}
