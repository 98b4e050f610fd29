pub mod branches;
pub mod system;
pub mod users;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    branches::requests::CreateBranchRequest,
    users::requests::{BulkDeleteUsersRequest, CreateUserRequest, UpdateRoleRequest, UserListParams},
};
use crate::storage::Storage;

/// 超级管理员：分校与全体用户管理
pub struct SuperAdminService {
    storage: Option<Arc<dyn Storage>>,
}

impl SuperAdminService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub async fn list_branches(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        branches::list_branches(self, request).await
    }

    pub async fn create_branch(
        &self,
        branch: CreateBranchRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        branches::create_branch(self, branch, request).await
    }

    pub async fn list_users(
        &self,
        query: UserListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        users::list_users(self, query, request).await
    }

    pub async fn create_user(
        &self,
        user: CreateUserRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        users::create_user(self, user, request).await
    }

    pub async fn update_role(
        &self,
        user_id: i64,
        body: UpdateRoleRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        users::update_role(self, user_id, body, request).await
    }

    pub async fn delete_user(
        &self,
        user_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        users::delete_user(self, user_id, request).await
    }

    pub async fn bulk_delete_users(
        &self,
        body: BulkDeleteUsersRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        users::bulk_delete_users(self, body, request).await
    }

    pub async fn get_statistics(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        system::get_statistics(self, request).await
    }

    pub async fn database_health(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        system::database_health(self, request).await
    }
}
