use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{ApiResponse, ErrorCode};
use crate::services::{not_found, session_branch, storage_error_response};
use crate::storage::Storage;

/// 当前会话分校，任意已登录角色可用
pub struct BranchService {
    storage: Option<Arc<dyn Storage>>,
}

impl BranchService {
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

    pub async fn current_branch(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let branch_id = match session_branch(request) {
            Ok(id) => id,
            Err(resp) => return Ok(resp),
        };

        match self.get_storage(request).get_branch_by_id(branch_id).await {
            Ok(Some(branch)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                branch,
                "Branch retrieved successfully",
            ))),
            Ok(None) => Ok(not_found(ErrorCode::BranchNotFound, "Branch not found")),
            Err(e) => Ok(storage_error_response("Failed to retrieve branch", e)),
        }
    }
}
