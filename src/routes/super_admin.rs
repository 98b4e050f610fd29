use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::{
    branches::requests::CreateBranchRequest,
    users::{
        entities::UserRole,
        requests::{BulkDeleteUsersRequest, CreateUserRequest, UpdateRoleRequest, UserListParams},
    },
};
use crate::services::SuperAdminService;
use crate::utils::SafeUserId;

// 懒加载的全局 SuperAdminService 实例
static SUPER_ADMIN_SERVICE: Lazy<SuperAdminService> = Lazy::new(SuperAdminService::new_lazy);

pub async fn list_branches(req: HttpRequest) -> ActixResult<HttpResponse> {
    SUPER_ADMIN_SERVICE.list_branches(&req).await
}

pub async fn create_branch(
    req: HttpRequest,
    body: web::Json<CreateBranchRequest>,
) -> ActixResult<HttpResponse> {
    SUPER_ADMIN_SERVICE.create_branch(body.into_inner(), &req).await
}

pub async fn list_users(
    req: HttpRequest,
    query: web::Query<UserListParams>,
) -> ActixResult<HttpResponse> {
    SUPER_ADMIN_SERVICE.list_users(query.into_inner(), &req).await
}

pub async fn create_user(
    req: HttpRequest,
    body: web::Json<CreateUserRequest>,
) -> ActixResult<HttpResponse> {
    SUPER_ADMIN_SERVICE.create_user(body.into_inner(), &req).await
}

pub async fn update_role(
    req: HttpRequest,
    user_id: SafeUserId,
    body: web::Json<UpdateRoleRequest>,
) -> ActixResult<HttpResponse> {
    SUPER_ADMIN_SERVICE
        .update_role(user_id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_user(req: HttpRequest, user_id: SafeUserId) -> ActixResult<HttpResponse> {
    SUPER_ADMIN_SERVICE.delete_user(user_id.0, &req).await
}

pub async fn bulk_delete_users(
    req: HttpRequest,
    body: web::Json<BulkDeleteUsersRequest>,
) -> ActixResult<HttpResponse> {
    SUPER_ADMIN_SERVICE
        .bulk_delete_users(body.into_inner(), &req)
        .await
}

pub async fn get_statistics(req: HttpRequest) -> ActixResult<HttpResponse> {
    SUPER_ADMIN_SERVICE.get_statistics(&req).await
}

pub async fn database_health(req: HttpRequest) -> ActixResult<HttpResponse> {
    SUPER_ADMIN_SERVICE.database_health(&req).await
}

// 配置路由
pub fn configure_super_admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/super_admin")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new(&UserRole::SuperAdmin))
                    .route("/branches", web::get().to(list_branches))
                    .route("/branches", web::post().to(create_branch))
                    .route("/users", web::get().to(list_users))
                    .route("/users", web::post().to(create_user))
                    .route("/users/bulk-delete", web::post().to(bulk_delete_users))
                    .route("/users/{user_id}", web::delete().to(delete_user))
                    .route("/users/{user_id}/role", web::put().to(update_role))
                    .route("/statistics", web::get().to(get_statistics))
                    .route("/health", web::get().to(database_health)),
            ),
    );
}
