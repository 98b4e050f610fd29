use super::entities::UserRole;
use crate::models::common::PaginationQuery;
use crate::models::common::numeric::deserialize_optional_i64;
use serde::Deserialize;
use ts_rs::TS;

// 用户列表查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UserListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub role: Option<UserRole>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub branch_id: Option<i64>,
    pub search: Option<String>,
}

// 超级管理员创建用户请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub branch_id: Option<i64>,
}

// 管理员创建教师请求（角色固定为教师，分校取自会话）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct CreateTeacherRequest {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

// 修改密码请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

// 修改角色请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

// 批量删除请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct BulkDeleteUsersRequest {
    pub user_ids: Vec<i64>,
}

// 存储层：新建用户（密码已哈希）
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
    pub branch_id: Option<i64>,
}

// 存储层：用户更新
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub password_hash: Option<String>,
    pub role: Option<UserRole>,
    pub branch_id: Option<Option<i64>>,
}

// 存储层：用户列表查询
#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub role: Option<UserRole>,
    pub branch_id: Option<i64>,
    pub search: Option<String>,
}
