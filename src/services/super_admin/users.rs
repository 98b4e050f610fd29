use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SuperAdminService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{
        requests::{
            BulkDeleteUsersRequest, CreateUserRequest, NewUser, UpdateRoleRequest, UpdateUser,
            UserListParams, UserListQuery,
        },
        responses::BulkDeleteResponse,
    },
};
use crate::services::{
    bad_request, invalidate_cached_user, not_found, storage_error_response, unauthorized,
};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_name, validate_password};

pub async fn list_users(
    service: &SuperAdminService,
    query: UserListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let (page, size) = query.pagination.normalized();
    let list_query = UserListQuery {
        page: Some(page as i64),
        size: Some(size as i64),
        role: query.role,
        branch_id: query.branch_id,
        search: query.search,
    };

    match service
        .get_storage(request)
        .list_users_with_pagination(list_query)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Users retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response("Failed to retrieve users", e)),
    }
}

pub async fn create_user(
    service: &SuperAdminService,
    user: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_email(&user.email) {
        return Ok(bad_request(ErrorCode::UserEmailInvalid, msg));
    }
    let password_check = validate_password(&user.password);
    if !password_check.is_valid {
        return Ok(bad_request(
            ErrorCode::UserPasswordInvalid,
            password_check.error_message(),
        ));
    }
    for name in [&user.first_name, &user.last_name].into_iter().flatten() {
        if let Err(msg) = validate_name(name) {
            return Ok(bad_request(ErrorCode::UserNameInvalid, msg));
        }
    }

    let storage = service.get_storage(request);
    if let Some(branch_id) = user.branch_id {
        match storage.get_branch_by_id(branch_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Ok(not_found(ErrorCode::BranchNotFound, "Branch not found")),
            Err(e) => return Ok(storage_error_response("Failed to retrieve branch", e)),
        }
    }

    let password_hash = match hash_password(&user.password) {
        Ok(hash) => hash,
        Err(e) => return Ok(storage_error_response("Failed to hash password", e)),
    };

    let new_user = NewUser {
        email: user.email.trim().to_lowercase(),
        password_hash,
        first_name: user.first_name,
        last_name: user.last_name,
        role: user.role,
        branch_id: user.branch_id,
    };

    match storage.create_user(new_user).await {
        Ok(created) => Ok(HttpResponse::Created().json(ApiResponse::success(
            created,
            "User created successfully",
        ))),
        Err(e) if e.is_unique_violation() => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::UserEmailAlreadyExists, "Email already exists"),
        )),
        Err(e) => Ok(storage_error_response("Failed to create user", e)),
    }
}

pub async fn update_role(
    service: &SuperAdminService,
    user_id: i64,
    body: UpdateRoleRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(current_user_id) = RequireJWT::extract_user_id(request) else {
        return Ok(unauthorized());
    };
    if current_user_id == user_id {
        return Ok(bad_request(
            ErrorCode::BadRequest,
            "Cannot change the role of the current user",
        ));
    }

    let update = UpdateUser {
        role: Some(body.role),
        ..Default::default()
    };
    match service.get_storage(request).update_user(user_id, update).await {
        Ok(Some(user)) => {
            invalidate_cached_user(request, user_id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                user,
                "Role updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => Ok(storage_error_response("Failed to update role", e)),
    }
}

pub async fn delete_user(
    service: &SuperAdminService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(current_user_id) = RequireJWT::extract_user_id(request) else {
        return Ok(unauthorized());
    };
    if current_user_id == user_id {
        return Ok(bad_request(
            ErrorCode::CanNotDeleteCurrentUser,
            "Cannot delete the current user",
        ));
    }

    match service.get_storage(request).delete_user(user_id).await {
        Ok(true) => {
            invalidate_cached_user(request, user_id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("User deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => Ok(storage_error_response("Failed to delete user", e)),
    }
}

pub async fn bulk_delete_users(
    service: &SuperAdminService,
    body: BulkDeleteUsersRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(current_user_id) = RequireJWT::extract_user_id(request) else {
        return Ok(unauthorized());
    };
    if body.user_ids.is_empty() {
        return Ok(bad_request(ErrorCode::BadRequest, "user_ids must not be empty"));
    }
    if body.user_ids.contains(&current_user_id) {
        return Ok(bad_request(
            ErrorCode::CanNotDeleteCurrentUser,
            "Cannot delete the current user",
        ));
    }

    let mut ids = body.user_ids;
    ids.sort_unstable();
    ids.dedup();

    match service.get_storage(request).delete_users(&ids).await {
        Ok(deleted) => {
            for id in &ids {
                invalidate_cached_user(request, *id).await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                BulkDeleteResponse {
                    deleted: deleted as i64,
                },
                "Users deleted successfully",
            )))
        }
        Err(e) => Ok(storage_error_response("Failed to delete users", e)),
    }
}
