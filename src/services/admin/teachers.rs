use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AdminService;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{
        entities::{User, UserRole},
        requests::{
            ChangePasswordRequest, CreateTeacherRequest, NewUser, UpdateUser, UserListParams,
            UserListQuery,
        },
    },
};
use crate::services::{
    bad_request, invalidate_cached_user, not_found, session_branch, storage_error_response,
};
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_name, validate_password};

// 会话分校内的教师，否则 404
pub(super) async fn load_branch_teacher(
    storage: &dyn Storage,
    branch_id: i64,
    teacher_id: i64,
) -> Result<User, HttpResponse> {
    match storage.get_user_by_id(teacher_id).await {
        Ok(Some(user)) if user.role == UserRole::Teacher && user.branch_id == Some(branch_id) => {
            Ok(user)
        }
        Ok(_) => Err(not_found(ErrorCode::UserNotFound, "Teacher not found")),
        Err(e) => Err(storage_error_response("Failed to retrieve teacher", e)),
    }
}

pub async fn list_teachers(
    service: &AdminService,
    query: UserListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let branch_id = match session_branch(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    let (page, size) = query.pagination.normalized();
    let list_query = UserListQuery {
        page: Some(page as i64),
        size: Some(size as i64),
        role: Some(UserRole::Teacher),
        branch_id: Some(branch_id),
        search: query.search,
    };

    match service
        .get_storage(request)
        .list_users_with_pagination(list_query)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Teachers retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response("Failed to retrieve teachers", e)),
    }
}

pub async fn create_teacher(
    service: &AdminService,
    teacher: CreateTeacherRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let branch_id = match session_branch(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    if let Err(msg) = validate_email(&teacher.email) {
        return Ok(bad_request(ErrorCode::UserEmailInvalid, msg));
    }
    let password_check = validate_password(&teacher.password);
    if !password_check.is_valid {
        return Ok(bad_request(
            ErrorCode::UserPasswordInvalid,
            password_check.error_message(),
        ));
    }
    for name in [&teacher.first_name, &teacher.last_name].into_iter().flatten() {
        if let Err(msg) = validate_name(name) {
            return Ok(bad_request(ErrorCode::UserNameInvalid, msg));
        }
    }

    let password_hash = match hash_password(&teacher.password) {
        Ok(hash) => hash,
        Err(e) => return Ok(storage_error_response("Failed to hash password", e)),
    };

    let new_user = NewUser {
        email: teacher.email.trim().to_lowercase(),
        password_hash,
        first_name: teacher.first_name,
        last_name: teacher.last_name,
        role: UserRole::Teacher,
        branch_id: Some(branch_id),
    };

    match service.get_storage(request).create_user(new_user).await {
        Ok(user) => Ok(HttpResponse::Created().json(ApiResponse::success(
            user,
            "Teacher created successfully",
        ))),
        Err(e) if e.is_unique_violation() => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::UserEmailAlreadyExists, "Email already exists"),
        )),
        Err(e) => Ok(storage_error_response("Failed to create teacher", e)),
    }
}

pub async fn delete_teacher(
    service: &AdminService,
    teacher_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let branch_id = match session_branch(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = load_branch_teacher(storage.as_ref(), branch_id, teacher_id).await {
        return Ok(resp);
    }

    match storage.delete_user(teacher_id).await {
        Ok(true) => {
            invalidate_cached_user(request, teacher_id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Teacher deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::UserNotFound, "Teacher not found")),
        Err(e) => Ok(storage_error_response("Failed to delete teacher", e)),
    }
}

pub async fn change_password(
    service: &AdminService,
    teacher_id: i64,
    body: ChangePasswordRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let branch_id = match session_branch(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    let password_check = validate_password(&body.new_password);
    if !password_check.is_valid {
        return Ok(bad_request(
            ErrorCode::UserPasswordInvalid,
            password_check.error_message(),
        ));
    }

    let storage = service.get_storage(request);
    if let Err(resp) = load_branch_teacher(storage.as_ref(), branch_id, teacher_id).await {
        return Ok(resp);
    }

    let password_hash = match hash_password(&body.new_password) {
        Ok(hash) => hash,
        Err(e) => return Ok(storage_error_response("Failed to hash password", e)),
    };

    let update = UpdateUser {
        password_hash: Some(password_hash),
        ..Default::default()
    };
    match storage.update_user(teacher_id, update).await {
        Ok(Some(_)) => {
            invalidate_cached_user(request, teacher_id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Password updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::UserNotFound, "Teacher not found")),
        Err(e) => Ok(storage_error_response("Failed to update password", e)),
    }
}
