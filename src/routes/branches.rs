use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::services::BranchService;

// 懒加载的全局 BranchService 实例
static BRANCH_SERVICE: Lazy<BranchService> = Lazy::new(BranchService::new_lazy);

pub async fn current_branch(req: HttpRequest) -> ActixResult<HttpResponse> {
    BRANCH_SERVICE.current_branch(&req).await
}

// 配置路由
pub fn configure_branch_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/branches")
            .wrap(middlewares::RequireJWT)
            .route("/current", web::get().to(current_branch)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::test_support::TestContext;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_current_branch() {
        let ctx = TestContext::new().await;
        let branch = ctx.branch("Lakeside").await;
        let teacher = ctx
            .user("t@school.test", UserRole::Teacher, Some(branch))
            .await;

        let app =
            test::init_service(ctx.app_data(App::new()).configure(configure_branch_routes)).await;

        let req = test::TestRequest::get()
            .uri("/api/branches/current")
            .insert_header((
                "Authorization",
                format!("Bearer {}", ctx.token(&teacher, Some(branch))),
            ))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["name"], "Lakeside");

        // 教师的分校以账号为准
        let req = test::TestRequest::get()
            .uri("/api/branches/current")
            .insert_header((
                "Authorization",
                format!("Bearer {}", ctx.token(&teacher, Some(4242))),
            ))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["name"], "Lakeside");

        let boss = ctx.user("boss@school.test", UserRole::SuperAdmin, None).await;
        let req = test::TestRequest::get()
            .uri("/api/branches/current")
            .insert_header((
                "Authorization",
                format!("Bearer {}", ctx.token(&boss, Some(4242))),
            ))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );
    }
}
