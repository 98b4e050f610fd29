//! 测试辅助：内存数据库、数据填充与令牌生成

use std::sync::Arc;

use actix_web::{App, dev::ServiceFactory, dev::ServiceRequest, web};

use crate::cache::{MokaCacheWrapper, ObjectCache};
use crate::config::CacheConfig;
use crate::models::{
    academic_sessions::requests::CreateAcademicSessionRequest,
    branches::requests::CreateBranchRequest,
    users::{entities::User, entities::UserRole, requests::NewUser},
};
use crate::storage::{Storage, sea_orm_storage::SeaOrmStorage};
use crate::utils::jwt::JwtUtils;
use crate::utils::password::hash_password_with;

pub const TEST_PASSWORD: &str = "Passw0rd!x";

pub struct TestContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

impl TestContext {
    pub async fn new() -> Self {
        let storage = SeaOrmStorage::in_memory()
            .await
            .expect("in-memory storage");
        Self {
            storage: Arc::new(storage),
            cache: Arc::new(MokaCacheWrapper::new(&CacheConfig::default())),
        }
    }

    pub fn app_data<T>(&self, app: App<T>) -> App<T>
    where
        T: ServiceFactory<
                ServiceRequest,
                Config = (),
                Error = actix_web::Error,
                InitError = (),
            >,
    {
        app.app_data(web::Data::new(self.storage.clone()))
            .app_data(web::Data::new(self.cache.clone()))
    }

    pub async fn branch(&self, name: &str) -> i64 {
        self.storage
            .create_branch(CreateBranchRequest {
                name: name.to_string(),
                address: None,
            })
            .await
            .expect("create branch")
            .id
    }

    pub async fn session(&self, branch_id: i64, name: &str) -> i64 {
        self.storage
            .create_academic_session(
                branch_id,
                CreateAcademicSessionRequest {
                    name: name.to_string(),
                    start_date: None,
                    end_date: None,
                },
            )
            .await
            .expect("create session")
            .id
    }

    /// 创建用户，密码为 `TEST_PASSWORD`（低成本哈希）
    pub async fn user(&self, email: &str, role: UserRole, branch_id: Option<i64>) -> User {
        let cheap = crate::config::Argon2Config {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        };
        self.storage
            .create_user(NewUser {
                email: email.to_string(),
                password_hash: hash_password_with(TEST_PASSWORD, &cheap).expect("hash"),
                first_name: None,
                last_name: None,
                role,
                branch_id,
            })
            .await
            .expect("create user")
    }

    pub fn token(&self, user: &User, branch_id: Option<i64>) -> String {
        JwtUtils::generate_access_token(user.id, user.role, branch_id).expect("token")
    }
}
