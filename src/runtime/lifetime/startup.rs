use crate::cache::{MokaCacheWrapper, ObjectCache};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::NewUser;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@localhost";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 生成随机密码
fn generate_random_password(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// 用户表为空时创建默认超级管理员
pub async fn seed_super_admin(storage: &Arc<dyn Storage>) {
    match storage.count_users().await {
        Ok(count) if count > 0 => {
            debug!(
                "Database already has {} user(s), skipping super_admin seed",
                count
            );
            return;
        }
        Ok(_) => {
            info!("No users found in database, creating default super_admin account...");
        }
        Err(e) => {
            warn!("Failed to count users: {}, skipping super_admin seed", e);
            return;
        }
    }

    // 优先使用环境变量，否则生成随机密码
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        let pwd = generate_random_password(16);
        warn!("==========================================================");
        warn!("  ADMIN PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Generated super_admin password: {}", pwd);
        warn!("  Please save this password or set ADMIN_PASSWORD env var");
        warn!("==========================================================");
        pwd
    });

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Failed to hash admin password: {}, skipping seed", e);
            return;
        }
    };

    let admin = NewUser {
        email: DEFAULT_ADMIN_EMAIL.to_string(),
        password_hash,
        first_name: Some("System".to_string()),
        last_name: Some("Administrator".to_string()),
        role: UserRole::SuperAdmin,
        branch_id: None,
    };

    match storage.create_user(admin).await {
        Ok(user) => {
            info!(
                "Default super_admin account created (ID: {}, email: {})",
                user.id, user.email
            );
        }
        Err(e) => {
            warn!("Failed to create super_admin account: {}", e);
        }
    }
}

/// 准备服务器启动的上下文：存储（含迁移）、默认账号与缓存
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    seed_super_admin(&storage).await;

    let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::new(&AppConfig::get().cache));
    warn!("Moka cache backend initialized");

    Ok(StartupContext { storage, cache })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestContext;

    #[test]
    fn test_generated_password_length() {
        let pwd = generate_random_password(16);
        assert_eq!(pwd.chars().count(), 16);
        assert_ne!(pwd, generate_random_password(16));
    }

    #[actix_web::test]
    async fn test_seed_only_when_empty() {
        let ctx = TestContext::new().await;
        seed_super_admin(&ctx.storage).await;
        assert_eq!(ctx.storage.count_users().await.unwrap(), 1);
        let admin = ctx
            .storage
            .get_user_by_email(DEFAULT_ADMIN_EMAIL)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, UserRole::SuperAdmin);

        seed_super_admin(&ctx.storage).await;
        assert_eq!(ctx.storage.count_users().await.unwrap(), 1);
    }
}
