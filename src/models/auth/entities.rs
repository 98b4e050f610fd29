use serde::{Deserialize, Serialize};

use crate::models::users::entities::{User, UserRole};

/// 经认证中间件解析后的会话身份
///
/// `user` 每次从存储（或缓存）重新加载。`branch_id` 仅对 super_admin 取自令牌，
/// 其他角色固定为账号所属分校。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub user: User,
    pub branch_id: Option<i64>,
}

impl SessionUser {
    pub fn resolve(user: User, claimed_branch: Option<i64>) -> Self {
        let branch_id = effective_branch_id(&user, claimed_branch);
        Self { user, branch_id }
    }

    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn role(&self) -> UserRole {
        self.user.role
    }
}

/// 按数据库中的当前角色确定会话分校
pub fn effective_branch_id(user: &User, claimed_branch: Option<i64>) -> Option<i64> {
    match user.role {
        UserRole::SuperAdmin => claimed_branch,
        UserRole::Admin | UserRole::Teacher => user.branch_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: UserRole, branch_id: Option<i64>) -> User {
        User {
            id: 1,
            email: "u@school.test".to_string(),
            password_hash: String::new(),
            first_name: None,
            last_name: None,
            role,
            branch_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_only_super_admin_keeps_claimed_branch() {
        assert_eq!(effective_branch_id(&user(UserRole::SuperAdmin, Some(1)), Some(2)), Some(2));
        assert_eq!(effective_branch_id(&user(UserRole::Admin, Some(1)), Some(2)), Some(1));
        assert_eq!(effective_branch_id(&user(UserRole::Teacher, Some(1)), None), Some(1));
        assert_eq!(effective_branch_id(&user(UserRole::Admin, None), Some(2)), None);
    }
}
