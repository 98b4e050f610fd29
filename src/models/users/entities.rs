use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 用户角色
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub enum UserRole {
    Teacher,    // 教师
    Admin,      // 分校管理员
    SuperAdmin, // 超级管理员
}

impl UserRole {
    pub const TEACHER: &'static str = "teacher";
    pub const ADMIN: &'static str = "admin";
    pub const SUPER_ADMIN: &'static str = "super_admin";

    pub fn teacher_roles() -> &'static [&'static UserRole] {
        &[&Self::Teacher]
    }
    pub fn admin_roles() -> &'static [&'static UserRole] {
        &[&Self::Admin, &Self::SuperAdmin]
    }
    pub fn super_admin_roles() -> &'static [&'static UserRole] {
        &[&Self::SuperAdmin]
    }
    pub fn all_roles() -> &'static [&'static UserRole] {
        &[&Self::Teacher, &Self::Admin, &Self::SuperAdmin]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Teacher => Self::TEACHER,
            UserRole::Admin => Self::ADMIN,
            UserRole::SuperAdmin => Self::SUPER_ADMIN,
        }
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<UserRole>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的用户角色: '{s}'. 支持的角色: teacher, admin, super_admin"
            ))
        })
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            UserRole::TEACHER => Ok(UserRole::Teacher),
            UserRole::ADMIN => Ok(UserRole::Admin),
            UserRole::SUPER_ADMIN => Ok(UserRole::SuperAdmin),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

// 用户实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    #[ts(skip)]
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
    pub branch_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    /// 显示名称，缺省时回退到邮箱
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect();
        if parts.is_empty() {
            self.email.clone()
        } else {
            parts.join(" ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_strings() {
        assert_eq!("super_admin".parse::<UserRole>(), Ok(UserRole::SuperAdmin));
        assert_eq!(UserRole::SuperAdmin.to_string(), "super_admin");
        assert!("student".parse::<UserRole>().is_err());

        let role: UserRole = serde_json::from_str(r#""admin""#).unwrap();
        assert_eq!(role, UserRole::Admin);
        assert_eq!(
            serde_json::to_string(&UserRole::SuperAdmin).unwrap(),
            r#""super_admin""#
        );
        assert!(serde_json::from_str::<UserRole>(r#""root""#).is_err());
    }

    #[test]
    fn test_role_groups() {
        assert!(UserRole::admin_roles().contains(&&UserRole::SuperAdmin));
        assert!(!UserRole::teacher_roles().contains(&&UserRole::Admin));
    }

    #[test]
    fn test_display_name_fallback() {
        let mut user = User {
            id: 1,
            email: "t@school.test".into(),
            password_hash: String::new(),
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            role: UserRole::Teacher,
            branch_id: Some(1),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert_eq!(user.display_name(), "Ada Lovelace");

        user.first_name = None;
        user.last_name = None;
        assert_eq!(user.display_name(), "t@school.test");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: 1,
            email: "a@school.test".into(),
            password_hash: "secret-hash".into(),
            first_name: None,
            last_name: None,
            role: UserRole::Admin,
            branch_id: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }
}
