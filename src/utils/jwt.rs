use crate::config::AppConfig;
use crate::models::users::entities::UserRole;
use actix_web::HttpRequest;
use actix_web::cookie::{Cookie, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE: &str = "session_token";
pub const REFRESH_COOKIE: &str = "refresh_token";
const BEARER_PREFIX: &str = "Bearer ";

const ACCESS: &str = "access";
const REFRESH: &str = "refresh";

// JWT Claims 结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,              // Subject (user ID)
    pub role: String,             // 用户角色
    pub branch_id: Option<i64>,   // 会话分校
    pub token_type: String,       // "access" 或 "refresh"
    pub exp: usize,               // 过期时间
    pub iat: usize,               // 签发时间
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }

    pub fn user_role(&self) -> Option<UserRole> {
        self.role.parse().ok()
    }
}

// Token 对
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct JwtUtils;

impl JwtUtils {
    fn get_secret() -> &'static str {
        &AppConfig::get().jwt.secret
    }

    // 生成 Access Token
    pub fn generate_access_token(
        user_id: i64,
        role: UserRole,
        branch_id: Option<i64>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let config = AppConfig::get();
        Self::generate_token_with_expiry(
            user_id,
            role,
            branch_id,
            ACCESS,
            chrono::Duration::minutes(config.jwt.access_token_expiry),
        )
    }

    // 生成 Refresh Token
    pub fn generate_refresh_token(
        user_id: i64,
        role: UserRole,
        branch_id: Option<i64>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let config = AppConfig::get();
        Self::generate_token_with_expiry(
            user_id,
            role,
            branch_id,
            REFRESH,
            chrono::Duration::days(config.jwt.refresh_token_expiry),
        )
    }

    pub fn generate_token_with_expiry(
        user_id: i64,
        role: UserRole,
        branch_id: Option<i64>,
        token_type: &str,
        expiry_duration: chrono::Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let expiration = now + expiry_duration;

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            branch_id,
            token_type: token_type.to_string(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let encoding_key = EncodingKey::from_secret(Self::get_secret().as_bytes());
        encode(&Header::default(), &claims, &encoding_key)
    }

    // access + refresh，两者携带相同的分校
    pub fn generate_token_pair(
        user_id: i64,
        role: UserRole,
        branch_id: Option<i64>,
    ) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        Ok(TokenPair {
            access_token: Self::generate_access_token(user_id, role, branch_id)?,
            refresh_token: Self::generate_refresh_token(user_id, role, branch_id)?,
        })
    }

    // 验证签名与过期时间
    pub fn verify_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let decoding_key = DecodingKey::from_secret(Self::get_secret().as_bytes());
        decode::<Claims>(token, &decoding_key, &Validation::default())
            .map(|token_data| token_data.claims)
    }

    fn verify_token_type(
        token: &str,
        expected_type: &str,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        let claims = Self::verify_token(token)?;
        if claims.token_type != expected_type {
            return Err(jsonwebtoken::errors::ErrorKind::InvalidToken.into());
        }
        Ok(claims)
    }

    pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::verify_token_type(token, ACCESS)
    }

    pub fn verify_refresh_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::verify_token_type(token, REFRESH)
    }

    /// 使用 Refresh Token 换取新的 Access Token，保留分校
    pub fn refresh_access_token(
        refresh_token: &str,
    ) -> Result<(String, Claims), jsonwebtoken::errors::Error> {
        let claims = Self::verify_refresh_token(refresh_token)?;
        let user_id = claims
            .user_id()
            .ok_or(jsonwebtoken::errors::ErrorKind::InvalidToken)?;
        let role = claims
            .user_role()
            .ok_or(jsonwebtoken::errors::ErrorKind::InvalidToken)?;
        let token = Self::generate_access_token(user_id, role, claims.branch_id)?;
        Ok((token, claims))
    }

    /// 会话令牌：优先 `Authorization: Bearer`，其次 `session_token` cookie
    pub fn extract_session_token(req: &HttpRequest) -> Option<String> {
        req.headers()
            .get(actix_web::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix(BEARER_PREFIX))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| {
                req.cookie(SESSION_COOKIE)
                    .map(|c| c.value().to_string())
                    .filter(|s| !s.is_empty())
            })
    }

    pub fn extract_refresh_token_from_cookie(req: &HttpRequest) -> Option<String> {
        req.cookie(REFRESH_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn create_session_cookie(access_token: &str) -> Cookie<'static> {
        let config = AppConfig::get();
        Self::build_cookie(
            SESSION_COOKIE,
            access_token.to_string(),
            actix_web::cookie::time::Duration::minutes(config.jwt.access_token_expiry),
        )
    }

    pub fn create_refresh_token_cookie(refresh_token: &str) -> Cookie<'static> {
        let config = AppConfig::get();
        Self::build_cookie(
            REFRESH_COOKIE,
            refresh_token.to_string(),
            actix_web::cookie::time::Duration::days(config.jwt.refresh_token_expiry),
        )
    }

    /// 注销用：max_age=0 让浏览器删除 cookie
    pub fn create_empty_session_cookie() -> Cookie<'static> {
        Self::build_cookie(
            SESSION_COOKIE,
            String::new(),
            actix_web::cookie::time::Duration::seconds(0),
        )
    }

    pub fn create_empty_refresh_token_cookie() -> Cookie<'static> {
        Self::build_cookie(
            REFRESH_COOKIE,
            String::new(),
            actix_web::cookie::time::Duration::seconds(0),
        )
    }

    fn build_cookie(
        name: &'static str,
        value: String,
        max_age: actix_web::cookie::time::Duration,
    ) -> Cookie<'static> {
        Cookie::build(name, value)
            .path("/")
            .max_age(max_age)
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(AppConfig::get().is_production())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_access_token_carries_branch() {
        let token = JwtUtils::generate_access_token(42, UserRole::SuperAdmin, Some(3)).unwrap();
        let claims = JwtUtils::verify_access_token(&token).unwrap();
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.user_role(), Some(UserRole::SuperAdmin));
        assert_eq!(claims.branch_id, Some(3));
    }

    #[test]
    fn test_token_type_is_enforced() {
        let pair = JwtUtils::generate_token_pair(7, UserRole::Teacher, Some(1)).unwrap();
        assert!(JwtUtils::verify_access_token(&pair.refresh_token).is_err());
        assert!(JwtUtils::verify_refresh_token(&pair.access_token).is_err());
    }

    #[test]
    fn test_refresh_preserves_branch() {
        let pair = JwtUtils::generate_token_pair(7, UserRole::Admin, Some(9)).unwrap();
        let (access, claims) = JwtUtils::refresh_access_token(&pair.refresh_token).unwrap();
        assert_eq!(claims.branch_id, Some(9));
        let decoded = JwtUtils::verify_access_token(&access).unwrap();
        assert_eq!(decoded.branch_id, Some(9));
        assert_eq!(decoded.role, "admin");
    }

    #[test]
    fn test_tampered_token_rejected() {
        let token = JwtUtils::generate_access_token(1, UserRole::Teacher, None).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(JwtUtils::verify_token(&tampered).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = JwtUtils::generate_token_with_expiry(
            1,
            UserRole::Teacher,
            None,
            "access",
            chrono::Duration::minutes(-10),
        )
        .unwrap();
        assert!(JwtUtils::verify_access_token(&token).is_err());
    }

    #[test]
    fn test_extract_session_token_sources() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer abc"))
            .cookie(Cookie::new(SESSION_COOKIE, "from-cookie"))
            .to_http_request();
        assert_eq!(JwtUtils::extract_session_token(&req).as_deref(), Some("abc"));

        let req = TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE, "from-cookie"))
            .to_http_request();
        assert_eq!(
            JwtUtils::extract_session_token(&req).as_deref(),
            Some("from-cookie")
        );

        let req = TestRequest::default().to_http_request();
        assert_eq!(JwtUtils::extract_session_token(&req), None);
    }
}
