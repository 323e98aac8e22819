use crate::config::AppConfig;
use actix_web::HttpRequest;
use actix_web::cookie::{Cookie, SameSite};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,     // 用户 ID
    pub role: String,    // 签发时的角色
    pub kind: TokenKind, // access / refresh
    #[serde(default)]
    pub remember: bool,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, JwtError> {
        self.sub
            .parse::<i64>()
            .map_err(|_| JwtError::from(ErrorKind::InvalidSubject))
    }
}

#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// access token 过期时间（秒级时间戳）
    pub access_expires_at: i64,
}

pub struct JwtUtils;

impl JwtUtils {
    fn secret() -> &'static [u8] {
        AppConfig::get().jwt.secret.as_bytes()
    }

    fn refresh_lifetime(remember_me: bool) -> chrono::Duration {
        let jwt = &AppConfig::get().jwt;
        if remember_me {
            chrono::Duration::days(jwt.refresh_token_remember_me_expiry)
        } else {
            chrono::Duration::days(jwt.refresh_token_expiry)
        }
    }

    fn encode_claims(
        user_id: i64,
        role: &str,
        kind: TokenKind,
        remember: bool,
        lifetime: chrono::Duration,
    ) -> Result<(String, i64), JwtError> {
        let now = chrono::Utc::now();
        let exp = (now + lifetime).timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            kind,
            remember,
            exp: exp as usize,
            iat: now.timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(Self::secret()),
        )?;
        Ok((token, exp))
    }

    /// 生成 access token，返回 token 和过期时间
    pub fn generate_access_token(user_id: i64, role: &str) -> Result<(String, i64), JwtError> {
        let minutes = AppConfig::get().jwt.access_token_expiry;
        Self::encode_claims(
            user_id,
            role,
            TokenKind::Access,
            false,
            chrono::Duration::minutes(minutes),
        )
    }

    pub fn generate_refresh_token(
        user_id: i64,
        role: &str,
        remember_me: bool,
    ) -> Result<String, JwtError> {
        Self::encode_claims(
            user_id,
            role,
            TokenKind::Refresh,
            remember_me,
            Self::refresh_lifetime(remember_me),
        )
        .map(|(token, _)| token)
    }

    pub fn generate_token_pair(
        user_id: i64,
        role: &str,
        remember_me: bool,
    ) -> Result<TokenPair, JwtError> {
        let (access_token, access_expires_at) = Self::generate_access_token(user_id, role)?;
        let refresh_token = Self::generate_refresh_token(user_id, role, remember_me)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at,
        })
    }

    fn verify(token: &str, expected: TokenKind) -> Result<Claims, JwtError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(Self::secret()),
            &Validation::default(),
        )?
        .claims;
        if claims.kind != expected {
            return Err(JwtError::from(ErrorKind::InvalidToken));
        }
        Ok(claims)
    }

    pub fn verify_access_token(token: &str) -> Result<Claims, JwtError> {
        Self::verify(token, TokenKind::Access)
    }

    pub fn verify_refresh_token(token: &str) -> Result<Claims, JwtError> {
        Self::verify(token, TokenKind::Refresh)
    }

    /// 创建 refresh token cookie
    pub fn refresh_cookie(refresh_token: &str, remember_me: bool) -> Cookie<'static> {
        let config = AppConfig::get();
        let days = Self::refresh_lifetime(remember_me).num_days();
        Cookie::build(REFRESH_COOKIE_NAME, refresh_token.to_string())
            .path("/")
            .max_age(actix_web::cookie::time::Duration::days(days))
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(config.is_production())
            .finish()
    }

    /// 清空 refresh token cookie（登出或刷新失败）
    pub fn expired_refresh_cookie() -> Cookie<'static> {
        Cookie::build(REFRESH_COOKIE_NAME, "")
            .path("/")
            .max_age(actix_web::cookie::time::Duration::seconds(0))
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(AppConfig::get().is_production())
            .finish()
    }

    pub fn refresh_token_from_cookie(req: &HttpRequest) -> Option<String> {
        req.cookie(REFRESH_COOKIE_NAME)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_round() {
        let (token, exp) = JwtUtils::generate_access_token(42, "teacher").unwrap();
        let claims = JwtUtils::verify_access_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.role, "teacher");
        assert_eq!(claims.exp as i64, exp);
    }

    #[test]
    fn test_token_kind_is_checked() {
        let pair = JwtUtils::generate_token_pair(7, "student", true).unwrap();
        assert!(JwtUtils::verify_refresh_token(&pair.access_token).is_err());
        assert!(JwtUtils::verify_access_token(&pair.refresh_token).is_err());
        let refresh = JwtUtils::verify_refresh_token(&pair.refresh_token).unwrap();
        assert!(refresh.remember);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let (token, _) = JwtUtils::generate_access_token(1, "admin").unwrap();
        let tampered = format!("{token}x");
        assert!(JwtUtils::verify_access_token(&tampered).is_err());
    }

    #[test]
    fn test_refresh_cookie_attributes() {
        let cookie = JwtUtils::refresh_cookie("abc", false);
        assert_eq!(cookie.name(), REFRESH_COOKIE_NAME);
        assert_eq!(cookie.http_only(), Some(true));
        let cleared = JwtUtils::expired_refresh_cookie();
        assert_eq!(cleared.value(), "");
    }
}
