//! siteops-auth-core - 认证核心库
//!
//! 管理后台会话令牌（JWT）的签发与校验

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use siteops_errors::{AppError, AppResult};
use uuid::Uuid;

/// JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject（登录邮箱，小写）
    pub sub: String,
    /// Expiration time
    pub exp: i64,
    /// Issued at
    pub iat: i64,
    /// JWT ID
    pub jti: String,
    /// Issuer
    #[serde(default)]
    pub iss: String,
    /// Audience
    #[serde(default)]
    pub aud: String,
    /// Token type
    #[serde(default)]
    pub token_type: String,
}

impl Claims {
    pub fn new(
        subject: &str,
        expires_in_secs: i64,
        token_type: &str,
        issuer: &str,
        audience: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: subject.to_string(),
            exp: (now + Duration::seconds(expires_in_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::now_v7().to_string(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            token_type: token_type.to_string(),
        }
    }

    /// 登录邮箱
    pub fn email(&self) -> &str {
        &self.sub
    }

    pub fn is_access_token(&self) -> bool {
        self.token_type == "access"
    }
}

/// Token 服务
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: i64,
    issuer: String,
    audience: String,
}

impl TokenService {
    pub fn new(
        secret: &str,
        access_token_expires_in: i64,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in,
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    /// 生成访问令牌
    pub fn generate_access_token(&self, subject: &str) -> AppResult<String> {
        let claims = Claims::new(
            subject,
            self.access_token_expires_in,
            "access",
            &self.issuer,
            &self.audience,
        );

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))
    }

    /// 验证令牌
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::unauthenticated(format!("Invalid token: {}", e)))?
            .claims;

        if claims.jti.is_empty() {
            return Err(AppError::unauthenticated("Token ID (jti) missing"));
        }
        if claims.sub.is_empty() {
            return Err(AppError::unauthenticated("Token subject missing"));
        }

        Ok(claims)
    }

    /// 验证访问令牌（确保是 access token）
    pub fn validate_access_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.validate_token(token)?;

        if !claims.is_access_token() {
            return Err(AppError::unauthenticated("Not an access token"));
        }

        Ok(claims)
    }

    /// 获取访问令牌过期时间（秒）
    pub fn access_token_expires_in(&self) -> i64 {
        self.access_token_expires_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn service(expires_in: i64) -> TokenService {
        TokenService::new(SECRET, expires_in, "siteops", "siteops-admin")
    }

    #[test]
    fn test_roundtrip() {
        let tokens = service(3600);
        let token = tokens.generate_access_token("ops@example.com").unwrap();
        let claims = tokens.validate_access_token(&token).unwrap();
        assert_eq!(claims.email(), "ops@example.com");
        assert!(claims.is_access_token());
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service(-3600);
        let token = tokens.generate_access_token("ops@example.com").unwrap();
        let err = tokens.validate_access_token(&token).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let other = TokenService::new("another-secret-another-secret-xx", 3600, "siteops", "siteops-admin");
        let token = other.generate_access_token("ops@example.com").unwrap();
        assert!(service(3600).validate_access_token(&token).is_err());
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let other = TokenService::new(SECRET, 3600, "siteops", "someone-else");
        let token = other.generate_access_token("ops@example.com").unwrap();
        assert!(service(3600).validate_access_token(&token).is_err());
    }
}
