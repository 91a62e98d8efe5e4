//! 邮箱登录验证码
//!
//! 只保存验证码的 SHA-256 哈希；明文仅在签发时返回一次用于发信。

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use siteops_errors::AppError;
use uuid::Uuid;

/// 验证码位数
pub const CODE_LENGTH: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LoginChallenge {
    pub id: Uuid,
    /// 小写邮箱
    pub email: String,
    pub code_hash: String,
    pub attempts: i32,
    pub expires_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl LoginChallenge {
    /// 签发新的验证码，返回 (challenge, 明文验证码)
    pub fn issue(email: &str, ttl_minutes: i64) -> (Self, String) {
        let code = generate_code();
        let now = Utc::now();
        let challenge = Self {
            id: Uuid::now_v7(),
            email: email.to_string(),
            code_hash: hash_code(&code),
            attempts: 0,
            expires_at: now + Duration::minutes(ttl_minutes),
            verified_at: None,
            created_at: now,
        };
        (challenge, code)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_verified(&self) -> bool {
        self.verified_at.is_some()
    }

    /// 剩余有效时间（秒）
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }

    /// 校验验证码；不修改状态，尝试次数由调用方记录
    pub fn check(&self, code: &str, max_attempts: i32, now: DateTime<Utc>) -> Result<(), ChallengeError> {
        if self.is_verified() {
            return Err(ChallengeError::AlreadyVerified);
        }
        if self.is_expired(now) {
            return Err(ChallengeError::Expired);
        }
        if self.attempts >= max_attempts {
            return Err(ChallengeError::AttemptsExhausted);
        }
        if !constant_time_eq(self.code_hash.as_bytes(), hash_code(code.trim()).as_bytes()) {
            return Err(ChallengeError::InvalidCode);
        }
        Ok(())
    }
}

/// 验证失败原因
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChallengeError {
    #[error("Sign-in code has already been used")]
    AlreadyVerified,

    #[error("Sign-in code has expired")]
    Expired,

    #[error("Too many attempts, request a new sign-in code")]
    AttemptsExhausted,

    #[error("Invalid sign-in code")]
    InvalidCode,
}

impl From<ChallengeError> for AppError {
    fn from(e: ChallengeError) -> Self {
        AppError::unauthenticated(e.to_string())
    }
}

/// 生成 6 位数字验证码
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(0..1_000_000))
}

pub fn hash_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
