//! 邮箱验证码登录
//!
//! 请求验证码：校验邮箱、检查当日签发次数、保存哈希并发信。
//! 校验验证码：取最近一条未使用的验证码，失败计数，成功后签发访问令牌。

use std::sync::Arc;

use chrono::{NaiveTime, Utc};
use serde::Serialize;
use siteops_adapter_email::{EmailSender, EmailTemplate};
use siteops_auth_core::TokenService;
use siteops_config::OtpConfig;
use siteops_errors::{AppError, AppResult};
use tracing::{debug, info, warn};

use crate::domain::validate;
use crate::domain::{ChallengeError, LoginChallenge, LoginChallengeRepository};

const SIGN_IN_SUBJECT: &str = "Your sign-in code";

/// 验证码已发送
#[derive(Debug, Clone, Serialize)]
pub struct CodeRequested {
    pub message: String,
    /// 有效期（秒）
    pub expires_in: i64,
}

/// 登录成功
#[derive(Debug, Clone, Serialize)]
pub struct SignedIn {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub email: String,
}

pub struct AuthService {
    challenges: Arc<dyn LoginChallengeRepository>,
    mailer: Arc<dyn EmailSender>,
    templates: EmailTemplate,
    tokens: Arc<TokenService>,
    otp: OtpConfig,
}

impl AuthService {
    pub fn new(
        challenges: Arc<dyn LoginChallengeRepository>,
        mailer: Arc<dyn EmailSender>,
        templates: EmailTemplate,
        tokens: Arc<TokenService>,
        otp: OtpConfig,
    ) -> Self {
        Self {
            challenges,
            mailer,
            templates,
            tokens,
            otp,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// 签发并发送验证码
    pub async fn request_code(&self, email: &str) -> AppResult<CodeRequested> {
        let email = normalize_email(email)?;
        validate::email("email", &email)?;

        let midnight = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
        let issued_today = self.challenges.count_since(&email, midnight).await?;
        if issued_today >= self.otp.max_requests_per_day {
            warn!(%email, issued_today, "Sign-in code limit reached");
            return Err(AppError::resource_exhausted(
                "Too many sign-in codes requested today, try again tomorrow",
            ));
        }

        let (challenge, code) = LoginChallenge::issue(&email, self.otp.code_ttl_minutes);
        self.challenges.create(&challenge).await?;

        let (html, text) = self
            .templates
            .render_sign_in_code(&code, self.otp.code_ttl_minutes)?;
        self.mailer
            .send_html_email(&email, SIGN_IN_SUBJECT, &html, &text)
            .await?;

        info!(%email, challenge_id = %challenge.id, "Sign-in code sent");
        Ok(CodeRequested {
            message: format!("A sign-in code has been sent to {}", email),
            expires_in: challenge.remaining_seconds(Utc::now()),
        })
    }

    /// 校验验证码并签发访问令牌
    pub async fn verify_code(&self, email: &str, code: &str) -> AppResult<SignedIn> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AppError::validation("code is required"));
        }
        let email = normalize_email(email)?;

        let challenge = self
            .challenges
            .latest_pending(&email)
            .await?
            .ok_or_else(|| AppError::unauthenticated("No pending sign-in code for this address"))?;

        let now = Utc::now();
        match challenge.check(code, self.otp.max_attempts, now) {
            Ok(()) => {}
            Err(ChallengeError::InvalidCode) => {
                let recorded = self
                    .challenges
                    .record_failed_attempt(challenge.id, self.otp.max_attempts)
                    .await?;
                return Err(match recorded {
                    Some(attempts) => {
                        warn!(%email, attempts, "Invalid sign-in code");
                        ChallengeError::InvalidCode
                    }
                    None => {
                        warn!(%email, "Sign-in code attempts exhausted");
                        ChallengeError::AttemptsExhausted
                    }
                }
                .into());
            }
            Err(e) => {
                warn!(%email, reason = %e, "Sign-in code rejected");
                return Err(e.into());
            }
        }

        if !self
            .challenges
            .mark_verified(challenge.id, now, self.otp.max_attempts)
            .await?
        {
            warn!(%email, challenge_id = %challenge.id, "Sign-in code no longer usable");
            return Err(ChallengeError::AlreadyVerified.into());
        }
        let access_token = self.tokens.generate_access_token(&email)?;
        info!(%email, "Signed in");

        Ok(SignedIn {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.tokens.access_token_expires_in(),
            email,
        })
    }
}

/// 去除首尾空白并转小写；为空时拒绝
fn normalize_email(raw: &str) -> AppResult<String> {
    let email = raw.trim();
    if email.is_empty() {
        debug!("Empty email rejected");
        return Err(AppError::validation("email is required"));
    }
    Ok(email.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ops@Example.COM ").unwrap(), "ops@example.com");
        assert_eq!(normalize_email("   ").unwrap_err().status_code(), 400);
    }
}
