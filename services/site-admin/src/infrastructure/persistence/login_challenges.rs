//! 登录验证码仓储的 PostgreSQL 实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use siteops_adapter_postgres::map_sqlx_error;
use siteops_errors::AppResult;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{LoginChallenge, LoginChallengeRepository};

pub struct PgLoginChallengeRepository {
    pool: PgPool,
}

impl PgLoginChallengeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoginChallengeRepository for PgLoginChallengeRepository {
    async fn create(&self, challenge: &LoginChallenge) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO login_challenges (id, email, code_hash, attempts, expires_at, verified_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(challenge.id)
        .bind(&challenge.email)
        .bind(&challenge.code_hash)
        .bind(challenge.attempts)
        .bind(challenge.expires_at)
        .bind(challenge.verified_at)
        .bind(challenge.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn count_since(&self, email: &str, since: DateTime<Utc>) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM login_challenges WHERE email = $1 AND created_at >= $2",
        )
        .bind(email)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn latest_pending(&self, email: &str) -> AppResult<Option<LoginChallenge>> {
        sqlx::query_as::<_, LoginChallenge>(
            r#"
            SELECT id, email, code_hash, attempts, expires_at, verified_at, created_at
            FROM login_challenges
            WHERE email = $1 AND verified_at IS NULL
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn record_failed_attempt(&self, id: Uuid, max_attempts: i32) -> AppResult<Option<i32>> {
        sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE login_challenges SET attempts = attempts + 1
            WHERE id = $1 AND attempts < $2
            RETURNING attempts
            "#,
        )
        .bind(id)
        .bind(max_attempts)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn mark_verified(&self, id: Uuid, at: DateTime<Utc>, max_attempts: i32) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE login_challenges SET verified_at = $2
            WHERE id = $1 AND verified_at IS NULL AND attempts < $3
            "#,
        )
        .bind(id)
        .bind(at)
        .bind(max_attempts)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() == 1)
    }
}
