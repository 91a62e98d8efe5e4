//! Email 适配器
//!
//! 登录验证码邮件的发送：
//! - SMTP 发送（lettre，异步传输）
//! - 模板渲染（tera，内置验证码模板）

mod client;
mod template;

pub use client::{EmailClient, EmailMessage};
pub use siteops_config::EmailConfig;
pub use template::EmailTemplate;

use siteops_errors::AppResult;

/// 邮件发送接口
#[async_trait::async_trait]
pub trait EmailSender: Send + Sync {
    /// 发送纯文本邮件
    async fn send_text_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;

    /// 发送 HTML 邮件（附纯文本备用）
    async fn send_html_email(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> AppResult<()>;
}
