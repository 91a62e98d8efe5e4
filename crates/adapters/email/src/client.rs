//! 邮件客户端实现

use crate::{EmailConfig, EmailSender};
use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use siteops_errors::{AppError, AppResult};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 邮件消息
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: String,
}

/// 邮件客户端
pub struct EmailClient {
    config: EmailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailClient {
    /// 创建邮件客户端（不会立即建立连接）
    pub fn new(config: EmailConfig) -> AppResult<Self> {
        let transport = Self::build_transport(&config)?;
        Ok(Self { config, transport })
    }

    fn build_transport(config: &EmailConfig) -> AppResult<AsyncSmtpTransport<Tokio1Executor>> {
        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host).map_err(|e| {
                AppError::internal(format!("Failed to create SMTP transport: {}", e))
            })?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
        };

        let builder = if config.username.is_empty() {
            builder
        } else {
            builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.expose_secret().clone(),
            ))
        };

        Ok(builder
            .port(config.smtp_port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)))
            .build())
    }

    /// 构建邮件消息
    fn build_message(&self, msg: &EmailMessage) -> AppResult<Message> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| AppError::internal(format!("Invalid from address: {}", e)))?;

        let to = msg
            .to
            .parse()
            .map_err(|e| AppError::validation(format!("Invalid to address: {}", e)))?;

        let text = SinglePart::builder()
            .header(header::ContentType::TEXT_PLAIN)
            .body(msg.text_body.clone());

        let body = match &msg.html_body {
            Some(html) => MultiPart::alternative().singlepart(text).singlepart(
                SinglePart::builder()
                    .header(header::ContentType::TEXT_HTML)
                    .body(html.clone()),
            ),
            None => MultiPart::alternative().singlepart(text),
        };

        Message::builder()
            .from(from)
            .to(to)
            .subject(&msg.subject)
            .multipart(body)
            .map_err(|e| AppError::internal(format!("Failed to build message: {}", e)))
    }

    async fn send_message(&self, msg: EmailMessage) -> AppResult<()> {
        let message = self.build_message(&msg)?;
        self.transport.send(message).await.map_err(|e| {
            warn!(to = %msg.to, error = %e, "SMTP delivery failed");
            AppError::external_service(format!("Failed to send email: {}", e))
        })?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl EmailSender for EmailClient {
    async fn send_text_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        debug!(to = %to, subject = %subject, "Sending text email");

        self.send_message(EmailMessage {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: None,
            text_body: body.to_string(),
        })
        .await?;

        info!(to = %to, subject = %subject, "Text email sent");
        Ok(())
    }

    async fn send_html_email(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> AppResult<()> {
        debug!(to = %to, subject = %subject, "Sending HTML email");

        self.send_message(EmailMessage {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: Some(html_body.to_string()),
            text_body: text_body.to_string(),
        })
        .await?;

        info!(to = %to, subject = %subject, "HTML email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmailConfig {
        EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            username: String::new(),
            password: secrecy::Secret::new(String::new()),
            from_email: "noreply@siteops.local".to_string(),
            from_name: "SiteOps".to_string(),
            use_tls: false,
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_build_message() {
        let client = EmailClient::new(config()).unwrap();
        let msg = EmailMessage {
            to: "ops@example.com".to_string(),
            subject: "Your sign-in code".to_string(),
            html_body: Some("<p>123456</p>".to_string()),
            text_body: "123456".to_string(),
        };
        assert!(client.build_message(&msg).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_validation_error() {
        let client = EmailClient::new(config()).unwrap();
        let msg = EmailMessage {
            to: "not an address".to_string(),
            subject: "x".to_string(),
            html_body: None,
            text_body: "x".to_string(),
        };
        let err = client.build_message(&msg).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
