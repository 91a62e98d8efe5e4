//! 邮件模板

use siteops_errors::{AppError, AppResult};
use tera::Tera;

const SIGN_IN_CODE_HTML: &str = r#"<p>Hello,</p>
<p>Your SiteOps sign-in code is:</p>
<p style="font-size:24px;font-weight:bold;letter-spacing:4px">{{ code }}</p>
<p>The code expires in {{ expires_in_minutes }} minutes. If you did not request it, you can ignore this email.</p>
"#;

const SIGN_IN_CODE_TEXT: &str = "Your SiteOps sign-in code is {{ code }}.\n\
The code expires in {{ expires_in_minutes }} minutes. If you did not request it, you can ignore this email.\n";

/// 邮件模板管理器
pub struct EmailTemplate {
    tera: Tera,
}

impl EmailTemplate {
    /// 从模板目录加载（`*.html` / `*.txt`），并补齐内置模板
    pub fn from_dir(template_dir: &str) -> AppResult<Self> {
        let pattern = format!("{}/**/*", template_dir);
        let tera = Tera::new(&pattern)
            .map_err(|e| AppError::internal(format!("Failed to load email templates: {}", e)))?;
        Self::with_builtin(tera)
    }

    /// 仅内置模板
    pub fn builtin() -> AppResult<Self> {
        Self::with_builtin(Tera::default())
    }

    fn with_builtin(mut tera: Tera) -> AppResult<Self> {
        for (name, content) in [
            ("sign_in_code.html", SIGN_IN_CODE_HTML),
            ("sign_in_code.txt", SIGN_IN_CODE_TEXT),
        ] {
            if tera.get_template_names().any(|n| n == name) {
                continue;
            }
            tera.add_raw_template(name, content).map_err(|e| {
                AppError::internal(format!("Failed to add template {}: {}", name, e))
            })?;
        }
        Ok(Self { tera })
    }

    /// 渲染模板
    pub fn render(&self, template_name: &str, context: &serde_json::Value) -> AppResult<String> {
        let context = tera::Context::from_serialize(context)
            .map_err(|e| AppError::internal(format!("Failed to create template context: {}", e)))?;

        self.tera.render(template_name, &context).map_err(|e| {
            AppError::internal(format!("Failed to render template {}: {}", template_name, e))
        })
    }

    /// 渲染登录验证码邮件，返回 (html, text)
    pub fn render_sign_in_code(
        &self,
        code: &str,
        expires_in_minutes: i64,
    ) -> AppResult<(String, String)> {
        let context = serde_json::json!({
            "code": code,
            "expires_in_minutes": expires_in_minutes,
        });
        Ok((
            self.render("sign_in_code.html", &context)?,
            self.render("sign_in_code.txt", &context)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_sign_in_code() {
        let template = EmailTemplate::builtin().unwrap();
        let (html, text) = template.render_sign_in_code("042917", 10).unwrap();
        assert!(html.contains("042917"));
        assert!(text.contains("042917"));
        assert!(text.contains("10 minutes"));
    }

    #[test]
    fn test_unknown_template() {
        let template = EmailTemplate::builtin().unwrap();
        assert!(template.render("missing.html", &serde_json::json!({})).is_err());
    }
}
