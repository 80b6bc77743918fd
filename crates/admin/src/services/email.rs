//! Email service for sending admin approval codes.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

/// HTML template for the approval code email.
#[derive(Template)]
#[template(path = "email/admin_otp.html")]
struct AdminOtpEmailHtml<'a> {
    requester: &'a str,
    code: &'a str,
    ttl_minutes: i64,
}

/// Plain text template for the approval code email.
#[derive(Template)]
#[template(path = "email/admin_otp.txt")]
struct AdminOtpEmailText<'a> {
    requester: &'a str,
    code: &'a str,
    ttl_minutes: i64,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send an approval code for `requester` to the approver inbox `to`.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_admin_otp(
        &self,
        to: &str,
        requester: &str,
        code: &str,
        ttl_minutes: i64,
    ) -> Result<(), EmailError> {
        let html = AdminOtpEmailHtml {
            requester,
            code,
            ttl_minutes,
        }
        .render()?;
        let text = AdminOtpEmailText {
            requester,
            code,
            ttl_minutes,
        }
        .render()?;

        self.send_multipart_email(
            to,
            &format!("Xstore admin access request from {requester}"),
            &text,
            &html,
        )
        .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

/// Generate a 6-digit verification code.
#[must_use]
pub fn generate_verification_code() -> String {
    use rand::Rng;
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

#[cfg(test)]
mod tests {
    use xstore_core::otp::is_well_formed;

    use super::*;

    #[test]
    fn test_generate_verification_code_format() {
        for _ in 0..100 {
            let code = generate_verification_code();
            assert!(is_well_formed(&code), "bad code {code}");
        }
    }

    #[test]
    fn test_templates_render_code_and_requester() {
        let html = AdminOtpEmailHtml {
            requester: "new.admin@xstore.in",
            code: "482913",
            ttl_minutes: 10,
        }
        .render()
        .expect("html renders");
        assert!(html.contains("482913"));
        assert!(html.contains("new.admin@xstore.in"));

        let text = AdminOtpEmailText {
            requester: "a&b@xstore.in",
            code: "482913",
            ttl_minutes: 10,
        }
        .render()
        .expect("text renders");
        assert!(text.contains("a&b@xstore.in has asked"));
        assert!(text.contains("expires in 10 minutes"));
    }
}
