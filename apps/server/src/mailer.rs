//! SMTP delivery for order notifications.

use std::sync::Arc;

use async_trait::async_trait;
use bookloop_core::notifications::{
    EmailMessage, NotificationError, NotificationSender, UnconfiguredSender,
};
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;

pub struct SmtpSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpSender {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid sender address '{}': {}", config.from, e))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| anyhow::anyhow!("Failed to create SMTP transport: {}", e))?
            .port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, message: &EmailMessage) -> Result<Message, NotificationError> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|_| NotificationError::InvalidAddress(message.to.clone()))?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&message.subject);

        let built = match &message.body_html {
            Some(html) => builder.multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(message.body_text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.clone()),
                    ),
            ),
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(message.body_text.clone()),
        };

        built.map_err(|e| NotificationError::Transport(format!("Failed to build email: {}", e)))
    }
}

#[async_trait]
impl NotificationSender for SmtpSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        let email = self.build_message(message)?;
        self.transport
            .send(email)
            .await
            .map(|_| ())
            .map_err(|e| NotificationError::Transport(e.to_string()))
    }
}

/// Every email attempt fails (and is logged as such) when SMTP is not set up.
pub fn build_sender(config: Option<&SmtpConfig>) -> Arc<dyn NotificationSender> {
    let Some(config) = config else {
        tracing::warn!("BL_SMTP_HOST is not set; emails will be logged as failed");
        return Arc::new(UnconfiguredSender::new("BL_SMTP_HOST is not set"));
    };
    match SmtpSender::new(config) {
        Ok(sender) => {
            tracing::info!("SMTP relay configured: {}:{}", config.host, config.port);
            Arc::new(sender)
        }
        Err(e) => {
            tracing::error!("SMTP setup failed: {}", e);
            Arc::new(UnconfiguredSender::new(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smtp_config() -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".into(),
            port: 587,
            username: None,
            password: None,
            from: "Bookloop <no-reply@bookloop.local>".into(),
        }
    }

    fn email(to: &str, html: Option<&str>) -> EmailMessage {
        EmailMessage {
            to: to.into(),
            subject: "Order #42 confirmed".into(),
            body_text: "Your order is on its way.".into(),
            body_html: html.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_reported() {
        let sender = SmtpSender::new(&smtp_config()).unwrap();
        let err = sender.build_message(&email("not an address", None)).unwrap_err();
        assert_eq!(
            err,
            NotificationError::InvalidAddress("not an address".into())
        );
    }

    #[tokio::test]
    async fn test_builds_plain_and_multipart_messages() {
        let sender = SmtpSender::new(&smtp_config()).unwrap();
        let plain = sender
            .build_message(&email("buyer@example.com", None))
            .unwrap();
        let formatted = String::from_utf8(plain.formatted()).unwrap();
        assert!(formatted.contains("Subject: Order #42 confirmed"));
        assert!(formatted.contains("text/plain"));

        let html = sender
            .build_message(&email("buyer@example.com", Some("<p>On its way</p>")))
            .unwrap();
        let formatted = String::from_utf8(html.formatted()).unwrap();
        assert!(formatted.contains("multipart/alternative"));
    }

    #[test]
    fn test_rejects_bad_from_address() {
        let mut config = smtp_config();
        config.from = "nobody".into();
        assert!(SmtpSender::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_missing_config_yields_failing_sender() {
        let sender = build_sender(None);
        let err = sender
            .send(&email("buyer@example.com", None))
            .await
            .unwrap_err();
        assert!(matches!(err, NotificationError::NotConfigured(_)));
    }
}
