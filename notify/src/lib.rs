//! Outbound mail: a new activity post is announced to the lab's mailing
//! list, with the uploaded attachments included.
//!
//! Delivery is strictly fire-and-forget: the post has already been stored
//! when the hook runs, so a failed send is logged and never surfaces to the
//! request that triggered it.

pub mod error;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;
use tracing::{debug, error, info};

pub use error::{NotifyError, Result};

/// SMTP configuration, loaded once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// SMTP server host.
    pub smtp_host: String,
    /// SMTP server port.
    pub smtp_port: u16,
    /// SMTP username; empty means an unauthenticated development relay.
    pub smtp_username: String,
    /// SMTP password.
    pub smtp_password: String,
    /// From address.
    pub from_email: String,
    /// The mailing list that receives activity announcements.
    pub activity_list: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025, // MailHog default port for development
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@labsite.local".to_string(),
            activity_list: "lab-all@labsite.local".to_string(),
        }
    }
}

/// An attachment to include with an announcement, read from the stored file.
#[derive(Debug, Clone)]
pub struct MailAttachment {
    pub filename: String,
    pub path: std::path::PathBuf,
}

/// Sends activity announcements to the configured mailing list.
pub struct Mailer {
    config: MailConfig,
}

impl Mailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    /// Whether a post with this title should be announced. Posts titled as
    /// logs are internal notes and stay off the list.
    pub fn should_announce(title: &str) -> bool {
        !title.to_lowercase().contains("log")
    }

    /// Send one announcement: subject is the post title, body its HTML
    /// content, attachments the post's uploaded files.
    pub async fn send_activity_mail(
        &self,
        subject: &str,
        html_body: &str,
        attachments: &[MailAttachment],
    ) -> Result<()> {
        let mut multipart = MultiPart::mixed().singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(html_body.to_string()),
        );

        let octet_stream = ContentType::parse("application/octet-stream")
            .map_err(|e| NotifyError::Configuration(format!("Invalid content type: {e}")))?;

        for attachment in attachments {
            let bytes = tokio::fs::read(&attachment.path).await.map_err(|e| {
                NotifyError::Attachment(format!("{}: {}", attachment.path.display(), e))
            })?;
            multipart = multipart.singlepart(
                Attachment::new(attachment.filename.clone()).body(bytes, octet_stream.clone()),
            );
        }

        let email = Message::builder()
            .from(
                self.config
                    .from_email
                    .parse()
                    .map_err(|e| NotifyError::Configuration(format!("Invalid from email: {}", e)))?,
            )
            .to(self
                .config
                .activity_list
                .parse()
                .map_err(|e| NotifyError::Configuration(format!("Invalid recipient: {}", e)))?)
            .subject(subject)
            .multipart(multipart)
            .map_err(|e| NotifyError::Configuration(format!("Failed to build email: {}", e)))?;

        let mailer = if self.config.smtp_username.is_empty() {
            // No authentication (for development with MailHog)
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            );
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
                .map_err(|e| NotifyError::Configuration(format!("Invalid SMTP host: {}", e)))?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        mailer.send(email).await.map_err(|e| {
            error!("Failed to send activity mail: {}", e);
            NotifyError::Send(e.to_string())
        })?;

        debug!("Activity mail sent to {}", self.config.activity_list);
        Ok(())
    }

    /// Spawn the send in the background, logging failures. This is the entry
    /// point request handlers use.
    pub fn announce_in_background(
        self: std::sync::Arc<Self>,
        subject: String,
        html_body: String,
        attachments: Vec<MailAttachment>,
    ) {
        tokio::spawn(async move {
            match self
                .send_activity_mail(&subject, &html_body, &attachments)
                .await
            {
                Ok(()) => info!("Announced activity: {}", subject),
                Err(e) => error!("Activity announcement failed for {}: {}", subject, e),
            }
        });
    }
}
