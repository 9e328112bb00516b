//! New-lesson email notification fan-out.
//!
//! Sends one templated HTML message per recipient through a Resend-style
//! HTTP email API. Sends run in fixed-size batches with a delay between
//! batches to respect provider rate limits; within a batch, recipients
//! are sent concurrently and every send is attempted regardless of
//! earlier failures. Individual failures are counted, never raised.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use berean_core::{defaults, DeliveryReport, Error, LessonNotifier, NewLessonEmail, Result};

/// Default Resend API endpoint.
pub const DEFAULT_EMAIL_API_URL: &str = "https://api.resend.com";

/// Configuration for the email notifier.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Base URL of the email provider API.
    pub base_url: String,
    /// Provider API key.
    pub api_key: String,
    /// From address for lesson notifications.
    pub from_address: String,
    /// Recipients per concurrent batch.
    pub batch_size: usize,
    /// Delay between batches, in milliseconds.
    pub batch_delay_ms: u64,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl EmailConfig {
    /// Create from environment variables (`RESEND_API_KEY`, optional
    /// `EMAIL_API_URL` and `EMAIL_FROM_ADDRESS`).
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            base_url: std::env::var("EMAIL_API_URL")
                .unwrap_or_else(|_| DEFAULT_EMAIL_API_URL.to_string()),
            api_key: std::env::var("RESEND_API_KEY")
                .map_err(|_| Error::Config("RESEND_API_KEY not set".into()))?,
            from_address: std::env::var("EMAIL_FROM_ADDRESS")
                .unwrap_or_else(|_| "Berean <hello@berean.app>".to_string()),
            batch_size: defaults::EMAIL_BATCH_SIZE,
            batch_delay_ms: defaults::EMAIL_BATCH_DELAY_MS,
            timeout_seconds: defaults::EMAIL_TIMEOUT_SECS,
        })
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: String,
    html: String,
}

/// Email notifier over a Resend-compatible HTTP API.
pub struct EmailNotifier {
    client: Client,
    config: EmailConfig,
}

impl EmailNotifier {
    /// Create a notifier with the given configuration.
    pub fn new(config: EmailConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(EmailConfig::from_env()?)
    }

    /// Send one notification to one recipient.
    async fn send_one(&self, to: &str, email: &NewLessonEmail) -> Result<()> {
        let url = format!("{}/emails", self.config.base_url.trim_end_matches('/'));
        let request = SendRequest {
            from: &self.config.from_address,
            to: [to],
            subject: format!("New Message: {}", email.lesson_title),
            html: render_lesson_email(email),
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Notification(format!("send to {} failed: {}", to, e)))?;

        if !response.status().is_success() {
            return Err(Error::Notification(format!(
                "provider returned {} for {}",
                response.status(),
                to
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl LessonNotifier for EmailNotifier {
    async fn notify_all(&self, recipients: &[String], email: &NewLessonEmail) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let batches: Vec<&[String]> = recipients.chunks(self.config.batch_size.max(1)).collect();
        let batch_count = batches.len();

        for (i, batch) in batches.into_iter().enumerate() {
            let sends = batch.iter().map(|to| self.send_one(to, email));
            for (to, result) in batch.iter().zip(join_all(sends).await) {
                match result {
                    Ok(()) => report.sent += 1,
                    Err(e) => {
                        report.failed += 1;
                        warn!(
                            subsystem = "notify",
                            component = "email",
                            recipient = %to,
                            error = %e,
                            "Notification delivery failed"
                        );
                    }
                }
            }
            if i + 1 < batch_count {
                tokio::time::sleep(Duration::from_millis(self.config.batch_delay_ms)).await;
            }
        }

        info!(
            subsystem = "notify",
            component = "email",
            op = "notify_all",
            lesson_id = %email.lesson_id,
            sent = report.sent,
            failed = report.failed,
            "Notification fan-out complete"
        );
        report
    }
}

/// Notifier used when no email provider is configured. Reports zero
/// deliveries so summaries stay truthful.
pub struct DisabledNotifier;

#[async_trait]
impl LessonNotifier for DisabledNotifier {
    async fn notify_all(&self, recipients: &[String], email: &NewLessonEmail) -> DeliveryReport {
        info!(
            subsystem = "notify",
            component = "email",
            lesson_id = %email.lesson_id,
            recipients = recipients.len(),
            "Email provider not configured; skipping notification"
        );
        DeliveryReport::default()
    }
}

/// Render the HTML body for a new-lesson notification.
fn render_lesson_email(email: &NewLessonEmail) -> String {
    let formatted_date = email.published_at.format("%A, %B %-d, %Y");
    let lesson_url = format!(
        "{}/learn/{}",
        email.app_url.trim_end_matches('/'),
        email.lesson_id
    );
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>New Lesson Available</title>
</head>
<body style="margin: 0; padding: 0; font-family: -apple-system, 'Segoe UI', Roboto, Arial, sans-serif; background-color: #f5f5f5;">
  <table width="100%" cellpadding="0" cellspacing="0" style="background-color: #f5f5f5; padding: 40px 20px;">
    <tr>
      <td align="center">
        <table width="600" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px; overflow: hidden;">
          <tr>
            <td style="background-color: #003366; padding: 40px 30px; text-align: center;">
              <h1 style="margin: 0; color: #ffffff; font-size: 28px;">New Lesson Available</h1>
            </td>
          </tr>
          <tr>
            <td style="padding: 40px 30px;">
              <p style="margin: 0 0 24px 0; color: #374151; font-size: 16px;">
                A new message is ready for you to learn from:
              </p>
              <div style="background-color: #f8fafc; border-left: 4px solid #003366; padding: 20px; margin-bottom: 24px;">
                <h2 style="margin: 0 0 12px 0; color: #003366; font-size: 22px;">{title}</h2>
                <p style="margin: 0; color: #6b7280; font-size: 14px;">{date}</p>
              </div>
              <p style="margin: 0 0 30px 0; color: #4b5563; font-size: 15px;">{summary}</p>
              <table width="100%" cellpadding="0" cellspacing="0">
                <tr>
                  <td align="center" style="padding: 20px 0;">
                    <a href="{url}" style="display: inline-block; background-color: #003366; color: #ffffff; text-decoration: none; padding: 16px 40px; border-radius: 6px; font-size: 16px;">Start Learning</a>
                  </td>
                </tr>
              </table>
              <p style="text-align: center; margin: 20px 0 0 0; color: #9ca3af; font-size: 13px;">
                Original message: {video_title}
              </p>
            </td>
          </tr>
        </table>
      </td>
    </tr>
  </table>
</body>
</html>"#,
        title = email.lesson_title,
        date = formatted_date,
        summary = email.summary,
        url = lesson_url,
        video_title = email.video_title,
    )
}
