//! Outbound email: aggregated recipient notifications and admin alerts.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use specmon_core::{Folder, SpecRecord};
use thiserror::Error;
use tracing::{error, info};

use crate::config::EmailSettings;

/// Which configured address list a message goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Recipients,
    Admin,
}

/// Notification boundary consumed by the pipeline and the store.
///
/// Sends are fire-and-forget: implementations must absorb transport failures
/// after escalating them, so a mail outage can never take the pipeline down.
#[async_trait]
pub trait Notify: Send + Sync {
    /// One aggregated message summarizing every new valid record.
    async fn notify_recipients(&self, records: &[SpecRecord], folder: Folder);

    /// One aggregated message describing a problem for the admin list.
    async fn notify_admin(&self, issue: &str, folder: Folder);
}

#[async_trait]
impl<T: Notify + ?Sized> Notify for std::sync::Arc<T> {
    async fn notify_recipients(&self, records: &[SpecRecord], folder: Folder) {
        (**self).notify_recipients(records, folder).await;
    }

    async fn notify_admin(&self, issue: &str, folder: Folder) {
        (**self).notify_admin(issue, folder).await;
    }
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mail address {address}: {reason}")]
    Address { address: String, reason: String },

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("smtp transport error: {0}")]
    Transport(String),
}

/// SMTP-backed notifier.
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    recipients: Vec<Mailbox>,
    admins: Vec<Mailbox>,
}

impl Mailer {
    pub fn new(settings: &EmailSettings) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_server)
            .map_err(|err| MailError::Transport(err.to_string()))?
            .port(settings.smtp_port)
            .credentials(Credentials::new(
                settings.sender_email.clone(),
                settings.sender_password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            sender: parse_mailbox(&settings.sender_email)?,
            recipients: parse_mailboxes(&settings.recipients)?,
            admins: parse_mailboxes(&settings.admins)?,
        })
    }

    /// Send with the single-bounce policy: a failed send is reported to the
    /// admin list exactly once; a failure of that escalation is logged and
    /// absorbed.
    async fn send(&self, subject: &str, body: String, audience: Audience) {
        if let Err(err) = self.try_send(subject, body.clone(), audience).await {
            error!(error = %err, subject, "failed to send mail");
            let (subject, body) = escalation_notice(subject, &body, &err);
            if let Err(err) = self.try_send(&subject, body, Audience::Admin).await {
                error!(error = %err, "failed to send escalation mail, giving up");
            }
        }
    }

    async fn try_send(
        &self,
        subject: &str,
        body: String,
        audience: Audience,
    ) -> Result<(), MailError> {
        let to = match audience {
            Audience::Recipients => &self.recipients,
            Audience::Admin => &self.admins,
        };

        let mut builder = Message::builder().from(self.sender.clone()).subject(subject);
        for mailbox in to {
            builder = builder.to(mailbox.clone());
        }
        let message = builder.body(body)?;

        self.transport
            .send(message)
            .await
            .map_err(|err| MailError::Transport(err.to_string()))?;
        info!(subject, ?audience, "mail sent");
        Ok(())
    }
}

#[async_trait]
impl Notify for Mailer {
    async fn notify_recipients(&self, records: &[SpecRecord], folder: Folder) {
        let subject = format!("ATTN: New files in {folder} folder");
        self.send(&subject, new_files_body(records), Audience::Recipients)
            .await;
    }

    async fn notify_admin(&self, issue: &str, folder: Folder) {
        let subject = format!("ATTN: Error with {folder} spec");
        self.send(&subject, admin_body(issue), Audience::Admin).await;
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|err: lettre::address::AddressError| {
        MailError::Address {
            address: address.to_string(),
            reason: err.to_string(),
        }
    })
}

fn parse_mailboxes(addresses: &[String]) -> Result<Vec<Mailbox>, MailError> {
    addresses.iter().map(|a| parse_mailbox(a)).collect()
}

/// Body for the aggregated new-files announcement: filename, title, and
/// purpose per record, one message for the whole batch.
fn new_files_body(records: &[SpecRecord]) -> String {
    let mut body =
        String::from("Hi,\nThe following new files were detected and require attention:\n\n");
    for record in records {
        body.push_str(&record.file_name);
        body.push('\n');
        body.push_str("Title:   ");
        body.push_str(&record.title);
        body.push('\n');
        body.push_str("Purpose: ");
        body.push_str(&record.purpose);
        body.push_str("\n\n");
    }
    body.push_str("Thanks\n");
    body
}

fn admin_body(issue: &str) -> String {
    format!("Hi,\nThere was an issue with the spec monitoring service.\n\n{issue}\n\nThanks\n")
}

/// The simplified follow-up sent when a mail fails: describes the original
/// message without re-sending it verbatim to the original audience.
fn escalation_notice(subject: &str, body: &str, err: &MailError) -> (String, String) {
    (
        "ATTN: Error sending mail for spec monitoring service".to_string(),
        format!(
            "Hi,\nA mail with the following details failed to send by the monitoring service.\n\n\
             Subject: {subject}\n\nBody:\n{body}\n\nError: {err}\n\nThanks\n"
        ),
    )
}
