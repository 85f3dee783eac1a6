//! Mail composition for outbox events and the transports that deliver it.

use anyhow::Context as _;
use chrono::NaiveDate;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;
use tracing::info;

use wrantle_domain::contact::ContactType;
use wrantle_domain::id::ContactId;
use wrantle_domain::verification::{CODE_TTL_MINUTES, VerificationType};

use crate::config::SiteConfig;
use crate::domain::repository::MailSender;
use crate::domain::types::{
    CONTACT_CONFIRMATION, CONTACT_NOTIFICATION, OutgoingMail, PendingOutboxEvent,
    VERIFICATION_CODE_CREATED,
};

/// Sender and recipient addresses used when composing mail.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub notifications_from: String,
    pub verification_from: String,
    /// Internal addresses notified of every contact request.
    pub contact_inbox: Vec<String>,
}

impl MailSettings {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            notifications_from: config.notifications_from.clone(),
            verification_from: config.verification_from.clone(),
            contact_inbox: config.contact_inbox.clone(),
        }
    }
}

/// Events that can never become a mail. Retrying will not help.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("unknown outbox event kind {0:?}")]
    UnknownKind(String),
    #[error("malformed {kind} payload: {source}")]
    Payload {
        kind: String,
        source: serde_json::Error,
    },
    #[error("undeliverable {kind} mail: {reason}")]
    Address { kind: String, reason: String },
}

#[derive(Deserialize)]
struct VerificationCodePayload {
    email: String,
    code: String,
    verification_type: VerificationType,
}

#[derive(Deserialize)]
struct ContactPayload {
    contact_id: ContactId,
    contact_type: ContactType,
    name: String,
    email: String,
    phone: String,
    message: String,
    preferred_date: Option<NaiveDate>,
    preferred_time: Option<String>,
}

impl ContactPayload {
    fn preferred_slot(&self) -> Option<String> {
        match (&self.preferred_date, &self.preferred_time) {
            (Some(date), Some(time)) => Some(format!("{date} at {time}")),
            (Some(date), None) => Some(date.to_string()),
            (None, Some(time)) => Some(time.clone()),
            (None, None) => None,
        }
    }
}

fn parse<T: for<'de> Deserialize<'de>>(event: &PendingOutboxEvent) -> Result<T, ComposeError> {
    serde_json::from_value(event.payload.clone()).map_err(|source| ComposeError::Payload {
        kind: event.kind.clone(),
        source,
    })
}

/// Turn an outbox event into the mail it stands for.
///
/// Every address must parse as a mailbox here, so a bad one fails the event
/// once instead of being retried by the transport.
pub fn compose(
    event: &PendingOutboxEvent,
    settings: &MailSettings,
) -> Result<OutgoingMail, ComposeError> {
    let mail = compose_mail(event, settings)?;
    build_message(&mail).map_err(|e| ComposeError::Address {
        kind: event.kind.clone(),
        reason: format!("{e:#}"),
    })?;
    Ok(mail)
}

fn compose_mail(
    event: &PendingOutboxEvent,
    settings: &MailSettings,
) -> Result<OutgoingMail, ComposeError> {
    match event.kind.as_str() {
        VERIFICATION_CODE_CREATED => {
            let p: VerificationCodePayload = parse(event)?;
            Ok(OutgoingMail {
                from: settings.verification_from.clone(),
                to: vec![p.email],
                reply_to: None,
                subject: format!("Your {} Verification Code", p.verification_type.title()),
                body: format!(
                    "Hello,\n\n\
                     Your {} verification code is: {}\n\n\
                     The code expires in {CODE_TTL_MINUTES} minutes. \
                     If you did not request it, you can ignore this email.\n",
                    p.verification_type.as_str(),
                    p.code,
                ),
            })
        }
        CONTACT_CONFIRMATION => {
            let p: ContactPayload = parse(event)?;
            let mut body = format!(
                "Hi {},\n\n\
                 Thanks for reaching out. We've received your {} request \
                 and will be in touch soon.\n\n\
                 Reference: #{}\n",
                p.name,
                p.contact_type.humanize().to_lowercase(),
                p.contact_id,
            );
            if let Some(slot) = p.preferred_slot() {
                body.push_str(&format!("Preferred time: {slot}\n"));
            }
            Ok(OutgoingMail {
                from: settings.notifications_from.clone(),
                to: vec![p.email],
                reply_to: None,
                subject: format!(
                    "We've received your {} request",
                    p.contact_type.humanize()
                ),
                body,
            })
        }
        CONTACT_NOTIFICATION => {
            let p: ContactPayload = parse(event)?;
            let mut body = format!(
                "New {} request #{}\n\n\
                 Name: {}\n\
                 Email: {}\n\
                 Phone: {}\n",
                p.contact_type.humanize(),
                p.contact_id,
                p.name,
                p.email,
                p.phone,
            );
            if let Some(slot) = p.preferred_slot() {
                body.push_str(&format!("Preferred time: {slot}\n"));
            }
            body.push_str(&format!("\n{}\n", p.message));
            Ok(OutgoingMail {
                from: settings.notifications_from.clone(),
                to: settings.contact_inbox.clone(),
                reply_to: Some(p.email),
                subject: format!(
                    "New {} Request from {}",
                    p.contact_type.humanize(),
                    p.name
                ),
                body,
            })
        }
        other => Err(ComposeError::UnknownKind(other.to_owned())),
    }
}

fn build_message(mail: &OutgoingMail) -> anyhow::Result<Message> {
    let from: Mailbox = mail.from.parse().context("parse sender address")?;
    let mut builder = Message::builder()
        .from(from)
        .subject(mail.subject.as_str())
        .header(ContentType::TEXT_PLAIN);
    for to in &mail.to {
        let to: Mailbox = to
            .parse()
            .with_context(|| format!("parse recipient address {to:?}"))?;
        builder = builder.to(to);
    }
    if let Some(reply_to) = &mail.reply_to {
        let reply_to: Mailbox = reply_to.parse().context("parse reply-to address")?;
        builder = builder.reply_to(reply_to);
    }
    builder.body(mail.body.clone()).context("build message")
}

/// SMTP delivery through `lettre`.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// `url` follows lettre's scheme: `smtp://`, `smtps://`, with optional
    /// credentials and `?tls=required`.
    pub fn from_url(url: &str) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::from_url(url)
            .context("parse SMTP_URL")?
            .build();
        Ok(Self { transport })
    }
}

impl MailSender for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> anyhow::Result<()> {
        let message = build_message(mail)?;
        self.transport.send(message).await.context("smtp send")?;
        Ok(())
    }
}

/// Development transport: records that a mail would have been sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl MailSender for LogMailer {
    async fn send(&self, mail: &OutgoingMail) -> anyhow::Result<()> {
        // Body is left out: it may carry a verification code.
        build_message(mail)?;
        info!(
            from = %mail.from,
            to = ?mail.to,
            subject = %mail.subject,
            "mail not sent, SMTP_URL unset"
        );
        Ok(())
    }
}

/// Transport selected at startup.
#[derive(Clone)]
pub enum ConfiguredMailer {
    Smtp(SmtpMailer),
    Log(LogMailer),
}

impl ConfiguredMailer {
    pub fn from_smtp_url(smtp_url: Option<&str>) -> anyhow::Result<Self> {
        Ok(match smtp_url {
            Some(url) => Self::Smtp(SmtpMailer::from_url(url)?),
            None => Self::Log(LogMailer),
        })
    }
}

impl MailSender for ConfiguredMailer {
    async fn send(&self, mail: &OutgoingMail) -> anyhow::Result<()> {
        match self {
            Self::Smtp(m) => m.send(mail).await,
            Self::Log(m) => m.send(mail).await,
        }
    }
}
