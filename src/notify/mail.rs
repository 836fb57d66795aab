use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MessageBuilder};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::Result;
use crate::config::MailSettings;
use crate::error::{ConfigError, NotifyError};
use crate::report::Digest;

/// Plain-text delivery through an SMTP relay, typically the local MTA.
pub struct MailNotifier {
    from: Mailbox,
    to: Vec<Mailbox>,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl MailNotifier {
    /// # Errors
    ///
    /// Returns an error if the sender is missing or any address is invalid.
    pub fn new(settings: &MailSettings) -> Result<Self> {
        let from = settings.from.as_deref().ok_or(ConfigError::MissingField {
            field: "notify.from",
        })?;
        let from = parse_mailbox(from)?;
        let to = settings
            .to
            .iter()
            .map(|addr| parse_mailbox(addr))
            .collect::<Result<Vec<_>>>()?;
        if to.is_empty() {
            return Err(ConfigError::MissingField { field: "notify.to" }.into());
        }

        // The relay is local and unauthenticated, as for any cron mail.
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.smtp_host)
            .port(settings.smtp_port)
            .timeout(Some(settings.timeout))
            .build();

        Ok(Self {
            from,
            to,
            transport,
        })
    }

    pub(crate) fn build_message(&self, digest: &Digest) -> Result<Message> {
        let builder: MessageBuilder = self
            .to
            .iter()
            .cloned()
            .fold(Message::builder().from(self.from.clone()), MessageBuilder::to);
        let message = builder
            .subject(digest.subject.as_str())
            .date_now()
            .header(ContentType::TEXT_PLAIN)
            .body(digest.body.clone())
            .map_err(NotifyError::from)?;
        Ok(message)
    }

    /// # Errors
    ///
    /// Returns [`NotifyError::Smtp`] if the relay refuses or cannot be reached.
    pub async fn send(&self, digest: &Digest) -> Result<()> {
        let message = self.build_message(digest)?;
        self.transport
            .send(message)
            .await
            .map_err(NotifyError::from)?;
        info!(
            recipients = self.to.len(),
            tickets = digest.ticket_ids.len(),
            "digest mailed"
        );
        Ok(())
    }
}

fn parse_mailbox(value: &str) -> Result<Mailbox> {
    Ok(value
        .trim()
        .parse::<Mailbox>()
        .map_err(|err| NotifyError::Address {
            value: value.to_string(),
            message: err.to_string(),
        })?)
}
