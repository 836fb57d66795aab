mod mail;

use tracing::info;

use crate::Result;
use crate::config::Config;
use crate::report::Digest;
use crate::types::Delivery;

pub use mail::MailNotifier;

/// Final hop of a run: hands the rendered digest to its reader.
pub enum Notifier {
    Mail(MailNotifier),
    Stdout,
    /// Logs what would be delivered and sends nothing. The seen-set is left
    /// untouched so a later real run still reports the tickets.
    DryRun,
}

impl Notifier {
    /// # Errors
    ///
    /// Returns an error if mail delivery is configured with invalid addresses.
    pub fn from_config(config: &Config) -> Result<Self> {
        match config.delivery {
            Delivery::Mail => Ok(Self::Mail(MailNotifier::new(&config.mail)?)),
            Delivery::Stdout => Ok(Self::Stdout),
        }
    }

    /// Whether a run using this notifier may record what it delivered.
    #[must_use]
    pub const fn persists(&self) -> bool {
        !matches!(self, Self::DryRun)
    }

    /// # Errors
    ///
    /// Mail delivery failures are returned as is; they are fatal for the run.
    pub async fn deliver(&self, digest: &Digest) -> Result<()> {
        match self {
            Self::Mail(mailer) => mailer.send(digest).await,
            Self::Stdout => {
                println!("{}\n\n{}", digest.subject, digest.body);
                Ok(())
            }
            Self::DryRun => {
                info!(
                    subject = %digest.subject,
                    tickets = ?digest.ticket_ids,
                    "dry-run: would deliver digest"
                );
                Ok(())
            }
        }
    }
}
