use secrecy::ExposeSecret;
use tracing::{debug, info};

use crate::Result;
use crate::config::Credentials;
use crate::error::GgusError;

use super::GgusClient;
use super::models::Ticket;
use super::parse::parse_tickets;
use super::query::TicketQuery;

impl GgusClient {
    /// Authenticate with the GGUS login form.
    ///
    /// # Errors
    ///
    /// Returns [`GgusError::Auth`] when the server did not hand out a session
    /// cookie, or a transport error when the request itself failed.
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        let request = self
            .http()
            .post(self.endpoint()?)
            .query(&[("mode", "login")])
            .form(&[
                ("login", credentials.username.as_str()),
                ("password", credentials.password.expose_secret()),
            ]);
        self.send("login", request).await?;

        if !self.has_session() {
            return Err(GgusError::Auth {
                message: format!("no session established for user {}", credentials.username),
            }
            .into());
        }
        info!(user = %credentials.username, "logged in to GGUS");
        Ok(())
    }

    /// Run one ticket search and parse the XML export.
    ///
    /// # Errors
    ///
    /// Fails with [`GgusError::Auth`] if called before a successful login,
    /// with a transport error on network or HTTP failures, and with
    /// [`GgusError::Parse`] if the answer is not well-formed XML.
    pub async fn fetch(&self, query: &TicketQuery) -> Result<Vec<Ticket>> {
        if !self.has_session() {
            return Err(GgusError::Auth {
                message: "ticket search attempted without a session".to_string(),
            }
            .into());
        }

        let request = self.http().get(self.endpoint()?).query(&query.pairs());
        let body = self
            .send("ticket_search", request)
            .await?
            .text()
            .await
            .map_err(GgusError::from)?;

        let tickets = parse_tickets(&body)?;
        debug!(
            status = %query.status(),
            count = tickets.len(),
            "fetched tickets"
        );
        Ok(tickets)
    }
}
