use roxmltree::{Document, Node, ParsingOptions};
use tracing::warn;

use crate::Result;
use crate::error::GgusError;
use crate::types::TicketStatus;

use super::models::{Field, Ticket};

const TICKET_TAG: &str = "ticket";

// Current export names first, then the ones used by the older search export.
const ID_TAGS: &[&str] = &["Ticket-ID", "request_id"];
const STATUS_TAGS: &[&str] = &["Status", "status"];
const SITE_TAGS: &[&str] = &["Site", "affected_site"];
const CREATED_TAGS: &[&str] = &["Date_Of_Creation", "date_of_creation"];
const LAST_UPDATE_TAGS: &[&str] = &["Last_Update", "last_update"];
const SUBJECT_TAGS: &[&str] = &["Subject", "subject"];
const TYPE_TAGS: &[&str] = &["Type", "type_of_problem"];
const SCOPE_TAGS: &[&str] = &["Scope"];
const VO_TAGS: &[&str] = &["VO", "vo"];

/// Parse a GGUS search export into tickets.
///
/// # Errors
///
/// Returns [`GgusError::Parse`] when the document is not well-formed XML.
/// Records without a ticket id are skipped; every other missing field
/// resolves to [`Field::Absent`].
pub fn parse_tickets(xml: &str) -> Result<Vec<Ticket>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml, options).map_err(|source| GgusError::Parse {
        message: source.to_string(),
        source,
    })?;

    let tickets = doc
        .descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == TICKET_TAG)
        .filter_map(|node| {
            let ticket = parse_ticket(node);
            if ticket.is_none() {
                warn!(
                    position = node.range().start,
                    "skipping ticket record without an identifier"
                );
            }
            ticket
        })
        .collect();
    Ok(tickets)
}

fn parse_ticket(node: Node<'_, '_>) -> Option<Ticket> {
    let id = match lookup(node, ID_TAGS) {
        Field::Present(id) if !id.is_empty() => id,
        _ => return None,
    };

    Some(Ticket {
        id,
        status: lookup(node, STATUS_TAGS).map(|raw| TicketStatus::from(raw.as_str())),
        affected_site: lookup(node, SITE_TAGS),
        created: lookup(node, CREATED_TAGS),
        last_update: lookup(node, LAST_UPDATE_TAGS),
        subject: lookup(node, SUBJECT_TAGS),
        ticket_type: lookup(node, TYPE_TAGS),
        scope: lookup(node, SCOPE_TAGS),
        vo: lookup(node, VO_TAGS),
    })
}

fn lookup(node: Node<'_, '_>, tags: &[&str]) -> Field<String> {
    tags.iter()
        .find_map(|tag| {
            node.descendants()
                .find(|child| child.is_element() && child.tag_name().name() == *tag)
        })
        .map(|child| child.text().unwrap_or_default().trim().to_string())
        .into()
}
