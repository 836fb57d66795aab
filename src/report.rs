//! Plain-text rendering of ticket digests and status reports.

use crate::ggus::Ticket;
use crate::types::QueryStatus;

const RULE_WIDTH: usize = 80;
const ID_PLACEHOLDER: &str = "{ticket_id}";

#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Named in the title of tickets that carry no site.
    pub support_unit: String,
    /// Ticket link, with `{ticket_id}` substituted per ticket.
    pub link_template: String,
    pub subject_label: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Digest {
    pub subject: String,
    pub body: String,
    pub ticket_ids: Vec<String>,
}

/// Render the notification for newly seen tickets, or `None` when there is
/// nothing to report.
#[must_use]
pub fn render_digest(tickets: &[Ticket], opts: &RenderOptions) -> Option<Digest> {
    if tickets.is_empty() {
        return None;
    }

    let ticket_ids: Vec<String> = tickets.iter().map(|t| t.id.clone()).collect();
    let subject = format!(
        "{} ({}): {}",
        opts.subject_label,
        tickets.len(),
        ticket_ids.join(" ")
    );

    let mut body = format!(
        "### New GGUS tickets ###\n{}\n\n",
        count_sentence(tickets.len(), "new GGUS")
    );
    push_blocks(&mut body, tickets, opts);

    Some(Digest {
        subject,
        body,
        ticket_ids,
    })
}

/// Render the full status report of a search: every ticket, site tickets
/// first, support-unit tickets after.
#[must_use]
pub fn render_report(
    tickets: &[Ticket],
    class: QueryStatus,
    title: &str,
    opts: &RenderOptions,
) -> String {
    let state = match class {
        QueryStatus::Open => "still open",
        QueryStatus::Terminal => "set to closed last month",
    };

    let sentence = count_sentence(tickets.len(), "");
    let mut body = format!(
        "### GGUS tickets for {title} ###\n{} {state} for {title}.\n\n",
        sentence.trim_end_matches('.')
    );
    push_blocks(&mut body, tickets, opts);
    body
}

#[must_use]
pub fn ticket_link(template: &str, ticket_id: &str) -> String {
    template.replace(ID_PLACEHOLDER, ticket_id)
}

fn count_sentence(count: usize, qualifier: &str) -> String {
    let (verb, noun) = if count == 1 {
        ("is", "ticket")
    } else {
        ("are", "tickets")
    };
    if qualifier.is_empty() {
        format!("There {verb} {count} {noun}.")
    } else {
        format!("There {verb} {count} {qualifier} {noun}.")
    }
}

fn push_blocks(body: &mut String, tickets: &[Ticket], opts: &RenderOptions) {
    let rule = format!("{}\n", "-".repeat(RULE_WIDTH));
    body.push_str(&rule);

    let (sited, unsited): (Vec<&Ticket>, Vec<&Ticket>) =
        tickets.iter().partition(|ticket| ticket.site().is_some());
    for ticket in sited.into_iter().chain(unsited) {
        push_block(body, ticket, opts);
        body.push_str(&rule);
    }
}

fn push_block(body: &mut String, ticket: &Ticket, opts: &RenderOptions) {
    let (title, name) = ticket.site().map_or(
        ("SUPPORT UNIT", opts.support_unit.as_str()),
        |site| ("SITE", site),
    );
    let lines = [
        ("GGUS ID", ticket.id.clone()),
        ("Open since", utc(ticket.created.display())),
        ("Last update", utc(ticket.last_update.display())),
        ("Scope", ticket.scope.display().to_string()),
        ("Type", ticket.ticket_type.display().to_string()),
        ("Status", ticket.status_label().to_string()),
        ("Description", ticket.subject.display().to_string()),
        ("VO", ticket.vo.display().to_string()),
        ("Link", ticket_link(&opts.link_template, &ticket.id)),
    ];

    body.push_str(&format!("{title}: {name}\n"));
    for (key, value) in lines {
        body.push_str(&format!("      {key:<11} : {value}\n"));
    }
}

fn utc(stamp: &str) -> String {
    if stamp.is_empty() {
        String::new()
    } else {
        format!("{stamp} UTC")
    }
}
