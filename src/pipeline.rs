use tracing::{debug, info};

use crate::Result;
use crate::config::Config;
use crate::dedup::reconcile;
use crate::ggus::{GgusClient, TicketQuery};
use crate::notify::Notifier;
use crate::report::{Digest, render_digest, render_report};
use crate::store::{CommitSummary, SeenStore};
use crate::types::QueryStatus;

#[derive(Debug)]
pub struct RunOutcome {
    pub open_fetched: usize,
    pub terminal_fetched: usize,
    pub committed: CommitSummary,
    pub digest: Option<Digest>,
}

/// One watch run: fetch, reconcile with the seen-set, notify, commit.
///
/// Both searches complete before the store is touched, and the store
/// transaction is committed only once the digest has been delivered, so a
/// failed run leaves the seen-set as it was. A dry run never commits.
///
/// # Errors
///
/// Any authentication, transport, parse, store or delivery failure aborts the
/// run.
pub async fn watch(
    client: &GgusClient,
    store: &mut SeenStore,
    notifier: &Notifier,
    config: &Config,
) -> Result<RunOutcome> {
    client.login(&config.credentials).await?;

    let mut open = client
        .fetch(&TicketQuery::new(&config.support_unit, QueryStatus::Open))
        .await?;
    if config.reverse {
        open.reverse();
    }
    let terminal = client
        .fetch(&TicketQuery::new(&config.support_unit, QueryStatus::Terminal))
        .await?;

    let seen = store.ids()?;
    let reconciliation = reconcile(&open, &terminal, &seen, &config.scope);
    debug!(
        seen = seen.len(),
        new = reconciliation.newly_seen.len(),
        drop = reconciliation.to_drop.len(),
        "reconciled tickets"
    );

    let digest = render_digest(&reconciliation.newly_seen, &config.render_options());
    let pending = store.stage(&reconciliation)?;
    match &digest {
        Some(digest) => notifier.deliver(digest).await?,
        None => debug!("no new tickets, nothing to deliver"),
    }
    let committed = if notifier.persists() {
        pending.commit()?
    } else {
        let staged = pending.summary();
        drop(pending);
        info!(
            new = staged.inserted,
            dropped = staged.dropped,
            "dry-run: seen-ticket store left unchanged"
        );
        CommitSummary::default()
    };

    info!(
        open = open.len(),
        terminal = terminal.len(),
        new = committed.inserted,
        dropped = committed.dropped,
        "watch run complete"
    );
    Ok(RunOutcome {
        open_fetched: open.len(),
        terminal_fetched: terminal.len(),
        committed,
        digest,
    })
}

/// Full status report of one search, without touching the seen-set.
///
/// # Errors
///
/// Fails on authentication, transport or parse errors.
pub async fn report(client: &GgusClient, config: &Config, class: QueryStatus) -> Result<String> {
    client.login(&config.credentials).await?;

    let mut query = TicketQuery::new(&config.support_unit, class);
    if let Some(crate::dedup::SiteFilter::Exact(site)) = &config.scope.site {
        query = query.with_site(site.as_str());
    }
    let mut tickets = client.fetch(&query).await?;
    tickets.retain(|ticket| config.scope.covers_site(ticket));
    if config.reverse {
        tickets.reverse();
    }

    info!(class = %class, count = tickets.len(), "rendering status report");
    Ok(render_report(
        &tickets,
        class,
        config.report_title(),
        &config.render_options(),
    ))
}
