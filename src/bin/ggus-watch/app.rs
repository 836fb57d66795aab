use std::path::PathBuf;

use ggus_watch::Result;
use ggus_watch::config::Config;
use ggus_watch::ggus::GgusClient;
use ggus_watch::notify::Notifier;
use ggus_watch::pipeline;
use ggus_watch::store::SeenStore;
use ggus_watch::telemetry::init_tracing;
use tracing::info;

use super::cli::Cli;

const DEFAULT_CONFIG: &str = "ggus-watch.toml";

pub async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.log_filter.as_deref(), cli.json_logs)?;

    let overrides = cli.overrides();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = Config::load(&config_path, overrides)?;

    let client = GgusClient::new(
        config.base_url.clone(),
        config.http_request_timeout,
        config.http_connect_timeout,
        cli.insecure,
    )?;

    if let Some(class) = cli.report {
        let report = pipeline::report(&client, &config, class).await?;
        print!("{report}");
        return Ok(());
    }

    let mut store = SeenStore::open(&config.store_path)?;
    let notifier = if cli.dry_run {
        Notifier::DryRun
    } else {
        Notifier::from_config(&config)?
    };

    let outcome = pipeline::watch(&client, &mut store, &notifier, &config).await?;
    info!(
        support_unit = %config.support_unit,
        open = outcome.open_fetched,
        terminal = outcome.terminal_fetched,
        new = outcome.committed.inserted,
        dropped = outcome.committed.dropped,
        delivered = outcome.digest.is_some(),
        "done"
    );
    Ok(())
}
