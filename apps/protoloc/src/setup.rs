//! Building the resolution engine from configuration

use protoloc_config::Config;
use protoloc_events::EventSender;
use protoloc_fetch::{validate_url, LocalRepository, NetClient, NetConfig, RemoteRepository};
use protoloc_platform::Platform;
use protoloc_resolver::ResolutionEngine;
use std::sync::Arc;
use std::time::Duration;

use crate::error::CliError;

/// Network settings from the `[network]` section
fn net_config(config: &Config) -> NetConfig {
    NetConfig {
        timeout: Duration::from_secs(config.network.timeout),
        connect_timeout: Duration::from_secs(config.network.connect_timeout),
        retry_count: config.network.retries,
        retry_delay: Duration::from_secs(config.network.retry_delay),
        ..NetConfig::default()
    }
}

/// The fetch service for the configured local and remote repositories
pub fn build_fetcher(
    config: &Config,
    event_sender: &EventSender,
) -> Result<RemoteRepository, CliError> {
    let remotes = config
        .repositories
        .remote
        .iter()
        .map(|url| validate_url(url))
        .collect::<Result<Vec<_>, _>>()?;

    let local = LocalRepository::new(config.local_repository())
        .with_event_sender(event_sender.clone());
    let client = NetClient::new(net_config(config))?.with_event_sender(event_sender.clone());

    Ok(RemoteRepository::new(local, remotes, client)
        .with_offline(config.general.offline)
        .with_event_sender(event_sender.clone()))
}

/// An engine for the running host
pub fn build_engine(
    config: &Config,
    event_sender: &EventSender,
) -> Result<ResolutionEngine, CliError> {
    let fetcher = build_fetcher(config, event_sender)?;
    tracing::debug!(
        local_repository = %fetcher.local().root().display(),
        remotes = config.repositories.remote.len(),
        offline = config.general.offline,
        "configured fetch service"
    );

    Ok(ResolutionEngine::new(Platform::current(), Arc::new(fetcher))
        .with_concurrency(config.general.concurrency)
        .with_event_sender(event_sender.clone()))
}
