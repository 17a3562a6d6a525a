//! Tracing and Sentry setup for binaries.

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::PortalConfig;

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "sol_city=info,sol_city_portal=info";

/// Initialize Sentry error tracking and return guard that must be kept alive.
#[must_use]
pub fn init_sentry(config: &PortalConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the global subscriber: `EnvFilter` (falling back to
/// [`DEFAULT_FILTER`]), a stderr formatter, and the Sentry layer.
///
/// Call after [`init_sentry`].
pub fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());

    let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let fmt = if json { fmt.json().boxed() } else { fmt.boxed() };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}
