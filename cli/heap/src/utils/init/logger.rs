use std::sync::OnceLock;

use tracing::{debug, error};
use tracing_subscriber::prelude::*;
use tracing_subscriber::reload::Handle;
use tracing_subscriber::{EnvFilter, Registry};

use crate::commands::Verbosity;

static LOGGER_HANDLE: OnceLock<Handle<EnvFilter, Registry>> = OnceLock::new();

/// The log filter for a verbosity level.
///
/// `RUST_LOG` takes precedence over this if set.
pub(crate) fn log_filter(verbosity: Verbosity) -> &'static str {
    match verbosity {
        // Show only errors
        Verbosity::Quiet => "off,heap=error",
        // Only show warnings
        Verbosity::Verbose(0) => "off,heap=warn,heap_rust_sdk=warn,heap_catalog=warn",
        // Show our own info logs
        Verbosity::Verbose(1) => "off,heap=info,heap_rust_sdk=info,heap_catalog=info",
        // Also show debug from our libraries
        Verbosity::Verbose(2) => "off,heap=debug,heap_rust_sdk=debug,heap_catalog=debug",
        // Also show trace from our libraries
        Verbosity::Verbose(3) => "off,heap=trace,heap_rust_sdk=trace,heap_catalog=trace",
        // Also show debug from the HTTP stack
        Verbosity::Verbose(4) => "debug,heap=trace,heap_rust_sdk=trace,heap_catalog=trace",
        Verbosity::Verbose(_) => "trace",
    }
}

/// Install the global subscriber on first use,
/// afterwards only update its filter.
pub(crate) fn init_logger(verbosity: Option<Verbosity>) {
    let verbosity = verbosity.unwrap_or_default();

    let filter_handle = LOGGER_HANDLE.get_or_init(|| {
        let (subscriber, reload_handle) = create_registry_and_filter_reload_handle();
        subscriber.init();
        reload_handle
    });

    update_filters(filter_handle, log_filter(verbosity));
}

pub fn update_filters(filter_handle: &Handle<EnvFilter, Registry>, log_filter: &str) {
    let result = filter_handle.modify(|layer| {
        match EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_filter)) {
            Ok(new_filter) => *layer = new_filter,
            Err(err) => {
                error!("Updating logger filter failed: {}", err);
            },
        };
    });
    if let Err(err) = result {
        error!("Updating logger filter failed: {}", err);
    }
}

fn create_registry_and_filter_reload_handle() -> (
    impl tracing_subscriber::util::SubscriberInitExt,
    Handle<EnvFilter, Registry>,
) {
    debug!("Initializing logger");
    let filter = EnvFilter::new("warn");
    let (filter, filter_reload_handle) = tracing_subscriber::reload::Layer::new(filter);
    let log_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);
    let registry = tracing_subscriber::registry().with(log_layer);

    (registry, filter_reload_handle)
}
