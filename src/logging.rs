use std::io;
use tracing::Level;
use tracing_appender::rolling;
use tracing_subscriber::filter::FilterFn;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::{TARGET_INGEST, TARGET_LEXICON, TARGET_MODEL, TARGET_SCORING, TARGET_WEB_REQUEST};

/// Prefixes of dependency targets whose debug events are dropped from stdout.
/// The tokenizers crate and candle log per-encoding and per-tensor detail.
const QUIET_DEPENDENCIES: [&str; 2] = ["tokenizers", "candle"];

/// Stdout shows every pipeline stage at info, with per-request web events at
/// warn. The daily file under `logs/` also keeps scoring and QA model debug
/// events, which carry per-answer signal values and inference timings.
pub fn configure_logging() {
    let quiet_dependencies = FilterFn::new(|metadata| {
        !(metadata.level() == &Level::DEBUG
            && QUIET_DEPENDENCIES
                .iter()
                .any(|prefix| metadata.target().starts_with(prefix)))
    });

    let stdout_log = fmt::layer()
        .with_writer(io::stdout)
        .with_filter(EnvFilter::new(format!(
            "info,{}=info,{}=info,{}=info,{}=info,{}=warn",
            TARGET_SCORING, TARGET_INGEST, TARGET_LEXICON, TARGET_MODEL, TARGET_WEB_REQUEST
        )))
        .with_filter(quiet_dependencies);

    let file_appender = rolling::daily("logs", "aqgs.log");
    let file_log = fmt::layer()
        .with_writer(file_appender)
        .with_filter(EnvFilter::new(format!(
            "info,{}=debug,{}=debug",
            TARGET_SCORING, TARGET_MODEL
        )));

    tracing_subscriber::Registry::default()
        .with(stdout_log)
        .with(file_log)
        .init();
}
