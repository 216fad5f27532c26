use crate::config::LogLevel;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::fmt::{self, format::FmtSpan};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub struct Logger {
    level: LogLevel,
    log_file: Option<PathBuf>,
}

impl Logger {
    pub fn new(level: LogLevel, log_file: Option<PathBuf>) -> Self {
        Self { level, log_file }
    }

    pub fn init(&self) -> Result<(), Box<dyn std::error::Error>> {
        let filter = match self.level {
            LogLevel::Error => EnvFilter::new("error"),
            LogLevel::Warn => EnvFilter::new("warn"),
            LogLevel::Info => EnvFilter::new("info"),
            LogLevel::Debug => EnvFilter::new("debug"),
            LogLevel::Trace => EnvFilter::new("trace"),
        };

        let registry = Registry::default().with(filter);

        if let Some(log_file) = &self.log_file {
            let file_appender =
                tracing_appender::rolling::daily(log_file.parent().unwrap(), "polis.log");
            let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

            let file_layer = fmt::layer()
                .with_writer(non_blocking)
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .with_thread_ids(true)
                .with_thread_names(true);

            let _ = registry.with(file_layer).try_init();
        } else {
            let stdout_layer = fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .with_thread_ids(true)
                .with_thread_names(true);

            let _ = registry.with(stdout_layer).try_init();
        }

        Ok(())
    }
}

pub fn log_tick_started(intent: &str) {
    debug!(intent = %intent, "reconciler tick started");
}

pub fn log_scaling_decision(intent: &str, from: u32, to: u32, reason: &str) {
    info!(
        intent = %intent,
        from,
        to,
        reason = %reason,
        "scaling decision applied"
    );
}

pub fn log_scaling_blocked(intent: &str, from: u32, reason: &str) {
    info!(
        intent = %intent,
        replicas = from,
        reason = %reason,
        "scaling decision blocked"
    );
}

pub fn log_binding_established(intent: &str, metric_type: &str, policy_type: &str) {
    info!(
        intent = %intent,
        metric_type = %metric_type,
        policy_type = %policy_type,
        "runtime binding established"
    );
}

pub fn log_binding_torn_down(intent: &str) {
    info!(intent = %intent, "runtime binding torn down");
}

pub fn log_condition(intent: &str, condition: &str, message: &str) {
    warn!(intent = %intent, condition = %condition, message = %message, "condition updated");
}

pub fn log_error(intent: &str, error: &str) {
    error!(intent = %intent, error = %error, "reconciler error");
}
