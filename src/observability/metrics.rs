//! Prometheus metrics.
//!
//! Emitted series:
//!
//! | Name | Kind | Labels |
//! |------|------|--------|
//! | `prompt_cache_hits_total` | counter | |
//! | `prompt_cache_misses_total` | counter | |
//! | `prompt_resolve_errors_total` | counter | `reason` |
//! | `prompt_resolve_duration_ms` | histogram | |
//! | `seed_files_rejected_total` | counter | |
//! | `sqlite_mutex_poison_recovery_total` | counter | |

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::thread;

use crate::config::{DEFAULT_METRICS_PORT, MetricsSettings};
use crate::{Error, Result};

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,
    /// Address to bind the metrics exporter.
    pub listen_addr: SocketAddr,
}

impl MetricsConfig {
    /// Builds metrics configuration from settings.
    #[must_use]
    pub fn from_settings(settings: &MetricsSettings) -> Self {
        let port = settings.port.unwrap_or(DEFAULT_METRICS_PORT);
        Self {
            enabled: settings.enabled.unwrap_or(false),
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port),
        }
    }
}

/// Installs the Prometheus recorder, with an HTTP listener when `expose` is set.
///
/// Returns `None` when metrics are disabled.
pub fn install_prometheus(config: &MetricsConfig, expose: bool) -> Result<Option<PrometheusHandle>> {
    if !config.enabled {
        return Ok(None);
    }

    let builder = PrometheusBuilder::new();
    let handle = if expose {
        install_listener(builder.with_http_listener(config.listen_addr))?
    } else {
        builder
            .install_recorder()
            .map_err(|e| Error::operation("metrics_recorder_install", e))?
    };

    tracing::info!(addr = %config.listen_addr, expose, "metrics recorder installed");
    Ok(Some(handle))
}

/// Runs the exporter on a dedicated single-threaded runtime.
fn install_listener(builder: PrometheusBuilder) -> Result<PrometheusHandle> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::operation("metrics_runtime_init", e))?;

    let (recorder, exporter) = {
        let _guard = runtime.enter();
        builder
            .build()
            .map_err(|e| Error::operation("metrics_exporter_build", e))?
    };
    let handle = recorder.handle();
    set_global_recorder(recorder)?;

    thread::Builder::new()
        .name("metrics-exporter-prometheus-http".to_string())
        .spawn(move || {
            if let Err(e) = runtime.block_on(exporter) {
                tracing::warn!(error = ?e, "metrics exporter stopped");
            }
        })
        .map_err(|e| Error::operation("metrics_runtime_thread", e))?;

    Ok(handle)
}

fn set_global_recorder(recorder: PrometheusRecorder) -> Result<()> {
    metrics::set_global_recorder(recorder).map_err(|e| Error::operation("metrics_recorder_install", e))
}
