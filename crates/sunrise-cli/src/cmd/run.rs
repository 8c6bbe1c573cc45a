use anyhow::Context;
use std::path::Path;
use sunrise_core::command::SystemLauncher;
use sunrise_core::orchestrator::{Orchestrator, TickOutcome};
use tokio::signal;
use tokio::time::{Instant, MissedTickBehavior};

use super::load_settings;

type Daemon = Orchestrator<SystemLauncher>;

pub fn run(config_path: &Path, once: bool) -> anyhow::Result<()> {
    let settings = load_settings(config_path)?;
    tracing::info!(
        config = %config_path.display(),
        log = %settings.log_path.display(),
        trigger = %settings.trigger,
        interval_secs = settings.check_interval.as_secs(),
        restart = settings.restart.is_some(),
        "starting sunrise monitoring service"
    );

    let mut daemon = Orchestrator::new(settings, SystemLauncher::new());
    if once {
        let outcome = daemon.tick().context("log check failed")?;
        log_outcome(&outcome);
        return Ok(());
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(watch(daemon))
}

/// Tick on a fixed interval until a shutdown signal arrives.
///
/// Each tick runs to completion on the blocking pool before the interval is
/// polled again, so ticks never overlap. Signals are honored between ticks.
async fn watch(mut daemon: Daemon) -> anyhow::Result<()> {
    let period = daemon.settings().check_interval;
    let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("stopping sunrise monitoring service");
                return Ok(());
            }
            _ = ticks.tick() => {}
        }

        let (returned, outcome) = tokio::task::spawn_blocking(move || {
            let outcome = daemon.tick();
            (daemon, outcome)
        })
        .await
        .context("log check panicked")?;
        daemon = returned;

        let outcome = outcome.context("log check failed")?;
        log_outcome(&outcome);
    }
}

fn log_outcome(outcome: &TickOutcome) {
    match outcome {
        TickOutcome::NoTrigger => tracing::debug!("display is not missing"),
        TickOutcome::AlreadyHandled => tracing::debug!("display missing error already handled"),
        TickOutcome::Remediated { wake, restart, .. } => tracing::info!(
            wake_ok = wake.is_success(),
            restarted = restart.as_ref().map_or(false, |r| r.started),
            "recovery sequence finished"
        ),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "unable to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C"),
        _ = terminate => tracing::info!("received SIGTERM"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn shutdown_signal_waits_for_a_signal() {
        let result = timeout(Duration::from_millis(10), shutdown_signal()).await;
        assert!(result.is_err());
    }
}
