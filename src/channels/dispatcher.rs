//! Polling loop that turns inbound envelopes into rule evaluations.
//!
//! Every poll cycle:
//! 1. Drain whatever is available from the inbound source
//! 2. Split it into envelopes according to the configured framing
//! 3. Spawn one independent evaluation task per envelope
//! 4. Sleep for the poll interval
//!
//! The loop never waits for the tasks it spawns. A semaphore caps how many
//! of them evaluate rules at the same time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::channels::framing::take_envelopes;
use crate::channels::inbound::InboundSource;
use crate::config::{Framing, PlumberConfig};
use crate::error::Error;
use crate::rules::{Outcome, RuleEngine};

/// Dispatcher settings taken from [`PlumberConfig`].
#[derive(Debug, Clone, Copy)]
pub struct DispatchSettings {
    pub poll_interval: Duration,
    pub framing: Framing,
    pub max_concurrent: usize,
}

impl From<&PlumberConfig> for DispatchSettings {
    fn from(config: &PlumberConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            framing: config.framing,
            max_concurrent: config.max_concurrent.max(1),
        }
    }
}

/// Spawn the polling loop.
///
/// Returns a `JoinHandle` and a shutdown flag. Set the flag to stop polling;
/// evaluations already spawned run to completion.
pub fn spawn_dispatcher<S>(
    mut source: S,
    engine: Arc<RuleEngine>,
    settings: DispatchSettings,
) -> (JoinHandle<()>, Arc<AtomicBool>)
where
    S: InboundSource + 'static,
{
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = Arc::clone(&shutdown);
    let permits = Arc::new(Semaphore::new(settings.max_concurrent));

    let handle = tokio::spawn(async move {
        info!(
            rules = %engine.rules_file().display(),
            interval_ms = settings.poll_interval.as_millis() as u64,
            framing = ?settings.framing,
            max_concurrent = settings.max_concurrent,
            "Dispatcher started"
        );

        let mut pending = Vec::new();

        loop {
            if shutdown.load(Ordering::Relaxed) {
                info!("Dispatcher shutting down");
                return;
            }

            match source.drain(&mut pending).await {
                Ok(0) => {}
                Ok(n) => debug!(bytes = n, "Drained inbound channel"),
                Err(e) => error!(error = %e, "Inbound channel read failed"),
            }

            for envelope in take_envelopes(settings.framing, &mut pending) {
                dispatch(envelope, &engine, &permits);
            }

            tokio::time::sleep(settings.poll_interval).await;
        }
    });

    (handle, shutdown_flag)
}

/// Hand one envelope to its own task.
fn dispatch(envelope: Vec<u8>, engine: &Arc<RuleEngine>, permits: &Arc<Semaphore>) {
    let engine = Arc::clone(engine);
    let permits = Arc::clone(permits);
    let span = info_span!("message", id = %Uuid::new_v4());

    tokio::spawn(
        async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            handle_envelope(&engine, &envelope).await;
        }
        .instrument(span),
    );
}

/// Evaluate one envelope and log how it went.
pub async fn handle_envelope(engine: &RuleEngine, raw: &[u8]) -> Option<Outcome> {
    match engine.process(raw).await {
        Ok(outcome) => {
            if outcome == Outcome::NoMatch {
                info!("No rule matched");
            }
            Some(outcome)
        }
        Err(Error::Message(e)) => {
            warn!(error = %e, bytes = raw.len(), "Dropped message");
            None
        }
        Err(e) => {
            error!(error = %e, "Message evaluation aborted");
            None
        }
    }
}
