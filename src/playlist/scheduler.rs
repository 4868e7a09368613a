use crate::playlist::engine::{PlaylistEngine, SchedulerStatus, TickOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

/// Periodic driver of the [`PlaylistEngine`]
///
/// The engine sits behind a single lock held for an entire tick, manifest
/// writes included, so ticks never overlap: a slow tick only delays the next.
/// Readers outside the scheduler get a [`SchedulerStatus`] through a watch
/// channel and never touch the lock.
pub struct Scheduler {
    engine: Arc<Mutex<PlaylistEngine>>,
    tick_interval: Duration,
    startup_delay: Duration,
    status: watch::Sender<SchedulerStatus>,
}

impl Scheduler {
    pub fn new(
        engine: PlaylistEngine,
        tick_interval: Duration,
        startup_delay: Duration,
    ) -> (Self, watch::Receiver<SchedulerStatus>) {
        let (status, receiver) = watch::channel(engine.status());
        let scheduler = Self {
            engine: Arc::new(Mutex::new(engine)),
            tick_interval,
            startup_delay,
            status,
        };
        (scheduler, receiver)
    }

    /// Run one tick under the lock and publish the resulting status
    pub async fn tick_once(&self) -> TickOutcome {
        let mut engine = self.engine.lock().await;
        let outcome = engine.tick().await;
        self.status.send_replace(engine.status());
        debug!("Tick {} → {:?}", engine.ticks(), outcome);
        outcome
    }

    /// Tick until every window is full so the first manifests players see are complete
    pub async fn prime(&self) {
        let window_size = self.engine.lock().await.window_size();
        for _ in 0..window_size {
            self.tick_once().await;
        }
        info!("Primed live windows with {} tick(s)", window_size);
    }

    /// Shared handle to the engine, for inspection
    pub fn engine(&self) -> Arc<Mutex<PlaylistEngine>> {
        Arc::clone(&self.engine)
    }

    /// Tick forever at the configured interval
    pub async fn run(self) {
        if !self.startup_delay.is_zero() {
            info!(
                "Waiting {:?} before starting manifest updates",
                self.startup_delay
            );
            tokio::time::sleep(self.startup_delay).await;
        }

        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Manifest updates every {:?}", self.tick_interval);

        loop {
            ticker.tick().await;
            self.tick_once().await;
        }
    }
}
