use std::time::Duration;

use ap_core::config::ScheduleConfig;
use ap_core::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{error, info};

use crate::manager::CycleReport;

/// One unit of scheduled work.
#[async_trait]
pub trait Cycle: Send {
    async fn run_cycle(&mut self) -> Result<CycleReport>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Running,
}

/// Runs cycles back to back with a random pause in between, until interrupted.
pub struct Scheduler {
    min_interval: Duration,
    max_interval: Duration,
    state: CycleState,
    rng: StdRng,
}

impl Scheduler {
    pub fn new(config: &ScheduleConfig) -> Self {
        Self {
            min_interval: config.min_interval,
            max_interval: config.max_interval,
            state: CycleState::Idle,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Uniform in `[min_interval, max_interval]`, at millisecond resolution.
    pub fn next_delay(&mut self) -> Duration {
        let min = duration_millis(self.min_interval);
        let max = duration_millis(self.max_interval);
        if min >= max {
            return self.min_interval;
        }
        Duration::from_millis(self.rng.gen_range(min..=max))
    }

    /// Runs until ctrl-c, or until `max_cycles` cycles have finished. Errors
    /// from a cycle are logged and never stop the loop. Returns the number of
    /// cycles that finished.
    pub async fn run<C: Cycle + ?Sized>(&mut self, cycle: &mut C, max_cycles: Option<usize>) -> usize {
        let mut finished = 0;

        loop {
            let number = finished + 1;
            self.state = CycleState::Running;
            info!("🚀 Starting cycle {}", number);

            let result = tokio::select! {
                result = cycle.run_cycle() => result,
                _ = tokio::signal::ctrl_c() => {
                    info!("🛑 Interrupted during cycle {}", number);
                    self.state = CycleState::Idle;
                    break;
                }
            };

            match result {
                Ok(report) => info!("🏁 Cycle {} finished: {}", number, report.summary()),
                Err(e) => error!("❌ Cycle {} failed: {}", number, e),
            }
            self.state = CycleState::Idle;
            finished += 1;

            if max_cycles.is_some_and(|max| finished >= max) {
                break;
            }

            let delay = self.next_delay();
            info!("😴 Next cycle in {} minutes", delay.as_secs() / 60);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("🛑 Interrupted, stopping");
                    break;
                }
            }
        }

        finished
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
