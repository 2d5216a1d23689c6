use chrono::Local;
use std::time::Duration;
use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle, time};

use crate::state::StateUpdate;

pub const CLOCK_PERIOD: Duration = Duration::from_secs(60);

/// Owns the clock task. Dropping the handle cancels it.
#[derive(Debug)]
pub struct ClockHandle {
    task: JoinHandle<()>,
}

impl ClockHandle {
    pub fn stop(self) {}

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ClockHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Emit [`StateUpdate::Tick`] every `period`, starting one period from now.
pub fn spawn_clock(tx: UnboundedSender<StateUpdate>, period: Duration) -> ClockHandle {
    let task = tokio::spawn(async move {
        let mut ticker = time::interval_at(time::Instant::now() + period, period);
        loop {
            ticker.tick().await;
            if tx.send(StateUpdate::Tick(Local::now())).is_err() {
                tracing::debug!("clock receiver gone, stopping");
                break;
            }
        }
    });

    ClockHandle { task }
}
