//! ---
//! ufs_section: "01-core-functionality"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Runtime helpers supporting the session runtime."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;
use ufs_common::time::duration_to_micros;

/// Fixed-period interval whose first tick lands one full period after
/// creation.
#[derive(Debug)]
pub struct RateLimiter {
    interval: tokio::time::Interval,
}

impl RateLimiter {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }

    /// Wait for the next tick and return the instant it was scheduled for.
    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }
}

/// One timer expiry, tagged with the schedule it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub generation: u64,
    pub scheduled_at: Instant,
    pub fired_at: Instant,
}

impl TimerFired {
    pub fn lateness(&self) -> Duration {
        self.fired_at.saturating_duration_since(self.scheduled_at)
    }
}

/// Owns at most one repeating timer that feeds a bounded queue.
///
/// Every change of period aborts the running timer, spawns a fresh one and
/// bumps the generation. Fires from an older generation may still sit in the
/// queue; consumers drop them with [`TickScheduler::is_current`].
#[derive(Debug)]
pub struct TickScheduler<M> {
    tx: mpsc::Sender<M>,
    period: Option<Duration>,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl<M> TickScheduler<M>
where
    M: From<TimerFired> + Send + 'static,
{
    pub fn new(tx: mpsc::Sender<M>) -> Self {
        Self {
            tx,
            period: None,
            generation: 0,
            task: None,
        }
    }

    /// Move to `period`, or stop the timer with `None`. Returns whether a
    /// reschedule happened; an unchanged period keeps the running timer.
    pub fn set_period(&mut self, period: Option<Duration>) -> bool {
        if self.period == period {
            return false;
        }
        self.abort_task();
        self.generation += 1;
        self.period = period;
        if let Some(period) = period {
            self.task = Some(spawn_timer(self.tx.clone(), period, self.generation));
        }
        debug!(
            generation = self.generation,
            period_us = period.map(duration_to_micros),
            "tick schedule updated"
        );
        true
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.period.is_some() && generation == self.generation
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn stop(&mut self) {
        self.set_period(None);
    }
}

impl<M> TickScheduler<M> {
    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<M> Drop for TickScheduler<M> {
    fn drop(&mut self) {
        self.abort_task();
    }
}

fn spawn_timer<M>(tx: mpsc::Sender<M>, period: Duration, generation: u64) -> JoinHandle<()>
where
    M: From<TimerFired> + Send + 'static,
{
    tokio::spawn(async move {
        let mut limiter = RateLimiter::new(period);
        loop {
            let scheduled_at = limiter.tick().await;
            let fired = TimerFired {
                generation,
                scheduled_at,
                fired_at: Instant::now(),
            };
            if tx.send(M::from(fired)).await.is_err() {
                break;
            }
        }
    })
}
