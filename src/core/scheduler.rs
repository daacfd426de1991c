use crate::config::SchedulerConfig;
use crate::core::mailer::Mailer;
use crate::domain::model::{Registration, ReminderDay};
use crate::domain::ports::{DynClock, DynRegistrationStore};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of one scheduled run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total_users: usize,
    pub due_today: usize,
    pub groups: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Registrations whose reminder day is the weekday of `today`, in original order.
/// Each email appears at most once; the first row wins.
pub fn select_due<D: Datelike>(users: &[Registration], today: &D) -> Vec<Registration> {
    let today_index = today.weekday().num_days_from_sunday();
    let mut seen = HashSet::new();
    users
        .iter()
        .filter(|user| user.reminder_day.index() == today_index)
        .filter(|user| {
            let first = seen.insert(user.email.clone());
            if !first {
                tracing::warn!("Skipping duplicate registration for {}", user.email);
            }
            first
        })
        .cloned()
        .collect()
}

/// Fixed-size groups, order preserved. The last group may be short.
pub fn partition(users: Vec<Registration>, group_size: usize) -> Vec<Vec<Registration>> {
    let size = group_size.max(1);
    users.chunks(size).map(|chunk| chunk.to_vec()).collect()
}

pub struct BatchScheduler {
    store: DynRegistrationStore,
    mailer: Arc<Mailer>,
    group_size: usize,
    group_delay: Duration,
}

impl BatchScheduler {
    pub fn new(store: DynRegistrationStore, mailer: Arc<Mailer>, config: &SchedulerConfig) -> Self {
        Self {
            store,
            mailer,
            group_size: config.batch_size.max(1),
            group_delay: config.batch_delay(),
        }
    }

    /// Fetch everyone, keep today's reminders and send them in paced groups.
    /// A store failure yields an empty run.
    pub async fn run_daily_batch(&self, now: DateTime<Utc>) -> BatchReport {
        tracing::info!("🚀 Starting reminder batch for {}", now.date_naive());

        let users = match self.store.list_all().await {
            Ok(users) => users,
            Err(e) => {
                tracing::error!("❌ Could not fetch registrations, skipping run: {}", e);
                Vec::new()
            }
        };

        self.dispatch_batch(&users, now).await
    }

    pub async fn dispatch_batch(&self, users: &[Registration], now: DateTime<Utc>) -> BatchReport {
        let today = now.date_naive();
        let due = select_due(users, &today);
        let groups = partition(due, self.group_size);

        let mut report = BatchReport {
            total_users: users.len(),
            due_today: groups.iter().map(Vec::len).sum(),
            groups: groups.len(),
            ..BatchReport::default()
        };

        tracing::info!(
            "👥 {} registrations, {} due on {} in {} group(s)",
            report.total_users,
            report.due_today,
            ReminderDay::of(&today),
            report.groups
        );

        let last = groups.len().saturating_sub(1);
        for (i, group) in groups.iter().enumerate() {
            let results = join_all(group.iter().map(|user| self.mailer.send_daily(user, now))).await;

            for (user, result) in group.iter().zip(&results) {
                if result.success {
                    report.delivered += 1;
                } else {
                    report.failed += 1;
                    tracing::warn!(
                        "Reminder for {} not delivered: {}",
                        user.email,
                        result.error.as_deref().unwrap_or("unknown error")
                    );
                }
            }

            if i < last {
                tokio::time::sleep(self.group_delay).await;
            }
        }

        tracing::info!(
            "✅ Batch finished: {} delivered, {} failed",
            report.delivered,
            report.failed
        );
        report
    }
}

/// Time until the next occurrence of `at` (UTC), strictly after `now`.
pub fn until_next_run(now: DateTime<Utc>, at: NaiveTime) -> Duration {
    let today = now.date_naive().and_time(at).and_utc();
    let next = if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    };
    (next - now).to_std().unwrap_or_default()
}

/// Fires the batch once a day at a fixed time. Never returns.
pub struct DailyTrigger {
    scheduler: Arc<BatchScheduler>,
    clock: DynClock,
    run_at: NaiveTime,
}

impl DailyTrigger {
    pub fn new(scheduler: Arc<BatchScheduler>, clock: DynClock, run_at: NaiveTime) -> Self {
        Self {
            scheduler,
            clock,
            run_at,
        }
    }

    pub fn next_wait(&self) -> Duration {
        until_next_run(self.clock.now(), self.run_at)
    }

    /// Runs the batch unless `last_run` already holds today's date.
    pub async fn tick(&self, last_run: &mut Option<NaiveDate>) -> Option<BatchReport> {
        let now = self.clock.now();
        let today = now.date_naive();
        if *last_run == Some(today) {
            tracing::warn!("Batch for {} already ran, skipping", today);
            return None;
        }
        *last_run = Some(today);
        Some(self.scheduler.run_daily_batch(now).await)
    }

    pub async fn run(self) {
        let mut last_run = None;
        loop {
            let wait = self.next_wait();
            tracing::info!("⏰ Next reminder batch in {}s", wait.as_secs());
            tokio::time::sleep(wait).await;

            if let Some(report) = self.tick(&mut last_run).await {
                tracing::debug!("Batch report: {:?}", report);
            }
        }
    }
}
