//! Live population of simulated visitors plus the single local visitor.
//!
//! All spawning and eviction is deferred through a virtual-time [`TaskQueue`] that is
//! drained by [`PopulationManager::tick`] against the injected [`Clock`].

use crate::core::scheduler::{saturating_offset, SimTask, SystemClock, TaskHandle, TaskQueue};
use crate::core::traits::Clock;
use crate::dashboard::metrics::{synthesize_business_metrics, BusinessMetrics};
use crate::population::insights::{aggregate_insights, VisitorInsights};
use crate::visitors::model::{
    ActionKind, DeviceType, PageView, PredictedNavigation, VisitorAction, VisitorProfile,
};
use crate::visitors::prediction::predict_navigation;
use crate::visitors::profile::ProfileGenerator;
use crate::visitors::scoring::engagement_score;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::VecDeque;
use uuid::Uuid;

/// Scheduling constants for the population.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationSettings {
    /// Oldest members drop off once the roster grows past this size.
    pub roster_capacity: usize,
    pub spawn_interval: Duration,
    pub metrics_interval: Duration,
    pub initial_burst: usize,
    pub initial_stagger: Duration,
    pub burst_size: usize,
    pub burst_stagger: Duration,
    /// Upper bound (exclusive) of the random delay added to each eviction.
    pub eviction_jitter: Duration,
    /// Absolute cap on a member's time in the roster.
    pub max_session: Duration,
}

impl Default for PopulationSettings {
    fn default() -> Self {
        Self {
            roster_capacity: 25,
            spawn_interval: Duration::seconds(12),
            metrics_interval: Duration::seconds(30),
            initial_burst: 6,
            initial_stagger: Duration::milliseconds(800),
            burst_size: 5,
            burst_stagger: Duration::milliseconds(400),
            eviction_jitter: Duration::seconds(30),
            max_session: Duration::minutes(5),
        }
    }
}

/// Delay of the `idx`-th member of a staggered batch, saturating on overflow.
fn stagger_delay(step: Duration, idx: usize) -> Duration {
    i32::try_from(idx)
        .ok()
        .and_then(|idx| step.checked_mul(idx))
        .unwrap_or(Duration::MAX)
}

/// Environment readings used once when the local visitor is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSnapshot {
    pub current_path: String,
    pub viewport_width: u32,
}

/// Roster member with its lifecycle bookkeeping.
#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub profile: VisitorProfile,
    pub spawned_at: DateTime<Utc>,
    pub evict_at: DateTime<Utc>,
    eviction: TaskHandle,
}

/// Point-in-time view of the population for presentation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationSnapshot {
    pub timestamp: DateTime<Utc>,
    pub roster_size: usize,
    pub insights: VisitorInsights,
    pub predictions: Vec<PredictedNavigation>,
    pub local_visitor: Option<VisitorProfile>,
    pub roster: Vec<VisitorProfile>,
    pub metrics: Option<BusinessMetrics>,
}

/// Owns the local visitor, the bounded roster and every pending timer.
pub struct PopulationManager<C: Clock = SystemClock> {
    clock: C,
    rng: StdRng,
    settings: PopulationSettings,
    generator: ProfileGenerator,
    tasks: TaskQueue,
    roster: VecDeque<RosterEntry>,
    local: Option<VisitorProfile>,
    metrics: Option<BusinessMetrics>,
    started: bool,
    stopped: bool,
}

impl<C: Clock> PopulationManager<C> {
    /// Creates an idle manager. Nothing is scheduled until [`start`](Self::start).
    pub fn new(clock: C, settings: PopulationSettings, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            clock,
            rng,
            settings,
            generator: ProfileGenerator::new(),
            tasks: TaskQueue::new(),
            roster: VecDeque::new(),
            local: None,
            metrics: None,
            started: false,
            stopped: false,
        }
    }

    /// Arms the initial staggered burst, the spawn cadence and the metrics refresh.
    pub fn start(&mut self) {
        if self.started || self.stopped {
            return;
        }
        self.started = true;
        let now = self.clock.now();
        for idx in 0..self.settings.initial_burst {
            let delay = stagger_delay(self.settings.initial_stagger, idx);
            self.tasks.schedule_in(now, delay, SimTask::Spawn);
        }
        self.tasks
            .schedule_in(now, self.settings.spawn_interval, SimTask::SpawnTick);
        self.tasks
            .schedule_in(now, self.settings.metrics_interval, SimTask::RefreshMetrics);
        self.metrics = Some(synthesize_business_metrics(&mut self.rng, now));
        tracing::info!(
            "population started: capacity={} initial_burst={}",
            self.settings.roster_capacity,
            self.settings.initial_burst
        );
    }

    /// Runs every task due at or before the clock's current time.
    ///
    /// Each task runs at its own due instant. Returns the number of tasks applied.
    pub fn tick(&mut self) -> usize {
        if self.stopped {
            return 0;
        }
        let until = self.clock.now();
        let mut applied = 0;
        while let Some((due, task)) = self.tasks.pop_due(until) {
            self.apply(task, due);
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, task: SimTask, at: DateTime<Utc>) {
        match task {
            SimTask::Spawn => {
                self.spawn_at(at);
            }
            SimTask::SpawnTick => {
                self.spawn_at(at);
                self.tasks
                    .schedule_in(at, self.settings.spawn_interval, SimTask::SpawnTick);
            }
            SimTask::Evict { visitor_id } => {
                self.remove_member(visitor_id);
            }
            SimTask::RefreshMetrics => {
                self.metrics = Some(synthesize_business_metrics(&mut self.rng, at));
                self.tasks
                    .schedule_in(at, self.settings.metrics_interval, SimTask::RefreshMetrics);
            }
        }
    }

    /// Generates and inserts one roster member now. `None` once shut down.
    pub fn spawn(&mut self) -> Option<Uuid> {
        if self.stopped {
            return None;
        }
        let now = self.clock.now();
        Some(self.spawn_at(now))
    }

    fn spawn_at(&mut self, at: DateTime<Utc>) -> Uuid {
        let profile = self.generator.generate(&mut self.rng, at);
        let id = profile.id;
        let delay = eviction_delay(&profile, &self.settings, &mut self.rng);
        let eviction = self
            .tasks
            .schedule_in(at, delay, SimTask::Evict { visitor_id: id });
        self.roster.push_back(RosterEntry {
            profile,
            spawned_at: at,
            evict_at: saturating_offset(at, delay),
            eviction,
        });
        tracing::debug!(
            "spawned visitor {id}, evicting in {}ms",
            delay.num_milliseconds()
        );

        while self.roster.len() > self.settings.roster_capacity {
            if let Some(dropped) = self.roster.pop_front() {
                self.tasks.cancel(dropped.eviction);
                tracing::debug!("roster full, dropped oldest visitor {}", dropped.profile.id);
            }
        }
        id
    }

    /// Removes a roster member ahead of its timer. Returns whether it was present.
    pub fn evict(&mut self, visitor_id: Uuid) -> bool {
        match self.remove_member(visitor_id) {
            Some(entry) => {
                self.tasks.cancel(entry.eviction);
                true
            }
            None => false,
        }
    }

    fn remove_member(&mut self, visitor_id: Uuid) -> Option<RosterEntry> {
        let idx = self
            .roster
            .iter()
            .position(|entry| entry.profile.id == visitor_id)?;
        let entry = self.roster.remove(idx)?;
        tracing::debug!("evicted visitor {visitor_id}");
        Some(entry)
    }

    /// Enqueues a staggered batch of new members and regenerates the metrics snapshot.
    pub fn simulate_burst(&mut self) {
        if self.stopped {
            return;
        }
        let now = self.clock.now();
        for idx in 0..self.settings.burst_size {
            let delay = stagger_delay(self.settings.burst_stagger, idx);
            self.tasks.schedule_in(now, delay, SimTask::Spawn);
        }
        self.metrics = Some(synthesize_business_metrics(&mut self.rng, now));
        tracing::info!("burst of {} visitors queued", self.settings.burst_size);
    }

    /// Cancels every pending timer. Later ticks, bursts and spawns do nothing.
    pub fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        let dropped = self.tasks.cancel_all();
        tracing::info!("population stopped, cancelled {dropped} pending tasks");
    }

    /// Returns the local visitor, creating it from the environment on first use.
    pub fn ensure_local_visitor(&mut self, env: &EnvironmentSnapshot) -> &VisitorProfile {
        let now = self.clock.now();
        let generator = &self.generator;
        let rng = &mut self.rng;
        self.local.get_or_insert_with(|| {
            let mut visitor = generator.generate(rng, now);
            visitor.device_type = DeviceType::from_viewport_width(env.viewport_width);
            visitor.current_page = env.current_path.clone();
            visitor.entry_time = now;
            visitor.page_views = vec![PageView {
                page: env.current_path.clone(),
                timestamp: now,
                time_spent: 0,
                scroll_depth: 0,
                interactions: 0,
            }];
            tracing::info!(
                "local visitor {} created on {} ({:?})",
                visitor.id,
                visitor.current_page,
                visitor.device_type
            );
            visitor
        })
    }

    pub fn local_visitor(&self) -> Option<&VisitorProfile> {
        self.local.as_ref()
    }

    /// Records an action for the local visitor and recomputes its score.
    ///
    /// Does nothing before the local visitor exists.
    pub fn record_action(&mut self, action: VisitorAction) {
        let Some(local) = self.local.as_mut() else {
            tracing::debug!("dropping {:?} action: no local visitor yet", action.kind);
            return;
        };
        if action.kind == ActionKind::Pageview {
            local.page_views.push(PageView {
                page: action.page.clone(),
                timestamp: action.timestamp,
                time_spent: 0,
                scroll_depth: 0,
                interactions: 0,
            });
            local.current_page = action.page.clone();
        }
        local.actions.push(action);
        local.lead_score = engagement_score(&local.actions);
    }

    /// Next-page predictions for the local visitor; empty before it exists.
    pub fn predicted_navigation(&self) -> Vec<PredictedNavigation> {
        self.local
            .as_ref()
            .map(predict_navigation)
            .unwrap_or_default()
    }

    pub fn insights(&self) -> VisitorInsights {
        aggregate_insights(self.roster(), self.local.as_ref())
    }

    /// Current metrics snapshot, generated on first request.
    pub fn business_metrics(&mut self) -> &BusinessMetrics {
        let now = self.clock.now();
        let rng = &mut self.rng;
        self.metrics
            .get_or_insert_with(|| synthesize_business_metrics(rng, now))
    }

    pub fn roster(&self) -> impl Iterator<Item = &VisitorProfile> + '_ {
        self.roster.iter().map(|entry| &entry.profile)
    }

    pub fn roster_entries(&self) -> impl Iterator<Item = &RosterEntry> + '_ {
        self.roster.iter()
    }

    /// Owned copy of the roster, oldest first.
    pub fn roster_snapshot(&self) -> Vec<VisitorProfile> {
        self.roster().cloned().collect()
    }

    pub fn roster_len(&self) -> usize {
        self.roster.len()
    }

    pub fn snapshot(&self) -> PopulationSnapshot {
        PopulationSnapshot {
            timestamp: self.clock.now(),
            roster_size: self.roster.len(),
            insights: self.insights(),
            predictions: self.predicted_navigation(),
            local_visitor: self.local.clone(),
            roster: self.roster_snapshot(),
            metrics: self.metrics.clone(),
        }
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_running(&self) -> bool {
        self.started && !self.stopped
    }

    pub fn settings(&self) -> &PopulationSettings {
        &self.settings
    }

}

impl<C: Clock> Drop for PopulationManager<C> {
    fn drop(&mut self) {
        self.tasks.cancel_all();
    }
}

/// Time a member stays in the roster: its summed dwell time plus jitter, capped.
fn eviction_delay(
    profile: &VisitorProfile,
    settings: &PopulationSettings,
    rng: &mut impl Rng,
) -> Duration {
    let dwell_ms = i64::try_from(profile.total_time_spent())
        .unwrap_or(i64::MAX / 1000)
        .saturating_mul(1000);
    let jitter_ms = settings.eviction_jitter.num_milliseconds();
    let jitter = if jitter_ms > 0 {
        rng.gen_range(0..jitter_ms)
    } else {
        0
    };
    let delay = Duration::milliseconds(dwell_ms.saturating_add(jitter));
    delay.min(settings.max_session)
}
