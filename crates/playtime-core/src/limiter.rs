//! The limiter core
//!
//! Owns the session registry, the enforcement engine, the presentation
//! state, and the task scheduler, and exposes the entry points the host
//! drives: connect/disconnect events, the periodic `run_due` tick, and the
//! admin operations. All mutations happen on whatever single logical
//! context calls in; the core holds no threads of its own.

use crate::{
    display_action, BarColor, CoreAction, EnforcementEngine, PlayerDirectory, Scheduler,
    SessionRegistry, Task,
};
use chrono::{DateTime, Utc};
use playtime_config::LimiterConfig;
use playtime_store::UsageStore;
use playtime_util::{format_duration, local_day, until_next_midnight, PlayerId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

/// Last pushed presentation values for one player. Derived state, never
/// authoritative.
#[derive(Debug, Clone, PartialEq)]
pub struct ShownBar {
    pub title: String,
    pub progress: f64,
    pub color: BarColor,
}

/// Admin view of a player's usage today
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageReport {
    pub player: PlayerId,
    pub minutes_today: u32,
    /// `None` when the player is exempt (whitelist or bypass)
    pub limit: Option<i64>,
}

/// The limiter core
pub struct LimiterCore {
    cfg: Arc<LimiterConfig>,
    store: Arc<dyn UsageStore>,
    directory: Arc<dyn PlayerDirectory>,
    engine: EnforcementEngine,
    sessions: SessionRegistry,
    presentation: HashMap<PlayerId, ShownBar>,
    scheduler: Scheduler,
}

impl LimiterCore {
    pub fn new(
        cfg: Arc<LimiterConfig>,
        store: Arc<dyn UsageStore>,
        directory: Arc<dyn PlayerDirectory>,
        now: DateTime<Utc>,
    ) -> Self {
        let engine = EnforcementEngine::new(store.clone(), directory.clone());

        let mut core = Self {
            cfg,
            store,
            directory,
            engine,
            sessions: SessionRegistry::new(),
            presentation: HashMap::new(),
            scheduler: Scheduler::new(),
        };

        core.scheduler
            .register_recurring(Task::Flush, core.cfg.save_interval, now);
        core.scheduler
            .register_recurring(Task::Presentation, core.cfg.ui.update_interval, now);
        core.schedule_rollover(now);

        info!(
            daily_limit_minutes = core.cfg.daily_limit_minutes,
            zone = %core.cfg.timezone,
            "Limiter core initialized"
        );

        core
    }

    /// Current configuration snapshot
    pub fn config(&self) -> Arc<LimiterConfig> {
        self.cfg.clone()
    }

    /// Currently active players
    pub fn active_players(&self) -> Vec<PlayerId> {
        self.sessions.active()
    }

    /// Last pushed presentation values for a player, if any
    pub fn presentation_of(&self, player: &PlayerId) -> Option<&ShownBar> {
        self.presentation.get(player)
    }

    // Event entry points

    /// A player connected: baseline their session and enforce immediately.
    pub fn on_connect(&mut self, player: PlayerId, now: DateTime<Utc>) -> Vec<CoreAction> {
        self.sessions.begin(player, now);
        info!(player = %player, "Session started");

        let actions = self.engine.enforce(&self.cfg, &self.sessions, &player, now);
        self.track_presentation(&actions);
        actions
    }

    /// A player disconnected: fold elapsed time, persist, drop their
    /// presentation state. Safe to call twice; the second fold is zero.
    pub fn on_disconnect(&mut self, player: PlayerId, now: DateTime<Utc>) -> Vec<CoreAction> {
        let elapsed = self.sessions.end(&player, now);
        if elapsed > 0 {
            let day = local_day(now, self.cfg.timezone);
            self.store.add_minutes(day, &player, elapsed as i64);
        }
        self.save_store();

        info!(player = %player, elapsed_minutes = elapsed, "Session ended");

        match self.presentation.remove(&player) {
            Some(_) => vec![CoreAction::HideDisplay { player }],
            None => Vec::new(),
        }
    }

    // Periodic entry points

    /// Run every task that has come due. Called from the host's tick loop.
    pub fn run_due(&mut self, now: DateTime<Utc>) -> Vec<CoreAction> {
        let mut actions = Vec::new();
        for task in self.scheduler.due(now) {
            match task {
                Task::Flush => actions.extend(self.flush_all(now)),
                Task::Presentation => actions.extend(self.presentation_tick(now)),
                Task::Rollover => actions.extend(self.rollover(now)),
            }
        }
        actions
    }

    /// Fold elapsed session time into the store for every active player,
    /// enforce the limit for each, then persist. Per-player work is
    /// isolated; one player's outcome never blocks the rest of the pass.
    pub fn flush_all(&mut self, now: DateTime<Utc>) -> Vec<CoreAction> {
        let cfg = self.cfg.clone();
        let day = local_day(now, cfg.timezone);
        let mut actions = Vec::new();

        for player in self.sessions.active() {
            let elapsed = self.sessions.elapsed_since_flush(&player, now);
            if elapsed > 0 {
                self.store.add_minutes(day, &player, elapsed as i64);
                self.sessions.rebaseline(&player, now);
            }

            let player_actions = self.engine.enforce(&cfg, &self.sessions, &player, now);
            self.track_presentation(&player_actions);
            actions.extend(player_actions);
        }

        self.save_store();
        actions
    }

    /// Recompute remaining time for every active player and push display
    /// updates, without mutating the store. With the bar disabled, clears
    /// any existing presentation state instead.
    pub fn presentation_tick(&mut self, now: DateTime<Utc>) -> Vec<CoreAction> {
        let cfg = self.cfg.clone();

        if !cfg.ui.bossbar {
            return self
                .presentation
                .drain()
                .map(|(player, _)| CoreAction::HideDisplay { player })
                .collect();
        }

        let mut actions = Vec::new();
        for player in self.sessions.active() {
            let state = self.engine.limit_state(&cfg, &self.sessions, &player, now);
            let action = display_action(&cfg, player, &state);

            if matches!(action, CoreAction::HideDisplay { .. })
                && self.presentation.remove(&player).is_none()
            {
                continue; // nothing shown, nothing to hide
            }

            self.track_presentation(std::slice::from_ref(&action));
            actions.push(action);
        }
        actions
    }

    /// Midnight boundary: flush everyone, wipe the current date's records,
    /// reschedule for the following midnight. Rescheduling happens after
    /// firing so a missed or delayed fire does not compound.
    pub fn rollover(&mut self, now: DateTime<Utc>) -> Vec<CoreAction> {
        info!("Daily reset");

        let actions = self.flush_all(now);
        self.store.reset_day(local_day(now, self.cfg.timezone));
        self.save_store();
        self.schedule_rollover(now);
        actions
    }

    // Admin surface

    /// Resolve an identity string (UUID or display name). Malformed input
    /// yields `None`, never an error.
    pub fn resolve_player(&self, input: &str) -> Option<PlayerId> {
        PlayerId::parse(input).or_else(|| self.directory.lookup_name(input))
    }

    /// Today's stored usage for a player, with limit context
    pub fn usage_of(&self, player: &PlayerId, now: DateTime<Utc>) -> UsageReport {
        let day = local_day(now, self.cfg.timezone);
        let unlimited = self.directory.has_bypass(player) || self.cfg.is_whitelisted(player);

        UsageReport {
            player: *player,
            minutes_today: self.store.minutes(day, player),
            limit: (!unlimited).then_some(self.cfg.daily_limit_minutes),
        }
    }

    /// Administrative override of today's usage. If the player is
    /// connected, re-baselines their session and re-invokes enforcement
    /// immediately rather than waiting for the next flush.
    pub fn set_minutes(
        &mut self,
        player: PlayerId,
        minutes: i64,
        now: DateTime<Utc>,
    ) -> Vec<CoreAction> {
        let day = local_day(now, self.cfg.timezone);
        self.store.set_minutes(day, &player, minutes);
        self.save_store();

        info!(player = %player, minutes, "Usage override");

        if !self.sessions.is_active(&player) {
            return Vec::new();
        }

        self.sessions.rebaseline(&player, now);
        let actions = self.engine.enforce(&self.cfg, &self.sessions, &player, now);
        self.track_presentation(&actions);
        actions
    }

    /// Add a player to the exemption set. Returns false if already present.
    /// The caller persists the new whitelist to configuration storage.
    pub fn whitelist_add(&mut self, player: PlayerId) -> bool {
        if self.cfg.whitelist.contains(&player) {
            return false;
        }
        let mut cfg = (*self.cfg).clone();
        cfg.whitelist.insert(player);
        self.cfg = Arc::new(cfg);
        true
    }

    /// Remove a player from the exemption set. Returns false if absent.
    pub fn whitelist_remove(&mut self, player: &PlayerId) -> bool {
        if !self.cfg.whitelist.contains(player) {
            return false;
        }
        let mut cfg = (*self.cfg).clone();
        cfg.whitelist.remove(player);
        self.cfg = Arc::new(cfg);
        true
    }

    /// Current exemption set
    pub fn whitelist(&self) -> &HashSet<PlayerId> {
        &self.cfg.whitelist
    }

    /// Swap in a freshly loaded configuration snapshot, re-arming any
    /// scheduler whose cadence it changed.
    pub fn reload(&mut self, cfg: Arc<LimiterConfig>, now: DateTime<Utc>) {
        if self.scheduler.interval_of(Task::Flush) != Some(cfg.save_interval) {
            self.scheduler
                .register_recurring(Task::Flush, cfg.save_interval, now);
        }
        if self.scheduler.interval_of(Task::Presentation) != Some(cfg.ui.update_interval) {
            self.scheduler
                .register_recurring(Task::Presentation, cfg.ui.update_interval, now);
        }

        let zone_changed = cfg.timezone != self.cfg.timezone;
        self.cfg = cfg;
        if zone_changed {
            self.schedule_rollover(now);
        }

        info!(
            daily_limit_minutes = self.cfg.daily_limit_minutes,
            zone = %self.cfg.timezone,
            "Configuration reloaded"
        );
    }

    // Internals

    fn schedule_rollover(&mut self, now: DateTime<Utc>) {
        let delay = until_next_midnight(now, self.cfg.timezone);
        let at = now + chrono::Duration::milliseconds(delay.as_millis() as i64);
        self.scheduler.register_once_at(Task::Rollover, at);

        info!(delay = %format_duration(delay), "Next daily reset scheduled");
    }

    /// Persistence failures are non-fatal: memory stays authoritative and
    /// the next flush retries.
    fn save_store(&self) {
        if let Err(e) = self.store.save() {
            warn!(error = %e, "Could not save usage store, keeping in-memory state");
        }
    }

    fn track_presentation(&mut self, actions: &[CoreAction]) {
        for action in actions {
            match action {
                CoreAction::Display {
                    player,
                    title,
                    progress,
                    color,
                } => {
                    self.presentation.insert(
                        *player,
                        ShownBar {
                            title: title.clone(),
                            progress: *progress,
                            color: *color,
                        },
                    );
                }
                CoreAction::HideDisplay { player } => {
                    self.presentation.remove(player);
                }
                _ => {}
            }
        }
    }
}
