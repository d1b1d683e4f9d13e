//! Enforcement engine
//!
//! The single place limit policy is applied. Stateless between calls: each
//! invocation recomputes a player's state from the usage store, the session
//! registry, and the configuration snapshot, then returns the actions that
//! follow from it. Persisted warned-flags are the only memory it keeps,
//! and those live in the store.

use crate::{display_action, CoreAction, PlayerDirectory, SessionRegistry};
use chrono::{DateTime, Utc};
use playtime_config::LimiterConfig;
use playtime_store::UsageStore;
use playtime_util::{local_day, PlayerId};
use std::sync::Arc;
use tracing::info;

/// Per-invocation limit state of one player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitState {
    /// Whitelisted or holding the bypass grant: unbounded remaining
    Unlimited,

    /// Under the cap with this many whole minutes left
    Active { remaining: i64 },

    /// Cap reached or passed
    Exceeded,
}

impl LimitState {
    /// Remaining minutes as displayed: 0 once exceeded, and 0 for
    /// unlimited players, who are rendered separately
    pub fn remaining_minutes(&self) -> i64 {
        match self {
            LimitState::Active { remaining } => *remaining,
            _ => 0,
        }
    }
}

/// The enforcement engine
pub struct EnforcementEngine {
    store: Arc<dyn UsageStore>,
    directory: Arc<dyn PlayerDirectory>,
}

impl EnforcementEngine {
    pub fn new(store: Arc<dyn UsageStore>, directory: Arc<dyn PlayerDirectory>) -> Self {
        Self { store, directory }
    }

    /// Compute a player's limit state without any side effects. Used by the
    /// presentation ticker and the admin surface.
    pub fn limit_state(
        &self,
        cfg: &LimiterConfig,
        sessions: &SessionRegistry,
        player: &PlayerId,
        now: DateTime<Utc>,
    ) -> LimitState {
        if self.directory.has_bypass(player) || cfg.is_whitelisted(player) {
            return LimitState::Unlimited;
        }

        let day = local_day(now, cfg.timezone);
        let used = self.store.minutes(day, player) as i64
            + sessions.elapsed_since_flush(player, now) as i64;
        let remaining = cfg.daily_limit_minutes - used;

        if remaining <= 0 {
            LimitState::Exceeded
        } else {
            LimitState::Active { remaining }
        }
    }

    /// Apply limit policy to one player: emit due warnings (marking them so
    /// each threshold fires at most once per day) and, when the cap is
    /// reached, the broadcast and the kick. Always includes a fresh display
    /// update so presentation is never stale after an enforcement decision.
    ///
    /// A threshold is due only when remaining equals it exactly; thresholds
    /// stepped over between two flushes are not warned retroactively.
    pub fn enforce(
        &self,
        cfg: &LimiterConfig,
        sessions: &SessionRegistry,
        player: &PlayerId,
        now: DateTime<Utc>,
    ) -> Vec<CoreAction> {
        let state = self.limit_state(cfg, sessions, player, now);
        let mut actions = vec![display_action(cfg, *player, &state)];

        if state == LimitState::Unlimited {
            return actions;
        }

        let day = local_day(now, cfg.timezone);
        let remaining = state.remaining_minutes();

        for &threshold in &cfg.warnings {
            if remaining == threshold && !self.store.is_warned(day, player, threshold) {
                self.store.mark_warned(day, player, threshold);

                info!(player = %player, threshold, "Warning issued");

                actions.push(CoreAction::Warn {
                    player: *player,
                    threshold,
                    remaining,
                    chat: format!("You have {} minutes left today.", remaining),
                    actionbar: cfg.ui.actionbar_on_warn.then(|| {
                        cfg.ui.actionbar.replace("{remaining}", &remaining.to_string())
                    }),
                });
            }
        }

        if state == LimitState::Exceeded {
            let name = self
                .directory
                .display_name(player)
                .unwrap_or_else(|| player.to_string());

            info!(player = %player, name = %name, "Daily limit reached, evicting");

            actions.push(CoreAction::Broadcast {
                message: cfg.broadcast.replace("{player}", &name),
            });
            actions.push(CoreAction::Kick {
                player: *player,
                message: cfg.kick_message.clone(),
            });
        }

        actions
    }
}
