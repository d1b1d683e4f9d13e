//! Presentation update computation
//!
//! Turns a limit state into the data a progress bar needs: a title from the
//! configured template, a progress fraction clamped to [0, 1], and a color
//! from the two configured thresholds. Unlimited players get a distinct
//! unbounded representation. Rendering itself is the host's job.

use crate::{BarColor, CoreAction, LimitState};
use playtime_config::LimiterConfig;
use playtime_util::PlayerId;

/// Compute the display action for a player in the given limit state.
/// Returns `HideDisplay` when the bar is disabled or the configured limit
/// cannot be rendered as a fraction (non-positive, without an exemption).
pub fn display_action(cfg: &LimiterConfig, player: PlayerId, state: &LimitState) -> CoreAction {
    let unlimited = matches!(state, LimitState::Unlimited);

    if !cfg.ui.bossbar || (cfg.daily_limit_minutes <= 0 && !unlimited) {
        return CoreAction::HideDisplay { player };
    }

    if unlimited {
        return CoreAction::Display {
            player,
            title: cfg.ui.title.replace("{remaining}", "∞"),
            progress: 1.0,
            color: BarColor::Blue,
        };
    }

    let remaining = state.remaining_minutes();
    let progress = (remaining as f64 / cfg.daily_limit_minutes as f64).clamp(0.0, 1.0);
    let color = if remaining > cfg.ui.green_above_minutes {
        BarColor::Green
    } else if remaining > cfg.ui.yellow_above_minutes {
        BarColor::Yellow
    } else {
        BarColor::Red
    };

    CoreAction::Display {
        player,
        title: cfg.ui.title.replace("{remaining}", &remaining.to_string()),
        progress,
        color,
    }
}
