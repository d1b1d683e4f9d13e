//! playtimed - daily playtime limiter daemon
//!
//! Wires the pieces together: configuration loading, the JSON usage store,
//! the limiter core, and the stdin/stdout JSON-lines protocol the game
//! server side speaks. A tick timer drives the core's scheduled passes;
//! SIGTERM/SIGINT/SIGHUP flush every open session and save before exit.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use playtime_config::{load_config, persist_daily_limit, persist_whitelist};
use playtime_core::{InMemoryDirectory, LimiterCore};
use playtime_store::JsonFileStore;
use playtime_util::{default_config_path, default_data_dir, PlayerId, PlaytimeError};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod proto;

use proto::{Inbound, Outbound};

/// playtimed - daily playtime limiter daemon
#[derive(Parser, Debug)]
#[command(name = "playtimed")]
#[command(about = "Daily playtime limiter daemon", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/playtimed/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory override (or set PLAYTIME_DATA_DIR env var)
    #[arg(short, long, env = "PLAYTIME_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Main service state
struct Service {
    core: LimiterCore,
    directory: Arc<InMemoryDirectory>,
    config_path: PathBuf,
}

impl Service {
    fn new(args: &Args, now: DateTime<Utc>) -> Result<Self> {
        let cfg = load_config(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;

        info!(
            config_path = %args.config.display(),
            daily_limit_minutes = cfg.daily_limit_minutes,
            "Configuration loaded"
        );

        let data_dir = args.data_dir.clone().unwrap_or_else(default_data_dir);
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        let store_path = data_dir.join("players.json");
        let store = Arc::new(JsonFileStore::open(&store_path));

        info!(store_path = %store_path.display(), "Usage store opened");

        let directory = Arc::new(InMemoryDirectory::new());
        let core = LimiterCore::new(Arc::new(cfg), store, directory.clone(), now);

        Ok(Self {
            core,
            directory,
            config_path: args.config.clone(),
        })
    }

    /// Scheduled passes (flush, presentation, rollover)
    fn tick(&mut self, now: DateTime<Utc>) -> Vec<Outbound> {
        self.core
            .run_due(now)
            .into_iter()
            .map(Outbound::action)
            .collect()
    }

    /// Handle one protocol line. Returns the replies plus whether the
    /// service should shut down.
    fn handle_line(&mut self, line: &str, now: DateTime<Utc>) -> (Vec<Outbound>, bool) {
        let msg: Inbound = match serde_json::from_str(line) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, "Unparseable protocol line");
                return (vec![Outbound::error(format!("Bad message: {}", e))], false);
            }
        };

        match msg {
            Inbound::Connect { player, name } => {
                if let Some(name) = name {
                    self.directory.register(player, &name);
                }
                (to_wire(self.core.on_connect(player, now)), false)
            }

            Inbound::Disconnect { player } => {
                (to_wire(self.core.on_disconnect(player, now)), false)
            }

            Inbound::GrantBypass { player } => {
                self.directory.grant_bypass(player);
                (vec![Outbound::ack(format!("Bypass granted to {}", player))], false)
            }

            Inbound::RevokeBypass { player } => {
                self.directory.revoke_bypass(&player);
                // Revocation takes effect on the next enforcement pass
                (vec![Outbound::ack(format!("Bypass revoked from {}", player))], false)
            }

            Inbound::GetUsage { player } => {
                let Some(id) = self.core.resolve_player(&player) else {
                    return (vec![not_found(&player)], false);
                };
                let report = self.core.usage_of(&id, now);
                (
                    vec![Outbound::Usage {
                        player: report.player,
                        minutes_today: report.minutes_today,
                        limit: report.limit,
                    }],
                    false,
                )
            }

            Inbound::SetMinutes { player, minutes } => {
                let Some(id) = self.core.resolve_player(&player) else {
                    return (vec![not_found(&player)], false);
                };
                let mut out = to_wire(self.core.set_minutes(id, minutes, now));
                out.push(Outbound::ack(format!("Usage of {} set to {}", id, minutes)));
                (out, false)
            }

            Inbound::SetDailyLimit { minutes } => (vec![self.set_daily_limit(minutes, now)], false),

            Inbound::WhitelistAdd { player } => {
                let Some(id) = self.core.resolve_player(&player) else {
                    return (vec![not_found(&player)], false);
                };
                if !self.core.whitelist_add(id) {
                    return (
                        vec![Outbound::ack(format!("{} is already whitelisted", id))],
                        false,
                    );
                }
                (vec![self.persist_whitelist(format!("{} whitelisted", id))], false)
            }

            Inbound::WhitelistRemove { player } => {
                let Some(id) = self.core.resolve_player(&player) else {
                    return (vec![not_found(&player)], false);
                };
                if !self.core.whitelist_remove(&id) {
                    return (
                        vec![Outbound::ack(format!("{} is not whitelisted", id))],
                        false,
                    );
                }
                (
                    vec![self.persist_whitelist(format!("{} removed from whitelist", id))],
                    false,
                )
            }

            Inbound::WhitelistList => {
                let mut players: Vec<PlayerId> = self.core.whitelist().iter().copied().collect();
                players.sort_unstable_by_key(|id| id.to_string());
                (vec![Outbound::Whitelist { players }], false)
            }

            Inbound::Reload => (vec![self.reload(now)], false),

            Inbound::Shutdown => {
                info!("Shutdown requested over the protocol");
                (Vec::new(), true)
            }
        }
    }

    /// Final flush before exit: fold and persist every open session.
    fn shutdown(&mut self, now: DateTime<Utc>) -> Vec<Outbound> {
        info!(active = self.core.active_players().len(), "Flushing sessions before exit");
        to_wire(self.core.flush_all(now))
    }

    fn set_daily_limit(&mut self, minutes: i64, now: DateTime<Utc>) -> Outbound {
        if let Err(e) = persist_daily_limit(&self.config_path, minutes) {
            warn!(error = %e, "Could not persist daily limit");
            return Outbound::error(format!("Could not persist daily limit: {}", e));
        }
        self.reload_snapshot(now, format!("Daily limit set to {} minutes", minutes))
    }

    fn reload(&mut self, now: DateTime<Utc>) -> Outbound {
        self.reload_snapshot(now, "Configuration reloaded".to_string())
    }

    fn reload_snapshot(&mut self, now: DateTime<Utc>, ack: String) -> Outbound {
        match load_config(&self.config_path) {
            Ok(cfg) => {
                self.core.reload(Arc::new(cfg), now);
                Outbound::ack(ack)
            }
            Err(e) => {
                warn!(error = %e, "Config reload failed, keeping current snapshot");
                Outbound::error(format!("Config reload failed: {}", e))
            }
        }
    }

    fn persist_whitelist(&self, ack: String) -> Outbound {
        match persist_whitelist(&self.config_path, self.core.whitelist()) {
            Ok(()) => Outbound::ack(ack),
            Err(e) => {
                warn!(error = %e, "Could not persist whitelist");
                Outbound::error(format!("Could not persist whitelist: {}", e))
            }
        }
    }

}

fn to_wire(actions: Vec<playtime_core::CoreAction>) -> Vec<Outbound> {
    actions.into_iter().map(Outbound::action).collect()
}

fn not_found(input: &str) -> Outbound {
    Outbound::error(PlaytimeError::player_not_found(input).to_string())
}

/// Write outbound messages as JSON lines on stdout. Stdout is the protocol
/// channel; logging goes to stderr.
fn emit(messages: &[Outbound]) {
    let mut stdout = std::io::stdout().lock();
    for msg in messages {
        match serde_json::to_string(msg) {
            Ok(line) => {
                if let Err(e) = writeln!(stdout, "{}", line) {
                    warn!(error = %e, "Could not write to stdout");
                }
            }
            Err(e) => warn!(error = %e, "Could not serialize outbound message"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "playtimed starting");

    let mut service = Service::new(&args, Utc::now())?;

    let mut sigterm = signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
    let mut sighup = signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tick_timer = tokio::time::interval(Duration::from_millis(500));

    info!("Service running");

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down gracefully");
                break;
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down gracefully");
                break;
            }
            _ = sighup.recv() => {
                info!("Received SIGHUP, shutting down gracefully");
                break;
            }

            _ = tick_timer.tick() => {
                emit(&service.tick(Utc::now()));
            }

            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) => {
                        let (out, stop) = service.handle_line(&line, Utc::now());
                        emit(&out);
                        if stop {
                            break;
                        }
                    }
                    // EOF: the server side went away
                    Ok(None) => {
                        info!("Stdin closed, shutting down");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "Stdin read error, shutting down");
                        break;
                    }
                }
            }
        }
    }

    emit(&service.shutdown(Utc::now()));
    info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use playtime_core::CoreAction;

    struct Harness {
        service: Service,
        _config: tempfile::NamedTempFile,
    }

    fn harness() -> Harness {
        let config = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            config.path(),
            concat!(
                "timezone = \"UTC\"\n",
                "dailyLimitMinutes = 120\n",
                "warnings = [30, 10]\n",
            ),
        )
        .unwrap();

        let cfg = load_config(config.path()).unwrap();
        let directory = Arc::new(InMemoryDirectory::new());
        let core = LimiterCore::new(
            Arc::new(cfg),
            Arc::new(JsonFileStore::ephemeral()),
            directory.clone(),
            noon(),
        );

        Harness {
            service: Service {
                core,
                directory,
                config_path: config.path().to_path_buf(),
            },
            _config: config,
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap()
    }

    fn line(h: &mut Harness, line: &str) -> Vec<Outbound> {
        let (out, stop) = h.service.handle_line(line, noon());
        assert!(!stop);
        out
    }

    #[test]
    fn connect_emits_a_display_update() {
        let mut h = harness();
        let id = PlayerId::random();

        let out = line(&mut h, &format!(r#"{{"type":"connect","player":"{}"}}"#, id));
        assert!(out.iter().any(|o| matches!(
            o,
            Outbound::Action { action: CoreAction::Display { player, .. } } if *player == id
        )));
    }

    #[test]
    fn unparseable_line_yields_an_error_reply() {
        let mut h = harness();
        let out = line(&mut h, "this is not json");
        assert!(matches!(out[0], Outbound::Error { .. }));
    }

    #[test]
    fn usage_lookup_by_registered_name() {
        let mut h = harness();
        let id = PlayerId::random();

        line(
            &mut h,
            &format!(r#"{{"type":"connect","player":"{}","name":"Steve"}}"#, id),
        );
        let out = line(&mut h, r#"{"type":"get_usage","player":"steve"}"#);
        assert_eq!(
            out,
            vec![Outbound::Usage {
                player: id,
                minutes_today: 0,
                limit: Some(120),
            }]
        );
    }

    #[test]
    fn unknown_player_is_an_error_not_a_crash() {
        let mut h = harness();
        let out = line(&mut h, r#"{"type":"get_usage","player":"nobody"}"#);
        assert!(matches!(&out[0], Outbound::Error { message } if message.contains("nobody")));
    }

    #[test]
    fn whitelist_add_persists_to_the_config_file() {
        let mut h = harness();
        let id = PlayerId::random();

        let out = line(
            &mut h,
            &format!(r#"{{"type":"whitelist_add","player":"{}"}}"#, id),
        );
        assert!(matches!(out[0], Outbound::Ack { .. }));

        // Survives a reload from disk
        let cfg = load_config(&h.service.config_path).unwrap();
        assert!(cfg.whitelist.contains(&id));

        // Second add is a no-op ack
        let out = line(
            &mut h,
            &format!(r#"{{"type":"whitelist_add","player":"{}"}}"#, id),
        );
        assert!(matches!(&out[0], Outbound::Ack { message } if message.contains("already")));

        let out = line(&mut h, r#"{"type":"whitelist_list"}"#);
        assert_eq!(out, vec![Outbound::Whitelist { players: vec![id] }]);
    }

    #[test]
    fn set_daily_limit_persists_and_swaps_the_snapshot() {
        let mut h = harness();

        let out = line(&mut h, r#"{"type":"set_daily_limit","minutes":90}"#);
        assert!(matches!(out[0], Outbound::Ack { .. }));

        assert_eq!(h.service.core.config().daily_limit_minutes, 90);
        assert_eq!(
            load_config(&h.service.config_path).unwrap().daily_limit_minutes,
            90
        );
    }

    #[test]
    fn set_minutes_to_the_limit_kicks_a_connected_player() {
        let mut h = harness();
        let id = PlayerId::random();

        line(&mut h, &format!(r#"{{"type":"connect","player":"{}"}}"#, id));
        let out = line(
            &mut h,
            &format!(r#"{{"type":"set_minutes","player":"{}","minutes":120}}"#, id),
        );

        assert!(out.iter().any(|o| matches!(
            o,
            Outbound::Action { action: CoreAction::Kick { .. } }
        )));
        assert!(matches!(out.last(), Some(Outbound::Ack { .. })));
    }

    #[test]
    fn shutdown_message_stops_the_loop() {
        let mut h = harness();
        let (out, stop) = h.service.handle_line(r#"{"type":"shutdown"}"#, noon());
        assert!(out.is_empty());
        assert!(stop);
    }

    #[test]
    fn shutdown_flush_folds_open_sessions() {
        let mut h = harness();
        let id = PlayerId::random();

        line(&mut h, &format!(r#"{{"type":"connect","player":"{}"}}"#, id));
        h.service.shutdown(noon() + chrono::Duration::minutes(15));

        let report = h.service.core.usage_of(&id, noon() + chrono::Duration::minutes(15));
        assert_eq!(report.minutes_today, 15);
    }

    #[test]
    fn bypass_grant_makes_the_player_exempt() {
        let mut h = harness();
        let id = PlayerId::random();

        line(&mut h, &format!(r#"{{"type":"grant_bypass","player":"{}"}}"#, id));
        let out = line(
            &mut h,
            &format!(r#"{{"type":"get_usage","player":"{}"}}"#, id),
        );
        assert_eq!(
            out,
            vec![Outbound::Usage {
                player: id,
                minutes_today: 0,
                limit: None,
            }]
        );
    }
}
