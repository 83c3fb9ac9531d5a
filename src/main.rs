//! Beauty Contest Server
//!
//! Hosts one commit-reveal round over WebSocket, or runs a scripted
//! demo round with `--demo`.

use anyhow::Context;
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use beauty_contest::net::{ContestServer, ServerConfig};
use beauty_contest::{
    AppConfig, InMemoryLedger, LedgerTable, LedgerView, ManualClock, RoundEngine, RoundSchedule,
    SystemClock, TimedLedger, ValueBounds, VERSION,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Beauty Contest Server v{}", VERSION);

    if std::env::args().any(|arg| arg == "--demo") {
        return demo_round().await;
    }

    let config = AppConfig::from_env().context("invalid configuration")?;
    info!(fingerprint = %config.round_fingerprint(), "round configured");
    info!("commit deadline: {}", config.schedule.commit_deadline());
    info!("reveal opens:    {}", config.schedule.reveal_open());
    info!(
        "value bounds:    [{}, {}]",
        config.bounds.min(),
        config.bounds.max()
    );

    let ledger = TimedLedger::new(InMemoryLedger::new(), config.ledger_timeout);
    let engine = RoundEngine::new(config.schedule, config.bounds, ledger, SystemClock);
    let server = ContestServer::new(
        engine,
        ServerConfig {
            bind_addr: config.bind_addr,
        },
    );
    server.run().await?;
    Ok(())
}

/// Scripted round against an in-memory ledger and a manual clock, so a
/// full commit -> wait -> reveal -> audit cycle runs in milliseconds.
async fn demo_round() -> anyhow::Result<()> {
    use chrono::{Duration, TimeZone, Utc};

    info!("=== Starting Demo Round ===");

    let deadline = Utc.with_ymd_and_hms(2025, 10, 21, 21, 59, 59).unwrap();
    let reveal_open = Utc.with_ymd_and_hms(2025, 10, 21, 22, 0, 0).unwrap();
    let schedule = RoundSchedule::new(deadline, reveal_open)?;
    let bounds = ValueBounds::default();

    let clock = ManualClock::new(deadline - Duration::hours(2));
    let ledger = TimedLedger::new(
        InMemoryLedger::new(),
        std::time::Duration::from_secs(5),
    );
    let engine = RoundEngine::new(schedule, bounds, ledger, clock.clone());

    // --- Commit phase ---
    info!("phase: {}", engine.phase());
    for (id, value, nonce) in [("u1", 42, "abc123"), ("u2", 77, "tiger"), ("u3", 5, "blue")] {
        let receipt = engine.submit_commit(id, value, nonce).await?;
        info!(
            "commit accepted: {} -> {} (preimage: {})",
            id, receipt.commitment, receipt.preimage
        );
    }

    // A second commit from u1 bounces off the first-wins policy.
    if let Err(err) = engine.submit_commit("u1", 99, "changed-my-mind").await {
        warn!("duplicate commit rejected: {err}");
    }

    // --- Past the deadline ---
    clock.set(deadline + Duration::seconds(10));
    info!("phase: {}", engine.phase());
    if let Err(err) = engine.submit_commit("u4", 60, "late").await {
        warn!("late commit rejected: {err}");
    }

    // --- Reveal phase ---
    clock.set(reveal_open + Duration::minutes(1));
    info!("phase: {}", engine.phase());

    let honest = engine.submit_reveal("u1", 42, "abc123").await?;
    info!("u1 reveal: {}", honest.outcome);

    let cheat = engine.submit_reveal("u2", 80, "tiger").await?;
    info!("u2 reveal with changed value: {}", cheat.outcome);

    let orphan = engine.submit_reveal("u9", 50, "nobody").await?;
    info!("u9 reveal without commit: {}", orphan.outcome);

    // --- Audit ---
    info!("=== Public Ledger ===");
    if let LedgerView::Commits(commits) = engine.fetch_ledger(LedgerTable::Commits).await? {
        for record in commits {
            info!(
                "commit  {:>4}  {}  {}",
                record.participant_id.as_str(),
                record.commitment,
                record.submitted_at
            );
        }
    }
    if let LedgerView::Reveals(reveals) = engine.fetch_ledger(LedgerTable::Reveals).await? {
        for record in reveals {
            info!(
                "reveal  {:>4}  value={} nonce={}  [{}]",
                record.participant_id.as_str(),
                record.value,
                record.nonce,
                record.outcome
            );
        }
    }

    info!("=== Demo Round Complete ===");
    Ok(())
}
