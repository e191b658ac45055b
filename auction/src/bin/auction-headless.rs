//! Headless auction driver for scripted testing.
//!
//! Runs one auction session against an in-process ledger with
//! JSON-over-stdio IPC. Logging goes to stderr; stdout is reserved for
//! the IPC protocol.
//!
//! Usage:
//!   auction-headless [--aes]
//!
//! On startup, emits a `Ready` JSON line to stdout.
//! Then reads `TestCommand` JSON lines from stdin and writes `TestResponse` lines.

use std::io::Write;
use std::sync::Arc;

use auction::{
    AesGcmEncryptor, AuctionApp, AuctionConfig, AuctionController, BidDraft, Encryptor,
    InMemoryLedger, SimulatedFhe, StaticWallet, SystemTimeProvider, ThreadRng,
};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// ── IPC types ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ReadyEvent {
    event: &'static str,
    encryptor: &'static str,
}

#[derive(Deserialize)]
#[serde(tag = "cmd")]
enum TestCommand {
    Connect {
        account: String,
    },
    PlaceBid {
        land_parcel: String,
        bid_amount: String,
        #[serde(default)]
        strategy: Option<String>,
    },
    Refresh,
    DetermineWinner,
    Snapshot,
    Stats,
    Shutdown,
}

#[derive(Serialize)]
#[serde(tag = "status")]
enum TestResponse {
    Ok { data: Option<serde_json::Value> },
    Err { message: String },
}

impl TestResponse {
    fn ok(value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(data) => Self::Ok { data: Some(data) },
            Err(e) => Self::Err {
                message: format!("Response serialization failed: {}", e),
            },
        }
    }

    fn err(e: impl std::fmt::Display) -> Self {
        Self::Err {
            message: e.to_string(),
        }
    }
}

type HeadlessApp = AuctionApp<InMemoryLedger, SystemTimeProvider, ThreadRng>;

// ── Helpers ──────────────────────────────────────────────────────────

fn init_logging_stderr() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .init();
}

fn emit_json(value: &impl Serialize) {
    let line = match serde_json::to_string(value) {
        Ok(line) => line,
        Err(e) => {
            error!("JSON serialization failed: {}", e);
            return;
        }
    };
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{}", line).and_then(|()| stdout.flush()) {
        error!("stdout write failed: {}", e);
    }
}

async fn handle(app: &HeadlessApp, cmd: TestCommand) -> TestResponse {
    match cmd {
        TestCommand::Connect { account } => {
            let wallet = Arc::new(StaticWallet::new(vec![account]));
            match app.connect_wallet(wallet).await {
                Ok(account) => TestResponse::ok(serde_json::json!({ "account": account })),
                Err(e) => TestResponse::err(e),
            }
        }

        TestCommand::PlaceBid {
            land_parcel,
            bid_amount,
            strategy,
        } => {
            let mut draft = BidDraft::new(land_parcel, bid_amount);
            if let Some(strategy) = strategy {
                draft = draft.with_strategy(strategy);
            }
            app.update_draft(draft);
            match app.place_bid().await {
                Ok(bid) => TestResponse::ok(&bid),
                Err(e) => TestResponse::err(e),
            }
        }

        TestCommand::Refresh => {
            app.refresh().await;
            TestResponse::ok(serde_json::json!({ "count": app.state().bids.len() }))
        }

        TestCommand::DetermineWinner => match app.determine_winner().await {
            Ok(outcome) => TestResponse::ok(&outcome),
            Err(e) => TestResponse::err(e),
        },

        TestCommand::Snapshot => TestResponse::ok(app.state()),

        TestCommand::Stats => {
            let state = app.state();
            TestResponse::ok(serde_json::json!({
                "stats": state.stats,
                "distribution": state.distribution,
            }))
        }

        // Handled by the command loop
        TestCommand::Shutdown => TestResponse::Ok { data: None },
    }
}

// ── Main ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    init_logging_stderr();

    let config = match AuctionConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let use_aes = std::env::args().any(|arg| arg == "--aes");
    let (encryptor, encryptor_name): (Arc<dyn Encryptor>, &'static str) = if use_aes {
        (Arc::new(AesGcmEncryptor::generate()), "aes-gcm")
    } else {
        (Arc::new(SimulatedFhe), "simulated-fhe")
    };
    info!(
        "auction-headless starting (strategy={:?}, encryptor={})",
        config.index_strategy, encryptor_name
    );

    let controller = AuctionController::new(
        InMemoryLedger::new(),
        SystemTimeProvider::new(),
        ThreadRng::new(),
        encryptor,
        config,
    );
    let app = AuctionApp::new(controller);
    app.refresh().await;

    emit_json(&ReadyEvent {
        event: "Ready",
        encryptor: encryptor_name,
    });
    info!("Ready event emitted");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            Ok(None) => {
                info!("stdin closed, shutting down");
                break;
            }
            Err(e) => {
                error!("stdin read error: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let cmd: TestCommand = match serde_json::from_str(&line) {
            Ok(c) => c,
            Err(e) => {
                emit_json(&TestResponse::Err {
                    message: format!("Invalid command JSON: {}", e),
                });
                continue;
            }
        };

        if matches!(cmd, TestCommand::Shutdown) {
            info!("Shutdown command received");
            emit_json(&TestResponse::Ok { data: None });
            break;
        }

        let response = handle(&app, cmd).await;
        emit_json(&response);
    }

    app.disconnect_wallet();
    info!("Shutdown complete");
}
