use std::env;
use std::io;
use std::process::ExitCode;

use points_ledger::csv::{read_requests, write_balances};
use points_ledger::{Ledger, LedgerConfig};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(path) = env::args().nth(1) else {
        error!("usage: points-ledger <requests.csv>");
        return ExitCode::from(2);
    };

    if !path.ends_with(".csv") {
        warn!(path, "input file seems to not be a csv file");
    }

    let config = match LedgerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(2);
        }
    };

    // the reader moves into the producer task, so it must own its path
    let requests = match read_requests(path) {
        Ok(requests) => requests,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let ledger = Ledger::with_config(config);
    let (tx_sender, tx_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in requests {
            match result {
                Ok(request) => {
                    if tx_sender.send(request).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    let summary = ledger.run(ReceiverStream::new(tx_receiver)).await;
    info!(
        applied = summary.applied,
        rejected = summary.rejected,
        failed = summary.failed,
        "run finished"
    );

    let balances = match ledger.balances() {
        Ok(balances) => balances,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = write_balances(io::stdout().lock(), &balances) {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
