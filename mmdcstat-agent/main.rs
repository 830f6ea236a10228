use std::path::Path;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use mmdcstat::common::DevMemOpener;

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Shutdown triggered by Ctrl+C");
        },
        _ = terminate => {
            tracing::info!("Shutdown triggered by SIGTERM");
        },
    }

    cancel_token.cancel();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cancel_token = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel_token.clone()));

    let mut stdout = std::io::stdout();
    let code = mmdcstat::run_cli(
        std::env::args_os(),
        |device: &Path| DevMemOpener::new(device),
        &mut stdout,
        cancel_token,
    )
    .await;

    // Register windows are unmapped by now; run_cli owns them
    std::process::exit(code);
}
