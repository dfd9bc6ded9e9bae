// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Graceful shutdown coordination with signal handling.
//!
//! Installs handlers for SIGTERM and SIGINT (Ctrl+C), triggering a
//! [`CancellationToken`] that the server monitors.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal is
/// received. The handler task exits early if the token is cancelled first.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let watched = token.clone();

    tokio::spawn(async move {
        tokio::select! {
            () = wait_for_signal() => watched.cancel(),
            () = watched.cancelled() => {}
        }
        debug!("shutdown signal handler completed");
    });

    token
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    () = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
                    _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                ctrl_c.await;
                info!("received SIGINT (Ctrl+C), initiating shutdown");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
        info!("received Ctrl+C, initiating shutdown");
    }
}
