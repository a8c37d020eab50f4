//! Live feed command.

use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use taleweave_client::AppContext;
use taleweave_client::bus::UiSignal;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

/// Arguments for the watch command
#[derive(Parser)]
pub struct WatchArgs {
    /// Stop after this many seconds; runs until Ctrl-C when omitted
    #[arg(short, long)]
    pub seconds: Option<u64>,
}

fn print_signal(signal: &UiSignal) {
    match signal {
        UiSignal::Toast(toast) => {
            println!("[{}] {}: {}", toast.severity, toast.title, toast.message);
        }
        UiSignal::Broadcast { name, payload } => println!("{name} {payload}"),
        UiSignal::Redirect(route) => println!("Session ended, sign in again ({route:?})"),
        UiSignal::ProtocolWarning { event } => println!("Unrecognized event: {event}"),
    }
}

/// Connects live updates and prints toasts and broadcasts until timeout or Ctrl-C.
///
/// # Errors
///
/// Returns error if nobody is signed in.
pub async fn run(context: &AppContext, args: WatchArgs) -> Result<()> {
    if !context.store().is_authenticated() {
        anyhow::bail!("Not signed in. Run `taleweave login` first.");
    }

    let mut signals = context.bus().subscribe();
    if let Err(error) = context.realtime().connect().await {
        warn!(%error, "Initial connect failed, retrying in the background");
    }

    let deadline = async {
        match args.seconds {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            () = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => break,
            received = signals.recv() => match received {
                Ok(signal) => print_signal(&signal),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Output fell behind"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    context.shutdown().await;
    Ok(())
}
