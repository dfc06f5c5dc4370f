//! OS termination signals.

use std::io;

/// Waits for the process to be asked to terminate and names the signal that
/// arrived. Listeners are installed before the first poll returns, so a
/// signal sent after this future is first awaited is never lost.
#[cfg(unix)]
pub async fn termination_signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate())?;
    let mut int = signal(SignalKind::interrupt())?;
    let name = tokio::select! {
        _ = term.recv() => "SIGTERM",
        _ = int.recv() => "SIGINT",
    };
    Ok(name)
}

#[cfg(windows)]
pub async fn termination_signal() -> io::Result<&'static str> {
    use tokio::signal::windows::{ctrl_break, ctrl_c, ctrl_close};

    let mut c = ctrl_c()?;
    let mut brk = ctrl_break()?;
    let mut close = ctrl_close()?;
    let name = tokio::select! {
        _ = c.recv() => "CTRL_C",
        _ = brk.recv() => "CTRL_BREAK",
        _ = close.recv() => "CTRL_CLOSE",
    };
    Ok(name)
}
