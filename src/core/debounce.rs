use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};

/// Forwards a value only after `window` has passed without a newer one.
///
/// Every `push` restarts the quiet period and replaces the pending value, so
/// a burst of pushes yields exactly one emission carrying the last value.
/// Dropping the debouncer still delivers a pending value once its window
/// expires, then closes the output channel.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn spawn(window: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        tokio::spawn(run(window, in_rx, out_tx));
        (Self { tx: in_tx }, out_rx)
    }

    /// Returns false once the loop has stopped, which happens when the
    /// receiving side is dropped.
    pub fn push(&self, value: T) -> bool {
        self.tx.send(value).is_ok()
    }
}

async fn run<T>(
    window: Duration,
    mut input: mpsc::UnboundedReceiver<T>,
    output: mpsc::UnboundedSender<T>,
) {
    let mut pending: Option<T> = None;
    let mut open = true;
    let timer = sleep(window);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            next = input.recv(), if open => match next {
                Some(value) => {
                    pending = Some(value);
                    timer.as_mut().reset(Instant::now() + window);
                }
                None => {
                    open = false;
                    if pending.is_none() {
                        break;
                    }
                }
            },
            () = output.closed() => {
                tracing::debug!("Debounce receiver dropped, stopping");
                break;
            }
            () = &mut timer, if pending.is_some() => {
                if let Some(value) = pending.take() {
                    if output.send(value).is_err() {
                        break;
                    }
                }
                if !open {
                    break;
                }
            }
        }
    }
}
