//! JSON-lines bridge so an out-of-process front-end can talk to the helper.
//!
//! Each input line is one request, each output line one event, both in the
//! `{"notification": NAME, "payload": {...}}` form.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::select;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::events::{HelperEvent, HelperRequest};

/// Bridge the process's stdin/stdout to the helper.
pub async fn run(
    requests: Sender<HelperRequest>,
    events: broadcast::Receiver<HelperEvent>,
    cancel: CancellationToken,
) -> Result<()> {
    bridge(
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        requests,
        events,
        cancel,
    )
    .await
}

/// Forward parsed lines from `input` as requests and write every helper
/// event to `output`, until the helper sends `NODE_HELPER_STOP`.
///
/// End of input cancels `cancel` so the helper winds down.
pub async fn bridge<R, W>(
    input: R,
    mut output: W,
    requests: Sender<HelperRequest>,
    mut events: broadcast::Receiver<HelperEvent>,
    cancel: CancellationToken,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut input_open = true;

    loop {
        select! {
            line = lines.next_line(), if input_open => {
                match line.context("reading request line")? {
                    Some(line) => forward(&line, &requests).await,
                    None => {
                        info!("input closed; stopping helper");
                        input_open = false;
                        cancel.cancel();
                    }
                }
            }

            res = events.recv() => match res {
                Ok(event) => {
                    let stop = matches!(event, HelperEvent::Stop {});
                    let mut json = serde_json::to_string(&event).context("encoding event")?;
                    json.push('\n');
                    output.write_all(json.as_bytes()).await.context("writing event")?;
                    output.flush().await.context("flushing event")?;
                    if stop {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "bridge fell behind helper events");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
    Ok(())
}

async fn forward(line: &str, requests: &Sender<HelperRequest>) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    match serde_json::from_str::<HelperRequest>(line) {
        Ok(request) => {
            debug!(
                client_id = request.client_id(),
                notification = request.notification(),
                "request line"
            );
            if requests.send(request).await.is_err() {
                warn!("helper is not accepting requests");
            }
        }
        Err(err) => warn!("ignoring malformed request: {err}"),
    }
}
