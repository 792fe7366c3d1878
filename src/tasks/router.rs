use std::collections::HashMap;

use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::select;
use tokio::sync::broadcast;
use tokio::sync::mpsc::{self, Receiver, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::events::{ClientId, HelperEvent, HelperRequest};
use crate::playback::Delivery;
use crate::session::ClientSession;

/// Handle to a running session task.
struct SessionHandle {
    queue: UnboundedSender<HelperRequest>,
    task: JoinHandle<()>,
}

/// Client id -> session task. Sessions are created on first reference and
/// live until the registry shuts down.
pub struct SessionRegistry {
    sessions: HashMap<ClientId, SessionHandle>,
    events: broadcast::Sender<HelperEvent>,
    shuffle_seed: Option<u64>,
}

impl SessionRegistry {
    pub fn new(events: broadcast::Sender<HelperEvent>, shuffle_seed: Option<u64>) -> Self {
        Self {
            sessions: HashMap::new(),
            events,
            shuffle_seed,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, client_id: &str) -> bool {
        self.sessions.contains_key(client_id)
    }

    /// Queue `request` on its session, spawning the session if needed.
    pub fn route(&mut self, request: HelperRequest) {
        let client_id = request.client_id().to_string();
        let events = &self.events;
        let shuffle_seed = self.shuffle_seed;
        let handle = self
            .sessions
            .entry(client_id.clone())
            .or_insert_with(|| {
                info!(client_id = %client_id, "new session");
                let rng = match shuffle_seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_os_rng(),
                };
                // Unbounded so a slow session never holds up the others.
                let (queue, rx) = mpsc::unbounded_channel();
                let session = ClientSession::new(client_id.clone(), rng);
                let task = tokio::spawn(serve(session, rx, events.clone()));
                SessionHandle { queue, task }
            });
        if handle.queue.send(request).is_err() {
            error!(client_id = %client_id, "session task is gone; request dropped");
        }
    }

    /// Close every session queue and wait for queued requests to finish.
    pub async fn shutdown(self) {
        for (client_id, SessionHandle { queue, task }) in self.sessions {
            drop(queue);
            if let Err(err) = task.await {
                error!(client_id = %client_id, "session task failed: {err}");
            }
        }
    }
}

/// Helper event loop: routes widget requests to their sessions until
/// cancelled or until every request sender is gone, then broadcasts
/// `NODE_HELPER_STOP`.
///
/// Requests already accepted are answered before the stop event goes out.
pub async fn run(
    mut requests: Receiver<HelperRequest>,
    events: broadcast::Sender<HelperEvent>,
    shuffle_seed: Option<u64>,
    cancel: CancellationToken,
) -> Result<()> {
    info!("helper started");
    let mut registry = SessionRegistry::new(events.clone(), shuffle_seed);

    loop {
        select! {
            biased;

            maybe_req = requests.recv() => match maybe_req {
                Some(request) => {
                    debug!(
                        client_id = request.client_id(),
                        notification = request.notification(),
                        "request received"
                    );
                    registry.route(request);
                }
                None => {
                    info!("request channel closed; stopping helper");
                    break;
                }
            },

            _ = cancel.cancelled() => {
                info!("cancel received; stopping helper");
                break;
            }
        }
    }

    let sessions = registry.len();
    registry.shutdown().await;
    info!(sessions, "stopping helper");
    publish(&events, HelperEvent::Stop {});
    Ok(())
}

/// Per-session loop. Requests run one at a time, in arrival order.
async fn serve(
    mut session: ClientSession,
    mut queue: UnboundedReceiver<HelperRequest>,
    events: broadcast::Sender<HelperEvent>,
) {
    while let Some(request) = queue.recv().await {
        for event in dispatch(&mut session, request).await {
            publish(&events, event);
        }
    }
    debug!(client_id = session.client_id(), "session closed");
}

/// Apply one request to `session` and return the events it produces.
///
/// A build always yields `NODE_HELPER_FILE_COUNT` and, when files were
/// found, the first `NODE_HELPER_DATA_URL` right after it.
pub async fn dispatch(session: &mut ClientSession, request: HelperRequest) -> Vec<HelperEvent> {
    let mut out = Vec::new();
    match request {
        HelperRequest::BuildFileList { config, .. } => {
            let file_count = session.rebuild(config).await;
            out.push(HelperEvent::FileCount {
                client_id: session.client_id().to_string(),
                file_count,
            });
            if file_count > 0 {
                out.extend(deliver(session).await);
            }
        }
        HelperRequest::RetrieveDataUrl { .. } => out.extend(deliver(session).await),
    }
    out
}

async fn deliver(session: &mut ClientSession) -> Option<HelperEvent> {
    match session.next().await {
        Ok(Delivery {
            file_name,
            file_content,
        }) => Some(HelperEvent::DataUrl {
            client_id: session.client_id().to_string(),
            file_name,
            file_content,
        }),
        Err(err @ Error::NoDataAvailable { .. }) => {
            warn!("{err}");
            None
        }
        Err(err) => {
            error!(client_id = session.client_id(), "{err}");
            None
        }
    }
}

fn publish(events: &broadcast::Sender<HelperEvent>, event: HelperEvent) {
    if events.send(event).is_err() {
        debug!("no widget listening; event dropped");
    }
}
