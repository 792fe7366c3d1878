use std::time::{Duration, Instant};

use anyhow::Result;
use rand::Rng;
use tokio::select;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::{Interval, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::animation::AnimationCycler;
use crate::config::WidgetConfig;
use crate::events::{
    ClientId, Content, HelperEvent, HelperRequest, Lifecycle, RenderUpdate, Transition,
};

pub const LOADING_STATUS: &str = "Torque: Loading...";
pub const SUSPENDED_STATUS: &str = "Torque: Suspended";
pub const HELPER_STOPPED_STATUS: &str = "Torque: Helper Stopped";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatState {
    Stopped,
    Running,
}

/// Side effects requested by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Request(HelperRequest),
    Render(RenderUpdate),
}

/// Widget-side scheduler: decides when to repaint and when to ask the
/// helper for the next item. Time is passed in, never read.
#[derive(Debug)]
pub struct Heartbeat {
    client_id: ClientId,
    config: WidgetConfig,
    state: HeartbeatState,
    last_update: Instant,
    files_loaded: bool,
    header: String,
    content: Option<Content>,
    animations: AnimationCycler,
    transition_speed: Duration,
    enables: u64,
}

impl Heartbeat {
    /// Set up a stopped widget. Transition order is shuffled here when the
    /// widget asks for random animations.
    pub fn new<R: Rng + ?Sized>(
        client_id: impl Into<ClientId>,
        config: WidgetConfig,
        transition_speed: Duration,
        rng: &mut R,
        now: Instant,
    ) -> Self {
        let client_id = client_id.into();
        info!(client_id = %client_id, ?config, "starting widget");
        let animations = if config.randomize_animations {
            AnimationCycler::shuffled(rng)
        } else {
            AnimationCycler::new()
        };
        Self {
            client_id,
            config,
            state: HeartbeatState::Stopped,
            last_update: now,
            files_loaded: false,
            header: LOADING_STATUS.to_string(),
            content: None,
            animations,
            transition_speed,
            enables: 0,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn state(&self) -> HeartbeatState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == HeartbeatState::Running
    }

    pub fn files_loaded(&self) -> bool {
        self.files_loaded
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    /// Bumped on every [`Heartbeat::enable`]; the driver restarts its
    /// interval whenever this changes.
    pub fn timer_epoch(&self) -> u64 {
        self.enables
    }

    /// Stopped -> Running. Asks for the file list until one has arrived.
    pub fn enable(&mut self, now: Instant) -> Vec<Action> {
        self.last_update = now;
        self.enables += 1;
        if self.state == HeartbeatState::Stopped {
            info!(client_id = %self.client_id, "enable widget");
        }
        self.state = HeartbeatState::Running;

        let mut actions = Vec::new();
        if !self.files_loaded {
            actions.push(Action::Request(HelperRequest::BuildFileList {
                client_id: self.client_id.clone(),
                config: self.config.clone(),
            }));
        }
        actions
    }

    /// Running -> Stopped, showing `status` in the header.
    pub fn disable(&mut self, status: &str, now: Instant) -> Vec<Action> {
        info!(client_id = %self.client_id, status, "disable widget");
        self.last_update = now;
        self.state = HeartbeatState::Stopped;
        self.header = status.to_string();
        vec![Action::Render(self.render(None))]
    }

    /// Periodic check. Refreshes once the refresh interval has elapsed, or
    /// right away when `immediate` is set.
    pub fn on_tick(&mut self, now: Instant, immediate: bool) -> Vec<Action> {
        if !self.is_running() {
            return Vec::new();
        }
        let elapsed = now.saturating_duration_since(self.last_update);
        if !immediate && elapsed < self.config.refresh_interval() {
            return Vec::new();
        }
        self.last_update = now;

        let (entry, exit) = self.animations.next_pair();
        debug!(client_id = %self.client_id, entry, exit, immediate, "refresh");
        let transition = Transition {
            entry,
            exit,
            speed: self.transition_speed,
        };
        vec![
            Action::Render(self.render(Some(transition))),
            Action::Request(self.retrieve_request()),
        ]
    }

    /// React to a helper event. Events for other widgets are ignored.
    pub fn on_event(&mut self, event: HelperEvent, now: Instant) -> Vec<Action> {
        if !event.concerns(&self.client_id) {
            return Vec::new();
        }
        match event {
            HelperEvent::FileCount { file_count, .. } => {
                info!(client_id = %self.client_id, file_count, "files loaded");
                self.files_loaded = true;
                if file_count > 0 {
                    vec![Action::Request(self.retrieve_request())]
                } else {
                    Vec::new()
                }
            }
            HelperEvent::DataUrl {
                file_name,
                file_content,
                ..
            } => {
                let first = self.content.is_none();
                self.header = if self.config.show_header {
                    file_name.clone()
                } else {
                    String::new()
                };
                self.content = Some(Content {
                    name: file_name,
                    data_url: file_content,
                });
                if first && self.config.show_header {
                    self.on_tick(now, true)
                } else {
                    Vec::new()
                }
            }
            HelperEvent::Stop {} => self.disable(HELPER_STOPPED_STATUS, now),
        }
    }

    pub fn on_lifecycle(&mut self, signal: Lifecycle, now: Instant) -> Vec<Action> {
        match signal {
            Lifecycle::Suspend => self.disable(SUSPENDED_STATUS, now),
            Lifecycle::Resume => self.enable(now),
            Lifecycle::Toggle if self.is_running() => self.disable(SUSPENDED_STATUS, now),
            Lifecycle::Toggle => self.enable(now),
        }
    }

    fn retrieve_request(&self) -> HelperRequest {
        HelperRequest::RetrieveDataUrl {
            client_id: self.client_id.clone(),
            config: self.config.clone(),
        }
    }

    fn render(&self, transition: Option<Transition>) -> RenderUpdate {
        RenderUpdate {
            client_id: self.client_id.clone(),
            header: self.header.clone(),
            content: self.content.clone(),
            transition,
        }
    }
}

/// Drive one widget: enable it, then tick, forward helper events and host
/// lifecycle signals until the helper stops.
pub async fn run(
    mut heartbeat: Heartbeat,
    tick: Duration,
    requests: Sender<HelperRequest>,
    mut events: broadcast::Receiver<HelperEvent>,
    mut lifecycle: Receiver<Lifecycle>,
    render: Sender<RenderUpdate>,
) -> Result<()> {
    let mut ticker: Option<(u64, Interval)> = None;
    let actions = heartbeat.enable(Instant::now());
    perform(actions, &requests, &render).await;

    loop {
        sync_ticker(&heartbeat, &mut ticker, tick);

        select! {
            _ = next_tick(&mut ticker) => {
                let actions = heartbeat.on_tick(Instant::now(), false);
                perform(actions, &requests, &render).await;
            }

            res = events.recv() => match res {
                Ok(event) => {
                    let stop = matches!(event, HelperEvent::Stop {});
                    let actions = heartbeat.on_event(event, Instant::now());
                    perform(actions, &requests, &render).await;
                    if stop {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(client_id = heartbeat.client_id(), skipped, "widget fell behind helper events");
                }
                Err(RecvError::Closed) => {
                    let actions = heartbeat.disable(HELPER_STOPPED_STATUS, Instant::now());
                    perform(actions, &requests, &render).await;
                    break;
                }
            },

            Some(signal) = lifecycle.recv() => {
                debug!(client_id = heartbeat.client_id(), ?signal, "lifecycle signal");
                let actions = heartbeat.on_lifecycle(signal, Instant::now());
                perform(actions, &requests, &render).await;
            }
        }
    }

    info!(client_id = heartbeat.client_id(), "widget stopped");
    Ok(())
}

/// Keep the interval armed exactly while the widget is running, starting a
/// fresh one after every enable.
fn sync_ticker(heartbeat: &Heartbeat, ticker: &mut Option<(u64, Interval)>, tick: Duration) {
    if !heartbeat.is_running() {
        *ticker = None;
        return;
    }
    let epoch = heartbeat.timer_epoch();
    if ticker.as_ref().is_some_and(|(armed, _)| *armed == epoch) {
        return;
    }
    let mut interval = interval_at(tokio::time::Instant::now() + tick, tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    *ticker = Some((epoch, interval));
}

async fn next_tick(ticker: &mut Option<(u64, Interval)>) {
    match ticker {
        Some((_, interval)) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn perform(actions: Vec<Action>, requests: &Sender<HelperRequest>, render: &Sender<RenderUpdate>) {
    for action in actions {
        match action {
            Action::Request(request) => {
                if let Err(err) = requests.send(request).await {
                    warn!(
                        client_id = err.0.client_id(),
                        notification = err.0.notification(),
                        "helper is not accepting requests"
                    );
                }
            }
            Action::Render(update) => {
                if render.send(update).await.is_err() {
                    debug!("renderer closed; update dropped");
                }
            }
        }
    }
}
