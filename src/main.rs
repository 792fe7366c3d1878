//! Binary entrypoint: runs the helper together with the configured widgets,
//! or the helper alone behind a stdio bridge.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use torque_slideshow::config::Configuration;
use torque_slideshow::events::{HelperEvent, HelperRequest, Lifecycle, RenderUpdate};
use torque_slideshow::session::ClientSession;
use torque_slideshow::tasks::{heartbeat, renderer, router, stdio};

#[derive(Debug, Parser)]
#[command(
    name = "torque-slideshow",
    version,
    about = "Image slideshow helper and widget scheduler"
)]
struct Args {
    /// Path to YAML config
    #[arg(value_name = "CONFIG", required_unless_present = "stdio")]
    config: Option<PathBuf>,
    /// Serve JSON-lines requests on stdin and write events to stdout
    #[arg(long)]
    stdio: bool,
    /// Scan every widget once and print its first N deliveries
    #[arg(long = "dry-run", value_name = "ITERATIONS", conflicts_with = "stdio")]
    dry_run: Option<usize>,
    /// Deterministic RNG seed for image and animation shuffles
    #[arg(long = "seed", value_name = "SEED")]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout belongs to the stdio bridge, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let Args {
        config,
        stdio,
        dry_run,
        seed,
    } = Args::parse();

    let mut cfg = match &config {
        Some(path) => {
            let cfg = Configuration::from_yaml_file(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?;
            if stdio {
                cfg
            } else {
                cfg.validated().context("invalid configuration values")?
            }
        }
        None => Configuration::default(),
    };
    if seed.is_some() {
        cfg.shuffle_seed = seed;
    }
    tracing::debug!("configuration: {cfg:#?}");

    if let Some(iterations) = dry_run {
        return run_dry_run(&cfg, iterations).await;
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    let (request_tx, request_rx) = mpsc::channel::<HelperRequest>(64);
    let (event_tx, _) = broadcast::channel::<HelperEvent>(cfg.event_capacity.max(1));

    let mut tasks = JoinSet::new();

    if stdio {
        let events = event_tx.subscribe();
        tasks.spawn({
            let cancel = cancel.clone();
            async move {
                stdio::run(request_tx, events, cancel)
                    .await
                    .context("stdio bridge failed")
            }
        });
    } else {
        let (render_tx, render_rx) = mpsc::channel::<RenderUpdate>(16);
        tasks.spawn(async move { renderer::run(render_rx).await.context("renderer failed") });

        let mut rng = match cfg.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut lifecycle_txs = Vec::with_capacity(cfg.widgets.len());
        for widget in &cfg.widgets {
            let (lifecycle_tx, lifecycle_rx) = mpsc::channel::<Lifecycle>(4);
            lifecycle_txs.push(lifecycle_tx);
            let hb = heartbeat::Heartbeat::new(
                widget.id.clone(),
                widget.config.clone(),
                cfg.transition_speed,
                &mut rng,
                Instant::now(),
            );
            let tick = cfg.heartbeat_tick;
            let requests = request_tx.clone();
            let events = event_tx.subscribe();
            let render = render_tx.clone();
            let id = widget.id.clone();
            tasks.spawn(async move {
                heartbeat::run(hb, tick, requests, events, lifecycle_rx, render)
                    .await
                    .with_context(|| format!("widget {id} failed"))
            });
        }
        drop(render_tx);
        drop(request_tx);
        spawn_suspend_toggle(lifecycle_txs, cancel.clone());
    }

    let shuffle_seed = cfg.shuffle_seed;
    tasks.spawn({
        let cancel = cancel.clone();
        async move {
            router::run(request_rx, event_tx, shuffle_seed, cancel)
                .await
                .context("helper task failed")
        }
    });

    let mut failed = false;
    while let Some(res) = tasks.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::error!("{err:#}");
                failed = true;
                cancel.cancel();
            }
            Err(err) => {
                tracing::error!("task panicked: {err}");
                failed = true;
                cancel.cancel();
            }
        }
    }
    if failed {
        bail!("shut down after a task failure");
    }
    Ok(())
}

/// SIGUSR1 suspends every running widget and resumes every suspended one.
#[cfg(unix)]
fn spawn_suspend_toggle(widgets: Vec<mpsc::Sender<Lifecycle>>, cancel: CancellationToken) {
    tokio::spawn(async move {
        match signal(SignalKind::user_defined1()) {
            Ok(mut sigusr1) => loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    received = sigusr1.recv() => {
                        if received.is_none() {
                            break;
                        }
                        tracing::info!("SIGUSR1 received; toggling widgets");
                        for widget in &widgets {
                            if widget.send(Lifecycle::Toggle).await.is_err() {
                                tracing::debug!("widget already stopped");
                            }
                        }
                    }
                }
            },
            Err(err) => tracing::warn!("failed to register SIGUSR1 handler: {err}"),
        }
    });
}

#[cfg(not(unix))]
fn spawn_suspend_toggle(widgets: Vec<mpsc::Sender<Lifecycle>>, _cancel: CancellationToken) {
    drop(widgets);
}

/// Scan each widget's directories once and print the delivery order.
async fn run_dry_run(cfg: &Configuration, iterations: usize) -> Result<()> {
    for widget in &cfg.widgets {
        let rng = match cfg.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut session = ClientSession::new(widget.id.clone(), rng);
        let file_count = session.rebuild(widget.config.clone()).await;
        println!("{}\tfiles={}", widget.id, file_count);
        for i in 0..iterations {
            let index = session.cursor();
            match session.next().await {
                Ok(delivery) => println!("{}\t{i}\t{index}\t{}", widget.id, delivery.file_name),
                Err(err) => {
                    tracing::warn!("{err}");
                    break;
                }
            }
        }
    }
    Ok(())
}
