use anyhow::Result;
use tokio::sync::mpsc::Receiver;
use tracing::info;

use crate::events::RenderUpdate;

/// Headless renderer: logs every repaint the widgets ask for.
///
/// Runs until every widget has dropped its sender.
pub async fn run(mut updates: Receiver<RenderUpdate>) -> Result<()> {
    let mut renders: u64 = 0;
    while let Some(update) = updates.recv().await {
        renders += 1;
        paint(&update);
    }
    info!(renders, "renderer finished");
    Ok(())
}

fn paint(update: &RenderUpdate) {
    let bytes = update.content.as_ref().map_or(0, |c| c.data_url.len());
    match &update.transition {
        Some(transition) => info!(
            client_id = %update.client_id,
            header = %update.header,
            entry = transition.entry,
            exit = transition.exit,
            speed = ?transition.speed,
            bytes,
            "render"
        ),
        None => info!(
            client_id = %update.client_id,
            header = %update.header,
            "render status"
        ),
    }
    if update.transition.is_some()
        && let Some(content) = &update.content
    {
        info!("loaded {} with {}", update.client_id, content.name);
    }
}
