//! tabbed-gallery demo.
//!
//! Drives the gallery core against in-memory collaborators: a tab is created
//! and pointed at a source, pages are scrolled, an item is opened in the
//! overlay, reacted to and restored, and the event loop runs a few ticks.

use std::env;
use std::error::Error;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tabbed_gallery::app::{Collaborators, MediaBrowser};
use tabbed_gallery::managers::tab_store::TabStoreTrait;
use tabbed_gallery::runtime::{run_event_loop, BrowserEvent};
use tabbed_gallery::services::collaborators::NoopView;
use tabbed_gallery::services::config_engine::{ConfigEngine, ConfigEngineTrait};
use tabbed_gallery::services::in_memory::{
    InMemoryCounters, InMemoryPageSource, InMemoryTabStore, RecordingReactionService,
};
use tabbed_gallery::services::logging;
use tabbed_gallery::types::item::{FileId, ReactionKind};
use tabbed_gallery::types::overlay::Rect;
use tabbed_gallery::types::tab::QueryParams;
use tokio::sync::mpsc;
use tracing::info;

const CONFIG_ENV: &str = "TABBED_GALLERY_CONFIG";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let config_path = env::var(CONFIG_ENV).unwrap_or_else(|_| "tabbed-gallery.json".to_string());
    let mut engine = ConfigEngine::new(config_path);
    let config = engine.load()?;

    let counters = Arc::new(InMemoryCounters::new());
    let reactions = Arc::new(RecordingReactionService::new());
    let services = Collaborators {
        persistence: Arc::new(InMemoryTabStore::new()),
        pages: Arc::new(InMemoryPageSource::numbered(20, 5)),
        reactions: reactions.clone(),
        previews: counters.clone(),
        seen: counters,
        view: Arc::new(NoopView),
    };
    let mut browser = MediaBrowser::new(config, services);

    let tab = browser.create_tab("Gallery")?;
    browser.apply_service(&tab, QueryParams::for_source("local"))?;
    browser.load_more()?;
    if let Some(active) = browser.tabs().active_tab() {
        info!(
            items = active.items.len(),
            token = ?active.cursor.current_token(),
            "scrolled two pages"
        );
    }

    let now = Instant::now();
    browser.open_item(1, Rect::new(0.0, 0.0, 240.0, 180.0), now);
    browser.react(FileId(2), ReactionKind::Love, now);
    info!(
        index = ?browser.overlay().current_index(),
        pending = browser.reactions().len(),
        "reacted to the open item"
    );
    browser.cancel_reaction(FileId(2));
    browser.react(FileId(3), ReactionKind::Like, now);

    let (events_tx, events_rx) = mpsc::channel(32);
    let (notices_tx, mut notices_rx) = mpsc::unbounded_channel();
    events_tx.send(BrowserEvent::Key("ArrowRight".to_string())).await?;
    events_tx.send(BrowserEvent::Preview(FileId(4))).await?;
    events_tx.send(BrowserEvent::Key("Escape".to_string())).await?;

    let driver = tokio::spawn(run_event_loop(
        browser,
        events_rx,
        notices_tx,
        Duration::from_millis(50),
    ));
    tokio::time::sleep(Duration::from_millis(600)).await;
    events_tx.send(BrowserEvent::Shutdown).await?;
    let browser = driver.await?;

    while let Ok(notice) = notices_rx.try_recv() {
        info!(?notice, "notice");
    }
    info!(
        tabs = browser.tabs().tab_count(),
        pending_reactions = browser.reactions().len(),
        committed = reactions.submitted().len(),
        "demo finished"
    );
    Ok(())
}
