//! Event loop driving a [`MediaBrowser`].
//!
//! One task owns the browser. Input events and clock ticks are processed one
//! at a time and each runs to completion before the next is taken. Page
//! fetches asked for with `LoadMore` run on the blocking pool; their results
//! come back through the loop, so a tab switched away meanwhile drops them.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::app::{BrowserNotice, MediaBrowser};
use crate::managers::input_bindings::{PointerInput, PointerTarget};
use crate::types::item::{FileId, ReactionKind};
use crate::types::overlay::Rect;
use crate::managers::tab_store::PageRequest;
use crate::types::errors::ServiceError;
use crate::types::tab::{Page, TabId};

/// Discrete events fed into the loop by the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserEvent {
    Key(String),
    Pointer {
        pointer: PointerInput,
        target: PointerTarget,
    },
    ItemClick {
        index: usize,
        pointer: PointerInput,
        origin: Rect,
    },
    React {
        file_id: FileId,
        kind: ReactionKind,
    },
    CancelReaction(FileId),
    Preview(FileId),
    AssetLoaded(FileId),
    SwitchTab(TabId),
    CloseTab(TabId),
    LoadMore,
    Shutdown,
}

fn handle_event(
    browser: &mut MediaBrowser,
    event: BrowserEvent,
    now: Instant,
    notices: &mpsc::UnboundedSender<BrowserNotice>,
) {
    let mut overlay_effects = Vec::new();
    match event {
        BrowserEvent::Key(key) => overlay_effects = browser.handle_key(&key, now),
        BrowserEvent::Pointer { pointer, target } => {
            overlay_effects = browser.handle_pointer(pointer, target, now).1
        }
        BrowserEvent::ItemClick {
            index,
            pointer,
            origin,
        } => overlay_effects = browser.handle_item_click(index, pointer, origin, now),
        BrowserEvent::React { file_id, kind } => overlay_effects = browser.react(file_id, kind, now),
        BrowserEvent::CancelReaction(file_id) => {
            browser.cancel_reaction(file_id);
        }
        BrowserEvent::Preview(file_id) => {
            // Results are applied to the collection when the batch flushes.
            drop(browser.preview(file_id, now));
        }
        BrowserEvent::AssetLoaded(file_id) => {
            if let Err(error) = browser.asset_loaded(file_id) {
                debug!(%file_id, %error, "seen increment failed");
            }
        }
        BrowserEvent::SwitchTab(tab_id) => {
            if let Err(error) = browser.switch_tab(&tab_id) {
                let _ = notices.send(BrowserNotice::LoadFailed { error });
            }
        }
        BrowserEvent::CloseTab(tab_id) => {
            if let Err(error) = browser.close_tab(&tab_id) {
                let _ = notices.send(BrowserNotice::LoadFailed { error });
            }
        }
        // Both are handled by the loop itself.
        BrowserEvent::LoadMore | BrowserEvent::Shutdown => {}
    }
    for effect in overlay_effects {
        let _ = notices.send(BrowserNotice::Overlay(effect));
    }
}

type PageResult = (PageRequest, Result<Page, ServiceError>);

/// Starts fetching the active tab's next page off the loop. Returns false
/// when there was nothing to fetch.
fn start_page_load(browser: &mut MediaBrowser, loaded: &mpsc::UnboundedSender<PageResult>) -> bool {
    let Some(request) = browser.begin_page_load() else {
        return false;
    };
    let pages = browser.page_service();
    let loaded = loaded.clone();
    tokio::task::spawn_blocking(move || {
        let result = pages.fetch_page(&request.token, &request.params, &request.tab_id);
        let _ = loaded.send((request, result));
    });
    true
}

/// Runs until `Shutdown` arrives or every event sender is dropped, then hands
/// the browser back. Page loads already started are applied before returning.
pub async fn run_event_loop(
    mut browser: MediaBrowser,
    mut events: mpsc::Receiver<BrowserEvent>,
    notices: mpsc::UnboundedSender<BrowserNotice>,
    tick_every: Duration,
) -> MediaBrowser {
    let mut ticker = tokio::time::interval(tick_every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!(tick_ms = tick_every.as_millis() as u64, "event loop started");

    let (loaded_tx, mut loaded_rx) = mpsc::unbounded_channel::<PageResult>();
    let mut loads_in_flight = 0usize;
    let mut stopping = false;

    while !(stopping && loads_in_flight == 0) {
        tokio::select! {
            biased;
            event = events.recv(), if !stopping => match event {
                None | Some(BrowserEvent::Shutdown) => stopping = true,
                Some(BrowserEvent::LoadMore) => {
                    if start_page_load(&mut browser, &loaded_tx) {
                        loads_in_flight += 1;
                    }
                }
                Some(event) => handle_event(&mut browser, event, Instant::now(), &notices),
            },
            Some((request, result)) = loaded_rx.recv() => {
                loads_in_flight = loads_in_flight.saturating_sub(1);
                match browser.finish_page_load(request, result) {
                    Ok(outcome) => debug!(?outcome, "page load finished"),
                    Err(error) => {
                        let _ = notices.send(BrowserNotice::LoadFailed { error });
                    }
                }
            }
            _ = ticker.tick() => {
                for notice in browser.tick(Instant::now()) {
                    let _ = notices.send(notice);
                }
            }
        }
    }

    info!("event loop stopped");
    browser
}
