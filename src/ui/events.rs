//! Background task plumbing: spawning page fetches and applying their
//! results.

use crate::app::{App, AppEvent};
use newshub::feed::PageRequest;
use tokio::sync::mpsc;

/// Run `request` on a background task and deliver the result as
/// [`AppEvent::PageLoaded`].
///
/// Superseded requests are not aborted; their results arrive with an old
/// generation and are dropped by the controller.
pub(super) fn spawn_fetch(app: &App, request: PageRequest, event_tx: &mpsc::Sender<AppEvent>) {
    tracing::debug!(
        category = %request.query.category,
        page = request.page,
        generation = request.generation,
        "Spawning page fetch"
    );
    let fetch = app.session.fetch(request);
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let (request, result) = fetch.await;
        if let Err(e) = tx.send(AppEvent::PageLoaded { request, result }).await {
            tracing::warn!(error = %e, "Failed to deliver page (receiver dropped)");
        }
    });
}

pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::PageLoaded { request, result } => {
            if let Err(e) = &result {
                tracing::warn!(page = request.page, error = %e, "Page fetch failed");
            }
            app.apply_page(&request, result);
        }
    }
}
