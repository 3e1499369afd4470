//! Background task plumbing for the UI.
//!
//! Every store call runs in its own tokio task and reports back through the
//! `AppEvent` channel. The list is only touched on the event loop.

use crate::app::{App, AppEvent, UpdateKind};
use crate::list::ListError;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Wraps a future to catch panics and convert them to errors.
///
/// # Returns
///
/// - `Ok(result)` if the future completes normally
/// - `Err(panic_message)` if the future panics
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Spawn `work` and forward the event it produces.
///
/// A panic inside `work` becomes `AppEvent::TaskPanicked` instead.
fn spawn_reporting<F>(task: &'static str, tx: mpsc::Sender<AppEvent>, work: F) -> JoinHandle<()>
where
    F: Future<Output = AppEvent> + Send + 'static,
{
    tokio::spawn(async move {
        match catch_task_panic(work).await {
            Ok(event) => {
                if let Err(e) = tx.send(event).await {
                    tracing::warn!(error = %e, task, "Channel send failed (receiver dropped)");
                }
            }
            Err(panic_msg) => {
                tracing::error!(task, error = %panic_msg, "Background task panicked");
                let _ = tx
                    .send(AppEvent::TaskPanicked {
                        task,
                        error: panic_msg,
                    })
                    .await;
            }
        }
    })
}

/// Fetch the whole list, replacing any fetch still in flight.
pub(super) fn spawn_load(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(handle) = app.load_handle.take() {
        handle.abort();
        tracing::debug!("Aborted previous list load");
    }

    let generation = app.list.begin_load();
    let client = app.client.clone();
    tracing::debug!(generation, "Spawning list load");

    app.load_handle = Some(spawn_reporting("load", event_tx.clone(), async move {
        AppEvent::Loaded {
            generation,
            result: client.list().await,
        }
    }));
}

/// Submit the draft title as a new item.
pub(super) fn spawn_create(
    app: &mut App,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<(), ListError> {
    let body = app.list.begin_create(app.list.draft_title())?;
    let client = app.client.clone();

    let handle = spawn_reporting("create", event_tx.clone(), async move {
        let result = client.create(&body).await;
        AppEvent::Created {
            title: body.title,
            result,
        }
    });
    app.track_create(handle);
    Ok(())
}

/// Delete the selected item. Returns false if a delete is already running.
pub(super) fn spawn_remove(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) -> bool {
    let Some(id) = app.selected_item().map(|item| item.id.clone()) else {
        return false;
    };
    if app.is_removing(&id) {
        return false;
    }

    let ticket = app.list.begin_remove(&id);
    // A pending toggle or commit for this item is moot now.
    if let Some((_, handle)) = app.update_handles.remove(&id) {
        handle.abort();
    }

    let client = app.client.clone();
    let task_ticket = ticket.clone();
    let handle = spawn_reporting("remove", event_tx.clone(), async move {
        let result = client.delete(&task_ticket.id).await;
        AppEvent::Removed {
            ticket: task_ticket,
            result,
        }
    });
    app.track_remove(&ticket, handle);
    true
}

/// Flip completion on the selected item.
pub(super) fn spawn_toggle(
    app: &mut App,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<(), ListError> {
    let Some(id) = app.selected_item().map(|item| item.id.clone()) else {
        return Ok(());
    };
    // Toggle relative to any toggle still in flight, not the stored value
    let Some(current) = app.list.completed_target(&id) else {
        return Ok(());
    };

    let (ticket, patch) = app.list.begin_toggle(&id, current)?;
    spawn_update(app, ticket, patch, UpdateKind::Toggle, event_tx);
    Ok(())
}

/// Save the staged title of the item under the edit cursor.
pub(super) fn spawn_commit(
    app: &mut App,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<(), ListError> {
    let (ticket, patch) = app.list.begin_commit()?;
    spawn_update(app, ticket, patch, UpdateKind::Commit, event_tx);
    Ok(())
}

fn spawn_update(
    app: &mut App,
    ticket: crate::list::Ticket,
    patch: crate::api::ItemPatch,
    kind: UpdateKind,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let client = app.client.clone();
    let task_ticket = ticket.clone();
    tracing::debug!(id = %ticket.id, generation = ticket.generation, ?kind, "Spawning update");

    let handle = spawn_reporting(kind.task_name(), event_tx.clone(), async move {
        let result = client.update(&task_ticket.id, &patch).await;
        AppEvent::Updated {
            ticket: task_ticket,
            kind,
            result,
        }
    });
    app.track_update(&ticket, handle);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Item, ItemId, TodoClient, DEFAULT_TIMEOUT};
    use crate::list::Features;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_catch_task_panic_passes_value() {
        assert_eq!(catch_task_panic(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn test_catch_task_panic_static_str() {
        let result: Result<(), String> = catch_task_panic(async { panic!("boom") }).await;
        assert_eq!(result, Err("boom".to_string()));
    }

    #[tokio::test]
    async fn test_catch_task_panic_formatted() {
        let id = 5;
        let result: Result<(), String> =
            catch_task_panic(async move { panic!("item {} vanished", id) }).await;
        assert_eq!(result, Err("item 5 vanished".to_string()));
    }

    #[tokio::test]
    async fn test_spawn_reporting_forwards_panic() {
        let (tx, mut rx) = mpsc::channel(4);
        let handle = spawn_reporting("load", tx, async {
            if true {
                panic!("exploded");
            }
            AppEvent::TaskPanicked {
                task: "unreachable",
                error: String::new(),
            }
        });
        handle.await.unwrap();
        match rx.recv().await {
            Some(AppEvent::TaskPanicked { task, error }) => {
                assert_eq!(task, "load");
                assert_eq!(error, "exploded");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_second_toggle_press_flips_back() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/todos/1"))
            .and(body_json(serde_json::json!({"completed": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"id": 1, "title": "a", "completed": false}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = TodoClient::new(&server.uri(), DEFAULT_TIMEOUT).unwrap();
        let mut app = App::new(client, Features::default());
        let generation = app.list.begin_load();
        app.list
            .apply_load(
                generation,
                Ok(vec![Item {
                    id: ItemId::from(1),
                    title: "a".to_string(),
                    completed: false,
                }]),
            )
            .unwrap();

        let (tx, mut rx) = mpsc::channel(4);
        spawn_toggle(&mut app, &tx).unwrap();
        spawn_toggle(&mut app, &tx).unwrap();
        assert_eq!(app.list.completed_target(&ItemId::from(1)), Some(false));

        let (_, handle) = app.update_handles.remove(&ItemId::from(1)).unwrap();
        handle.await.unwrap();
        match rx.recv().await {
            Some(AppEvent::Updated { result, .. }) => assert!(!result.unwrap().completed),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
