//! Controller actor: runs a [`ReconnectController`] in its own task.
//!
//! Client callbacks and the retry loop never touch the controller
//! directly. They send commands through an mpsc channel; one task owns the
//! controller and processes commands one at a time, so the attempt counter
//! and the tracker writes never race.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use warden_status::StatusTracker;

use crate::{CacheEvent, Reaction, ReconnectController, ReconnectError};

/// Commands sent to the controller task.
enum ControllerCommand {
    /// Handle an event and reply with the reaction.
    Report {
        event: CacheEvent,
        reply: oneshot::Sender<Reaction>,
    },
    /// Handle an event, nobody is waiting for the reaction.
    Notify(CacheEvent),
}

/// Handle to a running controller task. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    sender: mpsc::Sender<ControllerCommand>,
}

impl ControllerHandle {
    /// Sends `event` and waits for the controller's reaction.
    ///
    /// # Errors
    /// [`ReconnectError::ControllerClosed`] if the task has stopped.
    pub async fn report(&self, event: CacheEvent) -> Result<Reaction, ReconnectError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(ControllerCommand::Report {
                event,
                reply: reply_tx,
            })
            .await
            .map_err(|_| ReconnectError::ControllerClosed)?;
        reply_rx.await.map_err(|_| ReconnectError::ControllerClosed)
    }

    /// Sends `event` without waiting for the reaction.
    ///
    /// Ordering is preserved: a later `report` is handled after this event.
    ///
    /// # Errors
    /// [`ReconnectError::ControllerClosed`] if the task has stopped.
    pub async fn notify(&self, event: CacheEvent) -> Result<(), ReconnectError> {
        self.sender
            .send(ControllerCommand::Notify(event))
            .await
            .map_err(|_| ReconnectError::ControllerClosed)
    }
}

/// Spawns `controller` as the single consumer of cache-client events.
///
/// The task runs until every [`ControllerHandle`] has been dropped, then
/// yields the controller back through the join handle (useful for
/// inspecting counters in tests and at shutdown).
pub fn spawn_controller<T: StatusTracker>(
    controller: ReconnectController<T>,
    capacity: usize,
) -> (ControllerHandle, JoinHandle<ReconnectController<T>>) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    let task = tokio::spawn(run(controller, receiver));
    (ControllerHandle { sender }, task)
}

async fn run<T: StatusTracker>(
    mut controller: ReconnectController<T>,
    mut receiver: mpsc::Receiver<ControllerCommand>,
) -> ReconnectController<T> {
    tracing::debug!("reconnect controller started");

    while let Some(cmd) = receiver.recv().await {
        match cmd {
            ControllerCommand::Report { event, reply } => {
                let reaction = controller.handle(event);
                // The reporter may have given up waiting; that's fine.
                let _ = reply.send(reaction);
            }
            ControllerCommand::Notify(event) => {
                controller.handle(event);
            }
        }
    }

    tracing::debug!("reconnect controller stopped");
    controller
}
