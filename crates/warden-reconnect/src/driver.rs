//! The retry loop a cache-store client runs while (re)connecting.

use crate::{CacheEvent, ConnectFault, ControllerHandle, Reaction, ReconnectError};

/// One connection attempt against the cache store.
///
/// Implemented by the cache client adapter. The retry loop calls
/// `connect` repeatedly until it succeeds or fails with a fault the
/// controller escalates.
pub trait Connector: Send {
    /// Attempts to connect once.
    fn connect(
        &mut self,
    ) -> impl std::future::Future<Output = Result<(), ConnectFault>> + Send;
}

/// Connects `connector`, retrying on retry-handled faults.
///
/// Reports `Connecting` up front and waits until it is applied, then
/// reports every failure to the controller and sleeps for the delay it
/// hands back. On success the controller gets
/// `Ready` and the tracker reads `Connected` before this returns.
///
/// Never gives up on retry-handled faults. Request handlers don't wait on
/// this loop; they check the tracker and degrade instead.
///
/// # Errors
/// - [`ReconnectError::Escalated`]: the controller classified a fault as
///   not retry-handled. The caller decides whether that is fatal.
/// - [`ReconnectError::ControllerClosed`]: the controller task is gone.
pub async fn reconnect<C: Connector>(
    connector: &mut C,
    controller: &ControllerHandle,
) -> Result<(), ReconnectError> {
    // Wait for the controller so the tracker reads Connecting before the
    // first attempt runs.
    controller.report(CacheEvent::Connecting).await?;

    loop {
        let fault = match connector.connect().await {
            Ok(()) => {
                controller.report(CacheEvent::Ready).await?;
                return Ok(());
            }
            Err(fault) => fault,
        };

        match controller.report(CacheEvent::Failed(fault)).await? {
            Reaction::Retry { delay, .. } => tokio::time::sleep(delay).await,
            Reaction::Escalated(fault) => return Err(ReconnectError::Escalated(fault)),
            Reaction::Applied => {
                // Failures always produce Retry or Escalated.
                tracing::debug!("failure reported without a retry decision");
            }
        }
    }
}
