//! Runs one game action inside one store transaction: all of its writes
//! commit together, or none do.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{timeout_at, Instant};

use crate::config::settings;
use crate::db::{GameStore, StoreTx};
use crate::error::AbortReason;

/// A logical game action. `execute` signals abort by returning `Err`.
#[async_trait]
pub trait GameAction: Send {
    type Output: Send;

    /// Used in logs.
    fn name(&self) -> &'static str;

    async fn execute(self, tx: &mut dyn StoreTx) -> Result<Self::Output, AbortReason>;
}

/// Run `action` with the configured store timeout.
pub async fn run<A: GameAction>(store: &dyn GameStore, action: A) -> Result<A::Output, AbortReason> {
    run_with_timeout(store, action, settings().store_timeout).await
}

/// Run `action`; opening the transaction and executing it must finish
/// within `limit`.
///
/// There is no retry here. A timed-out transaction is rolled back and the
/// caller decides whether to re-issue the action. The commit itself is not
/// under `limit`: once it starts, its outcome is reported as it is, so a
/// `StoreTimeout` always means nothing was written.
pub async fn run_with_timeout<A: GameAction>(
    store: &dyn GameStore,
    action: A,
    limit: Duration,
) -> Result<A::Output, AbortReason> {
    let name = action.name();
    let deadline = Instant::now() + limit;

    let result = async {
        let mut tx = timeout_at(deadline, store.begin())
            .await
            .map_err(|_| AbortReason::StoreTimeout)??;

        let executed = match timeout_at(deadline, action.execute(&mut *tx)).await {
            Ok(r) => r,
            Err(_) => Err(AbortReason::StoreTimeout),
        };
        match executed {
            Ok(out) => {
                tx.commit().await?;
                Ok(out)
            }
            Err(reason) => {
                if let Err(e) = tx.rollback().await {
                    log::error!("{name}: rollback failed: {e}");
                }
                Err(reason)
            }
        }
    }
    .await;

    match &result {
        Err(reason) if reason.is_store_failure() => {
            log::error!("{name} aborted: {reason}")
        }
        Err(reason) => log::warn!("{name} aborted: {reason}"),
        Ok(_) => log::debug!("{name} committed"),
    }
    result
}
