//! Live feed of the user's subject collection.
//!
//! A background task long-polls the snapshot endpoint and forwards every new
//! snapshot to the UI loop. The first failure is forwarded too and ends the
//! feed; the user can resubscribe from the dashboard.

use tally_core::{store::Snapshot, user::UserId};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::client::ApiClient;

/// How long the server may hold one poll open.
pub const POLL_WAIT_SECS: u64 = 20;

#[derive(Debug)]
pub enum SubscriptionEvent {
  Snapshot(Snapshot),
  Error(String),
}

/// Handle to a running feed. Dropping it stops the polling task.
pub struct Subscription {
  rx:   mpsc::UnboundedReceiver<SubscriptionEvent>,
  task: JoinHandle<()>,
}

impl Subscription {
  pub fn spawn(client: ApiClient, user: UserId) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(poll_loop(client, user, tx));
    Self { rx, task }
  }

  /// Next pending event, without waiting.
  pub fn try_next(&mut self) -> Option<SubscriptionEvent> { self.rx.try_recv().ok() }

  /// Wait for the next event. `None` once the feed has ended and been
  /// drained.
  #[cfg(test)]
  pub async fn next(&mut self) -> Option<SubscriptionEvent> { self.rx.recv().await }
}

impl Drop for Subscription {
  fn drop(&mut self) { self.task.abort(); }
}

async fn poll_loop(
  client: ApiClient,
  user: UserId,
  tx: mpsc::UnboundedSender<SubscriptionEvent>,
) {
  let mut seen: Option<u64> = None;
  loop {
    match client.snapshot(user, seen, POLL_WAIT_SECS).await {
      Ok(snapshot) => {
        // A timed-out poll answers with the version we already have.
        if seen.is_some_and(|v| snapshot.version <= v) {
          continue;
        }
        seen = Some(snapshot.version);
        if tx.send(SubscriptionEvent::Snapshot(snapshot)).is_err() {
          return;
        }
      }
      Err(e) => {
        let _ = tx.send(SubscriptionEvent::Error(format!("{e:#}")));
        return;
      }
    }
  }
}
