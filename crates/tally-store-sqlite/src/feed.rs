//! Per-user snapshot channels.
//!
//! One [`watch::Sender`] exists per user with at least one live subscriber.
//! Publishing only ever moves a channel forward: a snapshot whose version is
//! not newer than the one already held is discarded, so racing publishers
//! cannot roll a subscriber back.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError},
};

use tally_core::{
  store::{Snapshot, SnapshotReceiver},
  user::UserId,
};
use tokio::sync::watch;

#[derive(Clone, Default)]
pub struct Feeds {
  senders: Arc<Mutex<HashMap<UserId, watch::Sender<Snapshot>>>>,
}

impl Feeds {
  /// Attach a receiver to `user`'s channel, creating it from `initial` if
  /// none exists. An existing channel is advanced to `initial` when newer.
  pub fn attach(&self, user: UserId, initial: Snapshot) -> SnapshotReceiver {
    let mut senders = self.senders.lock().unwrap_or_else(PoisonError::into_inner);
    match senders.get(&user) {
      Some(tx) => {
        advance(tx, initial);
        tx.subscribe()
      }
      None => {
        let (tx, rx) = watch::channel(initial);
        senders.insert(user, tx);
        rx
      }
    }
  }

  /// Whether anyone is listening to `user`. Drops the channel when its last
  /// receiver has gone away.
  pub fn is_watched(&self, user: UserId) -> bool {
    let mut senders = self.senders.lock().unwrap_or_else(PoisonError::into_inner);
    match senders.get(&user) {
      Some(tx) if tx.receiver_count() > 0 => true,
      Some(_) => {
        senders.remove(&user);
        false
      }
      None => false,
    }
  }

  /// Deliver `snapshot` to `user`'s subscribers, if any.
  pub fn publish(&self, user: UserId, snapshot: Snapshot) {
    let senders = self.senders.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(tx) = senders.get(&user) {
      advance(tx, snapshot);
    }
  }

  #[cfg(test)]
  pub fn channel_count(&self) -> usize {
    self.senders.lock().unwrap_or_else(PoisonError::into_inner).len()
  }
}

fn advance(tx: &watch::Sender<Snapshot>, next: Snapshot) {
  tx.send_if_modified(|current| {
    if next.version > current.version {
      *current = next;
      true
    } else {
      false
    }
  });
}
