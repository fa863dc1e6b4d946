//! Messages between connected accounts and their soft-delete lattice.
//!
//! A message is never erased. Each side can hide it from itself once; the
//! [`Visibility`] only ever narrows:
//!
//! ```text
//!                 ┌─ sender ──▶ HiddenFromSender ───┐
//! VisibleToBoth ──┤                                 ├─▶ HiddenFromBoth
//!                 └─ receiver ▶ HiddenFromReceiver ─┘
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, account::AccountId, connection, tx::NetworkTx};

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// A message identifier, allocated from a monotonic counter.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl std::str::FromStr for MessageId {
  type Err = std::num::ParseIntError;

  fn from_str(s: &str) -> Result<Self, Self::Err> { s.parse().map(Self) }
}

// ─── Visibility lattice ──────────────────────────────────────────────────────

/// Which side of a message an account is on.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
  Sender,
  Receiver,
}

/// Who can still see a message.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Visibility {
  VisibleToBoth,
  HiddenFromReceiver,
  HiddenFromSender,
  HiddenFromBoth,
}

impl Visibility {
  pub fn visible_to(self, role: Role) -> bool {
    match (self, role) {
      (Self::VisibleToBoth, _) => true,
      (Self::HiddenFromReceiver, Role::Sender) => true,
      (Self::HiddenFromSender, Role::Receiver) => true,
      _ => false,
    }
  }

  /// The state after `role` deletes the message, or `None` if it is
  /// already hidden from that side.
  pub fn hide_from(self, role: Role) -> Option<Self> {
    match (self, role) {
      (Self::VisibleToBoth, Role::Sender) => Some(Self::HiddenFromSender),
      (Self::VisibleToBoth, Role::Receiver) => Some(Self::HiddenFromReceiver),
      (Self::HiddenFromReceiver, Role::Sender) => Some(Self::HiddenFromBoth),
      (Self::HiddenFromSender, Role::Receiver) => Some(Self::HiddenFromBoth),
      _ => None,
    }
  }
}

// ─── Message ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
  pub message_id: MessageId,
  pub sender:     AccountId,
  pub receiver:   AccountId,
  pub body:       String,
  pub sent_at:    DateTime<Utc>,
  pub visibility: Visibility,
}

impl Message {
  /// The role `account` plays in this message, if any.
  pub fn role_of(&self, account: &AccountId) -> Option<Role> {
    if &self.sender == account {
      Some(Role::Sender)
    } else if &self.receiver == account {
      Some(Role::Receiver)
    } else {
      None
    }
  }
}

// ─── Operations ──────────────────────────────────────────────────────────────

/// Store a new message from `sender` to `receiver`. The two must be friends.
pub fn send<T: NetworkTx>(
  tx: &mut T,
  sender: &AccountId,
  receiver: &AccountId,
  body: String,
  sent_at: DateTime<Utc>,
) -> Result<Message, T::Error> {
  if !connection::is_friend(tx, sender, receiver)? {
    return Err(
      Error::NotConnected {
        sender:   sender.clone(),
        receiver: receiver.clone(),
      }
      .into(),
    );
  }

  let message = Message {
    message_id: tx.next_message_id()?,
    sender: sender.clone(),
    receiver: receiver.clone(),
    body,
    sent_at,
    visibility: Visibility::VisibleToBoth,
  };
  tx.insert_message(&message)?;
  Ok(message)
}

/// Hide message `id` from `actor`'s side. Returns the new visibility.
pub fn delete<T: NetworkTx>(
  tx: &mut T,
  actor: &AccountId,
  id: MessageId,
) -> Result<Visibility, T::Error> {
  let message = tx.message(id)?.ok_or(Error::NoSuchMessage(id))?;
  let role = message.role_of(actor).ok_or_else(|| Error::NotAParticipant {
    actor:   actor.clone(),
    message: id,
  })?;
  let next = message
    .visibility
    .hide_from(role)
    .ok_or(Error::AlreadyHidden { message: id, role })?;

  tx.update_visibility(id, next)?;
  Ok(next)
}

/// Messages received by `owner` that the receiver has not deleted.
pub fn inbox<T: NetworkTx>(
  tx: &T,
  owner: &AccountId,
) -> Result<Vec<Message>, T::Error> {
  let mut messages = tx.received_messages(owner)?;
  messages.retain(|m| m.visibility.visible_to(Role::Receiver));
  Ok(messages)
}

/// Messages sent by `owner` that the sender has not deleted.
pub fn sent<T: NetworkTx>(
  tx: &T,
  owner: &AccountId,
) -> Result<Vec<Message>, T::Error> {
  let mut messages = tx.sent_messages(owner)?;
  messages.retain(|m| m.visibility.visible_to(Role::Sender));
  Ok(messages)
}
