//! The scoped-transaction view every workflow runs against.
//!
//! A storage backend opens a transaction, hands the workflow a `NetworkTx`,
//! and then commits if the workflow returned `Ok` or rolls back if it
//! returned `Err`. The engines only ever touch persisted state through this
//! trait, so a whole workflow (eligibility check, insert, id allocation) is
//! one atomic unit.

use chrono::{DateTime, Utc};

use crate::{
  account::AccountId,
  connection::{ConnectionEdge, ConnectionStatus},
  message::{Message, MessageId, Visibility},
};

/// Primitive reads and writes over accounts, edges and messages.
///
/// `Error` must absorb [`crate::Error`] so the engines can raise domain
/// failures through the backend's own error type.
pub trait NetworkTx {
  type Error: From<crate::Error>;

  // ── Accounts ──────────────────────────────────────────────────────────

  fn account_exists(&self, id: &AccountId) -> Result<bool, Self::Error>;

  // ── Edges ─────────────────────────────────────────────────────────────

  /// The edge for the ordered pair `(requester, target)`, if any.
  fn edge(
    &self,
    requester: &AccountId,
    target: &AccountId,
  ) -> Result<Option<ConnectionEdge>, Self::Error>;

  /// Every edge `requester` created, in any status, oldest first.
  fn outgoing_edges(
    &self,
    requester: &AccountId,
  ) -> Result<Vec<ConnectionEdge>, Self::Error>;

  /// Every edge targeting `target`, in any status, oldest first.
  fn incoming_edges(
    &self,
    target: &AccountId,
  ) -> Result<Vec<ConnectionEdge>, Self::Error>;

  /// Insert a new edge. Must fail with
  /// [`crate::Error::DuplicateRequest`] if the ordered pair is taken.
  fn insert_edge(&mut self, edge: &ConnectionEdge) -> Result<(), Self::Error>;

  fn update_edge_status(
    &mut self,
    requester: &AccountId,
    target: &AccountId,
    status: ConnectionStatus,
    responded_at: DateTime<Utc>,
  ) -> Result<(), Self::Error>;

  // ── Messages ──────────────────────────────────────────────────────────

  /// Allocate the next message id. No two committed messages may share an
  /// id; the allocation takes effect only if the enclosing transaction
  /// commits.
  fn next_message_id(&mut self) -> Result<MessageId, Self::Error>;

  fn insert_message(&mut self, message: &Message) -> Result<(), Self::Error>;

  fn message(&self, id: MessageId) -> Result<Option<Message>, Self::Error>;

  fn update_visibility(
    &mut self,
    id: MessageId,
    visibility: Visibility,
  ) -> Result<(), Self::Error>;

  /// All messages addressed to `receiver`, any visibility, ordered by
  /// `sent_at` then id.
  fn received_messages(
    &self,
    receiver: &AccountId,
  ) -> Result<Vec<Message>, Self::Error>;

  /// All messages sent by `sender`, any visibility, ordered by `sent_at`
  /// then id.
  fn sent_messages(&self, sender: &AccountId) -> Result<Vec<Message>, Self::Error>;
}
