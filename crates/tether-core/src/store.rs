//! The `NetworkStore` trait: the interface the surrounding application
//! calls into.
//!
//! The trait is implemented by storage backends (e.g. `tether-store-sqlite`).
//! Implementations run each write method as a single atomic unit, typically
//! by handing a [`NetworkTx`](crate::tx::NetworkTx) to the matching function
//! in [`workflow`](crate::workflow) inside one database transaction.

use std::future::Future;

use crate::{
  account::{Account, AccountId},
  connection::{ConnectionEdge, Decision, Eligibility},
  message::{Message, MessageId},
};

/// Abstraction over a Tether store backend.
///
/// Every method takes the acting account explicitly; there is no ambient
/// session. All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait NetworkStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Register a new account. Fails if the id is taken.
  fn register_account(
    &self,
    id: AccountId,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  /// Retrieve an account. Returns `None` if not found.
  fn account(
    &self,
    id: AccountId,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  fn account_exists(
    &self,
    id: AccountId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Connections ───────────────────────────────────────────────────────

  /// Check, without writing, whether `requester` may request `target`.
  fn can_request(
    &self,
    requester: AccountId,
    target: AccountId,
  ) -> impl Future<Output = Result<Eligibility, Self::Error>> + Send + '_;

  /// Create a pending connection request.
  fn request_connection(
    &self,
    requester: AccountId,
    target: AccountId,
  ) -> impl Future<Output = Result<ConnectionEdge, Self::Error>> + Send + '_;

  /// Accept or reject the pending request `requester -> responder`.
  fn respond_to_request(
    &self,
    responder: AccountId,
    requester: AccountId,
    decision: Decision,
  ) -> impl Future<Output = Result<ConnectionEdge, Self::Error>> + Send + '_;

  /// The edge for the ordered pair, if any.
  fn connection(
    &self,
    requester: AccountId,
    target: AccountId,
  ) -> impl Future<Output = Result<Option<ConnectionEdge>, Self::Error>> + Send + '_;

  /// Requests addressed to `owner` that still await an answer.
  fn incoming_requests(
    &self,
    owner: AccountId,
  ) -> impl Future<Output = Result<Vec<ConnectionEdge>, Self::Error>> + Send + '_;

  /// Accounts joined to `owner` by an accepted edge in either direction.
  fn friends(
    &self,
    owner: AccountId,
  ) -> impl Future<Output = Result<Vec<AccountId>, Self::Error>> + Send + '_;

  fn is_friend(
    &self,
    a: AccountId,
    b: AccountId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Accepted edges `owner` requested.
  fn friend_count(
    &self,
    owner: AccountId,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Messages ──────────────────────────────────────────────────────────

  fn send_message(
    &self,
    sender: AccountId,
    receiver: AccountId,
    body: String,
  ) -> impl Future<Output = Result<MessageId, Self::Error>> + Send + '_;

  /// Hide a message from `actor`'s side.
  fn delete_message(
    &self,
    actor: AccountId,
    id: MessageId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Received messages not hidden from `owner`, oldest first.
  fn list_inbox(
    &self,
    owner: AccountId,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + '_;

  /// Sent messages not hidden from `owner`, oldest first.
  fn list_sent(
    &self,
    owner: AccountId,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + '_;
}
