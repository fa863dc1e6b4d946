//! Public workflows, each composed from the graph and messaging engines.
//!
//! Every function here is meant to run as one unit inside a single
//! [`NetworkTx`]; a store commits only when the workflow returns `Ok`.
//! Engine failures are passed through unchanged.

use chrono::{DateTime, SubsecRound as _, Utc};

use crate::{
  Error,
  account::AccountId,
  connection::{self, ConnectionEdge, Decision, Eligibility},
  message::{self, Message, MessageId},
  tx::NetworkTx,
};

/// The current time at the microsecond precision stores persist, so a
/// returned record equals the one read back later.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

/// Send a connection request from `requester` to `target`.
///
/// Fails with [`Error::DuplicateRequest`] if the ordered pair already has an
/// edge and with [`Error::OutOfReach`] if the requester is over quota and
/// the target is outside its two-hop frontier.
pub fn request_connection<T: NetworkTx>(
  tx: &mut T,
  requester: &AccountId,
  target: &AccountId,
) -> Result<ConnectionEdge, T::Error> {
  match connection::can_request(tx, requester, target)? {
    Eligibility::UnderQuota | Eligibility::WithinReach => {
      connection::create_request(tx, requester, target, now())
    }
    Eligibility::AlreadyRequested(status) => Err(
      Error::DuplicateRequest {
        requester: requester.clone(),
        target:    target.clone(),
        status,
      }
      .into(),
    ),
    Eligibility::OutOfReach => Err(
      Error::OutOfReach {
        requester: requester.clone(),
        target:    target.clone(),
      }
      .into(),
    ),
  }
}

/// Accept or reject the pending request `requester -> responder`.
pub fn respond_to_request<T: NetworkTx>(
  tx: &mut T,
  responder: &AccountId,
  requester: &AccountId,
  decision: Decision,
) -> Result<ConnectionEdge, T::Error> {
  connection::respond(tx, responder, requester, decision, now())
}

/// Send `body` from `sender` to `receiver`; returns the new message id.
pub fn send_message<T: NetworkTx>(
  tx: &mut T,
  sender: &AccountId,
  receiver: &AccountId,
  body: String,
) -> Result<MessageId, T::Error> {
  message::send(tx, sender, receiver, body, now()).map(|m| m.message_id)
}

/// Hide message `id` from `actor`'s side of the conversation.
pub fn delete_message<T: NetworkTx>(
  tx: &mut T,
  actor: &AccountId,
  id: MessageId,
) -> Result<(), T::Error> {
  message::delete(tx, actor, id).map(drop)
}

pub fn list_inbox<T: NetworkTx>(
  tx: &T,
  owner: &AccountId,
) -> Result<Vec<Message>, T::Error> {
  message::inbox(tx, owner)
}

pub fn list_sent<T: NetworkTx>(
  tx: &T,
  owner: &AccountId,
) -> Result<Vec<Message>, T::Error> {
  message::sent(tx, owner)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    connection::ConnectionStatus,
    message::Visibility,
    testing::{MemoryTx, id},
  };

  #[test]
  fn now_has_no_sub_microsecond_part() {
    use chrono::Timelike as _;
    assert_eq!(now().nanosecond() % 1_000, 0);
  }

  #[test]
  fn duplicate_request_is_refused() {
    let mut tx = MemoryTx::with_accounts(["a", "b"]);
    request_connection(&mut tx, &id("a"), &id("b")).unwrap();
    let err = request_connection(&mut tx, &id("a"), &id("b")).unwrap_err();
    assert!(matches!(
      err,
      Error::DuplicateRequest { status: ConnectionStatus::Requested, .. }
    ));
  }

  #[test]
  fn rejected_pair_stays_closed() {
    let mut tx = MemoryTx::with_accounts(["a", "b"]);
    request_connection(&mut tx, &id("a"), &id("b")).unwrap();
    respond_to_request(&mut tx, &id("b"), &id("a"), Decision::Reject).unwrap();
    let err = request_connection(&mut tx, &id("a"), &id("b")).unwrap_err();
    assert!(matches!(
      err,
      Error::DuplicateRequest { status: ConnectionStatus::Rejected, .. }
    ));
  }

  #[test]
  fn over_quota_without_path_fails() {
    let mut tx =
      MemoryTx::with_accounts(["a", "b1", "b2", "b3", "b4", "b5", "c"]);
    for n in 1..=5 {
      request_connection(&mut tx, &id("a"), &id(&format!("b{n}"))).unwrap();
    }
    let err = request_connection(&mut tx, &id("a"), &id("c")).unwrap_err();
    assert!(matches!(err, Error::OutOfReach { .. }));
    assert_eq!(tx.edge_count(), 5);
  }

  #[test]
  fn messaging_scenario() {
    let mut tx = MemoryTx::with_accounts(["a", "b"]);
    request_connection(&mut tx, &id("a"), &id("b")).unwrap();
    respond_to_request(&mut tx, &id("b"), &id("a"), Decision::Accept).unwrap();

    let m = send_message(&mut tx, &id("a"), &id("b"), "hi".into()).unwrap();
    assert_eq!(m, MessageId(1));

    delete_message(&mut tx, &id("b"), m).unwrap();
    assert_eq!(
      tx.visibility_of(m),
      Some(Visibility::HiddenFromReceiver)
    );
    assert!(list_inbox(&tx, &id("b")).unwrap().is_empty());
    assert_eq!(list_sent(&tx, &id("a")).unwrap().len(), 1);

    delete_message(&mut tx, &id("a"), m).unwrap();
    assert_eq!(tx.visibility_of(m), Some(Visibility::HiddenFromBoth));

    let err = delete_message(&mut tx, &id("a"), m).unwrap_err();
    assert!(matches!(err, Error::AlreadyHidden { .. }));
  }
}
