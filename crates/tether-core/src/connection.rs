//! Connection graph: directed connection requests and their lifecycle.
//!
//! An edge `(requester, target)` is created once, in [`Requested`] state, and
//! is answered exactly once by its target. Two accounts are friends when an
//! [`Accepted`] edge exists between them in either direction.
//!
//! A requester may hold [`DIRECT_QUOTA`] outgoing edges freely. Past that,
//! new requests are only allowed towards accounts within [`REACH_HOPS`]
//! hops of the requester's network.
//!
//! [`Requested`]: ConnectionStatus::Requested
//! [`Accepted`]: ConnectionStatus::Accepted

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, account::AccountId, tx::NetworkTx};

/// Outgoing edges a requester may hold before reachability applies.
pub const DIRECT_QUOTA: usize = 5;

/// Hop count of the reachability frontier used once the quota is reached.
pub const REACH_HOPS: usize = 2;

// ─── Types ───────────────────────────────────────────────────────────────────

/// Status of a connection edge.
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
pub enum ConnectionStatus {
  Requested,
  Accepted,
  Rejected,
}

impl ConnectionStatus {
  pub fn is_pending(self) -> bool { matches!(self, Self::Requested) }
}

/// The target's answer to a connection request.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Decision {
  Accept,
  Reject,
}

impl Decision {
  /// The terminal status this decision moves an edge to.
  pub fn status(self) -> ConnectionStatus {
    match self {
      Self::Accept => ConnectionStatus::Accepted,
      Self::Reject => ConnectionStatus::Rejected,
    }
  }
}

/// A directed connection request and its current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionEdge {
  pub requester:    AccountId,
  pub target:       AccountId,
  pub status:       ConnectionStatus,
  pub requested_at: DateTime<Utc>,
  /// Set when the target accepts or rejects.
  pub responded_at: Option<DateTime<Utc>>,
}

impl ConnectionEdge {
  /// The account on the other end of this edge, seen from `account`.
  pub fn other(&self, account: &AccountId) -> Option<&AccountId> {
    if &self.requester == account {
      Some(&self.target)
    } else if &self.target == account {
      Some(&self.requester)
    } else {
      None
    }
  }
}

/// Outcome of an eligibility check for a new connection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "eligibility", content = "status", rename_all = "snake_case")]
pub enum Eligibility {
  /// The requester holds fewer than [`DIRECT_QUOTA`] outgoing edges.
  UnderQuota,
  /// Quota reached, but the target is within [`REACH_HOPS`] hops.
  WithinReach,
  /// An edge for this ordered pair already exists; carries its status.
  AlreadyRequested(ConnectionStatus),
  /// Quota reached and the target is outside the reachability frontier.
  OutOfReach,
}

impl Eligibility {
  pub fn is_eligible(self) -> bool {
    matches!(self, Self::UnderQuota | Self::WithinReach)
  }
}

// ─── Eligibility ─────────────────────────────────────────────────────────────

/// Decide whether `requester` may send a connection request to `target`.
///
/// Fails with [`Error::SelfRequest`] or [`Error::UnknownAccount`] for an
/// invalid pair; every other outcome is reported as an [`Eligibility`].
pub fn can_request<T: NetworkTx>(
  tx: &T,
  requester: &AccountId,
  target: &AccountId,
) -> Result<Eligibility, T::Error> {
  if requester == target {
    return Err(Error::SelfRequest.into());
  }
  for account in [requester, target] {
    if !tx.account_exists(account)? {
      return Err(Error::UnknownAccount(account.clone()).into());
    }
  }

  if let Some(existing) = tx.edge(requester, target)? {
    return Ok(Eligibility::AlreadyRequested(existing.status));
  }

  if tx.outgoing_edges(requester)?.len() < DIRECT_QUOTA {
    return Ok(Eligibility::UnderQuota);
  }

  if reach_frontier(tx, requester)?.contains(target) {
    Ok(Eligibility::WithinReach)
  } else {
    Ok(Eligibility::OutOfReach)
  }
}

/// Accounts adjacent to `account` for reachability purposes: every target it
/// requested (in any status) plus every requester whose edge into it was
/// accepted.
pub fn neighbours<T: NetworkTx>(
  tx: &T,
  account: &AccountId,
) -> Result<BTreeSet<AccountId>, T::Error> {
  let mut out: BTreeSet<AccountId> = tx
    .outgoing_edges(account)?
    .into_iter()
    .map(|e| e.target)
    .collect();
  out.extend(
    tx.incoming_edges(account)?
      .into_iter()
      .filter(|e| e.status == ConnectionStatus::Accepted)
      .map(|e| e.requester),
  );
  Ok(out)
}

/// The set of accounts exactly [`REACH_HOPS`] neighbour expansions away
/// from `origin`.
pub fn reach_frontier<T: NetworkTx>(
  tx: &T,
  origin: &AccountId,
) -> Result<BTreeSet<AccountId>, T::Error> {
  let mut frontier = BTreeSet::from([origin.clone()]);
  for _ in 0..REACH_HOPS {
    let mut next = BTreeSet::new();
    for account in &frontier {
      next.extend(neighbours(tx, account)?);
    }
    frontier = next;
  }
  Ok(frontier)
}

// ─── Mutations ───────────────────────────────────────────────────────────────

/// Insert a fresh `Requested` edge. Callers must have checked
/// [`can_request`] inside the same transaction.
pub fn create_request<T: NetworkTx>(
  tx: &mut T,
  requester: &AccountId,
  target: &AccountId,
  requested_at: DateTime<Utc>,
) -> Result<ConnectionEdge, T::Error> {
  let edge = ConnectionEdge {
    requester:    requester.clone(),
    target:       target.clone(),
    status:       ConnectionStatus::Requested,
    requested_at,
    responded_at: None,
  };
  tx.insert_edge(&edge)?;
  Ok(edge)
}

/// Answer the pending request `requester -> responder`.
pub fn respond<T: NetworkTx>(
  tx: &mut T,
  responder: &AccountId,
  requester: &AccountId,
  decision: Decision,
  responded_at: DateTime<Utc>,
) -> Result<ConnectionEdge, T::Error> {
  let Some(mut edge) = tx.edge(requester, responder)? else {
    return Err(
      Error::NoSuchRequest {
        requester: requester.clone(),
        responder: responder.clone(),
      }
      .into(),
    );
  };
  if !edge.status.is_pending() {
    return Err(
      Error::NotInRequestedState {
        requester: requester.clone(),
        responder: responder.clone(),
        status:    edge.status,
      }
      .into(),
    );
  }

  let status = decision.status();
  tx.update_edge_status(requester, responder, status, responded_at)?;
  edge.status = status;
  edge.responded_at = Some(responded_at);
  Ok(edge)
}

// ─── Reads ───────────────────────────────────────────────────────────────────

/// `true` iff an accepted edge joins `a` and `b` in either direction.
pub fn is_friend<T: NetworkTx>(
  tx: &T,
  a: &AccountId,
  b: &AccountId,
) -> Result<bool, T::Error> {
  let accepted = |edge: Option<ConnectionEdge>| {
    edge.is_some_and(|e| e.status == ConnectionStatus::Accepted)
  };
  Ok(accepted(tx.edge(a, b)?) || accepted(tx.edge(b, a)?))
}

/// Number of accepted edges `account` requested.
pub fn friend_count<T: NetworkTx>(
  tx: &T,
  account: &AccountId,
) -> Result<usize, T::Error> {
  Ok(
    tx.outgoing_edges(account)?
      .iter()
      .filter(|e| e.status == ConnectionStatus::Accepted)
      .count(),
  )
}

/// Everyone `account` is friends with, in either direction, sorted.
pub fn friends<T: NetworkTx>(
  tx: &T,
  account: &AccountId,
) -> Result<Vec<AccountId>, T::Error> {
  let mut out = BTreeSet::new();
  for edge in tx
    .outgoing_edges(account)?
    .into_iter()
    .chain(tx.incoming_edges(account)?)
  {
    if edge.status == ConnectionStatus::Accepted
      && let Some(other) = edge.other(account)
    {
      out.insert(other.clone());
    }
  }
  Ok(out.into_iter().collect())
}

/// Requests addressed to `account` that are still awaiting an answer.
pub fn incoming_requests<T: NetworkTx>(
  tx: &T,
  account: &AccountId,
) -> Result<Vec<ConnectionEdge>, T::Error> {
  let mut pending = tx.incoming_edges(account)?;
  pending.retain(|e| e.status.is_pending());
  Ok(pending)
}
