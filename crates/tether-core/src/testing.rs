//! In-memory [`NetworkTx`] used by the engine unit tests.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::{
  Error,
  account::AccountId,
  connection::{ConnectionEdge, ConnectionStatus},
  message::{Message, MessageId, Visibility},
  tx::NetworkTx,
};

pub fn id(s: &str) -> AccountId { AccountId::new(s).unwrap() }

/// Make `a` and `b` friends through an accepted `a -> b` edge.
pub fn friends_with(tx: &mut MemoryTx, a: &str, b: &str) {
  tx.edges.push(ConnectionEdge {
    requester:    id(a),
    target:       id(b),
    status:       ConnectionStatus::Accepted,
    requested_at: Utc::now(),
    responded_at: Some(Utc::now()),
  });
}

#[derive(Default)]
pub struct MemoryTx {
  accounts: BTreeSet<AccountId>,
  edges:    Vec<ConnectionEdge>,
  messages: Vec<Message>,
  last_id:  i64,
}

impl MemoryTx {
  pub fn with_accounts<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
    Self {
      accounts: ids.into_iter().map(id).collect(),
      ..Default::default()
    }
  }

  pub fn edge_count(&self) -> usize { self.edges.len() }

  pub fn visibility_of(&self, id: MessageId) -> Option<Visibility> {
    self
      .messages
      .iter()
      .find(|m| m.message_id == id)
      .map(|m| m.visibility)
  }

  fn sorted(mut messages: Vec<Message>) -> Vec<Message> {
    messages.sort_by_key(|m| (m.sent_at, m.message_id));
    messages
  }
}

impl NetworkTx for MemoryTx {
  type Error = Error;

  fn account_exists(&self, id: &AccountId) -> Result<bool, Error> {
    Ok(self.accounts.contains(id))
  }

  fn edge(
    &self,
    requester: &AccountId,
    target: &AccountId,
  ) -> Result<Option<ConnectionEdge>, Error> {
    Ok(
      self
        .edges
        .iter()
        .find(|e| &e.requester == requester && &e.target == target)
        .cloned(),
    )
  }

  fn outgoing_edges(&self, requester: &AccountId) -> Result<Vec<ConnectionEdge>, Error> {
    Ok(self.edges.iter().filter(|e| &e.requester == requester).cloned().collect())
  }

  fn incoming_edges(&self, target: &AccountId) -> Result<Vec<ConnectionEdge>, Error> {
    Ok(self.edges.iter().filter(|e| &e.target == target).cloned().collect())
  }

  fn insert_edge(&mut self, edge: &ConnectionEdge) -> Result<(), Error> {
    if let Some(existing) = self.edge(&edge.requester, &edge.target)? {
      return Err(Error::DuplicateRequest {
        requester: edge.requester.clone(),
        target:    edge.target.clone(),
        status:    existing.status,
      });
    }
    self.edges.push(edge.clone());
    Ok(())
  }

  fn update_edge_status(
    &mut self,
    requester: &AccountId,
    target: &AccountId,
    status: ConnectionStatus,
    responded_at: DateTime<Utc>,
  ) -> Result<(), Error> {
    let Some(edge) = self.edges.iter_mut().find(|e| {
      &e.requester == requester && &e.target == target && e.status.is_pending()
    }) else {
      return Err(Error::NoSuchRequest {
        requester: requester.clone(),
        responder: target.clone(),
      });
    };
    edge.status = status;
    edge.responded_at = Some(responded_at);
    Ok(())
  }

  fn next_message_id(&mut self) -> Result<MessageId, Error> {
    self.last_id += 1;
    Ok(MessageId(self.last_id))
  }

  fn insert_message(&mut self, message: &Message) -> Result<(), Error> {
    self.messages.push(message.clone());
    Ok(())
  }

  fn message(&self, id: MessageId) -> Result<Option<Message>, Error> {
    Ok(self.messages.iter().find(|m| m.message_id == id).cloned())
  }

  fn update_visibility(&mut self, id: MessageId, visibility: Visibility) -> Result<(), Error> {
    let Some(m) = self.messages.iter_mut().find(|m| m.message_id == id) else {
      return Err(Error::NoSuchMessage(id));
    };
    m.visibility = visibility;
    Ok(())
  }

  fn received_messages(&self, receiver: &AccountId) -> Result<Vec<Message>, Error> {
    Ok(Self::sorted(
      self.messages.iter().filter(|m| &m.receiver == receiver).cloned().collect(),
    ))
  }

  fn sent_messages(&self, sender: &AccountId) -> Result<Vec<Message>, Error> {
    Ok(Self::sorted(
      self.messages.iter().filter(|m| &m.sender == sender).cloned().collect(),
    ))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn updates_without_a_matching_row_fail() {
    let mut tx = MemoryTx::with_accounts(["a", "b"]);
    let err = tx
      .update_edge_status(&id("a"), &id("b"), ConnectionStatus::Accepted, Utc::now())
      .unwrap_err();
    assert!(matches!(err, Error::NoSuchRequest { .. }));

    friends_with(&mut tx, "a", "b");
    let err = tx
      .update_edge_status(&id("a"), &id("b"), ConnectionStatus::Rejected, Utc::now())
      .unwrap_err();
    assert!(matches!(err, Error::NoSuchRequest { .. }));

    let err = tx
      .update_visibility(MessageId(9), Visibility::HiddenFromBoth)
      .unwrap_err();
    assert!(matches!(err, Error::NoSuchMessage(MessageId(9))));
  }
}
