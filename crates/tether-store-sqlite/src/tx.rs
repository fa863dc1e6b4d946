//! [`SqliteTx`]: the [`NetworkTx`] view over an open SQLite transaction.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _, ffi};
use tether_core::{
  account::AccountId,
  connection::{ConnectionEdge, ConnectionStatus},
  message::{Message, MessageId, Visibility},
  tx::NetworkTx,
};

use crate::{
  Error, Result,
  encode::{RawEdge, RawMessage, encode_dt},
};

/// Borrowed view of a connection that is inside a transaction.
///
/// Only [`SqliteStore`](crate::SqliteStore) creates these, always on a
/// `rusqlite::Transaction` it commits or rolls back afterwards.
pub struct SqliteTx<'a> {
  conn: &'a Connection,
}

impl<'a> SqliteTx<'a> {
  pub(crate) fn new(conn: &'a Connection) -> Self { Self { conn } }

  /// The underlying connection, for statements outside the `NetworkTx`
  /// surface (account registration).
  pub(crate) fn conn(&self) -> &'a Connection { self.conn }

  fn edges_where(&self, column: &str, account: &AccountId) -> Result<Vec<ConnectionEdge>> {
    let sql = format!(
      "SELECT {} FROM connections WHERE {column} = ?1 ORDER BY requested_at, requester, target",
      RawEdge::COLUMNS,
    );
    let mut stmt = self.conn.prepare(&sql)?;
    let raws = stmt
      .query_map(rusqlite::params![account.as_str()], RawEdge::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(RawEdge::into_edge).collect()
  }

  fn messages_where(&self, column: &str, account: &AccountId) -> Result<Vec<Message>> {
    let sql = format!(
      "SELECT {} FROM messages WHERE {column} = ?1 ORDER BY sent_at, message_id",
      RawMessage::COLUMNS,
    );
    let mut stmt = self.conn.prepare(&sql)?;
    let raws = stmt
      .query_map(rusqlite::params![account.as_str()], RawMessage::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(RawMessage::into_message).collect()
  }
}

fn is_primary_key_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
  )
}

impl NetworkTx for SqliteTx<'_> {
  type Error = Error;

  // ── Accounts ──────────────────────────────────────────────────────────────

  fn account_exists(&self, id: &AccountId) -> Result<bool> {
    Ok(
      self
        .conn
        .query_row(
          "SELECT 1 FROM accounts WHERE account_id = ?1",
          rusqlite::params![id.as_str()],
          |_| Ok(()),
        )
        .optional()?
        .is_some(),
    )
  }

  // ── Edges ─────────────────────────────────────────────────────────────────

  fn edge(&self, requester: &AccountId, target: &AccountId) -> Result<Option<ConnectionEdge>> {
    let sql = format!(
      "SELECT {} FROM connections WHERE requester = ?1 AND target = ?2",
      RawEdge::COLUMNS,
    );
    self
      .conn
      .query_row(
        &sql,
        rusqlite::params![requester.as_str(), target.as_str()],
        RawEdge::from_row,
      )
      .optional()?
      .map(RawEdge::into_edge)
      .transpose()
  }

  fn outgoing_edges(&self, requester: &AccountId) -> Result<Vec<ConnectionEdge>> {
    self.edges_where("requester", requester)
  }

  fn incoming_edges(&self, target: &AccountId) -> Result<Vec<ConnectionEdge>> {
    self.edges_where("target", target)
  }

  fn insert_edge(&mut self, edge: &ConnectionEdge) -> Result<()> {
    let inserted = self.conn.execute(
      "INSERT INTO connections (requester, target, status, requested_at, responded_at)
       VALUES (?1, ?2, ?3, ?4, ?5)",
      rusqlite::params![
        edge.requester.as_str(),
        edge.target.as_str(),
        edge.status.as_ref(),
        encode_dt(edge.requested_at),
        edge.responded_at.map(encode_dt),
      ],
    );

    match inserted {
      Ok(_) => Ok(()),
      Err(e) if is_primary_key_violation(&e) => {
        let Some(existing) = self.edge(&edge.requester, &edge.target)? else {
          return Err(e.into());
        };
        Err(
          tether_core::Error::DuplicateRequest {
            requester: edge.requester.clone(),
            target:    edge.target.clone(),
            status:    existing.status,
          }
          .into(),
        )
      }
      Err(e) => Err(e.into()),
    }
  }

  fn update_edge_status(
    &mut self,
    requester: &AccountId,
    target: &AccountId,
    status: ConnectionStatus,
    responded_at: DateTime<Utc>,
  ) -> Result<()> {
    let changed = self.conn.execute(
      "UPDATE connections SET status = ?3, responded_at = ?4
       WHERE requester = ?1 AND target = ?2 AND status = 'requested'",
      rusqlite::params![
        requester.as_str(),
        target.as_str(),
        status.as_ref(),
        encode_dt(responded_at),
      ],
    )?;
    if changed == 0 {
      return Err(
        tether_core::Error::NoSuchRequest {
          requester: requester.clone(),
          responder: target.clone(),
        }
        .into(),
      );
    }
    Ok(())
  }

  // ── Messages ──────────────────────────────────────────────────────────────

  fn next_message_id(&mut self) -> Result<MessageId> {
    let id: i64 = self.conn.query_row(
      "UPDATE sequences SET value = value + 1 WHERE name = 'message' RETURNING value",
      [],
      |row| row.get(0),
    )?;
    Ok(MessageId(id))
  }

  fn insert_message(&mut self, message: &Message) -> Result<()> {
    self.conn.execute(
      "INSERT INTO messages (message_id, sender, receiver, body, sent_at, visibility)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      rusqlite::params![
        message.message_id.0,
        message.sender.as_str(),
        message.receiver.as_str(),
        message.body,
        encode_dt(message.sent_at),
        message.visibility.as_ref(),
      ],
    )?;
    Ok(())
  }

  fn message(&self, id: MessageId) -> Result<Option<Message>> {
    let sql = format!(
      "SELECT {} FROM messages WHERE message_id = ?1",
      RawMessage::COLUMNS,
    );
    self
      .conn
      .query_row(&sql, rusqlite::params![id.0], RawMessage::from_row)
      .optional()?
      .map(RawMessage::into_message)
      .transpose()
  }

  fn update_visibility(&mut self, id: MessageId, visibility: Visibility) -> Result<()> {
    self.conn.execute(
      "UPDATE messages SET visibility = ?2 WHERE message_id = ?1",
      rusqlite::params![id.0, visibility.as_ref()],
    )?;
    Ok(())
  }

  fn received_messages(&self, receiver: &AccountId) -> Result<Vec<Message>> {
    self.messages_where("receiver", receiver)
  }

  fn sent_messages(&self, sender: &AccountId) -> Result<Vec<Message>> {
    self.messages_where("sender", sender)
  }
}
