//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that lexical order equals chronological order. Enums are stored
//! as their snake_case names.

use chrono::{DateTime, SecondsFormat, Utc};
use tether_core::{
  account::{Account, AccountId},
  connection::{ConnectionEdge, ConnectionStatus},
  message::{Message, MessageId, Visibility},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Identifiers ─────────────────────────────────────────────────────────────

pub fn decode_account_id(column: &'static str, s: String) -> Result<AccountId> {
  AccountId::new(s.clone()).map_err(|_| Error::Decode { column, value: s })
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_status(s: &str) -> Result<ConnectionStatus> {
  s.parse().map_err(|_| Error::Decode {
    column: "status",
    value:  s.to_owned(),
  })
}

pub fn decode_visibility(s: &str) -> Result<Visibility> {
  s.parse().map_err(|_| Error::Decode {
    column: "visibility",
    value:  s.to_owned(),
  })
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// Column values read straight out of `accounts`.
pub struct RawAccount {
  pub account_id: String,
  pub created_at: String,
}

impl RawAccount {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      account_id: row.get(0)?,
      created_at: row.get(1)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      account_id: decode_account_id("account_id", self.account_id)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Column values read straight out of `connections`.
pub struct RawEdge {
  pub requester:    String,
  pub target:       String,
  pub status:       String,
  pub requested_at: String,
  pub responded_at: Option<String>,
}

impl RawEdge {
  pub const COLUMNS: &'static str =
    "requester, target, status, requested_at, responded_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      requester:    row.get(0)?,
      target:       row.get(1)?,
      status:       row.get(2)?,
      requested_at: row.get(3)?,
      responded_at: row.get(4)?,
    })
  }

  pub fn into_edge(self) -> Result<ConnectionEdge> {
    Ok(ConnectionEdge {
      requester:    decode_account_id("requester", self.requester)?,
      target:       decode_account_id("target", self.target)?,
      status:       decode_status(&self.status)?,
      requested_at: decode_dt(&self.requested_at)?,
      responded_at: self.responded_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Column values read straight out of `messages`.
pub struct RawMessage {
  pub message_id: i64,
  pub sender:     String,
  pub receiver:   String,
  pub body:       String,
  pub sent_at:    String,
  pub visibility: String,
}

impl RawMessage {
  pub const COLUMNS: &'static str =
    "message_id, sender, receiver, body, sent_at, visibility";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      message_id: row.get(0)?,
      sender:     row.get(1)?,
      receiver:   row.get(2)?,
      body:       row.get(3)?,
      sent_at:    row.get(4)?,
      visibility: row.get(5)?,
    })
  }

  pub fn into_message(self) -> Result<Message> {
    Ok(Message {
      message_id: MessageId(self.message_id),
      sender:     decode_account_id("sender", self.sender)?,
      receiver:   decode_account_id("receiver", self.receiver)?,
      body:       self.body,
      sent_at:    decode_dt(&self.sent_at)?,
      visibility: decode_visibility(&self.visibility)?,
    })
  }
}
