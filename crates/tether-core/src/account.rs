//! Accounts: the identities that connections and messages hang off.
//!
//! An account carries nothing but its identity. Profile fields live with
//! whatever collaborator owns them; the core only ever asks whether an
//! account exists.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Longest accepted account identifier, in characters.
pub const MAX_ACCOUNT_ID_LEN: usize = 64;

/// A stable, unique account identifier (the login name).
///
/// Construct with [`AccountId::new`] or [`str::parse`]; both reject empty
/// identifiers, identifiers containing whitespace, and identifiers longer
/// than [`MAX_ACCOUNT_ID_LEN`].
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
  pub fn new(id: impl Into<String>) -> Result<Self, Error> {
    let id = id.into();
    if id.is_empty()
      || id.chars().count() > MAX_ACCOUNT_ID_LEN
      || id.chars().any(char::is_whitespace)
    {
      return Err(Error::InvalidAccountId(id));
    }
    Ok(Self(id))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for AccountId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl FromStr for AccountId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> { Self::new(s) }
}

impl TryFrom<String> for AccountId {
  type Error = Error;

  fn try_from(s: String) -> Result<Self, Self::Error> { Self::new(s) }
}

impl From<AccountId> for String {
  fn from(id: AccountId) -> Self { id.0 }
}

impl AsRef<str> for AccountId {
  fn as_ref(&self) -> &str { &self.0 }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
  pub account_id: AccountId,
  pub created_at: DateTime<Utc>,
}
