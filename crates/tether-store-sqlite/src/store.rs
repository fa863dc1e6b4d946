//! [`SqliteStore`]: the SQLite implementation of [`NetworkStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tether_core::{
  account::{Account, AccountId},
  connection::{self, ConnectionEdge, Decision, Eligibility},
  message::{Message, MessageId},
  store::NetworkStore,
  tx::NetworkTx,
  workflow,
};

use crate::{
  Error, Result,
  encode::{RawAccount, encode_dt},
  schema::SCHEMA,
  tx::SqliteTx,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tether store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All
/// database work runs on the connection's dedicated thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` inside one `IMMEDIATE` transaction.
  ///
  /// The write lock is taken when the transaction begins, so the reads a
  /// workflow bases its decision on cannot go stale before its writes land.
  /// Commits if `f` returns `Ok`, rolls back otherwise.
  pub(crate) async fn run<R, F>(&self, workflow: &'static str, f: F) -> Result<R>
  where
    F: FnOnce(&mut SqliteTx<'_>) -> Result<R> + Send + 'static,
    R: Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let outcome = f(&mut SqliteTx::new(&tx));
        match outcome {
          Ok(value) => {
            tx.commit()?;
            tracing::trace!(workflow, "committed");
            Ok(Ok(value))
          }
          Err(e) => {
            tx.rollback()?;
            tracing::debug!(workflow, error = %e, "rolled back");
            Ok(Err(e))
          }
        }
      })
      .await?
  }
}

// ─── NetworkStore impl ───────────────────────────────────────────────────────

impl NetworkStore for SqliteStore {
  type Error = Error;

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn register_account(&self, id: AccountId) -> Result<Account> {
    self
      .run("register_account", move |tx| {
        if tx.account_exists(&id)? {
          return Err(tether_core::Error::AccountExists(id).into());
        }
        let account = Account { account_id: id, created_at: workflow::now() };
        tx.conn().execute(
          "INSERT INTO accounts (account_id, created_at) VALUES (?1, ?2)",
          rusqlite::params![account.account_id.as_str(), encode_dt(account.created_at)],
        )?;
        Ok(account)
      })
      .await
  }

  async fn account(&self, id: AccountId) -> Result<Option<Account>> {
    self
      .run("account", move |tx| {
        tx.conn()
          .query_row(
            "SELECT account_id, created_at FROM accounts WHERE account_id = ?1",
            rusqlite::params![id.as_str()],
            RawAccount::from_row,
          )
          .optional()?
          .map(RawAccount::into_account)
          .transpose()
      })
      .await
  }

  async fn account_exists(&self, id: AccountId) -> Result<bool> {
    self.run("account_exists", move |tx| tx.account_exists(&id)).await
  }

  // ── Connections ───────────────────────────────────────────────────────────

  async fn can_request(&self, requester: AccountId, target: AccountId) -> Result<Eligibility> {
    self
      .run("can_request", move |tx| connection::can_request(tx, &requester, &target))
      .await
  }

  async fn request_connection(
    &self,
    requester: AccountId,
    target: AccountId,
  ) -> Result<ConnectionEdge> {
    self
      .run("request_connection", move |tx| {
        workflow::request_connection(tx, &requester, &target)
      })
      .await
  }

  async fn respond_to_request(
    &self,
    responder: AccountId,
    requester: AccountId,
    decision: Decision,
  ) -> Result<ConnectionEdge> {
    self
      .run("respond_to_request", move |tx| {
        workflow::respond_to_request(tx, &responder, &requester, decision)
      })
      .await
  }

  async fn connection(
    &self,
    requester: AccountId,
    target: AccountId,
  ) -> Result<Option<ConnectionEdge>> {
    self.run("connection", move |tx| tx.edge(&requester, &target)).await
  }

  async fn incoming_requests(&self, owner: AccountId) -> Result<Vec<ConnectionEdge>> {
    self
      .run("incoming_requests", move |tx| connection::incoming_requests(tx, &owner))
      .await
  }

  async fn friends(&self, owner: AccountId) -> Result<Vec<AccountId>> {
    self.run("friends", move |tx| connection::friends(tx, &owner)).await
  }

  async fn is_friend(&self, a: AccountId, b: AccountId) -> Result<bool> {
    self.run("is_friend", move |tx| connection::is_friend(tx, &a, &b)).await
  }

  async fn friend_count(&self, owner: AccountId) -> Result<usize> {
    self.run("friend_count", move |tx| connection::friend_count(tx, &owner)).await
  }

  // ── Messages ──────────────────────────────────────────────────────────────

  async fn send_message(
    &self,
    sender: AccountId,
    receiver: AccountId,
    body: String,
  ) -> Result<MessageId> {
    self
      .run("send_message", move |tx| {
        workflow::send_message(tx, &sender, &receiver, body)
      })
      .await
  }

  async fn delete_message(&self, actor: AccountId, id: MessageId) -> Result<()> {
    self
      .run("delete_message", move |tx| workflow::delete_message(tx, &actor, id))
      .await
  }

  async fn list_inbox(&self, owner: AccountId) -> Result<Vec<Message>> {
    self.run("list_inbox", move |tx| workflow::list_inbox(tx, &owner)).await
  }

  async fn list_sent(&self, owner: AccountId) -> Result<Vec<Message>> {
    self.run("list_sent", move |tx| workflow::list_sent(tx, &owner)).await
  }
}
