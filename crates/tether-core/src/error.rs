//! Error types for `tether-core`.
//!
//! Every variant is an expected, caller-recoverable outcome of a workflow.

use thiserror::Error;

use crate::{
  account::AccountId,
  connection::ConnectionStatus,
  message::{MessageId, Role},
};

#[derive(Debug, Clone, Error)]
pub enum Error {
  #[error("invalid account id: {0:?}")]
  InvalidAccountId(String),

  #[error("account not found: {0}")]
  UnknownAccount(AccountId),

  #[error("account already exists: {0}")]
  AccountExists(AccountId),

  #[error("an account cannot send a connection request to itself")]
  SelfRequest,

  #[error("connection request {requester} -> {target} already exists ({status})")]
  DuplicateRequest {
    requester: AccountId,
    target:    AccountId,
    status:    ConnectionStatus,
  },

  #[error("{target} is not within reach of {requester}'s network")]
  OutOfReach {
    requester: AccountId,
    target:    AccountId,
  },

  #[error("no connection request from {requester} to {responder}")]
  NoSuchRequest {
    requester: AccountId,
    responder: AccountId,
  },

  #[error("connection request {requester} -> {responder} is already {status}")]
  NotInRequestedState {
    requester: AccountId,
    responder: AccountId,
    status:    ConnectionStatus,
  },

  #[error("{sender} and {receiver} are not connected")]
  NotConnected {
    sender:   AccountId,
    receiver: AccountId,
  },

  #[error("message not found: {0}")]
  NoSuchMessage(MessageId),

  #[error("{actor} is neither the sender nor the receiver of message {message}")]
  NotAParticipant {
    actor:   AccountId,
    message: MessageId,
  },

  #[error("message {message} is already hidden from its {role}")]
  AlreadyHidden {
    message: MessageId,
    role:    Role,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
