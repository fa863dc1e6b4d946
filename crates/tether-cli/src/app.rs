//! Command dispatch: runs one subcommand against the store and prints the
//! result.

use anyhow::{Context, Result};
use serde::Serialize;
use tether_core::{
  account::AccountId,
  connection::{ConnectionEdge, Eligibility},
  message::Message,
  store::NetworkStore,
};

use crate::Command;

/// Execute `command` as `actor` and print its result to stdout.
pub async fn run<S>(
  store: &S,
  actor: Option<AccountId>,
  command: Command,
  json: bool,
) -> Result<()>
where
  S: NetworkStore,
{
  // Every command other than `register` acts on behalf of someone.
  let acting = || {
    actor
      .clone()
      .context("no acting account; pass --as <ACCOUNT> or set TETHER_AS")
  };

  match command {
    Command::Register { account } => {
      let account = store
        .register_account(account.clone())
        .await
        .with_context(|| format!("registering {account}"))?;
      emit(json, &account, |a| format!("registered {}", a.account_id))
    }

    Command::Eligibility { target } => {
      let eligibility = store
        .can_request(acting()?, target)
        .await
        .context("checking eligibility")?;
      emit(json, &eligibility, |e| describe_eligibility(*e))
    }

    Command::Request { target } => {
      let edge = store
        .request_connection(acting()?, target.clone())
        .await
        .with_context(|| format!("requesting connection to {target}"))?;
      emit(json, &edge, format_edge)
    }

    Command::Respond { requester, decision } => {
      let edge = store
        .respond_to_request(acting()?, requester.clone(), decision)
        .await
        .with_context(|| format!("responding to {requester}"))?;
      emit(json, &edge, format_edge)
    }

    Command::Incoming => {
      let edges = store
        .incoming_requests(acting()?)
        .await
        .context("listing incoming requests")?;
      emit(json, &edges, |edges| {
        lines(edges, |e| format!("{}  {}", e.requester, e.requested_at.to_rfc3339()))
      })
    }

    Command::Friends => {
      let friends = store
        .friends(acting()?)
        .await
        .context("listing connections")?;
      emit(json, &friends, |friends| lines(friends, ToString::to_string))
    }

    Command::Send { receiver, body } => {
      let id = store
        .send_message(acting()?, receiver.clone(), body)
        .await
        .with_context(|| format!("sending message to {receiver}"))?;
      emit(json, &serde_json::json!({ "message_id": id }), |_| {
        format!("sent message {id}")
      })
    }

    Command::Delete { message } => {
      store
        .delete_message(acting()?, message)
        .await
        .with_context(|| format!("deleting message {message}"))?;
      emit(json, &serde_json::json!({ "message_id": message }), |_| {
        format!("deleted message {message}")
      })
    }

    Command::Inbox => {
      let messages = store
        .list_inbox(acting()?)
        .await
        .context("listing inbox")?;
      emit(json, &messages, |m| lines(m, format_message))
    }

    Command::Sent => {
      let messages = store
        .list_sent(acting()?)
        .await
        .context("listing sent messages")?;
      emit(json, &messages, |m| lines(m, format_message))
    }
  }
}

// ─── Output ───────────────────────────────────────────────────────────────────

fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce(&T) -> String) -> Result<()> {
  let out = if json {
    serde_json::to_string_pretty(value).context("serialising output")?
  } else {
    human(value)
  };
  if !out.is_empty() {
    println!("{out}");
  }
  Ok(())
}

fn lines<T>(items: &[T], f: impl Fn(&T) -> String) -> String {
  items.iter().map(f).collect::<Vec<_>>().join("\n")
}

fn describe_eligibility(e: Eligibility) -> String {
  match e {
    Eligibility::UnderQuota => "eligible (under quota)".to_owned(),
    Eligibility::WithinReach => "eligible (within two hops)".to_owned(),
    Eligibility::AlreadyRequested(status) => format!("not eligible (already {status})"),
    Eligibility::OutOfReach => "not eligible (quota reached, out of reach)".to_owned(),
  }
}

fn format_edge(e: &ConnectionEdge) -> String {
  format!("{} -> {}: {}", e.requester, e.target, e.status)
}

fn format_message(m: &Message) -> String {
  format!(
    "#{}  {}  {} -> {}  {}",
    m.message_id,
    m.sent_at.to_rfc3339(),
    m.sender,
    m.receiver,
    m.body,
  )
}
