//! SQL schema for the Tether SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS` / `OR IGNORE`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    account_id  TEXT PRIMARY KEY,
    created_at  TEXT NOT NULL
);

-- One row per ordered pair, ever. Only status and responded_at change.
CREATE TABLE IF NOT EXISTS connections (
    requester     TEXT NOT NULL REFERENCES accounts(account_id),
    target        TEXT NOT NULL REFERENCES accounts(account_id),
    status        TEXT NOT NULL,   -- 'requested' | 'accepted' | 'rejected'
    requested_at  TEXT NOT NULL,
    responded_at  TEXT,
    PRIMARY KEY (requester, target),
    CHECK (requester != target)
);

-- Messages are never deleted; only visibility narrows.
CREATE TABLE IF NOT EXISTS messages (
    message_id  INTEGER PRIMARY KEY,
    sender      TEXT NOT NULL REFERENCES accounts(account_id),
    receiver    TEXT NOT NULL REFERENCES accounts(account_id),
    body        TEXT NOT NULL,
    sent_at     TEXT NOT NULL,   -- fixed-width RFC 3339 UTC, sorts lexically
    visibility  TEXT NOT NULL    -- see tether_core::message::Visibility
);

-- Monotonic id allocators, advanced inside the writing transaction.
CREATE TABLE IF NOT EXISTS sequences (
    name   TEXT PRIMARY KEY,
    value  INTEGER NOT NULL
);
INSERT OR IGNORE INTO sequences (name, value) VALUES ('message', 0);

CREATE INDEX IF NOT EXISTS connections_target_idx ON connections(target);
CREATE INDEX IF NOT EXISTS messages_sender_idx    ON messages(sender, sent_at);
CREATE INDEX IF NOT EXISTS messages_receiver_idx  ON messages(receiver, sent_at);

PRAGMA user_version = 1;
";
