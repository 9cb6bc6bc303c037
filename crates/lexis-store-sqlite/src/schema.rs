//! SQL schema for the Lexis SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS dictionaries (
    dictionary_id TEXT PRIMARY KEY,
    owner         TEXT NOT NULL,
    name          TEXT NOT NULL,
    description   TEXT,
    created_at    TEXT NOT NULL    -- RFC 3339 UTC
);

-- Rowid order is insertion order; selection ties are broken on it.
CREATE TABLE IF NOT EXISTS words (
    word_id       TEXT PRIMARY KEY,
    dictionary_id TEXT NOT NULL REFERENCES dictionaries(dictionary_id),
    name          TEXT NOT NULL,
    translation   TEXT NOT NULL,
    context       TEXT,
    example       TEXT,
    added_on      TEXT NOT NULL    -- YYYY-MM-DD
);

-- Exactly one row per word. Rows are updated in place, never deleted.
CREATE TABLE IF NOT EXISTS schedules (
    word_id           TEXT PRIMARY KEY REFERENCES words(word_id),
    dictionary_id     TEXT NOT NULL REFERENCES dictionaries(dictionary_id),
    status            TEXT NOT NULL,   -- 'NEW' | 'IS_LEARNING' | 'LEARNT'
    stage             TEXT NOT NULL,   -- 'STAGE1' .. 'STAGE6'
    total_train_count INTEGER NOT NULL DEFAULT 0,
    last_train_date   TEXT,
    next_train_date   TEXT NOT NULL,
    learnt_date       TEXT
);

CREATE TABLE IF NOT EXISTS trainings (
    training_id   TEXT PRIMARY KEY,
    dictionary_id TEXT NOT NULL REFERENCES dictionaries(dictionary_id),
    kind          TEXT NOT NULL,   -- 'new' | 'repeat'
    trained_on    TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    scheduled_on  TEXT             -- NULL until the schedule is formed
);

-- The fixed word batch of a training, in selection order.
CREATE TABLE IF NOT EXISTS training_words (
    training_id TEXT NOT NULL REFERENCES trainings(training_id),
    position    INTEGER NOT NULL,
    word_id     TEXT NOT NULL REFERENCES words(word_id),
    PRIMARY KEY (training_id, position),
    UNIQUE (training_id, word_id)
);

CREATE TABLE IF NOT EXISTS results (
    training_id TEXT NOT NULL REFERENCES trainings(training_id),
    word_id     TEXT NOT NULL REFERENCES words(word_id),
    success     INTEGER NOT NULL,
    PRIMARY KEY (training_id, word_id)
);

CREATE TABLE IF NOT EXISTS settings (
    owner                 TEXT PRIMARY KEY,
    new_words_in_train    INTEGER NOT NULL,
    repeat_words_in_train INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS words_dictionary_idx    ON words(dictionary_id);
CREATE INDEX IF NOT EXISTS schedules_selection_idx ON schedules(dictionary_id, status, next_train_date);
CREATE INDEX IF NOT EXISTS dictionaries_owner_idx  ON dictionaries(owner);

PRAGMA user_version = 1;
";
