//! SQL schema for the Bayou SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Reference data; static after seeding.
CREATE TABLE IF NOT EXISTS cities (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL UNIQUE COLLATE NOCASE,
    county        TEXT,
    founded_year  INTEGER,
    description   TEXT
);

CREATE TABLE IF NOT EXISTS topics (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    category     TEXT,
    description  TEXT
);

CREATE TABLE IF NOT EXISTS periods (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    start_year   INTEGER,
    end_year     INTEGER,
    description  TEXT
);

CREATE TABLE IF NOT EXISTS historical_facts (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    title        TEXT NOT NULL,
    content      TEXT NOT NULL,
    event_date   TEXT,
    year         INTEGER,
    city_id      INTEGER REFERENCES cities(id),
    topic_id     INTEGER REFERENCES topics(id),
    source_name  TEXT,
    source_url   TEXT,
    image_url    TEXT,
    verified     INTEGER NOT NULL DEFAULT 0,
    importance   INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL          -- ISO 8601 UTC
);

-- One row per distinct subject; topic_key is the normalised identity.
CREATE TABLE IF NOT EXISTS researched_topics (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    topic           TEXT NOT NULL,
    topic_key       TEXT NOT NULL UNIQUE,
    keywords        TEXT NOT NULL DEFAULT '[]',   -- JSON array
    user_id         TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    page_generated  INTEGER NOT NULL DEFAULT 0
);

-- Append-only; never updated or deleted.
CREATE TABLE IF NOT EXISTS topic_media (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    topic_id    INTEGER NOT NULL REFERENCES researched_topics(id),
    file_path   TEXT NOT NULL,
    media_type  TEXT NOT NULL,          -- 'image' | 'audio' | 'video'
    title       TEXT NOT NULL,
    source      TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

-- Append-only; the newest row per topic is the current page.
CREATE TABLE IF NOT EXISTS presentations (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    topic_id      INTEGER NOT NULL REFERENCES researched_topics(id),
    title         TEXT NOT NULL,
    html_content  TEXT NOT NULL,
    fragments     TEXT,                 -- JSON PageFragments or NULL
    file_path     TEXT NOT NULL,
    url           TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS consolidated_pages (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    category      TEXT NOT NULL,
    display_name  TEXT NOT NULL,
    file_path     TEXT NOT NULL,
    url           TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS conversations (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id  TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS messages (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    conversation_id  INTEGER NOT NULL REFERENCES conversations(id),
    role             TEXT NOT NULL,     -- 'system' | 'user' | 'assistant'
    content          TEXT NOT NULL,
    created_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contributions (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    title              TEXT NOT NULL,
    content            TEXT NOT NULL,
    city_name          TEXT,
    topic_name         TEXT,
    year               INTEGER,
    source_name        TEXT,
    source_url         TEXT,
    contributor_name   TEXT,
    contributor_email  TEXT,
    status             TEXT NOT NULL DEFAULT 'pending',
    submitted_at       TEXT NOT NULL,
    reviewed_at        TEXT
);

CREATE INDEX IF NOT EXISTS facts_topic_idx          ON historical_facts(topic_id);
CREATE INDEX IF NOT EXISTS facts_city_idx           ON historical_facts(city_id);
CREATE INDEX IF NOT EXISTS media_topic_idx          ON topic_media(topic_id);
CREATE INDEX IF NOT EXISTS presentations_topic_idx  ON presentations(topic_id, created_at);
CREATE INDEX IF NOT EXISTS messages_conv_idx        ON messages(conversation_id);

PRAGMA user_version = 1;
";
