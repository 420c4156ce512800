// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Tallybook", "tallybook"));

const OPEN_ATTEMPTS: u32 = 5;
const OPEN_BACKOFF: Duration = Duration::from_millis(200);
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub fn db_path() -> Result<PathBuf> {
    if let Ok(p) = std::env::var("TALLYBOOK_DB") {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("tallybook.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn = open_with_retry(&path)?;
    init_schema(&mut conn)?;
    Ok(conn)
}

// bounded retry with fixed backoff; the open call creates the file if absent
pub fn open_with_retry(path: &std::path::Path) -> Result<Connection> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match Connection::open(path) {
            Ok(conn) => {
                conn.busy_timeout(BUSY_TIMEOUT).context("Set busy timeout")?;
                return Ok(conn);
            }
            Err(_) if attempt < OPEN_ATTEMPTS => std::thread::sleep(OPEN_BACKOFF),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!(
                        "Open DB at {} (gave up after {} attempts)",
                        path.display(),
                        OPEN_ATTEMPTS
                    )
                });
            }
        }
    }
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS accounts(
        account_id TEXT PRIMARY KEY,
        account_name TEXT NOT NULL UNIQUE,
        account_type TEXT NOT NULL CHECK(account_type IN ('Asset','Liability')),
        currency_code TEXT NOT NULL CHECK(length(currency_code) = 3),
        initial_balance TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS categories(
        category_id INTEGER PRIMARY KEY AUTOINCREMENT,
        category_name TEXT NOT NULL UNIQUE,
        parent_category_id INTEGER REFERENCES categories(category_id),
        purpose_type TEXT CHECK(purpose_type IN ('Need','Want','Savings/Goal')),
        nature_type TEXT CHECK(nature_type IN ('Fixed','Variable'))
    );

    CREATE TABLE IF NOT EXISTS merchants(
        merchant_id TEXT PRIMARY KEY,
        merchant_name TEXT NOT NULL UNIQUE,
        default_category_id INTEGER REFERENCES categories(category_id)
    );

    CREATE TABLE IF NOT EXISTS tags(
        tag_id INTEGER PRIMARY KEY AUTOINCREMENT,
        tag_name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS transactions(
        transaction_id TEXT PRIMARY KEY,
        account_id TEXT NOT NULL REFERENCES accounts(account_id),
        merchant_id TEXT REFERENCES merchants(merchant_id),
        category_id INTEGER REFERENCES categories(category_id),
        base_currency_amount TEXT NOT NULL,
        original_amount TEXT NOT NULL,
        original_currency_code TEXT NOT NULL CHECK(length(original_currency_code) = 3),
        transaction_date TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'ACTIVE' CHECK(status IN ('ACTIVE','VOID','SUPERSEDED')),
        revises_transaction_id TEXT REFERENCES transactions(transaction_id),
        related_transaction_id TEXT REFERENCES transactions(transaction_id)
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions(account_id);
    CREATE INDEX IF NOT EXISTS idx_transactions_merchant ON transactions(merchant_id);
    CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id);
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(transaction_date);
    CREATE INDEX IF NOT EXISTS idx_transactions_status ON transactions(status);
    CREATE INDEX IF NOT EXISTS idx_transactions_revises ON transactions(revises_transaction_id);

    CREATE TABLE IF NOT EXISTS transaction_tags(
        transaction_id TEXT NOT NULL REFERENCES transactions(transaction_id) ON DELETE CASCADE,
        tag_id INTEGER NOT NULL REFERENCES tags(tag_id),
        PRIMARY KEY (transaction_id, tag_id)
    );

    CREATE TABLE IF NOT EXISTS transaction_splits(
        split_id TEXT PRIMARY KEY,
        transaction_id TEXT NOT NULL REFERENCES transactions(transaction_id) ON DELETE CASCADE,
        category_id INTEGER NOT NULL REFERENCES categories(category_id),
        amount TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_splits_transaction ON transaction_splits(transaction_id);

    CREATE TABLE IF NOT EXISTS asset_valuation_history(
        valuation_id TEXT PRIMARY KEY,
        account_id TEXT NOT NULL REFERENCES accounts(account_id),
        valuation_date TEXT NOT NULL,
        value TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_valuations_date ON asset_valuation_history(valuation_date);

    CREATE TABLE IF NOT EXISTS goals(
        goal_id TEXT PRIMARY KEY,
        goal_name TEXT NOT NULL,
        target_amount TEXT NOT NULL,
        target_date TEXT
    );

    CREATE TABLE IF NOT EXISTS goal_accounts(
        goal_id TEXT NOT NULL REFERENCES goals(goal_id) ON DELETE CASCADE,
        account_id TEXT NOT NULL REFERENCES accounts(account_id),
        PRIMARY KEY (goal_id, account_id)
    );

    CREATE TABLE IF NOT EXISTS monthly_category_summary(
        year INTEGER NOT NULL,
        month INTEGER NOT NULL,
        category_id INTEGER NOT NULL REFERENCES categories(category_id),
        total_amount TEXT NOT NULL,
        transaction_count INTEGER NOT NULL,
        PRIMARY KEY (year, month, category_id)
    );
    "#,
    )?;
    Ok(())
}
