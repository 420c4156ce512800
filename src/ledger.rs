// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The append-mostly event journal. Transactions are inserted ACTIVE and never
//! edited in place: a correction supersedes the old row and links back through
//! `revises_transaction_id`, a void flips status and keeps the row. Every
//! mutating call runs in one immediate SQLite transaction, so the insert and
//! the parent-status flip land together or not at all.

use crate::error::{Error, Result};
use crate::models::{Transaction, TransactionDraft, TransactionSplit, TxStatus};
use crate::validate;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    pub account_id: Option<Uuid>,
    pub category_id: Option<i64>,
    pub status: Option<TxStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

pub fn record(conn: &mut Connection, draft: &TransactionDraft) -> Result<Transaction> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    validate::validate_draft(&tx, draft)?;
    let event = insert_event(&tx, draft, None)?;
    tx.commit()?;
    Ok(event)
}

/// Atomically supersede `original_id` and insert its replacement. The target
/// must be the current ACTIVE chain tip; corrections chain forward only.
pub fn correct(
    conn: &mut Connection,
    original_id: Uuid,
    draft: &TransactionDraft,
) -> Result<Transaction> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let status = status_of(&tx, original_id)?;
    match status {
        None => return Err(Error::NotFound(format!("transaction {}", original_id))),
        Some(TxStatus::Active) => {}
        Some(s) => {
            let tip = chain_tip(&tx, original_id)?;
            return Err(Error::NotFound(format!(
                "transaction {} is {}; correct the chain tip {} instead",
                original_id,
                s.as_str(),
                tip.id
            )));
        }
    }

    validate::validate_draft(&tx, draft)?;

    // Guarded flip: if another writer superseded or voided the row between
    // our read and here, zero rows change and the caller must re-read the tip.
    let changed = tx.execute(
        "UPDATE transactions SET status='SUPERSEDED'
         WHERE transaction_id=?1 AND status='ACTIVE'",
        params![original_id.to_string()],
    )?;
    if changed == 0 {
        return Err(Error::Conflict(format!(
            "transaction {} was corrected or voided concurrently",
            original_id
        )));
    }

    let event = insert_event(&tx, draft, Some(original_id))?;
    tx.commit()?;
    Ok(event)
}

/// Mark a transaction VOID. Nothing is deleted; only ACTIVE rows qualify.
pub fn void(conn: &mut Connection, id: Uuid) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    match status_of(&tx, id)? {
        None => return Err(Error::NotFound(format!("transaction {}", id))),
        Some(TxStatus::Active) => {}
        Some(s) => {
            return Err(Error::NotFound(format!(
                "transaction {} is already {}",
                id,
                s.as_str()
            )));
        }
    }
    let changed = tx.execute(
        "UPDATE transactions SET status='VOID'
         WHERE transaction_id=?1 AND status='ACTIVE'",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(Error::Conflict(format!(
            "transaction {} was corrected or voided concurrently",
            id
        )));
    }
    tx.commit()?;
    Ok(())
}

/// Transactions matching the filter, ordered by event timestamp ascending
/// with id as the deterministic tie-break. Re-calling restarts the scan.
pub fn query(conn: &Connection, filter: &QueryFilter) -> Result<Vec<Transaction>> {
    let mut sql = format!(
        "SELECT {} FROM transactions WHERE 1=1",
        Transaction::COLUMNS
    );
    let mut args: Vec<String> = Vec::new();

    if let Some(aid) = filter.account_id {
        sql.push_str(" AND account_id=?");
        args.push(aid.to_string());
    }
    if let Some(cid) = filter.category_id {
        sql.push_str(" AND category_id=?");
        args.push(cid.to_string());
    }
    if let Some(status) = filter.status {
        sql.push_str(" AND status=?");
        args.push(status.as_str().to_string());
    }
    if let Some(from) = filter.from {
        sql.push_str(" AND transaction_date>=?");
        args.push(from.to_rfc3339());
    }
    if let Some(to) = filter.to {
        sql.push_str(" AND transaction_date<=?");
        args.push(to.to_rfc3339());
    }
    sql.push_str(" ORDER BY transaction_date ASC, transaction_id ASC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), |r| {
        Transaction::from_row(r)
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn get(conn: &Connection, id: Uuid) -> Result<Transaction> {
    let sql = format!(
        "SELECT {} FROM transactions WHERE transaction_id=?1",
        Transaction::COLUMNS
    );
    conn.query_row(&sql, params![id.to_string()], Transaction::from_row)
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))
}

pub fn splits_for(conn: &Connection, transaction_id: Uuid) -> Result<Vec<TransactionSplit>> {
    let mut stmt = conn.prepare(
        "SELECT split_id, transaction_id, category_id, amount
         FROM transaction_splits WHERE transaction_id=?1 ORDER BY split_id",
    )?;
    let rows = stmt.query_map(params![transaction_id.to_string()], |r| {
        TransactionSplit::from_row(r)
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Follow `revises` pointers forward from any member of a correction chain to
/// its end: the single ACTIVE tip, or a VOID terminal.
pub fn chain_tip(conn: &Connection, id: Uuid) -> Result<Transaction> {
    let mut current = get(conn, id)?;
    let mut seen = HashSet::new();
    seen.insert(current.id);
    loop {
        let sql = format!(
            "SELECT {} FROM transactions WHERE revises_transaction_id=?1",
            Transaction::COLUMNS
        );
        let next = conn
            .query_row(&sql, params![current.id.to_string()], Transaction::from_row)
            .optional()?;
        match next {
            Some(tx) => {
                if !seen.insert(tx.id) {
                    return Err(Error::ConsistencyFault(format!(
                        "correction chain through {} loops back to {}",
                        id, tx.id
                    )));
                }
                current = tx;
            }
            None => return Ok(current),
        }
    }
}

fn status_of(conn: &Connection, id: Uuid) -> Result<Option<TxStatus>> {
    let s: Option<String> = conn
        .query_row(
            "SELECT status FROM transactions WHERE transaction_id=?1",
            params![id.to_string()],
            |r| r.get(0),
        )
        .optional()?;
    match s {
        None => Ok(None),
        Some(s) => TxStatus::parse(&s)
            .map(Some)
            .ok_or_else(|| Error::ConsistencyFault(format!("unknown status '{}' on {}", s, id))),
    }
}

fn insert_event(
    tx: &rusqlite::Transaction,
    draft: &TransactionDraft,
    revises: Option<Uuid>,
) -> Result<Transaction> {
    let id = Uuid::new_v4();
    tx.execute(
        "INSERT INTO transactions(transaction_id, account_id, merchant_id, category_id,
             base_currency_amount, original_amount, original_currency_code,
             transaction_date, status, revises_transaction_id, related_transaction_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'ACTIVE', ?9, ?10)",
        params![
            id.to_string(),
            draft.account_id.to_string(),
            draft.merchant_id.map(|m| m.to_string()),
            draft.category_id,
            draft.base_amount.to_string(),
            draft.original_amount.to_string(),
            draft.original_currency,
            draft.date.to_rfc3339(),
            revises.map(|r| r.to_string()),
            draft.related.map(|r| r.to_string()),
        ],
    )?;
    for split in &draft.splits {
        tx.execute(
            "INSERT INTO transaction_splits(split_id, transaction_id, category_id, amount)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                Uuid::new_v4().to_string(),
                id.to_string(),
                split.category_id,
                split.amount.to_string(),
            ],
        )?;
    }
    for tag_id in &draft.tag_ids {
        tx.execute(
            "INSERT OR IGNORE INTO transaction_tags(transaction_id, tag_id) VALUES (?1, ?2)",
            params![id.to_string(), tag_id],
        )?;
    }
    Ok(Transaction {
        id,
        account_id: draft.account_id,
        merchant_id: draft.merchant_id,
        category_id: draft.category_id,
        base_amount: draft.base_amount,
        original_amount: draft.original_amount,
        original_currency: draft.original_currency.clone(),
        date: draft.date,
        status: TxStatus::Active,
        revises,
        related: draft.related,
    })
}
