// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Recomputes `monthly_category_summary` from the ledger so reports never
//! scan the full transaction table. Each month is replaced wholesale inside
//! one immediate transaction: recompute is idempotent and a failure partway
//! through leaves the previous rows untouched.

use crate::error::{Error, Result};
use crate::models::SummaryRow;
use rusqlite::{Connection, TransactionBehavior, params};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};

pub fn recompute(conn: &mut Connection, year: i32, month: u32) -> Result<Vec<SummaryRow>> {
    check_month(month)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let rows = compute_rows(&tx, year, month)?;

    tx.execute(
        "DELETE FROM monthly_category_summary WHERE year=?1 AND month=?2",
        params![year, month],
    )?;
    for row in &rows {
        tx.execute(
            "INSERT INTO monthly_category_summary(year, month, category_id, total_amount, transaction_count)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                row.year,
                row.month,
                row.category_id,
                row.total_amount.to_string(),
                row.transaction_count,
            ],
        )?;
    }

    // Cross-check against a straight ledger scan before committing. A
    // mismatch means a partial write escaped validation; surface it and
    // leave the old rows in place.
    let ledger_total = categorized_ledger_total(&tx, year, month)?;
    let summary_total: Decimal = rows.iter().map(|r| r.total_amount).sum();
    if ledger_total != summary_total {
        return Err(Error::ConsistencyFault(format!(
            "summary for {:04}-{:02} totals {} but ledger totals {}",
            year, month, summary_total, ledger_total
        )));
    }

    tx.commit()?;
    Ok(rows)
}

/// Recompute every month from `start` through `end` inclusive.
pub fn recompute_range(
    conn: &mut Connection,
    start: (i32, u32),
    end: (i32, u32),
) -> Result<Vec<SummaryRow>> {
    check_month(start.1)?;
    check_month(end.1)?;
    if (start.0, start.1) > (end.0, end.1) {
        return Err(Error::Validation(format!(
            "range start {:04}-{:02} is after end {:04}-{:02}",
            start.0, start.1, end.0, end.1
        )));
    }
    let mut all = Vec::new();
    let (mut y, mut m) = start;
    loop {
        all.extend(recompute(conn, y, m)?);
        if (y, m) == end {
            break;
        }
        if m == 12 {
            y += 1;
            m = 1;
        } else {
            m += 1;
        }
    }
    Ok(all)
}

pub fn summary_rows(conn: &Connection, year: i32, month: u32) -> Result<Vec<SummaryRow>> {
    let mut stmt = conn.prepare(
        "SELECT year, month, category_id, total_amount, transaction_count
         FROM monthly_category_summary WHERE year=?1 AND month=?2 ORDER BY category_id",
    )?;
    let rows = stmt.query_map(params![year, month], row_from_sql)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Compare the stored rows for a month against a fresh computation. Used by
/// `doctor`; divergence is a `ConsistencyFault`, never silently corrected.
pub fn verify(conn: &Connection, year: i32, month: u32) -> Result<()> {
    check_month(month)?;
    let fresh = compute_rows(conn, year, month)?;
    let stored = summary_rows(conn, year, month)?;
    if fresh != stored {
        return Err(Error::ConsistencyFault(format!(
            "stored summary for {:04}-{:02} has drifted from the ledger \
             ({} stored rows, {} recomputed)",
            year,
            month,
            stored.len(),
            fresh.len()
        )));
    }
    Ok(())
}

/// Attribute each ACTIVE transaction of the month to its direct category, or
/// to each split's category when splits exist. A transaction counts once per
/// category it touches, even when several splits share a category.
/// Uncategorized split-less transactions contribute to no row.
fn compute_rows(conn: &Connection, year: i32, month: u32) -> Result<Vec<SummaryRow>> {
    let prefix = crate::utils::month_prefix(year, month);
    let mut grouped: BTreeMap<i64, (Decimal, i64)> = BTreeMap::new();
    let mut counted: HashSet<(String, i64)> = HashSet::new();

    let mut stmt = conn.prepare(
        "SELECT t.transaction_id, t.category_id, t.base_currency_amount,
                s.category_id, s.amount
         FROM transactions t
         LEFT JOIN transaction_splits s ON s.transaction_id = t.transaction_id
         WHERE t.status='ACTIVE' AND substr(t.transaction_date,1,7)=?1
         ORDER BY t.transaction_id, s.split_id",
    )?;
    let mut rows = stmt.query(params![prefix])?;
    while let Some(r) = rows.next()? {
        let tx_id: String = r.get(0)?;
        let split_category: Option<i64> = r.get(3)?;
        let (category_id, amount) = match split_category {
            Some(cid) => (Some(cid), crate::models::decimal_col(r, 4)?),
            None => {
                let direct: Option<i64> = r.get(1)?;
                (direct, crate::models::decimal_col(r, 2)?)
            }
        };
        if let Some(cid) = category_id {
            let entry = grouped.entry(cid).or_insert((Decimal::ZERO, 0));
            entry.0 += amount;
            if counted.insert((tx_id, cid)) {
                entry.1 += 1;
            }
        }
    }

    Ok(grouped
        .into_iter()
        .map(|(category_id, (total_amount, transaction_count))| SummaryRow {
            year,
            month,
            category_id,
            total_amount,
            transaction_count,
        })
        .collect())
}

/// Independent total for the month: base amounts of every ACTIVE transaction
/// that carries a category or splits. Must equal the summary total because
/// split sums are validated against base amounts at write time.
fn categorized_ledger_total(conn: &Connection, year: i32, month: u32) -> Result<Decimal> {
    let prefix = crate::utils::month_prefix(year, month);
    let mut stmt = conn.prepare(
        "SELECT t.base_currency_amount
         FROM transactions t
         WHERE t.status='ACTIVE' AND substr(t.transaction_date,1,7)=?1
           AND (t.category_id IS NOT NULL
                OR EXISTS (SELECT 1 FROM transaction_splits s
                           WHERE s.transaction_id = t.transaction_id))",
    )?;
    let mut rows = stmt.query(params![prefix])?;
    let mut total = Decimal::ZERO;
    while let Some(r) = rows.next()? {
        total += crate::models::decimal_col(r, 0)?;
    }
    Ok(total)
}

fn row_from_sql(r: &rusqlite::Row) -> rusqlite::Result<SummaryRow> {
    Ok(SummaryRow {
        year: r.get(0)?,
        month: r.get(1)?,
        category_id: r.get(2)?,
        total_amount: crate::models::decimal_col(r, 3)?,
        transaction_count: r.get(4)?,
    })
}

fn check_month(month: u32) -> Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(Error::Validation(format!("invalid month {}", month)))
    }
}
