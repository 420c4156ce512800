// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::summary;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal::prelude::Signed;

pub fn handle(conn: &Connection) -> Result<()> {
    let mut rows = Vec::new();

    // 1) Stored split sums that disagree with their transaction
    let mut stmt = conn.prepare(
        "SELECT t.transaction_id, t.base_currency_amount
         FROM transactions t
         WHERE EXISTS (SELECT 1 FROM transaction_splits s WHERE s.transaction_id = t.transaction_id)",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: String = r.get(0)?;
        let base: Decimal = crate::models::decimal_col(r, 1)?;
        let mut sstmt =
            conn.prepare("SELECT amount FROM transaction_splits WHERE transaction_id=?1")?;
        let mut srows = sstmt.query([&id])?;
        let mut sum = Decimal::ZERO;
        while let Some(s) = srows.next()? {
            sum += crate::models::decimal_col(s, 0)?;
        }
        if sum != base {
            rows.push(vec![
                "split_sum_mismatch".into(),
                format!("{} splits {} vs base {}", id, sum, base),
            ]);
        }
    }

    // 2) Base vs original amount sign disagreements
    let mut stmt2 = conn.prepare(
        "SELECT transaction_id, base_currency_amount, original_amount FROM transactions",
    )?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let id: String = r.get(0)?;
        let base = crate::models::decimal_col(r, 1)?;
        let orig = crate::models::decimal_col(r, 2)?;
        if base.signum() != orig.signum() {
            rows.push(vec![
                "sign_mismatch".into(),
                format!("{} base {} vs original {}", id, base, orig),
            ]);
        }
    }

    // 3) Correction chain shape: every SUPERSEDED row needs exactly one
    //    successor, and nobody may have two
    let mut stmt3 = conn.prepare(
        "SELECT t.transaction_id,
                (SELECT COUNT(*) FROM transactions n
                 WHERE n.revises_transaction_id = t.transaction_id)
         FROM transactions t WHERE t.status='SUPERSEDED'",
    )?;
    let mut cur3 = stmt3.query([])?;
    while let Some(r) = cur3.next()? {
        let id: String = r.get(0)?;
        let successors: i64 = r.get(1)?;
        if successors != 1 {
            rows.push(vec![
                "broken_chain".into(),
                format!("{} is SUPERSEDED with {} successors", id, successors),
            ]);
        }
    }
    let mut stmt4 = conn.prepare(
        "SELECT revises_transaction_id, COUNT(*) FROM transactions
         WHERE revises_transaction_id IS NOT NULL
         GROUP BY revises_transaction_id HAVING COUNT(*) > 1",
    )?;
    let mut cur4 = stmt4.query([])?;
    while let Some(r) = cur4.next()? {
        let id: String = r.get(0)?;
        let n: i64 = r.get(1)?;
        rows.push(vec![
            "double_revision".into(),
            format!("{} revised by {} transactions", id, n),
        ]);
    }

    // 4) Summary drift for every materialized month
    let mut stmt5 = conn.prepare(
        "SELECT DISTINCT year, month FROM monthly_category_summary ORDER BY year, month",
    )?;
    let mut cur5 = stmt5.query([])?;
    while let Some(r) = cur5.next()? {
        let year: i32 = r.get(0)?;
        let month: u32 = r.get(1)?;
        if let Err(e) = summary::verify(conn, year, month) {
            rows.push(vec!["summary_drift".into(), e.to_string()]);
        }
    }

    // 5) Currency code shape
    let mut stmt6 = conn.prepare(
        "SELECT account_name, currency_code FROM accounts
         UNION ALL
         SELECT transaction_id, original_currency_code FROM transactions",
    )?;
    let mut cur6 = stmt6.query([])?;
    while let Some(r) = cur6.next()? {
        let owner: String = r.get(0)?;
        let code: String = r.get(1)?;
        if crate::validate::validate_currency_code(&code).is_err() {
            rows.push(vec![
                "bad_currency_code".into(),
                format!("{} uses '{}'", owner, code),
            ]);
        }
    }

    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
