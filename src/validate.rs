// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Gatekeeper invoked synchronously before any ledger write. Nothing here
//! creates rows; a draft that passes is safe to insert as-is.

use crate::error::{Error, Result};
use crate::models::TransactionDraft;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use rust_decimal::prelude::Signed;

pub fn validate_draft(conn: &Connection, draft: &TransactionDraft) -> Result<()> {
    validate_currency_code(&draft.original_currency)?;

    // Base and original amounts describe the same event, so their signs must
    // agree. FX conversion is the caller's job; only well-formedness is
    // checked here.
    if draft.base_amount.signum() != draft.original_amount.signum() {
        return Err(Error::Validation(format!(
            "base amount {} and original amount {} disagree in sign",
            draft.base_amount, draft.original_amount
        )));
    }

    if !account_exists(conn, &draft.account_id.to_string())? {
        return Err(Error::NotFound(format!(
            "account {}",
            draft.account_id
        )));
    }
    if let Some(mid) = draft.merchant_id {
        if !row_exists(conn, "merchants", "merchant_id", &mid.to_string())? {
            return Err(Error::NotFound(format!("merchant {}", mid)));
        }
    }
    if let Some(cid) = draft.category_id {
        if !category_exists(conn, cid)? {
            return Err(Error::NotFound(format!("category {}", cid)));
        }
    }
    for tag_id in &draft.tag_ids {
        let found: Option<i64> = conn
            .query_row(
                "SELECT tag_id FROM tags WHERE tag_id=?1",
                params![tag_id],
                |r| r.get(0),
            )
            .optional()?;
        if found.is_none() {
            return Err(Error::NotFound(format!("tag {}", tag_id)));
        }
    }

    validate_splits(conn, draft)?;
    Ok(())
}

/// Split-sum rule: if any splits are present, their exact decimal sum must
/// equal the transaction's base amount. No floating-point tolerance.
fn validate_splits(conn: &Connection, draft: &TransactionDraft) -> Result<()> {
    if draft.splits.is_empty() {
        return Ok(());
    }
    let mut sum = Decimal::ZERO;
    for split in &draft.splits {
        if split.amount.is_zero() {
            return Err(Error::Validation(
                "split amounts must be non-zero".to_string(),
            ));
        }
        if !category_exists(conn, split.category_id)? {
            return Err(Error::NotFound(format!(
                "split category {}",
                split.category_id
            )));
        }
        sum += split.amount;
    }
    if sum != draft.base_amount {
        return Err(Error::SplitMismatch {
            expected: draft.base_amount,
            actual: sum,
        });
    }
    Ok(())
}

pub fn validate_currency_code(code: &str) -> Result<()> {
    if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "invalid currency code '{}', expected 3 uppercase letters",
            code
        )))
    }
}

fn account_exists(conn: &Connection, id: &str) -> Result<bool> {
    row_exists(conn, "accounts", "account_id", id)
}

fn category_exists(conn: &Connection, id: i64) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT category_id FROM categories WHERE category_id=?1",
            params![id],
            |r| r.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn row_exists(conn: &Connection, table: &str, pk: &str, id: &str) -> Result<bool> {
    let sql = format!("SELECT 1 FROM {table} WHERE {pk}=?1");
    let found: Option<i64> = conn
        .query_row(&sql, params![id], |r| r.get(0))
        .optional()?;
    Ok(found.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_code_shape() {
        assert!(validate_currency_code("USD").is_ok());
        assert!(validate_currency_code("CLP").is_ok());
        assert!(validate_currency_code("usd").is_err());
        assert!(validate_currency_code("US").is_err());
        assert!(validate_currency_code("USDC").is_err());
        assert!(validate_currency_code("U$D").is_err());
    }
}
