// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Point-in-time net worth, derived on demand and never persisted. Asset
//! accounts add, Liability accounts subtract. Accounts with a valuation
//! history are priced from it; everything else is initial balance plus the
//! ACTIVE ledger flow up to the cutoff.

use crate::error::Result;
use crate::models::{Account, AccountType};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BalanceSource {
    /// initial balance + ACTIVE transaction flow up to the cutoff
    Ledger,
    /// latest valuation on or before the cutoff
    Valuation(NaiveDate),
    /// valuation-tracked account with no valuation on or before the cutoff
    InitialBalance,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountWorth {
    pub name: String,
    pub account_type: AccountType,
    pub currency: String,
    pub balance: Decimal,
    pub source: BalanceSource,
}

impl AccountWorth {
    /// Signed contribution to net worth.
    pub fn contribution(&self) -> Decimal {
        match self.account_type {
            AccountType::Asset => self.balance,
            AccountType::Liability => -self.balance,
        }
    }
}

pub fn net_worth(conn: &Connection, as_of: DateTime<Utc>) -> Result<Decimal> {
    Ok(breakdown(conn, as_of)?
        .iter()
        .map(AccountWorth::contribution)
        .sum())
}

/// Per-account balances behind `net_worth`, ordered by account name.
pub fn breakdown(conn: &Connection, as_of: DateTime<Utc>) -> Result<Vec<AccountWorth>> {
    let sql = format!(
        "SELECT {} FROM accounts ORDER BY account_name",
        Account::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let accounts = stmt.query_map([], Account::from_row)?;

    let mut out = Vec::new();
    for account in accounts {
        let account = account?;
        let (balance, source) = balance_of(conn, &account, as_of)?;
        out.push(AccountWorth {
            name: account.name,
            account_type: account.account_type,
            currency: account.currency,
            balance,
            source,
        });
    }
    Ok(out)
}

fn balance_of(
    conn: &Connection,
    account: &Account,
    as_of: DateTime<Utc>,
) -> Result<(Decimal, BalanceSource)> {
    let tracked: i64 = conn.query_row(
        "SELECT COUNT(*) FROM asset_valuation_history WHERE account_id=?1",
        params![account.id.to_string()],
        |r| r.get(0),
    )?;
    if tracked > 0 {
        // Re-stating a valuation for the same date supersedes the earlier
        // read, so break date ties by insertion order.
        let latest: Option<(NaiveDate, String)> = conn
            .query_row(
                "SELECT valuation_date, value FROM asset_valuation_history
                 WHERE account_id=?1 AND valuation_date<=?2
                 ORDER BY valuation_date DESC, rowid DESC LIMIT 1",
                params![account.id.to_string(), as_of.date_naive().to_string()],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;
        return match latest {
            Some((date, value)) => {
                let value = value.parse::<Decimal>().map_err(|e| {
                    crate::error::Error::ConsistencyFault(format!(
                        "unreadable valuation '{}' for account {}: {}",
                        value, account.name, e
                    ))
                })?;
                Ok((value, BalanceSource::Valuation(date)))
            }
            None => Ok((account.initial_balance, BalanceSource::InitialBalance)),
        };
    }

    let mut stmt = conn.prepare(
        "SELECT base_currency_amount FROM transactions
         WHERE account_id=?1 AND status='ACTIVE' AND transaction_date<=?2",
    )?;
    let mut rows = stmt.query(params![account.id.to_string(), as_of.to_rfc3339()])?;
    let mut flow = Decimal::ZERO;
    while let Some(r) = rows.next()? {
        flow += crate::models::decimal_col(r, 0)?;
    }
    Ok((account.initial_balance + flow, BalanceSource::Ledger))
}
