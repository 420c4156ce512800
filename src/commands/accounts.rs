// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::Error;
use crate::models::AccountType;
use crate::utils::{id_for_account, maybe_print_json, parse_decimal, pretty_table};
use crate::validate::validate_currency_code;
use anyhow::{Result, anyhow};
use rusqlite::{Connection, params};
use serde::Serialize;
use uuid::Uuid;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let type_s = sub.get_one::<String>("type").unwrap();
    let currency = sub.get_one::<String>("currency").unwrap().to_uppercase();
    let balance = parse_decimal(sub.get_one::<String>("balance").unwrap())?;

    validate_currency_code(&currency)?;
    let account_type =
        AccountType::parse(type_s).ok_or_else(|| anyhow!("Invalid account type '{}'", type_s))?;

    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO accounts(account_id, account_name, account_type, currency_code, initial_balance)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            id.to_string(),
            name,
            account_type.as_str(),
            currency,
            balance.to_string()
        ],
    )?;
    println!("Added {} account '{}' ({} {})", type_s, name, currency, balance);
    Ok(())
}

#[derive(Serialize)]
struct AccountRow {
    name: String,
    account_type: String,
    currency: String,
    initial_balance: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let mut stmt = conn.prepare(
        "SELECT account_name, account_type, currency_code, initial_balance
         FROM accounts ORDER BY account_name",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(AccountRow {
            name: r.get(0)?,
            account_type: r.get(1)?,
            currency: r.get(2)?,
            initial_balance: r.get(3)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|a| {
                vec![
                    a.name.clone(),
                    a.account_type.clone(),
                    a.currency.clone(),
                    a.initial_balance.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Account", "Type", "CCY", "Initial balance"], rows)
        );
    }
    Ok(())
}

// removal is blocked while any ACTIVE transaction references the account
fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let id = id_for_account(conn, name)?;
    let active: i64 = conn.query_row(
        "SELECT COUNT(*) FROM transactions WHERE account_id=?1 AND status='ACTIVE'",
        params![id.to_string()],
        |r| r.get(0),
    )?;
    if active > 0 {
        return Err(Error::Validation(format!(
            "account '{}' still has {} ACTIVE transactions",
            name, active
        ))
        .into());
    }
    conn.execute(
        "DELETE FROM accounts WHERE account_id=?1",
        params![id.to_string()],
    )?;
    println!("Removed account '{}'", name);
    Ok(())
}
