// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{id_for_account, maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};
use serde::Serialize;
use uuid::Uuid;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let account_name = sub.get_one::<String>("account").unwrap();
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let value = parse_decimal(sub.get_one::<String>("value").unwrap())?;
    let account_id = id_for_account(conn, account_name)?;

    // A later valuation for the same date supersedes the earlier one on read;
    // the old row stays.
    conn.execute(
        "INSERT INTO asset_valuation_history(valuation_id, account_id, valuation_date, value)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            Uuid::new_v4().to_string(),
            account_id.to_string(),
            date.to_string(),
            value.to_string()
        ],
    )?;
    println!("Valued '{}' at {} on {}", account_name, value, date);
    Ok(())
}

#[derive(Serialize)]
struct ValuationRow {
    account: String,
    date: String,
    value: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let mut sql = String::from(
        "SELECT a.account_name, v.valuation_date, v.value
         FROM asset_valuation_history v
         JOIN accounts a ON a.account_id = v.account_id
         WHERE 1=1",
    );
    let mut args: Vec<String> = Vec::new();
    if let Some(name) = sub.get_one::<String>("account") {
        sql.push_str(" AND a.account_name=?");
        args.push(name.clone());
    }
    sql.push_str(" ORDER BY v.valuation_date, a.account_name");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), |r| {
        Ok(ValuationRow {
            account: r.get(0)?,
            date: r.get(1)?,
            value: r.get(2)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|v| vec![v.account.clone(), v.date.clone(), v.value.clone()])
            .collect();
        println!("{}", pretty_table(&["Account", "Date", "Value"], rows));
    }
    Ok(())
}
