// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let mut stmt = conn.prepare(
        "SELECT t.transaction_id, t.transaction_date, a.account_name,
                IFNULL(m.merchant_name, ''), IFNULL(c.category_name, ''),
                t.base_currency_amount, t.original_amount, t.original_currency_code,
                t.status, IFNULL(t.revises_transaction_id, ''), IFNULL(t.related_transaction_id, '')
         FROM transactions t
         LEFT JOIN accounts a ON t.account_id = a.account_id
         LEFT JOIN merchants m ON t.merchant_id = m.merchant_id
         LEFT JOIN categories c ON t.category_id = c.category_id
         ORDER BY t.transaction_date, t.transaction_id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok([
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, String>(5)?,
            r.get::<_, String>(6)?,
            r.get::<_, String>(7)?,
            r.get::<_, String>(8)?,
            r.get::<_, String>(9)?,
            r.get::<_, String>(10)?,
        ])
    })?;

    const HEADERS: [&str; 11] = [
        "id",
        "date",
        "account",
        "merchant",
        "category",
        "base_amount",
        "original_amount",
        "original_currency",
        "status",
        "revises",
        "related",
    ];

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(HEADERS)?;
            for row in rows {
                wtr.write_record(row?)?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for row in rows {
                let row = row?;
                let item: serde_json::Map<String, serde_json::Value> = HEADERS
                    .iter()
                    .zip(row.iter())
                    .map(|(h, v)| (h.to_string(), json!(v)))
                    .collect();
                items.push(serde_json::Value::Object(item));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
        }
    }
    println!("Exported transactions to {}", out);
    Ok(())
}
