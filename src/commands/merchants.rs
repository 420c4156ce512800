// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{id_for_category, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};
use serde::Serialize;
use uuid::Uuid;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let category_id = sub
                .get_one::<String>("category")
                .map(|c| id_for_category(conn, c))
                .transpose()?;
            conn.execute(
                "INSERT INTO merchants(merchant_id, merchant_name, default_category_id)
                 VALUES (?1, ?2, ?3)",
                params![Uuid::new_v4().to_string(), name, category_id],
            )?;
            println!("Added merchant '{}'", name);
        }
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct MerchantRow {
    name: String,
    default_category: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let mut stmt = conn.prepare(
        "SELECT m.merchant_name, IFNULL(c.category_name, '')
         FROM merchants m
         LEFT JOIN categories c ON m.default_category_id = c.category_id
         ORDER BY m.merchant_name",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(MerchantRow {
            name: r.get(0)?,
            default_category: r.get(1)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|m| vec![m.name.clone(), m.default_category.clone()])
            .collect();
        println!("{}", pretty_table(&["Merchant", "Default category"], rows));
    }
    Ok(())
}
