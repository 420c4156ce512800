// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::category_tree;
use crate::summary;
use crate::utils::{maybe_print_json, parse_month, pretty_table};
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("recompute", sub)) => recompute(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn recompute(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let rows = match (
        sub.get_one::<String>("month"),
        sub.get_one::<String>("from"),
        sub.get_one::<String>("to"),
    ) {
        (Some(month), None, None) => {
            let (y, m) = parse_month(month)?;
            summary::recompute(conn, y, m)?
        }
        (None, Some(from), Some(to)) => {
            summary::recompute_range(conn, parse_month(from)?, parse_month(to)?)?
        }
        _ => return Err(anyhow!("Pass either --month, or both --from and --to")),
    };
    println!("Recomputed {} summary rows", rows.len());
    Ok(())
}

#[derive(Serialize)]
struct ShowRow {
    category: String,
    total: String,
    count: i64,
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let rows = summary::summary_rows(conn, year, month)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(ShowRow {
            category: category_tree::path(conn, row.category_id)?,
            total: row.total_amount.to_string(),
            count: row.transaction_count,
        });
    }
    data.sort_by(|a, b| a.category.cmp(&b.category));
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| vec![r.category.clone(), r.total.clone(), r.count.to_string()])
            .collect();
        println!("{}", pretty_table(&["Category", "Total", "Count"], rows));
    }
    Ok(())
}
