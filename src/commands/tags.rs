// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            conn.execute("INSERT INTO tags(tag_name) VALUES (?1)", params![name])?;
            println!("Added tag '{}'", name);
        }
        Some(("list", sub)) => {
            let mut stmt = conn.prepare(
                "SELECT t.tag_name, COUNT(tt.transaction_id)
                 FROM tags t
                 LEFT JOIN transaction_tags tt ON tt.tag_id = t.tag_id
                 GROUP BY t.tag_id ORDER BY t.tag_name",
            )?;
            let rows = stmt.query_map([], |r| {
                Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?))
            })?;
            let mut data = Vec::new();
            for row in rows {
                data.push(row?);
            }
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows: Vec<Vec<String>> = data
                    .iter()
                    .map(|(name, n)| vec![name.clone(), n.to_string()])
                    .collect();
                println!("{}", pretty_table(&["Tag", "Transactions"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}
