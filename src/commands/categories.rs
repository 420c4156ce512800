// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::category_tree;
use crate::models::{Category, NatureType, PurposeType};
use crate::utils::{id_for_category, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("move", sub)) => mv(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let parent_id = sub
        .get_one::<String>("parent")
        .map(|p| id_for_category(conn, p))
        .transpose()?;
    let purpose = sub
        .get_one::<String>("purpose")
        .and_then(|s| PurposeType::parse(s));
    let nature = sub
        .get_one::<String>("nature")
        .and_then(|s| NatureType::parse(s));

    let cat = category_tree::insert(conn, name, parent_id, purpose, nature)?;
    println!("Added category '{}'", category_tree::path(conn, cat.id)?);
    Ok(())
}

#[derive(Serialize)]
struct CategoryRow {
    path: String,
    purpose: String,
    nature: String,
    leaf: bool,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let sql = format!(
        "SELECT {} FROM categories ORDER BY category_name",
        Category::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let cats = stmt.query_map([], Category::from_row)?;
    let mut data = Vec::new();
    for cat in cats {
        let cat = cat?;
        data.push(CategoryRow {
            path: category_tree::path(conn, cat.id)?,
            purpose: cat.purpose.map(|p| p.as_str().to_string()).unwrap_or_default(),
            nature: cat.nature.map(|n| n.as_str().to_string()).unwrap_or_default(),
            leaf: category_tree::is_leaf(conn, cat.id)?,
        });
    }
    data.sort_by(|a, b| a.path.cmp(&b.path));
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|c| {
                vec![
                    c.path.clone(),
                    c.purpose.clone(),
                    c.nature.clone(),
                    if c.leaf { "yes".into() } else { "".into() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Purpose", "Nature", "Leaf"], rows)
        );
    }
    Ok(())
}

fn mv(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let id = id_for_category(conn, name)?;
    let parent_id = sub
        .get_one::<String>("parent")
        .map(|p| id_for_category(conn, p))
        .transpose()?;
    category_tree::reparent(conn, id, parent_id)?;
    println!("Moved '{}'", category_tree::path(conn, id)?);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let id = id_for_category(conn, name)?;
    category_tree::remove(conn, id)?;
    println!("Removed category '{}'", name);
    Ok(())
}
