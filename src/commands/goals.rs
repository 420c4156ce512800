// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::networth;
use crate::utils::{
    id_for_account, id_for_goal, maybe_print_json, parse_date, parse_decimal, pretty_table,
};
use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("link", sub)) => link(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let target = parse_decimal(sub.get_one::<String>("target").unwrap())?;
    let target_date = sub
        .get_one::<String>("date")
        .map(|s| parse_date(s))
        .transpose()?;
    conn.execute(
        "INSERT INTO goals(goal_id, goal_name, target_amount, target_date) VALUES (?1, ?2, ?3, ?4)",
        params![
            Uuid::new_v4().to_string(),
            name,
            target.to_string(),
            target_date.map(|d| d.to_string())
        ],
    )?;
    println!("Added goal '{}' targeting {}", name, target);
    Ok(())
}

fn link(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let goal_name = sub.get_one::<String>("goal").unwrap();
    let account_name = sub.get_one::<String>("account").unwrap();
    let goal_id = id_for_goal(conn, goal_name)?;
    let account_id = id_for_account(conn, account_name)?;
    conn.execute(
        "INSERT OR IGNORE INTO goal_accounts(goal_id, account_id) VALUES (?1, ?2)",
        params![goal_id.to_string(), account_id.to_string()],
    )?;
    println!("Linked '{}' to goal '{}'", account_name, goal_name);
    Ok(())
}

#[derive(Serialize)]
struct GoalRow {
    name: String,
    target: String,
    target_date: String,
    saved: String,
}

// progress = current balances of the linked accounts vs the target
fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let now = Utc::now();
    let balances = networth::breakdown(conn, now)?;

    let mut stmt = conn.prepare(
        "SELECT goal_id, goal_name, target_amount, IFNULL(target_date, '') FROM goals ORDER BY goal_name",
    )?;
    let goals = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
        ))
    })?;

    let mut data = Vec::new();
    for goal in goals {
        let (goal_id, name, target, target_date) = goal?;
        let mut linked = conn.prepare(
            "SELECT a.account_name FROM goal_accounts ga
             JOIN accounts a ON a.account_id = ga.account_id
             WHERE ga.goal_id=?1",
        )?;
        let names = linked.query_map(params![goal_id], |r| r.get::<_, String>(0))?;
        let mut saved = Decimal::ZERO;
        for n in names {
            let n = n?;
            if let Some(w) = balances.iter().find(|w| w.name == n) {
                saved += w.contribution();
            }
        }
        data.push(GoalRow {
            name,
            target,
            target_date,
            saved: saved.round_dp(2).to_string(),
        });
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|g| {
                vec![
                    g.name.clone(),
                    g.target.clone(),
                    g.target_date.clone(),
                    g.saved.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Goal", "Target", "Target date", "Saved"], rows)
        );
    }
    Ok(())
}
