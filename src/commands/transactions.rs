// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::{self, QueryFilter};
use crate::models::{SplitDraft, Transaction, TransactionDraft, TxStatus};
use crate::utils::{
    id_for_account, id_for_category, id_for_merchant, id_for_tag, maybe_print_json,
    parse_datetime, parse_datetime_end, parse_decimal, parse_uuid, pretty_table,
};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, params};
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("correct", sub)) => correct(conn, sub)?,
        Some(("void", sub)) => void(conn, sub)?,
        Some(("tip", sub)) => tip(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let draft = draft_from_args(conn, sub)?;
    let event = ledger::record(conn, &draft)?;
    println!(
        "Recorded {} {} on {} ({})",
        event.base_amount,
        event.original_currency,
        event.date.date_naive(),
        event.id
    );
    Ok(())
}

fn correct(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let original_id = parse_uuid(sub.get_one::<String>("id").unwrap())?;
    let draft = draft_from_args(conn, sub)?;
    let event = ledger::correct(conn, original_id, &draft)?;
    println!("Superseded {} with {}", original_id, event.id);
    Ok(())
}

fn void(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_uuid(sub.get_one::<String>("id").unwrap())?;
    ledger::void(conn, id)?;
    println!("Voided {}", id);
    Ok(())
}

fn tip(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_uuid(sub.get_one::<String>("id").unwrap())?;
    let tip = ledger::chain_tip(conn, id)?;
    println!(
        "{} ({}, {} on {})",
        tip.id,
        tip.status.as_str(),
        tip.base_amount,
        tip.date.date_naive()
    );
    Ok(())
}

// Original amount and currency default to the base amount and the account
// currency when the flags are omitted.
fn draft_from_args(conn: &Connection, sub: &clap::ArgMatches) -> Result<TransactionDraft> {
    let account_name = sub.get_one::<String>("account").unwrap();
    let account_id = id_for_account(conn, account_name)?;
    let base_amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let date = parse_datetime(sub.get_one::<String>("date").unwrap())?;

    let account_currency: String = conn.query_row(
        "SELECT currency_code FROM accounts WHERE account_id=?1",
        params![account_id.to_string()],
        |r| r.get(0),
    )?;
    let original_currency = sub
        .get_one::<String>("currency")
        .map(|c| c.to_uppercase())
        .unwrap_or(account_currency);
    let original_amount = sub
        .get_one::<String>("original-amount")
        .map(|s| parse_decimal(s))
        .transpose()?
        .unwrap_or(base_amount);

    let merchant_id = sub
        .get_one::<String>("merchant")
        .map(|name| id_for_merchant(conn, name))
        .transpose()?;
    let category_id = sub
        .get_one::<String>("category")
        .map(|name| id_for_category(conn, name))
        .transpose()?;
    let related = sub
        .get_one::<String>("related")
        .map(|s| parse_uuid(s))
        .transpose()?;

    let mut splits = Vec::new();
    if let Some(specs) = sub.get_many::<String>("split") {
        for spec in specs {
            splits.push(parse_split(conn, spec)?);
        }
    }
    let mut tag_ids = Vec::new();
    if let Some(names) = sub.get_many::<String>("tag") {
        for name in names {
            tag_ids.push(id_for_tag(conn, name)?);
        }
    }

    Ok(TransactionDraft {
        account_id,
        merchant_id,
        category_id,
        base_amount,
        original_amount,
        original_currency,
        date,
        related,
        splits,
        tag_ids,
    })
}

fn parse_split(conn: &Connection, spec: &str) -> Result<SplitDraft> {
    let (name, amount) = spec
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid split '{}', expected CATEGORY=AMOUNT", spec))?;
    Ok(SplitDraft {
        category_id: id_for_category(conn, name.trim())?,
        amount: parse_decimal(amount.trim())?,
    })
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub account: String,
    pub amount: String,
    pub currency: String,
    pub category: String,
    pub status: String,
    pub splits: usize,
    pub revises: String,
}

pub fn filter_from_args(conn: &Connection, sub: &clap::ArgMatches) -> Result<QueryFilter> {
    Ok(QueryFilter {
        account_id: sub
            .get_one::<String>("account")
            .map(|name| id_for_account(conn, name))
            .transpose()?,
        category_id: sub
            .get_one::<String>("category")
            .map(|name| id_for_category(conn, name))
            .transpose()?,
        status: sub
            .get_one::<String>("status")
            .and_then(|s| TxStatus::parse(s)),
        from: sub
            .get_one::<String>("from")
            .map(|s| parse_datetime(s))
            .transpose()?,
        to: sub
            .get_one::<String>("to")
            .map(|s| parse_datetime_end(s))
            .transpose()?,
    })
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let filter = filter_from_args(conn, sub)?;
    let events = ledger::query(conn, &filter)?;
    let mut data = Vec::new();
    for event in events {
        data.push(render_row(conn, &event)?);
    }
    Ok(data)
}

fn render_row(conn: &Connection, event: &Transaction) -> Result<TransactionRow> {
    let account: String = conn.query_row(
        "SELECT account_name FROM accounts WHERE account_id=?1",
        params![event.account_id.to_string()],
        |r| r.get(0),
    )?;
    let category = match event.category_id {
        Some(cid) => conn.query_row(
            "SELECT category_name FROM categories WHERE category_id=?1",
            params![cid],
            |r| r.get(0),
        )?,
        None => String::new(),
    };
    let splits = ledger::splits_for(conn, event.id)?.len();
    Ok(TransactionRow {
        id: event.id.to_string(),
        date: event.date.date_naive().to_string(),
        account,
        amount: event.base_amount.to_string(),
        currency: event.original_currency.clone(),
        category,
        status: event.status.as_str().to_string(),
        splits,
        revises: event.revises.map(|r| r.to_string()).unwrap_or_default(),
    })
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.account.clone(),
                    r.amount.clone(),
                    r.currency.clone(),
                    r.category.clone(),
                    r.status.clone(),
                    if r.splits > 0 {
                        r.splits.to_string()
                    } else {
                        String::new()
                    },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Account", "Amount", "CCY", "Category", "Status", "Splits"],
                rows,
            )
        );
    }
    Ok(())
}
