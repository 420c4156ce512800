// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::networth::{self, BalanceSource};
use crate::utils::{get_base_currency, maybe_print_json, parse_datetime, pretty_table};
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("net-worth", sub)) = m.subcommand() {
        net_worth(conn, sub)?;
    }
    Ok(())
}

fn net_worth(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let as_of = sub
        .get_one::<String>("as-of")
        .map(|s| parse_datetime(s))
        .transpose()?
        .unwrap_or_else(Utc::now);

    let accounts = networth::breakdown(conn, as_of)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &accounts)? {
        let rows: Vec<Vec<String>> = accounts
            .iter()
            .map(|w| {
                let source = match w.source {
                    BalanceSource::Ledger => "ledger".to_string(),
                    BalanceSource::Valuation(d) => format!("valuation {}", d),
                    BalanceSource::InitialBalance => "initial balance".to_string(),
                };
                vec![
                    w.name.clone(),
                    w.account_type.as_str().to_string(),
                    w.currency.clone(),
                    format!("{:.2}", w.balance),
                    format!("{:.2}", w.contribution()),
                    source,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Account", "Type", "CCY", "Balance", "Contribution", "Source"],
                rows
            )
        );
        let total: rust_decimal::Decimal = accounts.iter().map(|w| w.contribution()).sum();
        println!(
            "Net worth as of {}: {}",
            as_of.date_naive(),
            crate::utils::fmt_money(&total, &get_base_currency(conn)?)
        );
    }
    Ok(())
}
