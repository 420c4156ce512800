// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use tallybook::models::TransactionDraft;
use tallybook::{cli, commands::transactions, db, ledger, utils};
use uuid::Uuid;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn seed(conn: &mut Connection) -> Uuid {
    let acct = Uuid::new_v4();
    conn.execute(
        "INSERT INTO accounts(account_id, account_name, account_type, currency_code, initial_balance)
         VALUES (?1, 'A1', 'Asset', 'USD', '0')",
        rusqlite::params![acct.to_string()],
    )
    .unwrap();
    conn.execute("INSERT INTO categories(category_name) VALUES ('Cat1')", [])
        .unwrap();
    let cat = conn.last_insert_rowid();
    for day in 1..=3 {
        let d = TransactionDraft {
            account_id: acct,
            merchant_id: None,
            category_id: Some(cat),
            base_amount: "-10".parse().unwrap(),
            original_amount: "-10".parse().unwrap(),
            original_currency: "USD".into(),
            date: utils::parse_datetime(&format!("2026-08-0{day}")).unwrap(),
            related: None,
            splits: vec![],
            tag_ids: vec![],
        };
        ledger::record(conn, &d).unwrap();
    }
    acct
}

#[test]
fn list_filters_from_cli_args() {
    let mut conn = setup();
    seed(&mut conn);

    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "tallybook", "tx", "list", "--account", "A1", "--from", "2026-08-02", "--status", "ACTIVE",
    ]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            let rows = transactions::query_rows(&conn, list_m).unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].date, "2026-08-02");
            assert_eq!(rows[1].date, "2026-08-03");
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn bare_date_to_filter_keeps_whole_day() {
    let mut conn = setup();
    let acct = seed(&mut conn);

    // a transaction recorded midday must survive `--to` with a bare date
    let d = TransactionDraft {
        account_id: acct,
        merchant_id: None,
        category_id: None,
        base_amount: "-7".parse().unwrap(),
        original_amount: "-7".parse().unwrap(),
        original_currency: "USD".into(),
        date: utils::parse_datetime("2026-08-03T14:30:00+00:00").unwrap(),
        related: None,
        splits: vec![],
        tag_ids: vec![],
    };
    ledger::record(&mut conn, &d).unwrap();

    let cli = cli::build_cli();
    let matches =
        cli.get_matches_from(["tallybook", "tx", "list", "--from", "2026-08-03", "--to", "2026-08-03"]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            let rows = transactions::query_rows(&conn, list_m).unwrap();
            assert_eq!(rows.len(), 2);
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn list_unknown_account_errors() {
    let conn = setup();
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["tallybook", "tx", "list", "--account", "Nope"]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            assert!(transactions::query_rows(&conn, list_m).is_err());
            return;
        }
    }
    panic!("no tx list subcommand");
}
