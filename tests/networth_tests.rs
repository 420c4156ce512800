// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;
use tallybook::models::TransactionDraft;
use tallybook::networth::{self, BalanceSource};
use tallybook::{db, ledger, utils};
use uuid::Uuid;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn add_account(conn: &Connection, name: &str, account_type: &str, balance: &str) -> Uuid {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO accounts(account_id, account_name, account_type, currency_code, initial_balance)
         VALUES (?1, ?2, ?3, 'USD', ?4)",
        rusqlite::params![id.to_string(), name, account_type, balance],
    )
    .unwrap();
    id
}

fn add_valuation(conn: &Connection, account: Uuid, date: &str, value: &str) {
    conn.execute(
        "INSERT INTO asset_valuation_history(valuation_id, account_id, valuation_date, value)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![Uuid::new_v4().to_string(), account.to_string(), date, value],
    )
    .unwrap();
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn draft(account: Uuid, amount: &str, date: &str) -> TransactionDraft {
    TransactionDraft {
        account_id: account,
        merchant_id: None,
        category_id: None,
        base_amount: dec(amount),
        original_amount: dec(amount),
        original_currency: "USD".into(),
        date: utils::parse_datetime(date).unwrap(),
        related: None,
        splits: vec![],
        tag_ids: vec![],
    }
}

#[test]
fn ledger_accounts_cross_check() {
    let mut conn = setup();
    let checking = add_account(&conn, "Checking", "Asset", "100.00");
    let savings = add_account(&conn, "Savings", "Asset", "1000.00");

    ledger::record(&mut conn, &draft(checking, "-40.00", "2026-08-01")).unwrap();
    ledger::record(&mut conn, &draft(checking, "250.00", "2026-08-05")).unwrap();
    let voided = ledger::record(&mut conn, &draft(savings, "-999.00", "2026-08-06")).unwrap();
    ledger::void(&mut conn, voided.id).unwrap();

    let as_of = utils::parse_datetime("2026-08-31").unwrap();
    let worth = networth::net_worth(&conn, as_of).unwrap();

    // independent sum: initial balances plus ACTIVE flow
    assert_eq!(worth, dec("100.00") + dec("1000.00") - dec("40.00") + dec("250.00"));
}

#[test]
fn as_of_cuts_off_later_transactions() {
    let mut conn = setup();
    let checking = add_account(&conn, "Checking", "Asset", "0");

    ledger::record(&mut conn, &draft(checking, "10.00", "2026-08-01")).unwrap();
    ledger::record(&mut conn, &draft(checking, "99.00", "2026-09-01")).unwrap();

    let as_of = utils::parse_datetime("2026-08-15").unwrap();
    assert_eq!(networth::net_worth(&conn, as_of).unwrap(), dec("10.00"));
}

#[test]
fn liabilities_subtract() {
    let conn = setup();
    add_account(&conn, "House", "Asset", "300000");
    add_account(&conn, "Mortgage", "Liability", "250000");

    let as_of = utils::parse_datetime("2026-08-31").unwrap();
    assert_eq!(networth::net_worth(&conn, as_of).unwrap(), dec("50000"));
}

#[test]
fn valuation_tracked_account_uses_latest_on_or_before() {
    let conn = setup();
    let house = add_account(&conn, "House", "Asset", "300000");
    add_valuation(&conn, house, "2026-01-01", "310000");
    add_valuation(&conn, house, "2026-06-01", "325000");
    add_valuation(&conn, house, "2026-12-01", "340000");

    let breakdown = networth::breakdown(&conn, utils::parse_datetime("2026-08-31").unwrap())
        .unwrap();
    assert_eq!(breakdown[0].balance, dec("325000"));
    assert_eq!(
        breakdown[0].source,
        BalanceSource::Valuation(utils::parse_date("2026-06-01").unwrap())
    );
}

#[test]
fn restated_valuation_for_same_date_wins() {
    let conn = setup();
    let house = add_account(&conn, "House", "Asset", "0");
    add_valuation(&conn, house, "2026-06-01", "325000");
    add_valuation(&conn, house, "2026-06-01", "321000"); // restated later

    let breakdown = networth::breakdown(&conn, utils::parse_datetime("2026-08-31").unwrap())
        .unwrap();
    assert_eq!(breakdown[0].balance, dec("321000"));
}

#[test]
fn valuation_account_falls_back_to_initial_balance() {
    let conn = setup();
    let house = add_account(&conn, "House", "Asset", "300000");
    add_valuation(&conn, house, "2026-12-01", "340000"); // only after the cutoff

    let breakdown = networth::breakdown(&conn, utils::parse_datetime("2026-08-31").unwrap())
        .unwrap();
    assert_eq!(breakdown[0].balance, dec("300000"));
    assert_eq!(breakdown[0].source, BalanceSource::InitialBalance);
}
