// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;
use tallybook::error::Error;
use tallybook::ledger::{self, QueryFilter};
use tallybook::models::{TransactionDraft, TxStatus};
use tallybook::{db, utils};
use uuid::Uuid;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn add_account(conn: &Connection, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO accounts(account_id, account_name, account_type, currency_code, initial_balance)
         VALUES (?1, ?2, 'Asset', 'USD', '0')",
        rusqlite::params![id.to_string(), name],
    )
    .unwrap();
    id
}

fn add_category(conn: &Connection, name: &str) -> i64 {
    conn.execute("INSERT INTO categories(category_name) VALUES (?1)", [name])
        .unwrap();
    conn.last_insert_rowid()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn draft(account: Uuid, amount: &str, date: &str, category: Option<i64>) -> TransactionDraft {
    TransactionDraft {
        account_id: account,
        merchant_id: None,
        category_id: category,
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
fn record_inserts_active() {
    let mut conn = setup();
    let acct = add_account(&conn, "Checking");
    let cat = add_category(&conn, "Groceries");

    let event = ledger::record(&mut conn, &draft(acct, "-50.00", "2026-08-10", Some(cat))).unwrap();
    assert_eq!(event.status, TxStatus::Active);

    let stored = ledger::get(&conn, event.id).unwrap();
    assert_eq!(stored.base_amount, dec("-50.00"));
    assert_eq!(stored.status, TxStatus::Active);
    assert_eq!(stored.revises, None);
}

#[test]
fn record_rejects_unknown_account() {
    let mut conn = setup();
    let err = ledger::record(&mut conn, &draft(Uuid::new_v4(), "-1", "2026-08-10", None))
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 0);
}

#[test]
fn correct_supersedes_and_links() {
    let mut conn = setup();
    let acct = add_account(&conn, "Checking");
    let cat = add_category(&conn, "Groceries");

    let t1 = ledger::record(&mut conn, &draft(acct, "-50.00", "2026-08-10", Some(cat))).unwrap();
    let t2 = ledger::correct(&mut conn, t1.id, &draft(acct, "-45.00", "2026-08-10", Some(cat)))
        .unwrap();

    assert_eq!(ledger::get(&conn, t1.id).unwrap().status, TxStatus::Superseded);
    let stored = ledger::get(&conn, t2.id).unwrap();
    assert_eq!(stored.status, TxStatus::Active);
    assert_eq!(stored.revises, Some(t1.id));
}

#[test]
fn correct_rejected_off_tip() {
    let mut conn = setup();
    let acct = add_account(&conn, "Checking");

    let t1 = ledger::record(&mut conn, &draft(acct, "-50.00", "2026-08-10", None)).unwrap();
    let t2 = ledger::correct(&mut conn, t1.id, &draft(acct, "-45.00", "2026-08-10", None)).unwrap();
    let t3 = ledger::correct(&mut conn, t2.id, &draft(acct, "-40.00", "2026-08-10", None)).unwrap();

    // t1 is two hops behind the tip now
    let err = ledger::correct(&mut conn, t1.id, &draft(acct, "-1.00", "2026-08-10", None))
        .unwrap_err();
    match err {
        Error::NotFound(msg) => assert!(msg.contains(&t3.id.to_string())),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn correct_missing_target_not_found() {
    let mut conn = setup();
    let acct = add_account(&conn, "Checking");
    let err = ledger::correct(
        &mut conn,
        Uuid::new_v4(),
        &draft(acct, "-1.00", "2026-08-10", None),
    )
    .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn failed_correction_leaves_original_active() {
    let mut conn = setup();
    let acct = add_account(&conn, "Checking");

    let t1 = ledger::record(&mut conn, &draft(acct, "-50.00", "2026-08-10", None)).unwrap();
    let mut bad = draft(acct, "-45.00", "2026-08-10", None);
    bad.original_currency = "usd".into(); // malformed on purpose

    assert!(ledger::correct(&mut conn, t1.id, &bad).is_err());
    assert_eq!(ledger::get(&conn, t1.id).unwrap().status, TxStatus::Active);
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 1);
}

#[test]
fn chain_tip_walks_forward_from_any_member() {
    let mut conn = setup();
    let acct = add_account(&conn, "Checking");

    let t1 = ledger::record(&mut conn, &draft(acct, "-50.00", "2026-08-10", None)).unwrap();
    let t2 = ledger::correct(&mut conn, t1.id, &draft(acct, "-45.00", "2026-08-10", None)).unwrap();
    let t3 = ledger::correct(&mut conn, t2.id, &draft(acct, "-40.00", "2026-08-10", None)).unwrap();

    assert_eq!(ledger::chain_tip(&conn, t1.id).unwrap().id, t3.id);
    assert_eq!(ledger::chain_tip(&conn, t2.id).unwrap().id, t3.id);
    assert_eq!(ledger::chain_tip(&conn, t3.id).unwrap().id, t3.id);

    // exactly one ACTIVE member in the chain
    let active: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM transactions WHERE status='ACTIVE'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(active, 1);
}

#[test]
fn void_terminates_chain() {
    let mut conn = setup();
    let acct = add_account(&conn, "Checking");

    let t1 = ledger::record(&mut conn, &draft(acct, "-50.00", "2026-08-10", None)).unwrap();
    let t2 = ledger::correct(&mut conn, t1.id, &draft(acct, "-45.00", "2026-08-10", None)).unwrap();
    ledger::void(&mut conn, t2.id).unwrap();

    let tip = ledger::chain_tip(&conn, t1.id).unwrap();
    assert_eq!(tip.id, t2.id);
    assert_eq!(tip.status, TxStatus::Void);

    // voided rows can be neither voided again nor corrected
    assert!(matches!(
        ledger::void(&mut conn, t2.id).unwrap_err(),
        Error::NotFound(_)
    ));
    assert!(matches!(
        ledger::correct(&mut conn, t2.id, &draft(acct, "-1", "2026-08-10", None)).unwrap_err(),
        Error::NotFound(_)
    ));
}

#[test]
fn query_orders_by_date_then_id() {
    let mut conn = setup();
    let acct = add_account(&conn, "Checking");

    let a = ledger::record(&mut conn, &draft(acct, "-3", "2026-08-12", None)).unwrap();
    let b = ledger::record(&mut conn, &draft(acct, "-1", "2026-08-10", None)).unwrap();
    let c = ledger::record(&mut conn, &draft(acct, "-2", "2026-08-10", None)).unwrap();

    let got = ledger::query(&conn, &QueryFilter::default()).unwrap();
    let ids: Vec<_> = got.iter().map(|t| t.id).collect();

    let mut same_day = [b.id, c.id];
    same_day.sort_by_key(|id| id.to_string());
    assert_eq!(ids, vec![same_day[0], same_day[1], a.id]);

    // restartable: second run returns the same sequence
    let again: Vec<_> = ledger::query(&conn, &QueryFilter::default())
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, again);
}

#[test]
fn query_filters_by_status_and_range() {
    let mut conn = setup();
    let acct = add_account(&conn, "Checking");

    let t1 = ledger::record(&mut conn, &draft(acct, "-10", "2026-07-31", None)).unwrap();
    let t2 = ledger::record(&mut conn, &draft(acct, "-20", "2026-08-05", None)).unwrap();
    ledger::void(&mut conn, t1.id).unwrap();

    let active = ledger::query(
        &conn,
        &QueryFilter {
            status: Some(TxStatus::Active),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, t2.id);

    let july = ledger::query(
        &conn,
        &QueryFilter {
            from: Some(utils::parse_datetime("2026-07-01").unwrap()),
            to: Some(utils::parse_datetime("2026-07-31").unwrap()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(july.len(), 1);
    assert_eq!(july[0].id, t1.id);
}
