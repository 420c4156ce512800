// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use tallybook::category_tree;
use tallybook::db;
use tallybook::error::Error;
use tallybook::models::{NatureType, PurposeType};

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn add(conn: &Connection, name: &str, parent: Option<i64>) -> i64 {
    category_tree::insert(conn, name, parent, None, None)
        .unwrap()
        .id
}

#[test]
fn insert_with_typed_attributes() {
    let conn = setup();
    let cat = category_tree::insert(
        &conn,
        "Rent",
        None,
        Some(PurposeType::Need),
        Some(NatureType::Fixed),
    )
    .unwrap();
    let stored = category_tree::get(&conn, cat.id).unwrap();
    assert_eq!(stored.purpose, Some(PurposeType::Need));
    assert_eq!(stored.nature, Some(NatureType::Fixed));
}

#[test]
fn insert_rejects_missing_parent() {
    let conn = setup();
    let err = category_tree::insert(&conn, "Orphan", Some(42), None, None).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn self_parent_rejected() {
    let conn = setup();
    let a = add(&conn, "A", None);
    let err = category_tree::reparent(&conn, a, Some(a)).unwrap_err();
    assert!(matches!(err, Error::Cycle(_)));
}

#[test]
fn cycles_rejected_at_any_depth() {
    let conn = setup();
    let a = add(&conn, "A", None);
    let b = add(&conn, "B", Some(a));
    let c = add(&conn, "C", Some(b));
    let d = add(&conn, "D", Some(c));

    // chain lengths 1, 2, 3
    assert!(matches!(
        category_tree::reparent(&conn, a, Some(b)).unwrap_err(),
        Error::Cycle(_)
    ));
    assert!(matches!(
        category_tree::reparent(&conn, a, Some(c)).unwrap_err(),
        Error::Cycle(_)
    ));
    assert!(matches!(
        category_tree::reparent(&conn, a, Some(d)).unwrap_err(),
        Error::Cycle(_)
    ));

    // a legal move still works afterwards
    category_tree::reparent(&conn, d, Some(a)).unwrap();
    assert_eq!(category_tree::get(&conn, d).unwrap().parent_id, Some(a));
}

#[test]
fn ancestors_root_first() {
    let conn = setup();
    let a = add(&conn, "A", None);
    let b = add(&conn, "B", Some(a));
    let c = add(&conn, "C", Some(b));

    let chain: Vec<i64> = category_tree::ancestors(&conn, c)
        .unwrap()
        .iter()
        .map(|x| x.id)
        .collect();
    assert_eq!(chain, vec![a, b]);
    assert!(category_tree::ancestors(&conn, a).unwrap().is_empty());
}

#[test]
fn descendants_deepest_first() {
    let conn = setup();
    let a = add(&conn, "A", None);
    let b = add(&conn, "B", Some(a));
    let c = add(&conn, "C", Some(b));
    let d = add(&conn, "D", Some(a));

    let ids: Vec<i64> = category_tree::descendants(&conn, a)
        .unwrap()
        .iter()
        .map(|x| x.id)
        .collect();
    assert_eq!(ids.len(), 3);
    assert!(ids.contains(&b) && ids.contains(&c) && ids.contains(&d));
    // c is below b, so it must come out before b
    let pos = |id| ids.iter().position(|x| *x == id).unwrap();
    assert!(pos(c) < pos(b));

    assert!(category_tree::descendants(&conn, c).unwrap().is_empty());
}

#[test]
fn leaf_and_path_labels() {
    let conn = setup();
    let a = add(&conn, "Home", None);
    let b = add(&conn, "Utilities", Some(a));
    let c = add(&conn, "Electricity", Some(b));

    assert!(!category_tree::is_leaf(&conn, a).unwrap());
    assert!(category_tree::is_leaf(&conn, c).unwrap());
    assert_eq!(
        category_tree::path(&conn, c).unwrap(),
        "Home > Utilities > Electricity"
    );
    assert_eq!(category_tree::path(&conn, a).unwrap(), "Home");
}

#[test]
fn remove_blocked_while_children_exist() {
    let conn = setup();
    let a = add(&conn, "A", None);
    let b = add(&conn, "B", Some(a));

    assert!(matches!(
        category_tree::remove(&conn, a).unwrap_err(),
        Error::Validation(_)
    ));
    category_tree::remove(&conn, b).unwrap();
    category_tree::remove(&conn, a).unwrap();
}

#[test]
fn remove_blocked_while_referenced() {
    let conn = setup();
    let a = add(&conn, "A", None);
    conn.execute(
        "INSERT INTO merchants(merchant_id, merchant_name, default_category_id)
         VALUES ('m-1', 'Corner Shop', ?1)",
        [a],
    )
    .unwrap();
    assert!(matches!(
        category_tree::remove(&conn, a).unwrap_err(),
        Error::Validation(_)
    ));
}
