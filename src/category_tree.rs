// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Hierarchical spend/income taxonomy. A category has at most one parent, so
//! the structure is a tree; cycles are rejected when a parent is assigned,
//! which keeps traversals O(depth) with no cycle detection on the read path.

use crate::error::{Error, Result};
use crate::models::{Category, NatureType, PurposeType};
use rusqlite::{Connection, OptionalExtension, params};

pub fn insert(
    conn: &Connection,
    name: &str,
    parent_id: Option<i64>,
    purpose: Option<PurposeType>,
    nature: Option<NatureType>,
) -> Result<Category> {
    if let Some(pid) = parent_id {
        // A fresh node has no descendants, so existence is the only check
        // needed here; reparent() does the full cycle walk.
        get(conn, pid)?;
    }
    conn.execute(
        "INSERT INTO categories(category_name, parent_category_id, purpose_type, nature_type)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            name,
            parent_id,
            purpose.map(|p| p.as_str()),
            nature.map(|n| n.as_str()),
        ],
    )?;
    let id = conn.last_insert_rowid();
    Ok(Category {
        id,
        name: name.to_string(),
        parent_id,
        purpose,
        nature,
    })
}

/// Move a category under a new parent (or to the root with `None`). Rejected
/// with `Cycle` if the new parent is the category itself or any of its
/// descendants.
pub fn reparent(conn: &Connection, id: i64, new_parent_id: Option<i64>) -> Result<()> {
    get(conn, id)?;
    if let Some(pid) = new_parent_id {
        if pid == id {
            return Err(Error::Cycle(format!(
                "category {} cannot be its own parent",
                id
            )));
        }
        let parent = get(conn, pid)?;
        // Walk up from the proposed parent; seeing `id` means the parent sits
        // somewhere below the category being moved.
        for anc in ancestors(conn, parent.id)? {
            if anc.id == id {
                return Err(Error::Cycle(format!(
                    "category {} is an ancestor of proposed parent {}",
                    id, pid
                )));
            }
        }
    }
    conn.execute(
        "UPDATE categories SET parent_category_id=?1 WHERE category_id=?2",
        params![new_parent_id, id],
    )?;
    Ok(())
}

/// Blocked while the category has children or is referenced by any
/// transaction, split, or merchant.
pub fn remove(conn: &Connection, id: i64) -> Result<()> {
    get(conn, id)?;
    let children: i64 = conn.query_row(
        "SELECT COUNT(*) FROM categories WHERE parent_category_id=?1",
        params![id],
        |r| r.get(0),
    )?;
    if children > 0 {
        return Err(Error::Validation(format!(
            "category {} still has {} child categories",
            id, children
        )));
    }
    let refs: i64 = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM transactions WHERE category_id=?1)
              + (SELECT COUNT(*) FROM transaction_splits WHERE category_id=?1)
              + (SELECT COUNT(*) FROM merchants WHERE default_category_id=?1)",
        params![id],
        |r| r.get(0),
    )?;
    if refs > 0 {
        return Err(Error::Validation(format!(
            "category {} is referenced by {} rows",
            id, refs
        )));
    }
    conn.execute("DELETE FROM categories WHERE category_id=?1", params![id])?;
    Ok(())
}

pub fn get(conn: &Connection, id: i64) -> Result<Category> {
    let sql = format!(
        "SELECT {} FROM categories WHERE category_id=?1",
        Category::COLUMNS
    );
    conn.query_row(&sql, params![id], Category::from_row)
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("category {}", id)))
}

/// Chain of ancestors, root first, excluding the category itself.
pub fn ancestors(conn: &Connection, id: i64) -> Result<Vec<Category>> {
    let mut chain = Vec::new();
    let mut current = get(conn, id)?;
    while let Some(pid) = current.parent_id {
        if pid == id || chain.iter().any(|c: &Category| c.id == pid) {
            return Err(Error::ConsistencyFault(format!(
                "category parent chain through {} contains a cycle",
                id
            )));
        }
        current = get(conn, pid)?;
        chain.push(current.clone());
    }
    chain.reverse();
    Ok(chain)
}

/// All categories below this one, deepest first, excluding the category
/// itself.
pub fn descendants(conn: &Connection, id: i64) -> Result<Vec<Category>> {
    get(conn, id)?;
    let mut out: Vec<Category> = Vec::new();
    let mut frontier = vec![id];
    while let Some(cur) = frontier.pop() {
        let sql = format!(
            "SELECT {} FROM categories WHERE parent_category_id=?1 ORDER BY category_id",
            Category::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![cur], Category::from_row)?;
        for row in rows {
            let child = row?;
            frontier.push(child.id);
            out.push(child);
        }
    }
    out.reverse();
    Ok(out)
}

pub fn is_leaf(conn: &Connection, id: i64) -> Result<bool> {
    let children: i64 = conn.query_row(
        "SELECT COUNT(*) FROM categories WHERE parent_category_id=?1",
        params![id],
        |r| r.get(0),
    )?;
    Ok(children == 0)
}

/// "Root > Child > Leaf" label for report rows.
pub fn path(conn: &Connection, id: i64) -> Result<String> {
    let target = get(conn, id)?;
    let mut names: Vec<String> = ancestors(conn, id)?.into_iter().map(|c| c.name).collect();
    names.push(target.name);
    Ok(names.join(" > "))
}
