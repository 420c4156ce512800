// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use uuid::Uuid;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Accepts a full RFC 3339 timestamp or a bare date (midnight UTC).
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = parse_date(s)?;
    Ok(Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN)))
}

/// Like `parse_datetime`, but a bare date lands on the last instant of that
/// day so inclusive `--to` filters keep the whole day.
pub fn parse_datetime_end(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = parse_date(s)?;
    let eod = chrono::NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)
        .context("end-of-day time out of range")?;
    Ok(Utc.from_utc_datetime(&date.and_time(eod)))
}

pub fn parse_month(s: &str) -> Result<(i32, u32)> {
    let parts: Vec<&str> = s.split('-').collect();
    let parsed = if parts.len() == 2 {
        match (parts[0].parse::<i32>(), parts[1].parse::<u32>()) {
            (Ok(y), Ok(m)) if (1..=12).contains(&m) => Some((y, m)),
            _ => None,
        }
    } else {
        None
    };
    parsed.with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))
}

pub fn month_prefix(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).with_context(|| format!("Invalid id '{}'", s))
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {}", ccy, d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn id_for_account(conn: &Connection, name: &str) -> Result<Uuid> {
    let mut stmt = conn.prepare("SELECT account_id FROM accounts WHERE account_name=?1")?;
    let id: String = stmt
        .query_row(params![name], |r| r.get(0))
        .with_context(|| format!("Account '{}' not found", name))?;
    parse_uuid(&id)
}

pub fn id_for_category(conn: &Connection, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT category_id FROM categories WHERE category_name=?1")?;
    let id: i64 = stmt
        .query_row(params![name], |r| r.get(0))
        .with_context(|| format!("Category '{}' not found", name))?;
    Ok(id)
}

pub fn id_for_merchant(conn: &Connection, name: &str) -> Result<Uuid> {
    let mut stmt = conn.prepare("SELECT merchant_id FROM merchants WHERE merchant_name=?1")?;
    let id: String = stmt
        .query_row(params![name], |r| r.get(0))
        .with_context(|| format!("Merchant '{}' not found", name))?;
    parse_uuid(&id)
}

pub fn id_for_tag(conn: &Connection, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT tag_id FROM tags WHERE tag_name=?1")?;
    let id: i64 = stmt
        .query_row(params![name], |r| r.get(0))
        .with_context(|| format!("Tag '{}' not found", name))?;
    Ok(id)
}

pub fn id_for_goal(conn: &Connection, name: &str) -> Result<Uuid> {
    let mut stmt = conn.prepare("SELECT goal_id FROM goals WHERE goal_name=?1")?;
    let id: String = stmt
        .query_row(params![name], |r| r.get(0))
        .with_context(|| format!("Goal '{}' not found", name))?;
    parse_uuid(&id)
}

// Base currency settings
pub fn get_base_currency(conn: &Connection) -> Result<String> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key='base_currency'",
            [],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v.unwrap_or_else(|| "USD".to_string()))
}

pub fn set_base_currency(conn: &Connection, ccy: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('base_currency', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![ccy],
    )?;
    Ok(())
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_month_accepts_valid() {
        assert_eq!(parse_month("2026-08").unwrap(), (2026, 8));
        assert_eq!(parse_month("1999-12").unwrap(), (1999, 12));
    }

    #[test]
    fn parse_month_rejects_garbage() {
        assert!(parse_month("2026").is_err());
        assert!(parse_month("2026-13").is_err());
        assert!(parse_month("aug-2026").is_err());
    }

    #[test]
    fn parse_datetime_accepts_bare_date() {
        let dt = parse_datetime("2026-08-27").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-08-27T00:00:00+00:00");
    }

    #[test]
    fn parse_datetime_end_covers_whole_day() {
        let end = parse_datetime_end("2026-08-27").unwrap();
        let noon = parse_datetime("2026-08-27T12:00:00+00:00").unwrap();
        assert!(noon <= end);
        assert!(end < parse_datetime("2026-08-28").unwrap());
        // explicit timestamps are taken as-is
        let exact = parse_datetime_end("2026-08-27T08:30:00+00:00").unwrap();
        assert_eq!(exact.to_rfc3339(), "2026-08-27T08:30:00+00:00");
    }

    #[test]
    fn month_prefix_pads() {
        assert_eq!(month_prefix(2026, 8), "2026-08");
        assert_eq!(month_prefix(826, 11), "0826-11");
    }
}
