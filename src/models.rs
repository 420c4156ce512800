// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Row;
use rusqlite::types::Type;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Asset,
    Liability,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Asset => "Asset",
            AccountType::Liability => "Liability",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Asset" => Some(AccountType::Asset),
            "Liability" => Some(AccountType::Liability),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    Active,
    Void,
    Superseded,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Active => "ACTIVE",
            TxStatus::Void => "VOID",
            TxStatus::Superseded => "SUPERSEDED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(TxStatus::Active),
            "VOID" => Some(TxStatus::Void),
            "SUPERSEDED" => Some(TxStatus::Superseded),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurposeType {
    Need,
    Want,
    SavingsGoal,
}

impl PurposeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurposeType::Need => "Need",
            PurposeType::Want => "Want",
            PurposeType::SavingsGoal => "Savings/Goal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Need" => Some(PurposeType::Need),
            "Want" => Some(PurposeType::Want),
            "Savings/Goal" => Some(PurposeType::SavingsGoal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NatureType {
    Fixed,
    Variable,
}

impl NatureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NatureType::Fixed => "Fixed",
            NatureType::Variable => "Variable",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Fixed" => Some(NatureType::Fixed),
            "Variable" => Some(NatureType::Variable),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub account_type: AccountType,
    pub currency: String,
    pub initial_balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub purpose: Option<PurposeType>,
    pub nature: Option<NatureType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Merchant {
    pub id: Uuid,
    pub name: String,
    pub default_category_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// One immutable ledger event. Only `status` ever changes after insert, and
/// only through `ledger::correct` / `ledger::void`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub merchant_id: Option<Uuid>,
    pub category_id: Option<i64>,
    pub base_amount: Decimal,
    pub original_amount: Decimal,
    pub original_currency: String,
    pub date: DateTime<Utc>,
    pub status: TxStatus,
    pub revises: Option<Uuid>,
    pub related: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSplit {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub category_id: i64,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Valuation {
    pub id: Uuid,
    pub account_id: Uuid,
    pub date: NaiveDate,
    pub value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub name: String,
    pub target_amount: Decimal,
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub year: i32,
    pub month: u32,
    pub category_id: i64,
    pub total_amount: Decimal,
    pub transaction_count: i64,
}

/// Input for `ledger::record` / `ledger::correct`: everything the caller
/// chooses. Ids and status are filled in by the store.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub account_id: Uuid,
    pub merchant_id: Option<Uuid>,
    pub category_id: Option<i64>,
    pub base_amount: Decimal,
    pub original_amount: Decimal,
    pub original_currency: String,
    pub date: DateTime<Utc>,
    pub related: Option<Uuid>,
    pub splits: Vec<SplitDraft>,
    pub tag_ids: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct SplitDraft {
    pub category_id: i64,
    pub amount: Decimal,
}

fn conv_err<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn bad_enum(idx: usize, what: &str, s: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        format!("invalid {what} '{s}'").into(),
    )
}

pub(crate) fn uuid_col(r: &Row, idx: usize) -> rusqlite::Result<Uuid> {
    let s: String = r.get(idx)?;
    Uuid::parse_str(&s).map_err(|e| conv_err(idx, e))
}

pub(crate) fn uuid_col_opt(r: &Row, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let s: Option<String> = r.get(idx)?;
    s.map(|s| Uuid::parse_str(&s).map_err(|e| conv_err(idx, e)))
        .transpose()
}

pub(crate) fn decimal_col(r: &Row, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    s.parse::<Decimal>().map_err(|e| conv_err(idx, e))
}

pub(crate) fn datetime_col(r: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = r.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| conv_err(idx, e))
}

impl Account {
    pub const COLUMNS: &'static str =
        "account_id, account_name, account_type, currency_code, initial_balance";

    pub fn from_row(r: &Row) -> rusqlite::Result<Self> {
        let type_s: String = r.get(2)?;
        Ok(Account {
            id: uuid_col(r, 0)?,
            name: r.get(1)?,
            account_type: AccountType::parse(&type_s)
                .ok_or_else(|| bad_enum(2, "account type", &type_s))?,
            currency: r.get(3)?,
            initial_balance: decimal_col(r, 4)?,
        })
    }
}

impl Category {
    pub const COLUMNS: &'static str =
        "category_id, category_name, parent_category_id, purpose_type, nature_type";

    pub fn from_row(r: &Row) -> rusqlite::Result<Self> {
        let purpose_s: Option<String> = r.get(3)?;
        let nature_s: Option<String> = r.get(4)?;
        Ok(Category {
            id: r.get(0)?,
            name: r.get(1)?,
            parent_id: r.get(2)?,
            purpose: purpose_s
                .map(|s| PurposeType::parse(&s).ok_or_else(|| bad_enum(3, "purpose type", &s)))
                .transpose()?,
            nature: nature_s
                .map(|s| NatureType::parse(&s).ok_or_else(|| bad_enum(4, "nature type", &s)))
                .transpose()?,
        })
    }
}

impl Transaction {
    pub const COLUMNS: &'static str = "transaction_id, account_id, merchant_id, category_id, \
         base_currency_amount, original_amount, original_currency_code, \
         transaction_date, status, revises_transaction_id, related_transaction_id";

    pub fn from_row(r: &Row) -> rusqlite::Result<Self> {
        let status_s: String = r.get(8)?;
        Ok(Transaction {
            id: uuid_col(r, 0)?,
            account_id: uuid_col(r, 1)?,
            merchant_id: uuid_col_opt(r, 2)?,
            category_id: r.get(3)?,
            base_amount: decimal_col(r, 4)?,
            original_amount: decimal_col(r, 5)?,
            original_currency: r.get(6)?,
            date: datetime_col(r, 7)?,
            status: TxStatus::parse(&status_s)
                .ok_or_else(|| bad_enum(8, "transaction status", &status_s))?,
            revises: uuid_col_opt(r, 9)?,
            related: uuid_col_opt(r, 10)?,
        })
    }
}

impl TransactionSplit {
    pub fn from_row(r: &Row) -> rusqlite::Result<Self> {
        Ok(TransactionSplit {
            id: uuid_col(r, 0)?,
            transaction_id: uuid_col(r, 1)?,
            category_id: r.get(2)?,
            amount: decimal_col(r, 3)?,
        })
    }
}

impl Valuation {
    pub fn from_row(r: &Row) -> rusqlite::Result<Self> {
        Ok(Valuation {
            id: uuid_col(r, 0)?,
            account_id: uuid_col(r, 1)?,
            date: r.get(2)?,
            value: decimal_col(r, 3)?,
        })
    }
}
