// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced by the ledger core. Everything except `ConsistencyFault`
/// is recoverable by the caller fixing input or retrying.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input: bad currency code, sign mismatch, blocked delete.
    /// Rejected before any row is written.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The sum of a transaction's splits disagrees with its base amount.
    #[error("split amounts sum to {actual}, expected {expected}")]
    SplitMismatch { expected: Decimal, actual: Decimal },

    /// A referenced entity (or correction target) does not exist, or the
    /// correction target is no longer the ACTIVE chain tip.
    #[error("not found: {0}")]
    NotFound(String),

    /// A category insert/move would make a category its own ancestor.
    #[error("category cycle: {0}")]
    Cycle(String),

    /// A concurrent correction won the race. Re-read the chain tip and retry.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A recomputed summary does not match ledger totals. Never auto-corrected;
    /// surfaced for manual investigation.
    #[error("consistency fault: {0}")]
    ConsistencyFault(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
