use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use crate::core::RebalancingTransaction;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corrupt ledger entry on line {line}: {source}")]
    Corrupt {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("transaction {id} has a non-finite amount")]
    NonFinite { id: String },
    #[error("failed to encode transaction: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Append-only log of executed rebalances, one JSON object per line.
#[derive(Debug)]
pub struct TransactionLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TransactionLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// JSON has no encoding for NaN or infinity, so such records are refused rather than
    /// written as `null`.
    pub fn append(&self, transaction: &RebalancingTransaction) -> Result<()> {
        let finite = transaction.total_amount.is_finite()
            && transaction.actions.iter().all(|a| a.amount.is_finite());
        if !finite {
            return Err(LedgerError::NonFinite {
                id: transaction.id.clone(),
            });
        }

        let mut line = serde_json::to_string(transaction)?;
        line.push('\n');

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_error(source))?;
        file.write_all(line.as_bytes())
            .map_err(|source| self.io_error(source))?;

        tracing::info!(
            id = %transaction.id,
            actions = transaction.actions.len(),
            total_amount = transaction.total_amount,
            "recorded rebalancing transaction"
        );
        Ok(())
    }

    /// All recorded transactions, newest first. A ledger that was never written is empty.
    pub fn history(&self) -> Result<Vec<RebalancingTransaction>> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(self.io_error(source)),
        };

        let mut transactions = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|source| self.io_error(source))?;
            if line.trim().is_empty() {
                continue;
            }
            let transaction = serde_json::from_str(&line).map_err(|source| {
                LedgerError::Corrupt {
                    line: index + 1,
                    source,
                }
            })?;
            transactions.push(transaction);
        }
        transactions.reverse();
        Ok(transactions)
    }

    fn io_error(&self, source: io::Error) -> LedgerError {
        LedgerError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
