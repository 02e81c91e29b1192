//! CSV journal reader and report writers.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::{
    Balances, MemberId, Record, Settlement, Split, SplitType, Timestamp, Transaction,
};
use crate::{Amount, GlobalSummary};

/// Errors that can occur when reading or writing journals
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("failed to open journal {}: {source}", path.display())]
    Open { path: PathBuf, source: csv::Error },

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized record type '{record_type}'")]
    UnrecognizedType { line: usize, record_type: String },

    #[error("line {line}: {record_type} missing {field}")]
    MissingField {
        line: usize,
        record_type: String,
        field: &'static str,
    },

    #[error("line {line}: unknown split type '{split}'")]
    UnknownSplitType { line: usize, split: String },

    #[error("line {line}: value {value} is out of range")]
    InvalidValue { line: usize, value: f64 },

    #[error("failed to write report: {0}")]
    Write(#[from] csv::Error),

    #[error("failed to flush report: {0}")]
    Flush(#[from] io::Error),
}

#[derive(Debug, Deserialize)]
struct InputRow {
    r#type: String,
    r#ref: Option<String>,
    member: Option<String>,
    to: Option<String>,
    value: Option<f64>,
    split: Option<String>,
    /// Milliseconds since the Unix epoch; optional column.
    date: Option<Timestamp>,
    /// Optional column.
    description: Option<String>,
}

/// Convert a journal value, rejecting values an [`Amount`] cannot hold.
fn checked_amount(value: f64, line: usize) -> Result<Amount, JournalError> {
    Amount::try_from_float(value).ok_or(JournalError::InvalidValue { line, value })
}

/// Pull a required field out of a row, or report which one is missing.
fn required<T>(
    field: Option<T>,
    line: usize,
    record_type: &str,
    name: &'static str,
) -> Result<T, JournalError> {
    field.ok_or_else(|| JournalError::MissingField {
        line,
        record_type: record_type.to_string(),
        field: name,
    })
}

fn parse_row(line: usize, row: InputRow) -> Result<Record, JournalError> {
    let kind = row.r#type.as_str();
    let reference = || required(row.r#ref.clone(), line, kind, "ref");
    let member = || required(row.member.clone(), line, kind, "member");
    let value = || checked_amount(required(row.value, line, kind, "value")?, line);

    match kind {
        "member" => Ok(Record::Member { member: member()? }),
        "expense" => {
            let split = required(row.split.clone(), line, kind, "split")?;
            let split_type = split
                .parse::<SplitType>()
                .map_err(|_| JournalError::UnknownSplitType { line, split })?;
            Ok(Record::Expense {
                expense: reference()?,
                amount: value()?,
                split_type,
                description: row.description.clone(),
                date: row.date,
            })
        }
        "paid" => Ok(Record::Contribution {
            expense: reference()?,
            member: member()?,
            amount: value()?,
        }),
        "payer" => Ok(Record::Payer {
            expense: reference()?,
            member: member()?,
        }),
        "split" => Ok(Record::Participant {
            expense: reference()?,
            member: member()?,
            value: row.value.map(|v| checked_amount(v, line)).transpose()?,
        }),
        "settle" => Ok(Record::Settlement(
            Settlement::new(
                member()?,
                required(row.to.clone(), line, kind, "to")?,
                value()?,
            )
            .with_date(row.date),
        )),
        other => Err(JournalError::UnrecognizedType {
            line,
            record_type: other.to_string(),
        }),
    }
}

/// Read journal records from a csv file
pub fn read_records(
    path: &Path,
) -> Result<impl Iterator<Item = Result<Record, JournalError>> + use<>, JournalError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| JournalError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| JournalError::Parse { line, source })?;
            parse_row(line, row)
        }))
}

#[derive(Debug, Serialize)]
struct BalanceRow<'a> {
    member: &'a str,
    balance: String,
}

#[derive(Debug, Serialize)]
struct TransferRow<'a> {
    from: &'a str,
    to: &'a str,
    amount: String,
}

#[derive(Debug, Serialize)]
struct AmountRow<'a> {
    member: &'a str,
    amount: String,
}

#[derive(Debug, Serialize)]
struct SummaryRow {
    total_owed: String,
    total_owes: String,
}

/// Csv writer whose header is written up front, so empty reports keep it
fn report<W: io::Write>(out: W, header: &[&str]) -> Result<csv::Writer<W>, JournalError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    writer.write_record(header)?;
    Ok(writer)
}

/// Write `member,balance` rows
pub fn write_balances(out: impl io::Write, balances: &Balances) -> Result<(), JournalError> {
    let mut writer = report(out, &["member", "balance"])?;
    for (member, balance) in balances {
        writer.serialize(BalanceRow {
            member,
            balance: balance.to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `from,to,amount` rows
pub fn write_transactions(
    out: impl io::Write,
    transactions: &[Transaction],
) -> Result<(), JournalError> {
    let mut writer = report(out, &["from", "to", "amount"])?;
    for tx in transactions {
        writer.serialize(TransferRow {
            from: &tx.from,
            to: &tx.to,
            amount: tx.amount.to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `member,amount` rows, one per counterparty or split participant
pub fn write_amounts<'a>(
    out: impl io::Write,
    amounts: impl IntoIterator<Item = (&'a MemberId, Amount)>,
) -> Result<(), JournalError> {
    let mut writer = report(out, &["member", "amount"])?;
    for (member, amount) in amounts {
        writer.serialize(AmountRow {
            member,
            amount: amount.to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_splits(out: impl io::Write, splits: &[Split]) -> Result<(), JournalError> {
    write_amounts(out, splits.iter().map(|split| (&split.member, split.amount)))
}

pub fn write_summary(out: impl io::Write, summary: &GlobalSummary) -> Result<(), JournalError> {
    let mut writer = report(out, &["total_owed", "total_owes"])?;
    writer.serialize(SummaryRow {
        total_owed: summary.total_owed.to_string(),
        total_owes: summary.total_owes.to_string(),
    })?;
    writer.flush()?;
    Ok(())
}
