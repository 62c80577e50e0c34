use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::{Balance, TransactionRequest, UserId};

/// Errors that can occur when reading or writing csv
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open {path}: {source}")]
    Open { path: String, source: csv::Error },

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("failed to write balances: {0}")]
    Write(#[from] csv::Error),

    #[error("failed to flush balances: {0}")]
    Flush(#[from] io::Error),
}

#[derive(Debug, Deserialize)]
struct InputRow {
    r#type: String,
    user: UserId,
    amount: i64,
}

#[derive(Debug, Serialize)]
struct OutputRow {
    user: UserId,
    balance: u64,
}

/// Open a csv file of `type,user,amount` rows as a stream of requests.
///
/// The `type` column is passed through untouched; the ledger decides whether it
/// names a known transaction kind.
pub fn read_requests(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<TransactionRequest, CsvError>>, CsvError> {
    let path = path.as_ref();
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| CsvError::Open {
            path: path.display().to_string(),
            source,
        })?;

    Ok(reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            Ok(TransactionRequest::new(row.user, row.amount, row.r#type))
        }))
}

/// Write balances as `user,balance` csv
pub fn write_balances<'a>(
    writer: impl io::Write,
    balances: impl IntoIterator<Item = &'a Balance>,
) -> Result<(), CsvError> {
    let mut writer = csv::Writer::from_writer(writer);

    for balance in balances {
        writer.serialize(OutputRow {
            user: balance.user,
            balance: balance.amount.get(),
        })?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Points;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn read_all(file: &NamedTempFile) -> Vec<Result<TransactionRequest, CsvError>> {
        read_requests(file.path()).unwrap().collect()
    }

    #[test]
    fn read_charge_and_use() {
        let file = write_csv("type,user,amount\ncharge,1,500\nuse,2,30\n");
        let requests: Vec<_> = read_all(&file).into_iter().map(Result::unwrap).collect();

        assert_eq!(
            requests,
            vec![
                TransactionRequest::charge(1, 500),
                TransactionRequest::use_points(2, 30),
            ]
        );
    }

    #[test]
    fn read_with_whitespace() {
        let file = write_csv("type, user, amount\ncharge, 1, 10\n");
        let results = read_all(&file);
        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok());
    }

    #[test]
    fn read_passes_unknown_type_through() {
        let file = write_csv("type,user,amount\nrefund,1,10\n");
        let results = read_all(&file);
        assert_eq!(
            results[0].as_ref().unwrap(),
            &TransactionRequest::new(1, 10, "refund")
        );
    }

    #[test]
    fn read_keeps_negative_amounts_for_the_ledger() {
        let file = write_csv("type,user,amount\ncharge,1,-10\n");
        let results = read_all(&file);
        assert_eq!(results[0].as_ref().unwrap().amount, -10);
    }

    #[test]
    fn read_returns_error_for_malformed_amount() {
        let file = write_csv("type,user,amount\ncharge,1,ten\ncharge,1,10\n");
        let results = read_all(&file);
        assert_eq!(results.len(), 2);
        let err = results[0].as_ref().unwrap_err();
        assert!(matches!(err, CsvError::Parse { line: 2, .. }));
        assert!(results[1].is_ok());
    }

    #[test]
    fn read_returns_error_for_missing_amount() {
        let file = write_csv("type,user,amount\nuse,1,\n");
        let results = read_all(&file);
        assert!(matches!(results[0], Err(CsvError::Parse { line: 2, .. })));
    }

    #[test]
    fn reader_from_owned_path_outlives_caller() {
        let file = write_csv("type,user,amount\ncharge,1,10\n");
        let requests = read_requests(file.path().to_path_buf()).unwrap();

        let handle = std::thread::spawn(move || requests.map(Result::unwrap).collect::<Vec<_>>());
        assert_eq!(handle.join().unwrap(), vec![TransactionRequest::charge(1, 10)]);
    }

    #[test]
    fn open_missing_file_fails() {
        let result = read_requests("does/not/exist.csv");
        assert!(matches!(result, Err(CsvError::Open { .. })));
    }

    #[test]
    fn write_balances_as_csv() {
        let balances = vec![
            Balance {
                user: 1,
                amount: Points::new(75),
                updated_at: std::time::SystemTime::now(),
            },
            Balance::empty(2),
        ];

        let mut out = Vec::new();
        write_balances(&mut out, &balances).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "user,balance\n1,75\n2,0\n");
    }
}
