use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::info;
use crate::models::{Result, ScoredWallet, WalletScoreError};

pub const HEADER: &str = "wallet,score";

/// Ranked two-column score table: `wallet,score`, highest score first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreTable {
    rows: Vec<ScoredWallet>,
}

impl ScoreTable {
    pub fn from_scores(mut scores: Vec<ScoredWallet>) -> Self {
        scores.sort_by(ScoredWallet::ranking);
        Self { rows: scores }
    }

    pub fn rows(&self) -> &[ScoredWallet] {
        &self.rows
    }

    pub fn scores(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.iter().map(|r| r.score)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "{}", HEADER)?;
        for row in &self.rows {
            writeln!(writer, "{},{}", quote_field(&row.wallet), row.score)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Writes the table, creating the parent directory if needed.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        self.write_to(BufWriter::new(File::create(path)?))?;
        info!("Wrote {} wallet scores to {}", self.rows.len(), path.display());
        Ok(())
    }

    pub fn read_from<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;

        let mut records = split_records(&text)?.into_iter();
        let header = match records.next() {
            Some((_, fields)) => fields,
            None => {
                return Err(WalletScoreError::MalformedScoreTable {
                    line: 1,
                    message: "empty file".to_string(),
                });
            }
        };
        if header.join(",").trim() != HEADER {
            return Err(WalletScoreError::MalformedScoreTable {
                line: 1,
                message: format!("expected header '{}'", HEADER),
            });
        }

        let mut rows = Vec::new();
        for (line, fields) in records {
            if fields.len() == 1 && fields[0].trim().is_empty() {
                continue;
            }

            let [wallet, score]: [String; 2] = fields.try_into().map_err(|fields: Vec<String>| {
                WalletScoreError::MalformedScoreTable {
                    line,
                    message: format!("expected two columns, found {}", fields.len()),
                }
            })?;
            let score = score.trim().parse::<u32>().map_err(|e| {
                WalletScoreError::MalformedScoreTable {
                    line,
                    message: format!("invalid score '{}': {}", score, e),
                }
            })?;
            rows.push(ScoredWallet::new(wallet, score));
        }

        Ok(Self::from_scores(rows))
    }

    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::read_from(BufReader::new(File::open(path)?))
    }
}

// Wallet text comes straight from the input log, so anything with a
// delimiter, quote or line break is quoted with embedded quotes doubled.
fn quote_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Splits delimited text into records, each tagged with the line it starts
/// on. Quoted fields may hold commas, doubled quotes and line breaks.
fn split_records(text: &str) -> Result<Vec<(usize, Vec<String>)>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut line = 1;
    let mut start = 1;
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                records.push((start, std::mem::take(&mut fields)));
                line += 1;
                start = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(WalletScoreError::MalformedScoreTable {
            line: start,
            message: "unterminated quoted field".to_string(),
        });
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        records.push((start, fields));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ScoreTable {
        ScoreTable::from_scores(vec![
            ScoredWallet::new("0xb", 10),
            ScoredWallet::new("0xa", 990),
            ScoredWallet::new("0xc", 10),
        ])
    }

    #[test]
    fn test_rows_are_ranked() {
        let table = sample();
        let order: Vec<&str> = table.rows().iter().map(|r| r.wallet.as_str()).collect();
        assert_eq!(order, vec!["0xa", "0xb", "0xc"]);
    }

    #[test]
    fn test_csv_layout() {
        let mut buf = Vec::new();
        sample().write_to(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "wallet,score\n0xa,990\n0xb,10\n0xc,10\n"
        );
    }

    #[test]
    fn test_write_creates_directory_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output").join("wallet_scores.csv");

        let table = sample();
        table.write_csv(&path).unwrap();
        assert_eq!(ScoreTable::read_csv(&path).unwrap(), table);
    }

    #[test]
    fn test_wallets_with_delimiters_are_quoted() {
        let table = ScoreTable::from_scores(vec![
            ScoredWallet::new("0xa,evil", 1000),
            ScoredWallet::new("say \"hi\"", 500),
            ScoredWallet::new("two\nlines", 20),
            ScoredWallet::new("0xb", 0),
        ]);

        let mut buf = Vec::new();
        table.write_to(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf.clone()).unwrap(),
            "wallet,score\n\"0xa,evil\",1000\n\"say \"\"hi\"\"\",500\n\"two\nlines\",20\n0xb,0\n"
        );

        assert_eq!(ScoreTable::read_from(buf.as_slice()).unwrap(), table);
    }

    #[test]
    fn test_extra_column_rejected() {
        let err = ScoreTable::read_from("wallet,score\n0xa,evil,1000\n".as_bytes()).unwrap_err();
        assert!(matches!(err, WalletScoreError::MalformedScoreTable { line: 2, .. }));
    }

    #[test]
    fn test_unterminated_quote_rejected() {
        let err = ScoreTable::read_from("wallet,score\n\"0xa,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, WalletScoreError::MalformedScoreTable { line: 2, .. }));
    }

    #[test]
    fn test_crlf_rows_are_read() {
        let table = ScoreTable::read_from("wallet,score\r\n0xa,7\r\n".as_bytes()).unwrap();
        assert_eq!(table.rows(), &[ScoredWallet::new("0xa", 7)]);
    }

    #[test]
    fn test_bad_header_rejected() {
        let err = ScoreTable::read_from("address,value\n0xa,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, WalletScoreError::MalformedScoreTable { line: 1, .. }));
    }

    #[test]
    fn test_bad_score_reports_line() {
        let err = ScoreTable::read_from("wallet,score\n0xa,1\n0xb,lots\n".as_bytes()).unwrap_err();
        assert!(matches!(err, WalletScoreError::MalformedScoreTable { line: 3, .. }));
    }
}
