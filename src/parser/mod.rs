use crate::db::{ Database, DbError };
use crate::util::read_file_content;
use serde::de::DeserializeOwned;
use std::iter::Enumerate;
use std::marker::PhantomData;
use std::path::Path;
use std::str::Lines;
use log::debug;
pub mod log_file;
pub mod song_file;
pub use log_file::{ LogFileTransformer, PlayEvent };
pub use song_file::{ SongFileTransformer, SongRecord };

/// Reshapes the content of one input file into rows written through `db`.
pub trait Transformer {
    fn name(&self) -> &'static str;

    /// Returns the number of source records that produced rows.
    fn transform(&self, db: &dyn Database, content: &str) -> Result<usize, DbError>;
}

pub fn process_file(
    db: &dyn Database,
    path: &Path,
    transformer: &dyn Transformer
) -> Result<usize, DbError> {
    let content = read_file_content(path).map_err(|e| {
        format!("Error reading file '{}': {}", path.display(), e)
    })?;
    let records = transformer.transform(db, &content).map_err(|e| {
        format!("{} file '{}': {}", transformer.name(), path.display(), e)
    })?;
    debug!("{} records loaded from {}", records, path.display());
    Ok(records)
}

/// Lazy sequence of newline-delimited JSON records. Blank lines are skipped and
/// each item carries its 1-based line number.
pub struct JsonLines<'a, T> {
    lines: Enumerate<Lines<'a>>,
    _record: PhantomData<T>,
}

pub fn json_lines<T: DeserializeOwned>(content: &str) -> JsonLines<'_, T> {
    JsonLines {
        lines: content.lines().enumerate(),
        _record: PhantomData,
    }
}

impl<T: DeserializeOwned> Iterator for JsonLines<'_, T> {
    type Item = Result<(usize, T), DbError>;

    fn next(&mut self) -> Option<Self::Item> {
        for (index, line) in self.lines.by_ref() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let line_number = index + 1;
            return Some(
                serde_json
                    ::from_str(line)
                    .map(|record| (line_number, record))
                    .map_err(|e| format!("line {}: {}", line_number, e).into())
            );
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn skips_blank_lines_and_keeps_line_numbers() {
        let content = "{\"a\":1}\n\n   \n{\"a\":2}\n";
        let records: Vec<(usize, Value)> = json_lines(content)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0, 1);
        assert_eq!(records[1].0, 4);
        assert_eq!(records[1].1["a"], 2);
    }

    #[test]
    fn reports_the_broken_line() {
        let content = "{\"a\":1}\n{\"a\":\n";
        let mut lines = json_lines::<Value>(content);
        assert!(lines.next().unwrap().is_ok());
        let err = lines.next().unwrap().unwrap_err();
        assert!(err.to_string().starts_with("line 2:"));
        assert!(lines.next().is_none());
    }
}
