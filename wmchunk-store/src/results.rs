//! Subject result files: one row per executed trial, runs appended one after
//! another.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use serde::Deserialize;
use tracing::{debug, info};
use wmchunk_core::ResponseRecord;

use crate::columns::{SpecColumns, flexible_bool};
use crate::error::StoreError;

/// Columns written for every trial, in file order.
const RESULT_COLUMNS: [&str; 21] = [
    "TN",
    "run_number",
    "phase_type",
    "seq_str",
    "chunk",
    "recall_dir",
    "item_dur",
    "iti_dur",
    "feedback_dur",
    "trial_dur",
    "display_trial_feedback",
    "seq_length",
    "response",
    "response_time",
    "MT",
    "is_error",
    "number_correct",
    "points",
    "timed_out",
    "interrupted",
    "overflow",
];

/// Column layout of a result file. Response lists are stored as JSON arrays
/// and an undefined movement time as an empty cell. Columns this layout does
/// not know are ignored when reading and kept when appending.
#[derive(Debug, Clone, Deserialize)]
struct ResultRow {
    #[serde(rename = "TN")]
    trial_number: usize,
    run_number: u32,
    phase_type: u8,
    seq_str: String,
    chunk: usize,
    recall_dir: u8,
    item_dur: f64,
    iti_dur: f64,
    feedback_dur: f64,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    trial_dur: Option<f64>,
    #[serde(deserialize_with = "flexible_bool")]
    display_trial_feedback: bool,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    seq_length: Option<usize>,
    response: String,
    response_time: String,
    #[serde(rename = "MT", default, deserialize_with = "csv::invalid_option")]
    movement_time: Option<f64>,
    #[serde(deserialize_with = "flexible_bool")]
    is_error: bool,
    number_correct: usize,
    points: u32,
    // absent from files written before these flags existed
    #[serde(default, deserialize_with = "csv::invalid_option")]
    timed_out: Option<bool>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    interrupted: Option<bool>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    overflow: Option<usize>,
}

impl ResultRow {
    fn into_record(self, row: usize) -> Result<ResponseRecord, StoreError> {
        let spec = SpecColumns {
            run_number: self.run_number,
            phase_type: self.phase_type,
            seq_str: self.seq_str,
            chunk: self.chunk,
            recall_dir: self.recall_dir,
            item_dur: self.item_dur,
            iti_dur: self.iti_dur,
            feedback_dur: self.feedback_dur,
            trial_dur: self.trial_dur,
            display_trial_feedback: self.display_trial_feedback,
            seq_length: self.seq_length,
        }
        .into_spec(row)
        .map_err(|source| StoreError::Row { row, source })?;

        Ok(ResponseRecord {
            trial_index: self.trial_number,
            spec,
            responses: parse_list(&self.response, row, "response")?,
            response_times: parse_list(&self.response_time, row, "response_time")?,
            movement_time: self.movement_time.unwrap_or(f64::NAN),
            is_error: self.is_error,
            correct_count: self.number_correct,
            points: self.points,
            timed_out: self.timed_out.unwrap_or(false),
            interrupted: self.interrupted.unwrap_or(false),
            overflow: self.overflow.unwrap_or(0),
        })
    }
}

/// Cells for `record` in `RESULT_COLUMNS` order.
fn result_cells(record: &ResponseRecord) -> Result<Vec<String>, serde_json::Error> {
    let spec = SpecColumns::from(&record.spec);
    Ok(vec![
        record.trial_index.to_string(),
        spec.run_number.to_string(),
        spec.phase_type.to_string(),
        spec.seq_str,
        spec.chunk.to_string(),
        spec.recall_dir.to_string(),
        float_cell(spec.item_dur),
        float_cell(spec.iti_dur),
        float_cell(spec.feedback_dur),
        spec.trial_dur.map(float_cell).unwrap_or_default(),
        spec.display_trial_feedback.to_string(),
        spec.seq_length.map(|n| n.to_string()).unwrap_or_default(),
        serde_json::to_string(&record.responses)?,
        serde_json::to_string(&record.response_times)?,
        Some(record.movement_time)
            .filter(|mt| !mt.is_nan())
            .map(float_cell)
            .unwrap_or_default(),
        record.is_error.to_string(),
        record.correct_count.to_string(),
        record.points.to_string(),
        record.timed_out.to_string(),
        record.interrupted.to_string(),
        record.overflow.to_string(),
    ])
}

fn float_cell(value: f64) -> String {
    // Debug keeps the trailing `.0` on whole numbers
    format!("{value:?}")
}

/// The row laid out under `headers`; columns `record` has no value for stay
/// empty.
fn row_under(
    headers: &StringRecord,
    record: &ResponseRecord,
    row: usize,
) -> Result<StringRecord, StoreError> {
    let cells = result_cells(record).map_err(|source| StoreError::List {
        row,
        column: "response",
        source,
    })?;
    Ok(headers
        .iter()
        .map(|header| {
            RESULT_COLUMNS
                .iter()
                .position(|column| *column == header)
                .map_or("", |i| cells[i].as_str())
        })
        .collect())
}

/// Parses a list cell. Lists are JSON arrays; files written by the earlier
/// pandas task hold Python reprs such as `['1', '2']`, which are accepted too.
fn parse_list<T: serde::de::DeserializeOwned>(
    cell: &str,
    row: usize,
    column: &'static str,
) -> Result<Vec<T>, StoreError> {
    if cell.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(cell)
        .or_else(|err| serde_json::from_str(&cell.replace('\'', "\"")).map_err(|_| err))
        .map_err(|source| StoreError::List {
            row,
            column,
            source,
        })
}

/// Raw header and rows, every column kept as text.
struct Table {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl Table {
    fn read<R: io::Read>(reader: R) -> Result<Self, StoreError> {
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);
        let headers = csv.headers()?.clone();
        let rows = csv.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Self { headers, rows })
    }

    fn load(path: &Path) -> Result<Self, StoreError> {
        let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
        Self::read(file)
    }

    fn with_result_columns() -> Self {
        Self {
            headers: RESULT_COLUMNS.iter().copied().collect(),
            rows: Vec::new(),
        }
    }

    fn push_records(&mut self, records: &[ResponseRecord]) -> Result<(), StoreError> {
        for column in RESULT_COLUMNS {
            if !self.headers.iter().any(|header| header == column) {
                self.headers.push_field(column);
            }
        }
        let width = self.headers.len();
        for row in &mut self.rows {
            while row.len() < width {
                row.push_field("");
            }
        }

        let first = self.rows.len();
        for (i, record) in records.iter().enumerate() {
            let row = row_under(&self.headers, record, first + i)?;
            self.rows.push(row);
        }
        Ok(())
    }

    fn records(&self) -> Result<Vec<ResponseRecord>, StoreError> {
        self.rows
            .iter()
            .enumerate()
            .map(|(row, fields)| {
                fields
                    .deserialize::<ResultRow>(Some(&self.headers))?
                    .into_record(row)
            })
            .collect()
    }

    fn write(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        }

        // written next to the target and renamed so a crash never leaves half a file
        let tmp = staging_path(path);
        let mut writer = csv::Writer::from_path(&tmp)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush().map_err(|e| StoreError::io(&tmp, e))?;
        drop(writer);

        std::fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))
    }
}

pub fn read_results<R: io::Read>(reader: R) -> Result<Vec<ResponseRecord>, StoreError> {
    Table::read(reader)?.records()
}

pub fn load_results(path: &Path) -> Result<Vec<ResponseRecord>, StoreError> {
    Table::load(path)?.records()
}

/// Replaces the contents of `path` with `records`.
pub fn write_results(path: &Path, records: &[ResponseRecord]) -> Result<(), StoreError> {
    let mut table = Table::with_result_columns();
    table.push_records(records)?;
    table.write(path)
}

/// Appends `records` after whatever the subject's file already holds and
/// returns every record now stored. Rows already in the file are rewritten
/// as read, including columns this crate does not use.
pub fn append_results(
    path: &Path,
    records: &[ResponseRecord],
) -> Result<Vec<ResponseRecord>, StoreError> {
    let mut table = if path.exists() {
        Table::load(path)?
    } else {
        debug!(path = %path.display(), "starting new result file");
        Table::with_result_columns()
    };
    let previous = table.rows.len();
    table.push_records(records)?;

    // parse before writing so an unreadable file is never overwritten
    let stored = table.records()?;
    table.write(path)?;
    info!(
        path = %path.display(),
        previous,
        appended = records.len(),
        "saved results"
    );
    Ok(stored)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wmchunk_core::{RecallDir, TrialSpec};

    fn retrieval_record(run: u32, responses: &[&str], times: &[f64], mt: f64) -> ResponseRecord {
        let enc = TrialSpec::encoding(run, "1 2 3 4", 2, RecallDir::Backward);
        ResponseRecord {
            trial_index: 1,
            spec: TrialSpec::retrieval_for(&enc, "# # # #"),
            responses: responses.iter().map(|s| s.to_string()).collect(),
            response_times: times.to_vec(),
            movement_time: mt,
            is_error: true,
            correct_count: 3,
            points: 3,
            timed_out: false,
            interrupted: false,
            overflow: 0,
        }
    }

    const LEGACY: &str = "TN,hand,item_dur,iti_dur,run_number,phase_type,phase,\
display_trial_feedback,feedback_dur,feedback_type,seq_length,chunk,recall_dir,trial_dur,seq_str,\
response,response_time,MT,is_error,number_correct,points
0,right,2.0,1.0,1,0,encoding,False,0.0,points,4,2,1,4.0,1 2 3 4,[],[],0.0,False,0,0
1,right,2.0,1.0,1,1,retrieval,True,0.5,points,4,2,1,,# # # #,\
\"['1', '2', '4', '4']\",\"[1.1, 1.6, 2.0, 2.4]\",1.3,True,3,3
";

    #[test]
    fn result_file_has_expected_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub-01.csv");
        write_results(&path, &[retrieval_record(1, &["4"], &[0.5], 0.0)]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(
            header,
            "TN,run_number,phase_type,seq_str,chunk,recall_dir,item_dur,iti_dur,feedback_dur,\
trial_dur,display_trial_feedback,seq_length,response,response_time,MT,is_error,\
number_correct,points,timed_out,interrupted,overflow"
        );
        assert!(!dir.path().join("sub-01.csv.tmp").exists());
    }

    #[test]
    fn append_keeps_earlier_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subjects").join("s01.csv");

        let first = retrieval_record(1, &["4", "3", "1", "1"], &[1.0, 1.5, 2.0, 2.25], 1.25);
        assert_eq!(append_results(&path, &[first.clone()]).unwrap().len(), 1);

        let mut second = retrieval_record(2, &[], &[], f64::NAN);
        second.timed_out = true;
        let merged = append_results(&path, &[second]).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], first);

        let stored = load_results(&path).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0], first);
        assert_eq!(stored[1].spec.run_number, 2);
        assert!(stored[1].responses.is_empty());
        assert!(stored[1].movement_time.is_nan());
        assert!(stored[1].timed_out);
        assert!(!stored[1].interrupted);
    }

    #[test]
    fn python_list_reprs_are_read() {
        let records = read_results(LEGACY.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].responses.is_empty());
        assert_eq!(records[1].responses, vec!["1", "2", "4", "4"]);
        assert_eq!(records[1].response_times, vec![1.1, 1.6, 2.0, 2.4]);
        assert!(records[1].is_error);
        assert!(!records[1].timed_out);
        assert_eq!(records[1].overflow, 0);
    }

    #[test]
    fn append_keeps_columns_it_does_not_use() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub-02.csv");
        std::fs::write(&path, LEGACY).unwrap();

        let merged =
            append_results(&path, &[retrieval_record(2, &["4"], &[0.5], 0.0)]).unwrap();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[1].responses, vec!["1", "2", "4", "4"]);

        let mut csv = csv::Reader::from_path(&path).unwrap();
        let headers = csv.headers().unwrap().clone();
        let column = |name: &str| headers.iter().position(|h| h == name).unwrap();
        assert_eq!(headers.get(1), Some("hand"));
        assert_eq!(headers.get(headers.len() - 1), Some("overflow"));

        let rows: Vec<StringRecord> = csv.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][column("hand")], "right");
        assert_eq!(&rows[1][column("feedback_type")], "points");
        assert_eq!(&rows[1][column("phase")], "retrieval");
        assert_eq!(&rows[2][column("hand")], "");
        assert_eq!(&rows[2][column("run_number")], "2");
        assert_eq!(&rows[2][column("response")], "[\"4\"]");
    }

    #[test]
    fn legacy_capitalised_booleans_are_accepted() {
        let csv = "TN,run_number,phase_type,seq_str,chunk,recall_dir,item_dur,iti_dur,\
feedback_dur,trial_dur,display_trial_feedback,seq_length,response,response_time,MT,\
is_error,number_correct,points\n\
0,1,0,1 2,2,1,2,1,0,4,False,2,[],[],0.0,False,0,0\n";
        let records = read_results(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].is_error);
        assert!(!records[0].spec.display_feedback);
        assert_eq!(records[0].movement_time, 0.0);
    }

    #[test]
    fn malformed_response_list_names_the_row() {
        let csv = "TN,run_number,phase_type,seq_str,chunk,recall_dir,item_dur,iti_dur,\
feedback_dur,trial_dur,display_trial_feedback,seq_length,response,response_time,MT,\
is_error,number_correct,points\n\
0,1,1,# #,2,1,2,1,0.5,,true,2,not-json,[],,true,0,0\n";
        let err = read_results(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            StoreError::List {
                row: 0,
                column: "response",
                ..
            }
        ));
    }
}
