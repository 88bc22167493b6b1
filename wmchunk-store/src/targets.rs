//! Target files: one row per trial, read in file order.
//!
//! Columns this crate does not know about (an index column, `hand`,
//! `feedback_type`, ...) are ignored.

use std::fs::File;
use std::io;
use std::path::Path;

use tracing::{debug, info};
use wmchunk_core::TrialSpec;

use crate::columns::SpecColumns;
use crate::error::StoreError;

pub fn read_trial_specs<R: io::Read>(reader: R) -> Result<Vec<TrialSpec>, StoreError> {
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut specs = Vec::new();
    for (row, columns) in csv.deserialize::<SpecColumns>().enumerate() {
        let spec = columns?
            .into_spec(row)
            .map_err(|source| StoreError::Row { row, source })?;
        debug!(row, phase = ?spec.phase_type, seq = %spec.seq_str, "target row");
        specs.push(spec);
    }
    Ok(specs)
}

pub fn load_trial_specs(path: &Path) -> Result<Vec<TrialSpec>, StoreError> {
    let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
    let specs = read_trial_specs(file)?;
    info!(path = %path.display(), trials = specs.len(), "loaded target file");
    Ok(specs)
}

pub fn write_trial_specs(path: &Path, specs: &[TrialSpec]) -> Result<(), StoreError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for spec in specs {
        writer.serialize(SpecColumns::from(spec))?;
    }
    writer.flush().map_err(|e| StoreError::io(path, e))?;
    info!(path = %path.display(), trials = specs.len(), "wrote target file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wmchunk_core::{PhaseType, RecallDir, TrialSpecError};

    const HEADER: &str = ",hand,item_dur,iti_dur,run_number,phase_type,phase,\
display_trial_feedback,feedback_dur,feedback_type,seq_length,chunk,recall_dir,trial_dur,seq_str";

    #[test]
    fn reads_rows_written_by_the_legacy_generator() {
        let csv = format!(
            "{HEADER}\n\
0,right,2,1,1,0,enc,False,0,None,4,2,0,4,1 2 3 4\n\
1,right,2,1,1,1,ret,True,0.5,acc,4,2,0,None,# # # #\n"
        );
        let specs = read_trial_specs(csv.as_bytes()).unwrap();
        assert_eq!(specs.len(), 2);

        assert_eq!(specs[0].phase_type, PhaseType::Encoding);
        assert_eq!(specs[0].recall_dir, RecallDir::Backward);
        assert_eq!(specs[0].trial_dur, Some(4.0));
        assert!(!specs[0].display_feedback);

        assert_eq!(specs[1].phase_type, PhaseType::Retrieval);
        assert_eq!(specs[1].seq_str, "# # # #");
        assert_eq!(specs[1].trial_dur, None);
        assert_eq!(specs[1].feedback_dur, 0.5);
        assert!(specs[1].display_feedback);
    }

    #[test]
    fn seq_length_column_is_optional() {
        let csv = "run_number,phase_type,seq_str,chunk,recall_dir,item_dur,iti_dur,\
feedback_dur,trial_dur,display_trial_feedback\n\
3,0,2 2 1,3,1,2,1,0,6,0\n";
        let specs = read_trial_specs(csv.as_bytes()).unwrap();
        assert_eq!(specs[0].seq_length, None);
        assert_eq!(specs[0].run_number, 3);
        assert_eq!(specs[0].recall_dir, RecallDir::Forward);
    }

    #[test]
    fn bad_row_is_fatal_and_named() {
        let csv = format!(
            "{HEADER}\n\
0,right,2,1,1,0,enc,False,0,None,4,2,0,4,1 2 3 4\n\
1,right,2,1,1,0,enc,False,0,None,4,0,0,4,1 2 3 4\n"
        );
        let err = read_trial_specs(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Row {
                row: 1,
                source: TrialSpecError::ZeroChunkSize { row: 1 }
            }
        ));
    }

    #[test]
    fn unknown_phase_code_is_rejected() {
        let csv = format!("{HEADER}\n0,right,2,1,1,7,enc,False,0,None,2,2,0,4,1 2\n");
        let err = read_trial_specs(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("unknown phase_type code 7"), "{err}");
    }

    #[test]
    fn written_targets_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("targets").join("WMC_01.csv");
        let enc = TrialSpec::encoding(1, "4 3 2 1", 2, RecallDir::Forward);
        let ret = TrialSpec::retrieval_for(&enc, "# # # #");
        let specs = vec![enc, ret];

        write_trial_specs(&path, &specs).unwrap();
        assert_eq!(load_trial_specs(&path).unwrap(), specs);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_trial_specs(Path::new("/nonexistent/WMC_99.csv")).unwrap_err();
        assert!(err.to_string().contains("WMC_99.csv"));
    }
}
