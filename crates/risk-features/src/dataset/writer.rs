use super::DatasetError;
use crate::features::FeatureRow;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const OUTPUT_COLUMNS: [&str; 4] = [
    "id",
    "tot_claim_cnt_l180d",
    "disb_bank_loan_wo_tbc",
    "day_sinlastloan",
];

/// Writes the header even when there are no rows.
pub fn write_features<W: Write>(writer: W, rows: &[FeatureRow]) -> Result<(), DatasetError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(OUTPUT_COLUMNS)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Creates `dir` when missing and writes `file_name` inside it.
pub fn write_features_to_dir(
    dir: &Path,
    file_name: &str,
    rows: &[FeatureRow],
) -> Result<PathBuf, DatasetError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        info!(dir = %dir.display(), "output directory created");
    }

    let path = dir.join(file_name);
    let file = std::fs::File::create(&path)?;
    write_features(file, rows)?;

    info!(path = %path.display(), rows = rows.len(), "feature table saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ApplicantFeatures;

    fn render(rows: &[FeatureRow]) -> String {
        let mut buffer = Vec::new();
        write_features(&mut buffer, rows).expect("write succeeds");
        String::from_utf8(buffer).expect("utf-8 output")
    }

    #[test]
    fn writes_header_for_empty_tables() {
        assert_eq!(
            render(&[]),
            "id,tot_claim_cnt_l180d,disb_bank_loan_wo_tbc,day_sinlastloan\n"
        );
    }

    #[test]
    fn writes_sentinels_and_blank_ids() {
        let rows = vec![
            FeatureRow::new(Some(1), ApplicantFeatures::default()),
            FeatureRow::new(
                None,
                ApplicantFeatures {
                    tot_claim_cnt_l180d: 2,
                    disb_bank_loan_wo_tbc: 1250.75,
                    day_sinlastloan: 10,
                },
            ),
        ];

        assert_eq!(
            render(&rows),
            "id,tot_claim_cnt_l180d,disb_bank_loan_wo_tbc,day_sinlastloan\n\
1,-3,-1,-1\n\
,2,1250.75,10\n"
        );
    }

    #[test]
    fn creates_missing_output_directory() {
        let root = tempfile::tempdir().expect("temp dir");
        let dir = root.path().join("nested").join("out");

        let path = write_features_to_dir(
            &dir,
            "features.csv",
            &[FeatureRow::new(Some(4), ApplicantFeatures::default())],
        )
        .expect("write succeeds");

        assert_eq!(path, dir.join("features.csv"));
        let written = std::fs::read_to_string(path).expect("file readable");
        assert!(written.ends_with("4,-3,-1,-1\n"));
    }
}
