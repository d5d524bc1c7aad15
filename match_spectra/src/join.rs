use crate::{
    error::{MatchError, MatchResult},
    run_info::AnalyteIndex,
    sample::SampleSheet,
};

/// Sample matched to its spectrum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRow {
    pub sample_id: String,
    pub wgs_species: String,
    pub spectrum_uid: String,
    /// Spectrum location relative to the spectra directory, always '/' separated
    pub filepath: String,
}

/// Convert Windows style path separators to '/'
pub fn normalize_sub_path(s: &str) -> String {
    s.replace('\\', "/")
}

/// Relative location of a spectrum: `<project>/<normalized sub path>`
pub fn spectrum_path(project_uid: &str, sub_path: &str) -> String {
    format!("{}/{}", project_uid, normalize_sub_path(sub_path))
}

/// Match every sample in the sheet (in sheet order) to its identification
/// analyte.  Fails on the first sample without a matching analyte.
pub fn join_samples(sheet: &SampleSheet, index: &AnalyteIndex) -> MatchResult<Vec<JoinedRow>> {
    sheet
        .records()
        .iter()
        .map(|s| -> MatchResult<JoinedRow> {
            let a = index.get(s.sample_id()).ok_or_else(|| MatchError::Join {
                sample_id: s.sample_id().to_owned(),
            })?;
            trace!(
                "Sample {} matched to spectrum {} in project {}",
                s.sample_id(),
                a.spectrum_uid(),
                a.project_uid()
            );
            Ok(JoinedRow {
                sample_id: s.sample_id().to_owned(),
                wgs_species: s.wgs_species().to_owned(),
                spectrum_uid: a.spectrum_uid().to_owned(),
                filepath: spectrum_path(a.project_uid(), a.sub_path()),
            })
        })
        .collect()
}
