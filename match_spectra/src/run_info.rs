//! Indexing of MALDI-TOF run descriptions
//!
//! Each run directory below the spectra directory holds a `runInfo.json`
//! describing the project and the analytes measured in the run.  Only
//! analytes measured for identification are indexed.

use std::{
    collections::{hash_map::Entry, HashMap},
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Deserialize;

use crate::error::{MatchError, MatchResult};

pub const RUN_INFO_NAME: &str = "runInfo.json";

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RunInfo {
    project_uid: String,
    analytes: Vec<RawAnalyte>,
}

/// Analyte entry as found in the file.  Entries that are not used for
/// identification do not have to carry the spectrum fields.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawAnalyte {
    context: String,
    analyte_id: Option<String>,
    spectrum_uid: Option<String>,
    sub_path: Option<String>,
}

/// Identification analyte from a run, with the project of the run attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyteRecord {
    analyte_id: String,
    spectrum_uid: String,
    sub_path: String,
    project_uid: Arc<str>,
}

impl AnalyteRecord {
    #[cfg(test)]
    pub fn new(analyte_id: &str, spectrum_uid: &str, sub_path: &str, project_uid: &str) -> Self {
        Self {
            analyte_id: analyte_id.to_owned(),
            spectrum_uid: spectrum_uid.to_owned(),
            sub_path: sub_path.to_owned(),
            project_uid: Arc::from(project_uid),
        }
    }

    pub fn spectrum_uid(&self) -> &str {
        &self.spectrum_uid
    }

    /// Sub path as recorded by the instrument (separators not normalized)
    pub fn sub_path(&self) -> &str {
        &self.sub_path
    }

    pub fn project_uid(&self) -> &str {
        &self.project_uid
    }
}

/// Look up from analyte id to analyte record.  Built once, read only afterwards.
#[derive(Debug, Default)]
pub struct AnalyteIndex {
    analytes: HashMap<String, AnalyteRecord>,
}

impl AnalyteIndex {
    pub fn get(&self, analyte_id: &str) -> Option<&AnalyteRecord> {
        self.analytes.get(analyte_id)
    }

    pub fn len(&self) -> usize {
        self.analytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analytes.is_empty()
    }

    /// Insert record, replacing any earlier record with the same analyte id
    pub fn insert(&mut self, rec: AnalyteRecord) {
        match self.analytes.entry(rec.analyte_id.clone()) {
            Entry::Occupied(mut e) => {
                debug!(
                    "Analyte {} from project {} replaces entry from project {}",
                    rec.analyte_id,
                    rec.project_uid,
                    e.get().project_uid
                );
                e.insert(rec);
            }
            Entry::Vacant(e) => {
                e.insert(rec);
            }
        }
    }
}

/// Find `runInfo.json` files one level below dir.
/// The paths are returned in sorted order so that duplicate analyte ids are
/// always resolved the same way.
pub fn find_run_info_files(dir: &Path) -> MatchResult<Vec<PathBuf>> {
    let mut v = Vec::new();
    for f in dir.read_dir().map_err(|e| MatchError::io(dir, e))? {
        let entry = f.map_err(|e| MatchError::io(dir, e))?;
        let path = entry.path().join(RUN_INFO_NAME);
        if path.is_file() {
            trace!("Found run info file {}", path.display());
            v.push(path)
        }
    }
    v.sort_unstable();
    Ok(v)
}

/// Add the identification analytes from one run info file to the index.
/// Returns the number of analytes added and skipped
pub fn add_run_info_file(
    path: &Path,
    id_context: &str,
    index: &mut AnalyteIndex,
) -> MatchResult<(usize, usize)> {
    trace!("Reading run info from {}", path.display());
    let s = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::InvalidData => MatchError::malformed(path, "file is not valid UTF-8"),
        _ => MatchError::io(path, e),
    })?;
    add_run_info(&s, path, id_context, index)
}

fn add_run_info(
    s: &str,
    path: &Path,
    id_context: &str,
    index: &mut AnalyteIndex,
) -> MatchResult<(usize, usize)> {
    let run: RunInfo =
        serde_json::from_str(s).map_err(|e| MatchError::malformed(path, e.to_string()))?;

    let project_uid: Arc<str> = Arc::from(run.project_uid);
    let (mut added, mut skipped) = (0, 0);
    for (ix, a) in run.analytes.into_iter().enumerate() {
        if a.context != id_context {
            skipped += 1;
            continue;
        }
        let missing = |key: &str| {
            MatchError::malformed(
                path,
                format!("analyte entry {} has no {} field", ix, key),
            )
        };
        let rec = AnalyteRecord {
            analyte_id: a.analyte_id.ok_or_else(|| missing("AnalyteId"))?,
            spectrum_uid: a.spectrum_uid.ok_or_else(|| missing("SpectrumUid"))?,
            sub_path: a.sub_path.ok_or_else(|| missing("SubPath"))?,
            project_uid: project_uid.clone(),
        };
        index.insert(rec);
        added += 1;
    }
    debug!(
        "Project {}: {} identification analytes added, {} other analytes skipped",
        project_uid, added, skipped
    );
    Ok((added, skipped))
}

/// Build the analyte index from all run info files found below dir
pub fn build_analyte_index(dir: &Path, id_context: &str) -> MatchResult<AnalyteIndex> {
    let files = find_run_info_files(dir)?;
    info!(
        "Found {} run info files in {}",
        files.len(),
        dir.display()
    );
    let mut index = AnalyteIndex::default();
    let (mut added, mut skipped) = (0, 0);
    for p in files.iter() {
        let (a, s) = add_run_info_file(p, id_context, &mut index)?;
        added += a;
        skipped += s;
    }
    info!(
        "Indexed {} analytes with context {} ({} entries read, {} other analytes skipped)",
        index.len(),
        id_context,
        added,
        skipped
    );
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_run(root: &Path, run: &str, json: &str) -> PathBuf {
        let d = root.join(run);
        fs::create_dir_all(&d).unwrap();
        let p = d.join(RUN_INFO_NAME);
        fs::write(&p, json).unwrap();
        p
    }

    const RUN1: &str = r#"{
        "ProjectUid": "PRJ1",
        "Instrument": "maldi-1",
        "Analytes": [
            {"AnalyteId": "S1", "Context": "id", "SpectrumUid": "SP001", "SubPath": "run1\\spec"},
            {"AnalyteId": "S2", "Context": "other", "SpectrumUid": "SP002", "SubPath": "run1\\qc"},
            {"Context": "calibration"}
        ]
    }"#;

    #[test]
    fn only_identification_analytes_are_indexed() {
        let mut index = AnalyteIndex::default();
        let (a, s) = add_run_info(RUN1, Path::new("runInfo.json"), "id", &mut index).unwrap();
        assert_eq!((a, s), (1, 2));
        assert_eq!(index.len(), 1);
        let rec = index.get("S1").unwrap();
        assert_eq!(rec.spectrum_uid(), "SP001");
        assert_eq!(rec.sub_path(), "run1\\spec");
        assert_eq!(rec.project_uid(), "PRJ1");
        assert!(index.get("S2").is_none());
    }

    #[test]
    fn context_sentinel_is_exact() {
        let mut index = AnalyteIndex::default();
        add_run_info(RUN1, Path::new("runInfo.json"), "ID", &mut index).unwrap();
        assert!(index.is_empty());
        add_run_info(RUN1, Path::new("runInfo.json"), "other", &mut index).unwrap();
        assert!(index.get("S2").is_some());
    }

    #[test]
    fn missing_keys_are_malformed() {
        let p = Path::new("runInfo.json");
        let mut index = AnalyteIndex::default();
        for json in [
            "not json",
            r#"{"Analytes": []}"#,
            r#"{"ProjectUid": "PRJ1"}"#,
            r#"{"ProjectUid": 3, "Analytes": []}"#,
            r#"{"ProjectUid": "PRJ1", "Analytes": [{"AnalyteId": "S1"}]}"#,
            r#"{"ProjectUid": "PRJ1", "Analytes": [{"AnalyteId": "S1", "Context": "id", "SubPath": "a"}]}"#,
        ] {
            assert!(
                matches!(
                    add_run_info(json, p, "id", &mut index),
                    Err(MatchError::MalformedInput { .. })
                ),
                "{}",
                json
            );
        }
        let e = add_run_info(
            r#"{"ProjectUid": "PRJ1", "Analytes": [{"AnalyteId": "S1", "Context": "id", "SpectrumUid": "SP1"}]}"#,
            p,
            "id",
            &mut index,
        )
        .unwrap_err();
        assert!(e.to_string().contains("SubPath"));
    }

    #[test]
    fn finds_run_info_one_level_down() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_run(root, "b_run", r#"{"ProjectUid": "B", "Analytes": []}"#);
        write_run(root, "a_run", r#"{"ProjectUid": "A", "Analytes": []}"#);
        write_run(root, ".hidden", r#"{"ProjectUid": "H", "Analytes": []}"#);
        write_run(&root.join("c_run"), "nested", r#"{"ProjectUid": "C", "Analytes": []}"#);
        fs::write(root.join(RUN_INFO_NAME), "{}").unwrap();

        let files = find_run_info_files(root).unwrap();
        assert_eq!(
            files,
            vec![
                root.join(".hidden").join(RUN_INFO_NAME),
                root.join("a_run").join(RUN_INFO_NAME),
                root.join("b_run").join(RUN_INFO_NAME)
            ]
        );
    }

    #[test]
    fn later_run_wins_on_duplicate_analyte() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_run(
            root,
            "run2",
            r#"{"ProjectUid": "PRJ2", "Analytes": [
                {"AnalyteId": "S1", "Context": "id", "SpectrumUid": "SP2", "SubPath": "x"}]}"#,
        );
        write_run(
            root,
            "run1",
            r#"{"ProjectUid": "PRJ1", "Analytes": [
                {"AnalyteId": "S1", "Context": "id", "SpectrumUid": "SP1", "SubPath": "x"},
                {"AnalyteId": "S3", "Context": "id", "SpectrumUid": "SP3", "SubPath": "y"}]}"#,
        );
        let index = build_analyte_index(root, "id").unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("S1").unwrap().project_uid(), "PRJ2");
        assert_eq!(index.get("S3").unwrap().spectrum_uid(), "SP3");
    }

    #[test]
    fn bad_run_info_fails_whole_index() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_run(root, "run1", r#"{"ProjectUid": "PRJ1", "Analytes": []}"#);
        let bad = write_run(root, "run2", r#"{"ProjectUid": "PRJ2""#);
        match build_analyte_index(root, "id") {
            Err(MatchError::MalformedInput { path, .. }) => assert_eq!(path, bad),
            _ => panic!("expected malformed input error"),
        }
    }
}
