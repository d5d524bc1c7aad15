use std::{
    collections::HashMap,
    io::{self, BufRead, ErrorKind},
    path::Path,
    sync::Arc,
};

use compress_io::compress::CompressIo;
use utils::get_next_line;

use crate::error::{MatchError, MatchResult};

pub const SAMPLE_ID: &str = "sample_id";
pub const WGS_SPECIES: &str = "wgs_species";

pub type Column = Arc<str>;

/// One row of the sample sheet.  Values are keyed by the column names
/// from the header line, which are shared between all records.
#[derive(Debug)]
pub struct SampleRecord {
    fields: HashMap<Column, String>,
}

impl SampleRecord {
    /// Value of a named column, or None if the sheet has no such column
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }

    pub fn sample_id(&self) -> &str {
        self.field(SAMPLE_ID).unwrap_or_default()
    }

    pub fn wgs_species(&self) -> &str {
        self.field(WGS_SPECIES).unwrap_or_default()
    }
}

/// Sample records in the order they appear in the sheet
#[derive(Debug)]
pub struct SampleSheet {
    columns: Vec<Column>,
    records: Vec<SampleRecord>,
}

impl SampleSheet {
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn records(&self) -> &[SampleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read sample sheet.  The first line gives the column names, which must
/// include `sample_id` and `wgs_species`.  Every following line (including
/// empty lines) must have one field per column.
pub fn read_sample_sheet<P: AsRef<Path>>(fname: P) -> MatchResult<SampleSheet> {
    let fname = fname.as_ref();
    debug!("Reading in sample sheet from {}", fname.display());

    trace!("Opening sample sheet for reading");
    let mut rdr = CompressIo::new()
        .path(fname)
        .bufreader()
        .map_err(|e| MatchError::io(fname, e))?;

    parse_sample_sheet(&mut rdr, fname)
}

fn read_error(fname: &Path, e: io::Error) -> MatchError {
    match e.kind() {
        ErrorKind::InvalidData => MatchError::malformed(fname, "file is not valid UTF-8"),
        _ => MatchError::io(fname, e),
    }
}

fn parse_sample_sheet<R: BufRead>(rdr: &mut R, fname: &Path) -> MatchResult<SampleSheet> {
    let mut buf = String::new();
    let columns = match get_next_line(rdr, &mut buf).map_err(|e| read_error(fname, e))? {
        Some(fields) if !fields.is_empty() => parse_header(&fields, fname)?,
        _ => return Err(MatchError::malformed(fname, "missing header line")),
    };

    let mut line = 1;
    let mut records = Vec::new();

    while let Some(fields) = get_next_line(rdr, &mut buf).map_err(|e| read_error(fname, e))? {
        line += 1;
        if fields.len() != columns.len() {
            return Err(MatchError::malformed(
                fname,
                format!(
                    "line {} has {} fields but the header has {} columns",
                    line,
                    fields.len(),
                    columns.len()
                ),
            ));
        }
        let fields = columns
            .iter()
            .cloned()
            .zip(fields.iter().map(|s| s.to_string()))
            .collect();
        records.push(SampleRecord { fields });
    }

    debug!(
        "Finished reading in {} lines; found {} samples",
        line,
        records.len()
    );

    Ok(SampleSheet { columns, records })
}

fn parse_header(fields: &[&str], fname: &Path) -> MatchResult<Vec<Column>> {
    let mut columns: Vec<Column> = Vec::with_capacity(fields.len());
    for f in fields {
        if columns.iter().any(|c| c.as_ref() == *f) {
            return Err(MatchError::malformed(
                fname,
                format!("duplicate column {} in header", f),
            ));
        }
        columns.push(Arc::from(*f));
    }
    for req in [SAMPLE_ID, WGS_SPECIES] {
        if !columns.iter().any(|c| c.as_ref() == req) {
            return Err(MatchError::malformed(
                fname,
                format!("required column {} missing from header", req),
            ));
        }
    }
    Ok(columns)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs::File;
    use std::io::{Cursor, Write};
    use tempfile::tempdir;

    fn parse(s: &str) -> MatchResult<SampleSheet> {
        parse_sample_sheet(&mut Cursor::new(s), Path::new("samples.tsv"))
    }

    pub(crate) fn sheet_from_str(s: &str) -> SampleSheet {
        parse(s).unwrap()
    }

    #[test]
    fn reads_records_in_order() {
        let sheet =
            parse("sample_id\twgs_species\tplate\nS2\tE.coli\tP1\nS1\tS.aureus\tP2\n").unwrap();
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.columns().len(), 3);
        let ids: Vec<_> = sheet.records().iter().map(|r| r.sample_id()).collect();
        assert_eq!(ids, ["S2", "S1"]);
        assert_eq!(sheet.records()[1].wgs_species(), "S.aureus");
        assert_eq!(sheet.records()[0].field("plate"), Some("P1"));
        assert_eq!(sheet.records()[0].field("well"), None);
    }

    #[test]
    fn header_only_gives_empty_sheet() {
        let sheet = parse("wgs_species\tsample_id\r\n").unwrap();
        assert!(sheet.is_empty());
    }

    #[test]
    fn empty_line_is_malformed() {
        match parse("sample_id\twgs_species\n\nS1\tE.coli\n") {
            Err(MatchError::MalformedInput { msg, .. }) => {
                assert_eq!(msg, "line 2 has 0 fields but the header has 2 columns")
            }
            r => panic!("expected malformed input, got {:?}", r),
        }
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let mut rdr = Cursor::new(b"sample_id\twgs_species\nS1\tE.\xffcoli\n".to_vec());
        match parse_sample_sheet(&mut rdr, Path::new("samples.tsv")) {
            Err(MatchError::MalformedInput { msg, .. }) => assert!(msg.contains("UTF-8")),
            r => panic!("expected malformed input, got {:?}", r),
        }
    }

    #[test]
    fn empty_values_are_kept() {
        let sheet = parse("sample_id\twgs_species\tnote\nS1\t\t\n").unwrap();
        assert_eq!(sheet.records()[0].wgs_species(), "");
        assert_eq!(sheet.records()[0].field("note"), Some(""));
    }

    #[test]
    fn missing_header_is_malformed() {
        assert!(matches!(
            parse(""),
            Err(MatchError::MalformedInput { .. })
        ));
        assert!(matches!(
            parse("\nS1\tE.coli\n"),
            Err(MatchError::MalformedInput { .. })
        ));
    }

    #[test]
    fn required_columns_are_checked() {
        let e = parse("sample_id\tspecies\nS1\tE.coli\n").unwrap_err();
        assert!(e.to_string().contains("wgs_species"));
        let e = parse("sample_id\twgs_species\tsample_id\n").unwrap_err();
        assert!(e.to_string().contains("duplicate column"));
    }

    #[test]
    fn field_count_mismatch_is_malformed() {
        let e = parse("sample_id\twgs_species\nS1\tE.coli\nS2\n").unwrap_err();
        match e {
            MatchError::MalformedInput { msg, .. } => assert!(msg.starts_with("line 3 ")),
            e => panic!("unexpected error {}", e),
        }
        assert!(parse("sample_id\twgs_species\nS1\tE.coli\textra\n").is_err());
    }

    #[test]
    fn reads_sheet_from_file() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("samples.tsv");
        let mut f = File::create(&p).unwrap();
        write!(f, "sample_id\twgs_species\nS1\tE.coli\n").unwrap();
        drop(f);

        let sheet = read_sample_sheet(&p).unwrap();
        assert_eq!(sheet.records()[0].sample_id(), "S1");

        let missing = dir.path().join("missing.tsv");
        assert!(matches!(
            read_sample_sheet(&missing),
            Err(MatchError::Io { .. })
        ));
    }
}
