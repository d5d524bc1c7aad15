use std::{
    fs,
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::{
    error::{MatchError, MatchResult},
    join::JoinedRow,
};

pub const REPORT_HEADER: [&str; 4] = ["sample_id", "wgs_species", "spectrum_uid", "filepath"];

/// Write tab separated table of sample, species, spectrum and spectrum location.
/// Values are written as is (no quoting or escaping)
pub fn write_report<W: Write>(wrt: &mut W, rows: &[JoinedRow]) -> io::Result<()> {
    writeln!(wrt, "{}", REPORT_HEADER.join("\t"))?;
    for r in rows {
        writeln!(
            wrt,
            "{}\t{}\t{}\t{}",
            r.sample_id, r.wgs_species, r.spectrum_uid, r.filepath
        )?
    }
    Ok(())
}

pub fn output_report(opath: &Path, rows: &[JoinedRow]) -> MatchResult<()> {
    debug!("Writing sample data for {} samples to {}", rows.len(), opath.display());
    let mut wrt = BufWriter::new(fs::File::create(opath).map_err(|e| MatchError::io(opath, e))?);
    write_report(&mut wrt, rows)
        .and_then(|_| wrt.flush())
        .map_err(|e| MatchError::io(opath, e))
}
