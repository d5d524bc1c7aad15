use std::{fs, path::Path};

use crate::{
    error::{MatchError, MatchResult},
    join::JoinedRow,
};

/// Create directory (and any missing parents) with mode 0755.
/// Succeeds if the directory already exists.
pub fn create_dir(p: &Path) -> MatchResult<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder
        .create(p)
        .map_err(|e| MatchError::io(p, e))
}

fn copy_mtime(from: &Path, to: &Path) -> MatchResult<()> {
    let mtime = fs::metadata(from)
        .and_then(|m| m.modified())
        .map_err(|e| MatchError::io(from, e))?;
    fs::File::open(to)
        .and_then(|f| f.set_modified(mtime))
        .map_err(|e| MatchError::io(to, e))
}

/// Recursively copy the contents of src into dst, creating dst if needed.
/// Existing files in dst with the same name are overwritten, other files
/// in dst are left alone.  Symbolic links are followed.  Copied files keep
/// the permissions and modification time of the source.
/// Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path) -> MatchResult<usize> {
    create_dir(dst)?;
    let mut n = 0;
    for f in src.read_dir().map_err(|e| MatchError::io(src, e))? {
        let entry = f.map_err(|e| MatchError::io(src, e))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if from.is_dir() {
            n += copy_tree(&from, &to)?;
        } else {
            trace!("Copying {} to {}", from.display(), to.display());
            fs::copy(&from, &to).map_err(|e| MatchError::io(&from, e))?;
            copy_mtime(&from, &to)?;
            n += 1;
        }
    }
    Ok(n)
}

/// Copy the spectrum directory of each joined sample from spectra_dir to
/// the same relative location under out_dir.  Returns the number of files copied
pub fn copy_spectra(spectra_dir: &Path, out_dir: &Path, rows: &[JoinedRow]) -> MatchResult<usize> {
    debug!(
        "Copying spectra from {} to {}",
        spectra_dir.display(),
        out_dir.display()
    );
    create_dir(out_dir)?;

    let n = rows.len();
    let mut files = 0;
    for (i, r) in rows.iter().enumerate() {
        let src = spectra_dir.join(&r.filepath);
        if !src.is_dir() {
            return Err(MatchError::Copy {
                sample_id: r.sample_id.clone(),
                msg: if src.exists() {
                    "is not a directory"
                } else {
                    "does not exist"
                },
                path: src,
            });
        }
        let dst = out_dir.join(&r.filepath);
        let k = copy_tree(&src, &dst)?;
        debug!("{} files copied for sample {}", k, r.sample_id);
        files += k;
        info!("Spectrum {} of {} copied", i + 1, n);
    }
    info!(
        "Copied {} files for {} spectra to {}",
        files,
        n,
        out_dir.display()
    );
    Ok(files)
}
