use std::path::{Path, PathBuf};

/// Name of the copied spectra directory under the output directory
pub const SPECTRA_DIR_NAME: &str = "spectra";

/// Name of the sample report under the output directory
pub const REPORT_NAME: &str = "sample_data.tsv";

/// Context tag of analytes used for identification
pub const DEFAULT_ID_CONTEXT: &str = "id";

/// Config
///
/// Configuration info for the program
/// This is generated from the command line arguments
/// Once set it is read only
///
/// sample_sheet - tab delimited sample sheet
/// spectra_dir - directory with one sub-directory per MALDI-TOF run
/// output_dir - existing directory for copied spectra and the report
/// id_context - analyte context used for identification spectra
///
pub struct Config {
    sample_sheet: PathBuf,
    spectra_dir: PathBuf,
    output_dir: PathBuf,
    id_context: String,
}

impl Config {
    pub fn new(sample_sheet: PathBuf, spectra_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            sample_sheet,
            spectra_dir,
            output_dir,
            id_context: DEFAULT_ID_CONTEXT.to_owned(),
        }
    }

    pub fn set_id_context(&mut self, s: String) {
        self.id_context = s
    }

    pub fn sample_sheet(&self) -> &Path {
        &self.sample_sheet
    }

    pub fn spectra_dir(&self) -> &Path {
        &self.spectra_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn id_context(&self) -> &str {
        &self.id_context
    }

    pub fn output_spectra_dir(&self) -> PathBuf {
        self.output_dir.join(SPECTRA_DIR_NAME)
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_NAME)
    }
}
