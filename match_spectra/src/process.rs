use anyhow::Context;

use crate::{
    config::Config, join::join_samples, materialize::copy_spectra, report::output_report,
    run_info::build_analyte_index, sample::read_sample_sheet,
};

/// Strategy
///
/// Read in the sample sheet and index the identification analytes from
/// all run info files.  Every sample must match an analyte; the join is
/// completed before anything is written so a missing sample leaves the
/// output directory untouched.  The spectra are then copied (merging with
/// any previous output) and finally the sample report is written.
pub fn process_samples(cfg: &Config) -> anyhow::Result<()> {
    info!("Reading sample data");
    let sheet = read_sample_sheet(cfg.sample_sheet())
        .with_context(|| "Error reading sample sheet")?;
    debug!(
        "Sample sheet has {} columns and {} samples",
        sheet.columns().len(),
        sheet.len()
    );

    info!("Reading MALDI-TOF run data");
    let index = build_analyte_index(cfg.spectra_dir(), cfg.id_context())
        .with_context(|| "Error reading run info files")?;
    if index.is_empty() && !sheet.is_empty() {
        warn!(
            "No analytes with context {} found in {}",
            cfg.id_context(),
            cfg.spectra_dir().display()
        );
    }

    let rows = join_samples(&sheet, &index).with_context(|| "Error matching samples to spectra")?;

    info!("Copying spectra to output directory");
    copy_spectra(cfg.spectra_dir(), &cfg.output_spectra_dir(), &rows)
        .with_context(|| "Error copying spectra")?;

    info!("Writing sample data");
    output_report(&cfg.report_path(), &rows).with_context(|| "Error writing sample data")?;
    Ok(())
}
