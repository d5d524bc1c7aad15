use std::path::{Path, PathBuf};

use clap::{
    crate_authors, crate_description, crate_name, crate_version, error::ErrorKind, value_parser,
    Arg, ArgAction, ArgMatches, Command,
};

use utils::{init_log, LogLevel};

use crate::{
    config::{Config, DEFAULT_ID_CONTEXT},
    error::{MatchError, MatchResult},
};

/// Set up definition of command options for clap
fn cli_model() -> Command {
    Command::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .author(crate_authors!())
        .arg(
            Arg::new("timestamp")
                .short('X')
                .long("timestamp")
                .value_parser(value_parser!(stderrlog::Timestamp))
                .value_name("GRANULARITY")
                .default_value("none")
                .help("Prepend log entries with a timestamp"),
        )
        .arg(
            Arg::new("loglevel")
                .short('l')
                .long("loglevel")
                .value_name("LOGLEVEL")
                .value_parser(value_parser!(LogLevel))
                .ignore_case(true)
                .default_value("info")
                .help("Set log level"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .action(ArgAction::SetTrue)
                .long("quiet")
                .conflicts_with("loglevel")
                .help("Silence all output"),
        )
        .arg(
            Arg::new("context")
                .short('c')
                .long("context")
                .value_parser(value_parser!(String))
                .value_name("STRING")
                .default_value(DEFAULT_ID_CONTEXT)
                .help("Set analyte context of identification spectra"),
        )
        .arg(
            Arg::new("sample_sheet")
                .short('s')
                .long("sample-sheet")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .required(true)
                .help("Input sample sheet (tab separated, with sample_id and wgs_species columns)"),
        )
        .arg(
            Arg::new("spectra_dir")
                .short('S')
                .long("spectra-dir")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .required(true)
                .help("Input spectra directory with one sub-directory per run"),
        )
        .arg(
            Arg::new("output_dir")
                .short('o')
                .long("output-dir")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .required(true)
                .help("Output directory (must exist)"),
        )
}

fn check_path(p: &Path, desc: &str, want_dir: bool) -> MatchResult<()> {
    if !p.exists() {
        Err(MatchError::Argument(format!(
            "{} {} does not exist",
            desc,
            p.display()
        )))
    } else if want_dir && !p.is_dir() {
        Err(MatchError::Argument(format!(
            "{} {} is not a directory",
            desc,
            p.display()
        )))
    } else if !want_dir && p.is_dir() {
        Err(MatchError::Argument(format!(
            "{} {} is a directory",
            desc,
            p.display()
        )))
    } else {
        Ok(())
    }
}

/// Build Config from parsed options, checking that the input and
/// output paths exist
fn config_from_matches(m: &ArgMatches) -> MatchResult<Config> {
    let get_path = |id: &str| {
        m.get_one::<PathBuf>(id)
            .cloned()
            .ok_or_else(|| MatchError::Argument(format!("missing required option {}", id)))
    };
    let sample_sheet = get_path("sample_sheet")?;
    let spectra_dir = get_path("spectra_dir")?;
    let output_dir = get_path("output_dir")?;

    check_path(&sample_sheet, "Input file", false)?;
    check_path(&spectra_dir, "Input spectra directory", true)?;
    check_path(&output_dir, "Output directory", true)?;

    let mut cfg = Config::new(sample_sheet, spectra_dir, output_dir);
    if let Some(s) = m.get_one::<String>("context") {
        cfg.set_id_context(s.to_owned())
    }
    Ok(cfg)
}

/// Handle command line options.  Set up Config structure
///
/// Exits with a usage message if the paths given are not valid
pub fn handle_cli() -> anyhow::Result<Config> {
    // Get matches from command line
    let m = cli_model().get_matches();

    // Setup logging
    init_log(&m).map_err(|e| anyhow!("Could not initialize logging: {}", e))?;

    debug!("Processing command line options");

    match config_from_matches(&m) {
        Ok(cfg) => {
            debug!(
                "Sample sheet: {}, spectra directory: {}, output directory: {}",
                cfg.sample_sheet().display(),
                cfg.spectra_dir().display(),
                cfg.output_dir().display()
            );
            Ok(cfg)
        }
        Err(MatchError::Argument(msg)) => cli_model().error(ErrorKind::ValueValidation, msg).exit(),
        Err(e) => Err(e.into()),
    }
}
