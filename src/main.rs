use std::error::Error;
use std::fs;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{info, LevelFilter};

use niinfo::{collect_volume_files, describe_files, BatchOptions, ErrorPolicy, TsvWriter};

/// Describe NIfTI volumes and their JSON sidecars as a TSV table
#[derive(Debug, Parser)]
#[command(version)]
struct App {
    /// NIfTI files or directories containing NIfTI files, directories are
    /// searched recursively
    #[arg(required = true)]
    path: Vec<PathBuf>,

    /// File to write info to, `-` for STDOUT
    #[arg(short, long = "out-tsv", default_value = "-")]
    out_tsv: String,

    /// Run in debug mode, reporting errors with their full cause chain
    #[arg(short = 'D', long)]
    debug: bool,

    /// Skip files that cannot be described instead of stopping at the first
    /// one. Inputs that cannot be found and directories that cannot be
    /// searched still stop the run before any file is described.
    #[arg(short, long)]
    keep_going: bool,

    /// Decode files in parallel
    #[arg(short = 'j', long)]
    parallel: bool,

    /// Log progress details
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

impl App {
    fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else if self.quiet {
            LevelFilter::Error
        } else {
            LevelFilter::Warn
        }
    }

    fn options(&self) -> BatchOptions {
        let policy = if self.keep_going {
            ErrorPolicy::Continue
        } else {
            ErrorPolicy::Abort
        };
        BatchOptions::new(policy, self.parallel)
    }

    fn run(&self) -> Result<bool, Box<dyn Error>> {
        let files = collect_volume_files(self.path.as_slice())?;
        info!("Describing {} files", files.len());
        let report = describe_files(&files, self.options())?;

        let sink: Box<dyn io::Write> = if self.out_tsv == "-" {
            Box::new(io::stdout().lock())
        } else {
            Box::new(fs::File::create(&self.out_tsv)?)
        };
        let mut writer = TsvWriter::new(BufWriter::new(sink));
        writer.write_all(&report.rows)?;
        writer.flush()?;

        for (path, err) in report.failures.iter() {
            eprintln!("{}: {}", path.display(), err);
        }
        Ok(report.is_complete())
    }
}

fn report_error(err: &dyn Error, debug: bool) {
    if debug {
        eprintln!("Error: {err:?}");
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("Caused by: {cause:?}");
            source = cause.source();
        }
    } else {
        eprintln!("{err}");
    }
}

fn main() -> ExitCode {
    let app = App::parse();
    env_logger::Builder::new()
        .filter_level(app.log_level())
        .parse_default_env()
        .init();

    match app.run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            report_error(err.as_ref(), app.debug);
            ExitCode::FAILURE
        }
    }
}
