use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use logdigest_config::{DigestConfig, RunArgs, load_config};
use logdigest_drivers::{ProcessType, driver_for};
use logdigest_engine::Engine;
use logdigest_error::{ErrorCategory, category_of, precondition};
use logdigest_ids::LibraryType;
use logdigest_logging::{LogLevel, critical};
use logdigest_metadata::SamplesSheet;
use logdigest_ports::ObjectStore;
use logdigest_schema::context::LogSource;
use logdigest_store_aws::{AwsCliStore, AwsCredentials};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Action {
    /// Print the failure and warning lines of every log.
    #[value(name = "print_digest")]
    PrintDigest,
    /// Write the sample digest CSV to stdout.
    #[value(name = "get_csv")]
    GetCsv,
    /// Append library metrics rows to --lib-metrics-csv.
    #[value(name = "get_lib_metrics_csv")]
    GetLibMetricsCsv,
}

#[derive(Parser, Debug)]
#[command(name = "logdigest")]
#[command(about = "Digest sample and library processing logs of one donor.", long_about = None)]
struct Cli {
    action: Action,

    /// "sample" or "library"
    process_type: ProcessType,

    donor_id: String,

    /// Sequencing run id; part of library log names.
    seq_run: String,

    /// "aws", or an absolute directory holding already downloaded logs.
    logs_location: String,

    /// "vN" or "latest" ("latest" needs aws).
    version: String,

    /// Version of BCR/TCR library logs; empty means same as VERSION.
    #[arg(default_value = "")]
    version_ir: String,

    /// Download directory; required with aws, empty otherwise.
    #[arg(default_value = "")]
    working_dir: String,

    /// CSV holding the AWS access key; required with aws, empty otherwise.
    #[arg(default_value = "")]
    s3_access_file: String,

    /// Tool config (YAML, or JSON by extension).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Exported Samples sheet. Overrides the config file.
    #[arg(long)]
    samples_sheet: Option<PathBuf>,

    /// Bucket name. Overrides the config file.
    #[arg(long)]
    bucket: Option<String>,

    /// error, warning, info or debug. Overrides the config file.
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// CSV file library metrics are appended to.
    #[arg(long)]
    lib_metrics_csv: Option<PathBuf>,

    /// Only report these library types (comma-separated GEX,BCR,TCR).
    #[arg(long, value_delimiter = ',')]
    lib_types: Vec<LibraryType>,
}

fn load_settings(cli: &Cli) -> Result<DigestConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DigestConfig::default(),
    };
    if let Some(sheet) = &cli.samples_sheet {
        config.samples_sheet = Some(sheet.clone());
    }
    if let Some(bucket) = &cli.bucket {
        config.bucket = bucket.clone();
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: Cli, config: DigestConfig) -> Result<()> {
    let ctx = RunArgs {
        donor_id: cli.donor_id,
        seq_run: cli.seq_run,
        logs_location: cli.logs_location,
        version: cli.version,
        version_ir: cli.version_ir,
        working_dir: cli.working_dir,
        s3_access_file: cli.s3_access_file,
    }
    .into_context()?;

    if cli.action == Action::GetLibMetricsCsv && cli.lib_metrics_csv.is_none() {
        return Err(precondition("get_lib_metrics_csv needs --lib-metrics-csv").into());
    }
    let sheet_path = config.samples_sheet.as_deref().ok_or_else(|| {
        precondition("no samples sheet given; pass --samples-sheet or set samples_sheet in the config")
    })?;
    let sheet = SamplesSheet::load(sheet_path)?;
    let driver = driver_for(cli.process_type, &ctx.donor_id, &ctx.seq_run, &sheet);

    let store = match &ctx.source {
        LogSource::Remote {
            credentials_file, ..
        } => {
            let credentials = AwsCredentials::load(credentials_file)?;
            Some(AwsCliStore::new(&config.bucket, credentials).with_program(&config.aws_cli))
        }
        LogSource::Local { .. } => None,
    };
    let engine = Engine::new(
        driver.as_ref(),
        store.as_ref().map(|s| s as &dyn ObjectStore),
        &ctx,
    )
    .with_probe_max_version(config.probe_max_version);

    log::info!(
        "digesting {} logs of donor {} from {}",
        cli.process_type,
        ctx.donor_id,
        ctx.source.logs_dir().display()
    );

    match cli.action {
        Action::PrintDigest => {
            let mut out = io::stdout().lock();
            engine.print_digest(&mut out, None)?;
        }
        Action::GetCsv => {
            engine.digest_csv(io::stdout().lock())?;
        }
        Action::GetLibMetricsCsv => {
            let path = cli
                .lib_metrics_csv
                .context("get_lib_metrics_csv needs --lib-metrics-csv")?;
            let lib_types = (!cli.lib_types.is_empty()).then_some(cli.lib_types.as_slice());
            engine.lib_metrics_csv(&path, lib_types)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = load_settings(&cli);

    let level = cli
        .log_level
        .or_else(|| config.as_ref().ok().map(|c| c.log_level))
        .unwrap_or_default();
    if let Err(err) = logdigest_logging::init(level) {
        eprintln!("could not install logger: {err:#}");
    }

    match config.and_then(|c| run(cli, c)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            critical!("Execution failed with the following error:\n{err:?}");
            match category_of(&err) {
                Some(ErrorCategory::Precondition) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}
