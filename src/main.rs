use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};

use health_profile_pdf::{FontSource, HealthRecord, PageSize, RenderOptions, suggested_filename};

#[derive(Parser)]
#[command(name = "health-profile-pdf")]
#[command(version)]
#[command(about = "Render a patient health record (JSON) as a paginated PDF", long_about = None)]
struct Cli {
    /// Health record JSON, bare or wrapped in a {"success", "data"} envelope
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (defaults to health_profile_<id>.pdf)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// TrueType font for regular text
    #[arg(long, value_name = "PATH", requires = "bold_font")]
    font: Option<PathBuf>,

    /// TrueType font for bold text
    #[arg(long, value_name = "PATH", requires = "font")]
    bold_font: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "a4")]
    page_size: PageSizeArg,

    /// Generation date printed in the footer (YYYY-MM-DD, default today)
    #[arg(long, value_name = "DATE")]
    date: Option<NaiveDate>,

    /// Log phase timings
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PageSizeArg {
    A4,
    Letter,
}

impl From<PageSizeArg> for PageSize {
    fn from(arg: PageSizeArg) -> Self {
        match arg {
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::Letter => PageSize::LETTER,
        }
    }
}

fn run(cli: Cli) -> Result<PathBuf, health_profile_pdf::Error> {
    let mut options = RenderOptions::from_env();
    options.page_size = cli.page_size.into();
    options.generated_on = cli.date;
    if let (Some(regular), Some(bold)) = (cli.font, cli.bold_font) {
        options.fonts = FontSource::Custom { regular, bold };
    }

    let record = HealthRecord::from_json_bytes(&std::fs::read(&cli.input)?)?;
    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(suggested_filename(record.record_id())));
    health_profile_pdf::write_health_profile(&record, &output, &options)?;
    Ok(output)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(output) => {
            println!("{}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
