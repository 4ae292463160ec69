use clap::{Parser, Subcommand};
use reportcard::cli::{self, OutputFormat, SheetOptions};
use reportcard::error::ReportResult;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reportcard")]
#[command(about = "Grade spreadsheet analysis: subject statistics, class comparison, ranking.")]
#[command(long_about = "ReportCard - Grade spreadsheet analysis
Reads a workbook of student scores, works out which columns hold subjects,
classes and names, and reports per-subject and per-class statistics plus a
student ranking.

INPUT:
  .xlsx .xlsm .xlsb .xls .ods workbooks, or a .csv file (one sheet)
  Headers in English or Persian; Persian digits are read as numbers

COMMANDS:
  sheets    - List sheets with their sizes
  classify  - Show the role detected for each column
  analyze   - Overview, subject stats, class comparison, ranking
  export    - Write the analysis as CSV files or an .xlsx report

EXAMPLES:
  reportcard sheets grades.xlsx
  reportcard analyze grades.xlsx --class 7/1 --top 5
  reportcard analyze grades.xlsx --format json
  reportcard export grades.xlsx report.xlsx
  reportcard export grades.xlsx out/          # students.csv, subjects.csv, ...

VOCABULARY:
  Extra header terms can be supplied as YAML with --vocabulary
  (or REPORTCARD_VOCABULARY):

  mode: extend        # or replace
  subjects: [robotics]
  classes: [cohort]")]
#[command(version)]
struct Cli {
    /// Log classification and normalization details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// YAML file with additional header vocabulary
    #[arg(long, global = true, env = "REPORTCARD_VOCABULARY")]
    vocabulary: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sheets of a workbook
    Sheets {
        /// Workbook or CSV file
        file: PathBuf,
    },

    #[command(long_about = "Show the role detected for each column.

Subject columns are found by header vocabulary first. When no header matches,
columns whose first 10 values are mostly numeric are taken instead.
Class and name columns are found by header, with content fallbacks.")]
    /// Show column roles
    Classify {
        /// Workbook or CSV file
        file: PathBuf,

        /// Sheet to read (defaults to the first sheet)
        #[arg(short, long)]
        sheet: Option<String>,
    },

    /// Analyze student scores
    Analyze {
        /// Workbook or CSV file
        file: PathBuf,

        /// Sheet to read (defaults to the first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Restrict the analysis to one class
        #[arg(short, long)]
        class: Option<String>,

        /// Number of ranked students to print (0 = all)
        #[arg(short, long, default_value_t = 10)]
        top: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    #[command(long_about = "Write the analysis to disk.

An output path ending in .xlsx gets a report workbook (overview, students,
subjects, classes, ranking, and a chart of subject means). Any other path is
treated as a directory and receives UTF-8 CSV files with a byte-order mark.")]
    /// Export the analysis as CSV or an Excel report
    Export {
        /// Workbook or CSV file
        file: PathBuf,

        /// Output .xlsx file or CSV directory
        output: PathBuf,

        /// Sheet to read (defaults to the first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Restrict the export to one class
        #[arg(short, long)]
        class: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "reportcard=debug"
    } else {
        "reportcard=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ReportResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = |sheet: Option<String>| SheetOptions {
        sheet,
        vocabulary: cli.vocabulary.clone(),
    };

    match cli.command {
        Commands::Sheets { file } => cli::sheets(file),

        Commands::Classify { file, sheet } => cli::classify(file, options(sheet)),

        Commands::Analyze {
            file,
            sheet,
            class,
            top,
            format,
        } => cli::analyze(file, options(sheet), class, top, format),

        Commands::Export {
            file,
            output,
            sheet,
            class,
        } => cli::export(file, output, options(sheet), class),
    }
}
