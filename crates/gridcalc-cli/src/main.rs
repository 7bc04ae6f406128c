//! gridcalc CLI - formula evaluation and CSV sheet calculation

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use gridcalc::formula::registry;
use gridcalc::prelude::*;
use gridcalc::{tokenize, FunctionCategory};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gridcalc")]
#[command(author, version, about = "Spreadsheet formula evaluation tool")]
struct Cli {
    /// Use conventional operator precedence instead of left-to-right evaluation
    #[arg(long, global = true)]
    precedence: bool,

    /// Deepest chain of formula cells followed before reporting #CYCLE!
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Total operator, call and cell nesting allowed in one evaluation
    #[arg(long, global = true)]
    max_recursion: Option<usize>,

    /// CSV field delimiter (default: comma)
    #[arg(short, long, global = true, default_value = ",")]
    delimiter: char,

    /// Log more detail to stderr (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a single formula and print its displayed value
    Eval {
        /// Formula text, e.g. "=SUM(1,2,3)"
        formula: String,

        /// CSV file providing the cells the formula may reference
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Cell the formula is evaluated as (e.g. C3)
        #[arg(long)]
        at: Option<String>,
    },

    /// Print the tokens of a formula, one per line
    Tokens {
        /// Formula text
        formula: String,
    },

    /// List supported function names
    Functions {
        /// Group names by category
        #[arg(long)]
        by_category: bool,
    },

    /// Calculate every formula in a CSV file and write the results as CSV
    #[command(alias = "calc")]
    Sheet {
        /// Input CSV file
        input: PathBuf,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write formula text instead of calculated values
        #[arg(long)]
        formulas: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let evaluator = Evaluator::new(evaluator_options(&cli));
    let delimiter = delimiter_byte(cli.delimiter)?;

    match cli.command {
        Commands::Eval { formula, csv, at } => {
            eval(&formula, csv.as_deref(), at.as_deref(), delimiter, &evaluator)
        }
        Commands::Tokens { formula } => print_tokens(&formula),
        Commands::Functions { by_category } => list_functions(by_category),
        Commands::Sheet {
            input,
            output,
            formulas,
        } => calculate_sheet(&input, output.as_deref(), formulas, delimiter, &evaluator),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn evaluator_options(cli: &Cli) -> EvaluatorOptions {
    let mut options = if cli.precedence {
        EvaluatorOptions::with_precedence()
    } else {
        EvaluatorOptions::default()
    };
    if let Some(depth) = cli.max_depth {
        options.max_depth = depth;
    }
    if let Some(budget) = cli.max_recursion {
        options.max_recursion = budget;
    }
    options
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got '{}'", delimiter);
    }
    Ok(delimiter as u8)
}

fn read_sheet(input: &Path, delimiter: u8) -> Result<Sheet> {
    let options = CsvReadOptions {
        delimiter,
        ..Default::default()
    };
    CsvReader::read_file(input, &options)
        .with_context(|| format!("Failed to read '{}'", input.display()))
}

fn eval(
    formula: &str,
    csv: Option<&Path>,
    at: Option<&str>,
    delimiter: u8,
    evaluator: &Evaluator,
) -> Result<()> {
    let sheet = match csv {
        Some(path) => read_sheet(path, delimiter)?,
        None => Sheet::new("Sheet1"),
    };
    let current = at
        .map(CellCoordinate::parse)
        .transpose()
        .context("Invalid --at cell address")?;

    let value = evaluator.evaluate(formula, &sheet, current);
    tracing::debug!(formula, result = %value, "evaluated");
    println!("{}", value);
    Ok(())
}

fn print_tokens(formula: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    for token in tokenize(formula) {
        writeln!(stdout, "{:?}\t{}", token.kind, token.text)
            .context("Failed to write to stdout")?;
    }
    Ok(())
}

fn list_functions(by_category: bool) -> Result<()> {
    let mut stdout = io::stdout().lock();
    let registry = registry();

    if !by_category {
        for name in registry.names() {
            writeln!(stdout, "{}", name).context("Failed to write to stdout")?;
        }
        return Ok(());
    }

    for category in FunctionCategory::ALL {
        let names = registry.names_in(category);
        if names.is_empty() {
            continue;
        }
        writeln!(stdout, "{} ({})", category, names.len()).context("Failed to write to stdout")?;
        for name in names {
            writeln!(stdout, "  {}", name).context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn calculate_sheet(
    input: &Path,
    output: Option<&Path>,
    formulas: bool,
    delimiter: u8,
    evaluator: &Evaluator,
) -> Result<()> {
    let mut sheet = read_sheet(input, delimiter)?;

    let stats = sheet.calculate_with(evaluator);
    eprintln!(
        "Calculated {} formulas ({} errors, {} unknown functions, {} cycles)",
        stats.formula_count, stats.errors, stats.unknown_functions, stats.cycles
    );

    let options = CsvWriteOptions {
        delimiter,
        write_formulas: formulas,
        ..Default::default()
    };

    match output {
        Some(path) => {
            CsvWriter::write_file(&sheet, path, &options)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            eprintln!("Wrote '{}'", path.display());
        }
        None => {
            CsvWriter::write(&sheet, io::stdout().lock(), &options)
                .context("Failed to write to stdout")?;
        }
    }

    Ok(())
}
