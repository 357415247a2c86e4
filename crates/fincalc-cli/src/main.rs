mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use env_logger::{Builder, Env};
use std::process;

use commands::dti::DtiArgs;
use commands::mortgage::{AmortizeArgs, BaselineArgs, PayoffArgs};
use commands::retirement::{RetirementArgs, RothIraArgs};

/// Mortgage payoff and retirement growth projections
#[derive(Parser)]
#[command(
    name = "fincalc",
    version,
    about = "Mortgage payoff and retirement growth projections",
    long_about = "A CLI for period-by-period loan amortization with extra payments and \
                  year-by-year retirement account projections, computed with decimal \
                  precision. Set RUST_LOG=debug for diagnostic logging."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Full amortization schedule with an extra-payment policy
    Amortize(AmortizeArgs),
    /// Amortization schedule with no extra payments
    Baseline(BaselineArgs),
    /// Compare an accelerated payoff against the baseline
    Payoff(PayoffArgs),
    /// Year-by-year retirement account projection
    Retirement(RetirementArgs),
    /// Roth IRA contribution plan with limits and summary
    RothIra(RothIraArgs),
    /// Debt-to-income ratios
    Dti(DtiArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Amortize(args) => commands::mortgage::run_amortize(args),
        Commands::Baseline(args) => commands::mortgage::run_baseline(args),
        Commands::Payoff(args) => commands::mortgage::run_payoff(args),
        Commands::Retirement(args) => commands::retirement::run_retirement(args),
        Commands::RothIra(args) => commands::retirement::run_roth_ira(args),
        Commands::Dti(args) => commands::dti::run_dti(args),
        Commands::Version => {
            println!("fincalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
