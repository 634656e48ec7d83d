use std::{io::stdout, path::PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use miette::{IntoDiagnostic, WrapErr};
use rustyline::DefaultEditor;
use simple_calc::{Calculator, graphics::Histogram, stats};

/// A small command-line calculator, with statistics and histogram helpers.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Log more detail to stderr (repeat for more); RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the interactive calculator (the default).
    Calc,
    /// Print the count, mean, median and standard deviation of some numbers.
    Stats {
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<String>,
        #[arg(short, long)]
        label: Option<String>,
        /// Delta degrees of freedom for the standard deviation.
        #[arg(long, default_value_t = 0)]
        ddof: usize,
    },
    /// Draw a histogram marking the mean and median.
    Hist {
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<String>,
        #[arg(short, long, default_value_t = 30)]
        bins: usize,
        #[arg(short, long)]
        label: Option<String>,
        /// Also save the histogram as an SVG image.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> miette::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match args.command.unwrap_or(Commands::Calc) {
        Commands::Calc => {
            let mut editor = DefaultEditor::new()
                .into_diagnostic()
                .wrap_err("starting the line editor failed")?;
            Calculator::new()
                .run(&mut editor, &mut stdout())
                .into_diagnostic()
                .wrap_err("writing to the terminal failed")?;
        }
        Commands::Stats {
            values,
            label,
            ddof,
        } => {
            let data = stats::parse_values(values.as_slice())?;
            print!("{}", stats::pretty_print(&data, label.as_deref(), ddof)?);
        }
        Commands::Hist {
            values,
            bins,
            label,
            output,
        } => {
            let data = stats::parse_values(values.as_slice())?;
            let histogram = Histogram::new(&data, bins)?;
            print!("{}", histogram.render_text(label.as_deref()));
            if let Some(path) = output {
                histogram.save_svg(&path, label.as_deref())?;
                println!("saved {}", path.display());
            }
        }
    }
    Ok(())
}
