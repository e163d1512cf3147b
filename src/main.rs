use std::{fs, path::PathBuf, process::ExitCode};

use clap::{ArgAction, Parser, ValueEnum};
use koml::{Symbol, Table};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Load a KOML document and print its symbols")]
struct Args {
    /// KOML file to load
    file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Koml)]
    format: Format,

    /// Print only the symbol with this fully qualified name
    #[arg(short, long, value_name = "NAME")]
    get: Option<String>,

    /// Log loader events to stderr (-v for debug, -vv for trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// KOML declarations, one per line
    Koml,
    /// A JSON object of name to value
    Json,
    /// `name (type): value` listing
    Debug,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let source = match fs::read(&args.file) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("koml: {}: {}", args.file.display(), err);
            return ExitCode::from(2);
        }
    };

    let table = match koml::load(&source) {
        Ok(table) => table,
        Err(err) => {
            eprintln!("{}: {}", args.file.display(), err);
            return ExitCode::from(1);
        }
    };

    let output = match &args.get {
        Some(name) => match table.symbol(name) {
            Some(symbol) => render_symbol(symbol, args.format),
            None => {
                eprintln!("koml: no symbol named `{}`", name);
                return ExitCode::from(1);
            }
        },
        None => render_table(&table, args.format),
    };

    match output {
        Ok(text) => {
            println!("{}", text.trim_end());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("koml: {}", err);
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_directive(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn log_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "koml=debug",
        _ => "koml=trace",
    }
}

fn render_table(table: &Table, format: Format) -> serde_json::Result<String> {
    Ok(match format {
        Format::Koml => table.to_string(),
        Format::Json => serde_json::to_string_pretty(table)?,
        Format::Debug => table.describe().to_string(),
    })
}

fn render_symbol(symbol: &Symbol, format: Format) -> serde_json::Result<String> {
    Ok(match format {
        Format::Koml => symbol.to_string(),
        Format::Json => serde_json::to_string_pretty(symbol.value())?,
        Format::Debug => format!("{} ({}): {}", symbol.name(), symbol.typ(), symbol.value()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_selects_loader_events() {
        assert_eq!(log_directive(0), "warn");
        assert_eq!(log_directive(1), "koml=debug");
        assert_eq!(log_directive(2), "koml=trace");
        assert_eq!(log_directive(5), "koml=trace");
    }

    #[test]
    fn verbose_flag_counts() {
        let args = Args::parse_from(["koml", "-vv", "config.koml"]);
        assert_eq!(args.verbose, 2);
        assert_eq!(Args::parse_from(["koml", "config.koml"]).verbose, 0);
    }

    #[test]
    fn directives_parse_as_filters() {
        for verbose in 0..3 {
            assert!(log_directive(verbose).parse::<EnvFilter>().is_ok());
        }
    }
}
