//! mathcopy CLI - Recover LaTeX source from rendered math in saved web pages

#[cfg(feature = "cli")]
use clap::{ArgAction, Parser, Subcommand};
#[cfg(feature = "cli")]
use mathcopy::{
    normalize, reconstruct_text, Discovery, Document, ExtractError, Extractor, ExtractorConfig,
    Platform, Probe,
};
#[cfg(feature = "cli")]
use serde::Serialize;
#[cfg(feature = "cli")]
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
#[cfg(feature = "cli")]
use std::io::{self, Read};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "mathcopy")]
#[command(version)]
#[command(about = "mathcopy - Recover LaTeX source from KaTeX/MathJax rendered web pages", long_about = None)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Discover rendered math in an HTML page and recover its LaTeX
    Scan {
        /// HTML file (reads from stdin if not provided)
        input: Option<PathBuf>,

        /// Page hostname, selects the platform strategy
        #[arg(long)]
        host: Option<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reconstruct LaTeX from rendered math text
    Reconstruct {
        /// Rendered text, e.g. "ax2+bx+c=0"
        text: String,
    },

    /// Strip delimiters and check that a string looks like math
    Normalize {
        /// Candidate LaTeX
        text: String,
    },

    /// Show the effective configuration and platform
    Info {
        /// Page hostname
        #[arg(long)]
        host: Option<String>,
    },
}

/// One scan result
#[cfg(feature = "cli")]
#[derive(Serialize)]
struct ScanRecord {
    index: usize,
    tag: String,
    classes: String,
    latex: Option<String>,
}

#[cfg(feature = "cli")]
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // html5ever and selectors are noisy at debug level
    let config = simplelog::ConfigBuilder::new()
        .add_filter_ignore_str("html5ever")
        .add_filter_ignore_str("selectors")
        .build();
    if let Err(e) = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("warning: logging unavailable: {}", e);
    }
}

#[cfg(feature = "cli")]
fn load_config(path: Option<&PathBuf>, host: Option<String>) -> Result<ExtractorConfig, ExtractError> {
    let mut config = match path {
        Some(path) => ExtractorConfig::load(path)?,
        None => ExtractorConfig::default(),
    };
    config = config.with_env();
    if let Some(host) = host {
        config.hostname = host;
    }
    config.validate()?;
    Ok(config)
}

#[cfg(feature = "cli")]
fn read_input(path: Option<&PathBuf>) -> io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

#[cfg(feature = "cli")]
fn scan(html: &str, config: ExtractorConfig, json: bool) -> Result<(), ExtractError> {
    let doc = Document::parse(html);
    let extractor = Extractor::new(config);
    let discovery = Discovery::new(extractor.platform(), extractor.config());

    let records: Vec<ScanRecord> = discovery
        .discover(&doc, doc.scan_root())
        .into_iter()
        .enumerate()
        .map(|(index, node)| ScanRecord {
            index,
            tag: node.tag().to_string(),
            classes: node.class_name(),
            latex: extractor.extract(node),
        })
        .collect();

    if json {
        let output = serde_json::to_string_pretty(&records).map_err(|e| ExtractError::Io {
            message: e.to_string(),
        })?;
        println!("{}", output);
        return Ok(());
    }

    if records.is_empty() {
        eprintln!("No math found");
    }
    for record in &records {
        let element = if record.classes.is_empty() {
            record.tag.clone()
        } else {
            format!("{}.{}", record.tag, record.classes.replace(' ', "."))
        };
        match &record.latex {
            Some(latex) => println!("[{}] {}\t{}", record.index, element, latex),
            None => println!("[{}] {}\t(no LaTeX recovered)", record.index, element),
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn run(cli: Cli) -> Result<(), ExtractError> {
    match cli.command {
        Commands::Scan { input, host, json } => {
            let config = load_config(cli.config.as_ref(), host)?;
            let html = read_input(input.as_ref())?;
            scan(&html, config, json)
        }

        Commands::Reconstruct { text } => {
            match reconstruct_text(&text) {
                Some(latex) => println!("{}", latex),
                None => {
                    eprintln!("Could not reconstruct LaTeX");
                    std::process::exit(1);
                }
            }
            Ok(())
        }

        Commands::Normalize { text } => {
            match normalize(Some(&text)) {
                Some(latex) => println!("{}", latex),
                None => {
                    eprintln!("Not math");
                    std::process::exit(1);
                }
            }
            Ok(())
        }

        Commands::Info { host } => {
            let config = load_config(cli.config.as_ref(), host)?;
            let platform = Platform::detect(&config.hostname);
            println!("mathcopy {}", env!("CARGO_PKG_VERSION"));
            println!("Platform: {}", platform);
            println!("Probe steps: {}", Probe::for_platform(platform).step_names().join(", "));
            println!("Selectors: {}", platform.math_selectors().len());
            println!();
            match toml::to_string_pretty(&config) {
                Ok(rendered) => print!("{}", rendered),
                Err(e) => eprintln!("Could not render configuration: {}", e),
            }
            Ok(())
        }
    }
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install mathcopy --features cli");
    eprintln!("  mathcopy scan [FILE] --host HOST");
}
