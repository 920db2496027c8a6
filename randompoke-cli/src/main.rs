mod reports;
mod source;
mod store;
mod util;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write, stdin, stdout};
use std::path::PathBuf;

use randompoke_core::{
    GenerationOptions, Generator, LoadedOptions, PokemonType, Region, parse_query,
};
use reports::{
    BatchReport, OptionsReport, RecordLine, ReportFormat, write_batch_report,
    write_options_report, write_vault_report,
};
use source::DirectoryCatalogSource;
use store::JsonFileStore;
use util::{entropy_seed, parse_csv_set};

type CliGenerator = Generator<DirectoryCatalogSource, JsonFileStore>;

#[derive(Debug, Parser)]
#[command(name = "randompoke", version)]
#[command(about = "Generate random Pokémon from a local dex directory")]
struct Args {
    /// Directory holding the catalog documents (all.json, kanto.json, ...)
    #[arg(long, default_value = "dex")]
    dex: PathBuf,

    /// State file standing in for browser storage (saved options and shiny vault)
    #[arg(long, default_value = "randompoke-state.json", conflicts_with = "ephemeral")]
    state: PathBuf,

    /// Keep state in memory only
    #[arg(long)]
    ephemeral: bool,

    /// RNG seed for reproducible batches
    #[arg(long)]
    seed: Option<u64>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate one or more batches and print the displayed one
    Generate {
        /// Share query to take options from (e.g. "regions=kanto&n=3")
        #[arg(long)]
        query: Option<String>,

        /// Batch size override
        #[arg(long)]
        n: Option<u32>,

        /// Regions override (comma-separated, or "all")
        #[arg(long)]
        regions: Option<String>,

        /// Types override (comma-separated, or "all")
        #[arg(long)]
        types: Option<String>,

        /// Number of batches to generate
        #[arg(long, default_value_t = 1)]
        repeat: usize,

        /// Step this many batches back through history before printing
        #[arg(long, default_value_t = 0)]
        older: usize,
    },
    /// List the shiny vault
    Vault {
        /// Remove every vaulted shiny
        #[arg(long)]
        clear: bool,

        /// Skip the confirmation prompt when clearing
        #[arg(long)]
        yes: bool,
    },
    /// Print the resolved options and their share query
    Options {
        /// Share query to resolve instead of the saved options
        #[arg(long)]
        query: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if matches!(args.report, ReportFormat::Console) {
        announce_banner();
    }

    let seed = args.seed.unwrap_or_else(entropy_seed);
    let store = if args.ephemeral {
        JsonFileStore::ephemeral()
    } else {
        JsonFileStore::open(&args.state)
    };
    let mut generator = Generator::new(DirectoryCatalogSource::new(&args.dex), store, seed);
    if args.verbose {
        println!(
            "📂 dex: {} · state: {} · seed: {seed}",
            generator.source().root().display(),
            generator
                .store()
                .path()
                .map_or_else(|| "(memory)".to_string(), |p| p.display().to_string())
        );
    }

    let mut output_target = OutputTarget::new(args.output.clone())?;
    match &args.command {
        Command::Generate {
            query,
            n,
            regions,
            types,
            repeat,
            older,
        } => {
            check_query(query.as_deref())?;
            let loaded = generator.load_options(query.as_deref());
            let options = apply_overrides(
                loaded.options.clone(),
                *n,
                regions.as_deref(),
                types.as_deref(),
            )?;
            let report = run_generate(&mut generator, &loaded, options, *repeat, *older).await?;
            write_batch_report(output_target.writer(), args.report, &report)?;
        }
        Command::Vault { clear, yes } => {
            if *clear {
                if !*yes && !confirm("Clear every shiny from the vault?")? {
                    bail!("vault not cleared");
                }
                generator.clear_vault();
            }
            let lines: Vec<RecordLine> = generator.vault().iter().map(RecordLine::from).collect();
            write_vault_report(output_target.writer(), args.report, &lines)?;
        }
        Command::Options { query } => {
            check_query(query.as_deref())?;
            let loaded = generator.load_options(query.as_deref());
            write_options_report(
                output_target.writer(),
                args.report,
                &OptionsReport::from(&loaded),
            )?;
        }
    }
    output_target.flush_inner()?;
    Ok(())
}

fn announce_banner() {
    println!("{}", "🎲 Randompoke".bright_cyan().bold());
    println!("{}", "=============".cyan());
}

/// Reject a share query whose lists have no usable value, as the flags do.
fn check_query(query: Option<&str>) -> Result<()> {
    if let Some(query) = query {
        let parsed = parse_query(query);
        if !parsed.rejected.is_empty() {
            bail!("invalid --query: no known values for {}", parsed.rejected.join(", "));
        }
    }
    Ok(())
}

fn apply_overrides(
    mut options: GenerationOptions,
    n: Option<u32>,
    regions: Option<&str>,
    types: Option<&str>,
) -> Result<GenerationOptions> {
    if let Some(n) = n {
        if n == 0 {
            bail!("--n must be a positive integer");
        }
        options.n = n;
    }
    if let Some(regions) = regions {
        options.regions = parse_csv_set::<Region>(regions).context("invalid --regions")?;
    }
    if let Some(types) = types {
        options.types = parse_csv_set::<PokemonType>(types).context("invalid --types")?;
    }
    Ok(options)
}

async fn run_generate(
    generator: &mut CliGenerator,
    loaded: &LoadedOptions,
    options: GenerationOptions,
    repeat: usize,
    older: usize,
) -> Result<BatchReport> {
    let share_query = options.clone().sanitized().to_query();
    let dex = generator.source().root().display().to_string();
    for _ in 0..repeat.max(1) {
        generator
            .generate(options.clone(), Utc::now())
            .await
            .with_context(|| format!("failed to generate from {dex}"))?;
    }
    for _ in 0..older {
        if !generator.show_next() {
            break;
        }
    }

    let controls = generator.controls();
    Ok(BatchReport {
        seed: generator.seed(),
        origin: loaded.origin,
        share_query,
        batches_generated: repeat.max(1),
        cursor: controls.cursor,
        history_len: controls.history_len,
        vault_len: controls.vault_len,
        records: generator
            .displayed()
            .unwrap_or_default()
            .iter()
            .map(RecordLine::from)
            .collect(),
    })
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    stdout().flush()?;
    let mut answer = String::new();
    stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}
