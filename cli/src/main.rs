//! unmht CLI - MHT table extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use unmht::{
    decompose_file_with_options, detect_format_from_path, render, DecomposeOptions,
    ExtractOptions, JsonFormat, Unmht,
};

#[derive(Parser)]
#[command(name = "unmht")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Decompose MHT documents and extract their tables to JSON", long_about = None)]
struct Cli {
    /// Input MHT file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output job directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline into a job directory
    Run {
        /// Input MHT file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output job directory
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,

        #[command(flatten)]
        ocr: OcrArgs,
    },

    /// List the MIME parts of a document
    Parts {
        /// Input MHT file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Persist payloads and manifest into this directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Print the manifest as JSON instead of a listing
        #[arg(long)]
        json: bool,
    },

    /// Extract tables as JSON
    Tables {
        /// Input MHT file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Directory for persisted parts (required for OCR, defaults next to the input)
        #[arg(long, value_name = "DIR")]
        dump: Option<PathBuf>,

        /// Number of preceding blocks scanned for table anchors
        #[arg(long, default_value = "3")]
        lookback: usize,

        #[command(flatten)]
        ocr: OcrArgs,
    },

    /// Show document information
    Info {
        /// Input MHT file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(clap::Args)]
struct OcrArgs {
    /// Replace images with text recognized by tesseract
    #[arg(long)]
    ocr: bool,

    /// Tesseract language packs
    #[arg(long, default_value = "chi_sim+eng", env = "UNMHT_OCR_LANG")]
    lang: String,
}

impl OcrArgs {
    fn apply(&self, builder: Unmht) -> Unmht {
        if self.ocr {
            builder.with_ocr(self.lang.clone())
        } else {
            builder
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Run { input, output, ocr }) => cmd_run(&input, output.as_deref(), &ocr),
        Some(Commands::Parts {
            input,
            output,
            json,
        }) => cmd_parts(&input, output.as_deref(), json),
        Some(Commands::Tables {
            input,
            output,
            compact,
            dump,
            lookback,
            ocr,
        }) => cmd_tables(
            &input,
            output.as_deref(),
            compact,
            dump.as_deref(),
            lookback,
            &ocr,
        ),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: run the pipeline if input is provided
            if let Some(input) = cli.input {
                let ocr = OcrArgs {
                    ocr: false,
                    lang: String::new(),
                };
                cmd_run(&input, cli.output.as_deref(), &ocr)
            } else {
                println!("{}", "Usage: unmht <FILE> [OUTPUT]".yellow());
                println!("       unmht --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    PathBuf::from(format!("{}_output", stem))
}

fn cmd_run(
    input: &Path,
    output: Option<&Path>,
    ocr: &OcrArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| default_output_dir(input));
    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message(if ocr.ocr {
        "Decomposing, extracting tables and running OCR..."
    } else {
        "Decomposing and extracting tables..."
    });

    let result = ocr.apply(Unmht::new()).run_job(input, &output_dir)?;
    pb.finish_with_message("Done!");

    let diagnostics = &result.diagnostics;
    println!(
        "\n{} {} parts, {} tables, {} rows, {} image placeholders",
        "Extracted".green().bold(),
        result.decomposition.part_count(),
        diagnostics.table_count,
        diagnostics.total_rows(),
        diagnostics.img_placeholders
    );

    println!("\n{} {}", "Output files:".green().bold(), output_dir.display());
    println!("  {} structure/manifest.json", "├─".dimmed());
    println!("  {} structure/parts/", "├─".dimmed());
    println!("  {} semantics/tables.json", "├─".dimmed());
    println!("  {} semantics/diagnostics.json", "├─".dimmed());
    println!("  {} semantics/row_payloads.jsonl", "└─".dimmed());

    Ok(())
}

fn cmd_parts(
    input: &Path,
    output: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = DecomposeOptions::new();
    if let Some(dir) = output {
        options = options.with_dump_dir(dir);
    }
    let decomposition = decompose_file_with_options(input, options)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&decomposition.manifest())?
        );
        return Ok(());
    }

    println!(
        "{} {} ({})",
        "Parts of".cyan().bold(),
        input.display(),
        decomposition.root_content_type
    );
    println!("{}", "─".repeat(60).dimmed());
    for part in &decomposition.parts {
        println!(
            "{:>4}  {:<28} {:>10}  {}  {}",
            part.part_index,
            part.content_type,
            part.size_bytes,
            &part.sha256[..10],
            part.filename
        );
    }

    if let Some(dir) = output {
        println!(
            "\n{} {}",
            "Saved to".green(),
            dir.join("manifest.json").display()
        );
    }

    Ok(())
}

fn cmd_tables(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    dump: Option<&Path>,
    lookback: usize,
    ocr: &OcrArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = ocr
        .apply(Unmht::new())
        .with_extract_options(ExtractOptions::new().with_anchor_lookback(lookback));

    let dump_dir = match dump {
        Some(dir) => Some(dir.to_path_buf()),
        None if ocr.ocr => Some(default_output_dir(input).join("structure")),
        None => None,
    };
    if let Some(dir) = dump_dir {
        builder = builder.with_dump_dir(dir);
    }

    let result = builder.process(input)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = result.to_json(format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!(
            "{} {} ({} tables)",
            "Saved to".green(),
            path.display(),
            result.table_count()
        );
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let format = detect_format_from_path(input)?;
    let result = Unmht::new().process(input)?;
    let decomposition = &result.decomposition;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), format);
    println!(
        "{}: {}",
        "MIME-Version".bold(),
        if format.mime_version { "Yes" } else { "No" }
    );
    println!("{}: {}", "Parts".bold(), decomposition.part_count());
    println!("{}: {}", "Images".bold(), decomposition.images().count());
    if let Some(root) = decomposition.root_html() {
        println!(
            "{}: {} ({} bytes)",
            "Root HTML".bold(),
            root.filename,
            root.size_bytes
        );
    }

    println!();
    println!("{}", "Table Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let diagnostics = &result.diagnostics;
    println!("{}: {}", "Tables".bold(), diagnostics.table_count);
    println!("{}: {}", "Rows".bold(), diagnostics.total_rows());
    println!("{}: {}", "Anchored".bold(), diagnostics.anchored_tables());
    println!(
        "{}: {}",
        "Nested tables".bold(),
        diagnostics.totals.nested_tables
    );
    println!(
        "{}: {}",
        "Image placeholders".bold(),
        diagnostics.img_placeholders
    );

    for table in &result.tables {
        println!(
            "  {} T{}: {} x {}  {}",
            "•".dimmed(),
            table.order,
            table.row_count(),
            table.column_count(),
            table.anchor().unwrap_or("-")
        );
    }

    log::debug!(
        "Diagnostics: {}",
        render::to_json(diagnostics, JsonFormat::Compact)?
    );

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "unmht".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("MHT table extraction tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/unmht".dimmed());
    println!("License: MIT");
}
