mod config;
mod export;
mod platform;
mod segment;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};

use platform::PlatformFlags;
use segment::rules::{self, RuleWriter};
use segment::SegmentReport;

#[derive(Parser)]
#[command(name = "segmentify", about = "Segmentation rule generation from crawl URL exports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the latest crawl's URLs from the API and generate the full rule file
    Run {
        /// Organisation name
        org: String,
        /// Project name
        project: String,
        /// Rule file to write
        #[arg(short, long, default_value = config::DEFAULT_OUTPUT_PATH)]
        output: PathBuf,
        /// Where the exported URL list is kept
        #[arg(long, default_value = config::DEFAULT_EXPORT_PATH)]
        export: PathBuf,
    },
    /// Generate the full rule file from an existing URL export
    Segment {
        input: PathBuf,
        output: PathBuf,
    },
    /// Generate first-level folder rules only
    Level1 {
        input: PathBuf,
        output: PathBuf,
    },
    /// Show the URL analysis sections of a rule file
    Audit {
        rules: PathBuf,
        /// Entries shown per section
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            org,
            project,
            output,
            export,
        } => {
            let settings = config::Settings::from_env()?;
            let client = export::ExportClient::new(settings)?;
            println!("Exporting URLs for {}/{}...", org, project);
            let summary = client.export_urls(&org, &project, &export).await?;
            println!(
                "Exported {} URLs from analysis {} ({} pages)",
                summary.urls, summary.analysis, summary.pages
            );
            print_platforms(summary.flags);
            generate_all(&export, &output, summary.flags)
        }
        Commands::Segment { input, output } => {
            let flags = PlatformFlags::scan_file(&input)?;
            print_platforms(flags);
            generate_all(&input, &output, flags)
        }
        Commands::Level1 { input, output } => {
            let mut writer = RuleWriter::new(&output, rules::preamble(Local::now()));
            let report = segment::level1(&input, &mut writer)?;
            print_report(&report);
            println!("\nRules written to {}", output.display());
            Ok(())
        }
        Commands::Audit { rules: path, limit } => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to open rule file {}", path.display()))?;
            let sections = rules::parse_analysis(&text);
            if sections.is_empty() {
                println!("No URL analysis sections found.");
                return Ok(());
            }
            for section in &sections {
                let total: usize = section.entries.iter().map(|e| e.count).sum();
                println!(
                    "\n{} ({} entries, {} URLs)",
                    section.title,
                    section.entries.len(),
                    total
                );
                for e in section.entries.iter().take(limit) {
                    println!("  {:>8}  {}", e.count, e.key);
                }
                if section.entries.len() > limit {
                    println!("  ... {} more", section.entries.len() - limit);
                }
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn generate_all(input: &Path, output: &Path, flags: PlatformFlags) -> anyhow::Result<()> {
    let mut writer = RuleWriter::new(output, rules::preamble(Local::now()));
    let reports = segment::generate(input, &mut writer, flags)?;
    for report in &reports {
        print_report(report);
    }
    println!("\nRules written to {}", output.display());
    Ok(())
}

fn print_platforms(flags: PlatformFlags) {
    if flags.sfcc {
        println!("Salesforce Commerce Cloud detected, SFCC rules will be generated.");
    }
    if flags.shopify {
        println!("Shopify detected.");
    }
}

fn print_report(r: &SegmentReport) {
    println!("\n--- {} ---", r.name);
    println!("URLs scanned: {}", r.records);
    if let Some(t) = r.threshold {
        println!("Largest bucket: {} URLs, threshold: {}", r.largest, t);
    }
    for e in &r.entries {
        println!("{} (URLs: {})", e.key, e.count);
    }
    println!(
        "{} kept, {} excluded of {} distinct",
        r.entries.len(),
        r.excluded,
        r.distinct
    );
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
