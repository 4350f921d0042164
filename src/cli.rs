//! CLI implementation for tsblast

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;

use tsblast::{Analyzer, ImpactAnalysisResult, RiskLevel, SnapshotBuilder};

#[derive(Parser)]
#[command(name = "tsblast")]
#[command(about = "Breaking-change and blast-radius analysis for TypeScript edits")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze an edit: breaking changes, impacted files, affected tests
    Analyze {
        /// The edited file (current content is the "after" side)
        file: PathBuf,
        /// File holding the "before" content
        #[arg(long)]
        before: PathBuf,
        /// Workspace root (defaults to the current directory)
        #[arg(long)]
        root: Option<PathBuf>,
        /// Explicit tsconfig.json (discovered by walking upward otherwise)
        #[arg(long)]
        tsconfig: Option<PathBuf>,
        /// Machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Print a module's export snapshot as JSON
    Snapshot {
        file: PathBuf,
    },
    /// Extract changed line numbers from a unified diff (file or stdin)
    DiffLines {
        /// Diff file; reads stdin when omitted
        file: Option<PathBuf>,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            file,
            before,
            root,
            tsconfig,
            json,
        } => analyze(file, before, root, tsconfig, json),
        Commands::Snapshot { file } => snapshot(file),
        Commands::DiffLines { file } => diff_lines(file),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "tsblast", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn analyze(
    file: PathBuf,
    before_path: PathBuf,
    root: Option<PathBuf>,
    tsconfig: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let root = match root {
        Some(r) => r,
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };
    let after = std::fs::read_to_string(&file)
        .with_context(|| format!("Cannot read {}", file.display()))?;
    let before = std::fs::read_to_string(&before_path)
        .with_context(|| format!("Cannot read {}", before_path.display()))?;

    let analyzer = Analyzer::for_root(&root);
    let report = analyzer.analyze(&file, &before, &after, &root, tsconfig.as_deref());

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display_report(&report);
    }
    Ok(())
}

fn snapshot(file: PathBuf) -> Result<()> {
    let source = std::fs::read_to_string(&file)
        .with_context(|| format!("Cannot read {}", file.display()))?;
    let snapshot = SnapshotBuilder::new().build(&file, &source);
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn diff_lines(file: Option<PathBuf>) -> Result<()> {
    let input = match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Cannot read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Cannot read diff from stdin")?;
            buf
        }
    };
    for line in tsblast::diff_parse::changed_lines(&input) {
        println!("{line}");
    }
    Ok(())
}

fn display_report(report: &ImpactAnalysisResult) {
    if !report.has_actual_changes {
        println!("{}", "No changes detected.".dimmed());
        return;
    }

    let risk = match report.risk_level {
        RiskLevel::High => "high".red().bold(),
        RiskLevel::Medium => "medium".yellow().bold(),
        RiskLevel::Low => "low".green().bold(),
    };
    println!(
        "{}  risk: {}  confidence: {:.2}",
        report.file_path.display().to_string().bold(),
        risk,
        report.confidence
    );

    if !report.breaking_changes.is_empty() {
        println!("\n{}", "Breaking changes:".bold());
        for change in &report.breaking_changes {
            let after = change.after.as_deref().unwrap_or("(removed)");
            println!(
                "  {} {}  {} -> {}",
                change.rule_id.as_str().cyan(),
                change.symbol_name,
                change.before.dimmed(),
                after.dimmed()
            );
            for file in &change.impacted_files {
                println!("    impacts {}", file.display());
            }
        }
    }

    if !report.changed_functions.is_empty() || !report.changed_classes.is_empty() {
        println!("\n{}", "Changed symbols:".bold());
        for name in report
            .changed_functions
            .iter()
            .chain(report.changed_classes.iter())
        {
            println!("  {name}");
        }
    }

    if !report.downstream_components.is_empty() {
        println!("\n{}", "Downstream components:".bold());
        for file in &report.downstream_components {
            println!("  {}", file.display());
        }
    }

    if !report.affected_tests.is_empty() {
        println!(
            "\n{} (~{}s)",
            "Affected tests:".bold(),
            report.estimated_test_time_secs
        );
        for test in &report.affected_tests {
            println!("  {}", test.display());
        }
    }
}
