use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use cartograph::cache::AnalysisCache;
use cartograph::config::{
    AnalyzerConfig, DEFAULT_CACHE_MAX_BYTES, DEFAULT_CACHE_TTL_SECS,
};
use cartograph::core::{graph, AnalysisEvent, AnalysisRequest, GraphBuilder, RepoAnalyzer};
use cartograph::fetch::FetchStrategy;

#[derive(Debug, Parser)]
#[command(
    name = "cartograph",
    version,
    about = "Component dependency graphs for modern web app repositories"
)]
struct Cli {
    /// Cache directory override (defaults to CARTOGRAPH_CACHE_DIR or a
    /// per-user temp location)
    #[arg(long, global = true, value_name = "PATH")]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze a repository and stream discovery events
    Analyze {
        /// Repository location: owner/name, owner/name@branch, or a GitHub URL
        repo: String,

        /// Branch to analyze when the location does not pin one
        #[arg(short, long, default_value = "main")]
        branch: String,

        /// List every tree entry instead of only structurally relevant files
        #[arg(long)]
        all_files: bool,

        /// How repository contents are acquired
        #[arg(long, value_enum, default_value_t = StrategyArg::Api)]
        strategy: StrategyArg,

        /// Output format for the event stream
        #[arg(short, long, value_enum, default_value_t = Format::Ndjson)]
        format: Format,
    },
    /// Inspect or clear the analysis cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Debug, Subcommand)]
enum CacheAction {
    /// Print record count, total bytes, and capture timestamps
    Stats,
    /// Delete every cached record
    Clear,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum StrategyArg {
    /// Remote tree listing plus per-file fetches
    Api,
    /// Shallow clone into a scratch directory
    Workdir,
}

impl From<StrategyArg> for FetchStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Api => FetchStrategy::Api,
            StrategyArg::Workdir => FetchStrategy::Workdir,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum Format {
    /// One JSON event per line, as they stream
    Ndjson,
    /// Human-readable progress and summary
    Summary,
    /// DOT rendering of the final dependency graph
    Dot,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Analyze {
            repo,
            branch,
            all_files,
            strategy,
            format,
        } => {
            let config = AnalyzerConfig {
                strategy: strategy.into(),
                cache_dir: cli.cache_dir,
                ..AnalyzerConfig::default()
            }
            .with_env();
            analyze(repo, branch, all_files, format, config).await
        }
        Command::Cache { action } => {
            let config = AnalyzerConfig {
                cache_dir: cli.cache_dir,
                ..AnalyzerConfig::default()
            }
            .with_env();
            let cache = AnalysisCache::new(
                config.resolved_cache_dir(),
                DEFAULT_CACHE_TTL_SECS,
                DEFAULT_CACHE_MAX_BYTES,
            );
            match action {
                CacheAction::Stats => {
                    let stats = cache.stats();
                    println!("Records: {}", stats.count);
                    println!("Total bytes: {}", stats.total_bytes);
                    match (stats.oldest, stats.newest) {
                        (Some(oldest), Some(newest)) => {
                            println!("Oldest capture: {oldest} (unix)");
                            println!("Newest capture: {newest} (unix)");
                        }
                        _ => println!("No capture timestamps recorded"),
                    }
                }
                CacheAction::Clear => {
                    cache.clear();
                    println!("Cache cleared");
                }
            }
            Ok(())
        }
    }
}

async fn analyze(
    repo: String,
    branch: String,
    all_files: bool,
    format: Format,
    config: AnalyzerConfig,
) -> Result<()> {
    let analyzer = RepoAnalyzer::new(config);
    let request = AnalysisRequest::new(&repo)
        .with_branch(&branch)
        .with_include_all(all_files);

    let (tx, mut rx) = mpsc::channel(64);
    let pipeline = tokio::spawn(async move { analyzer.analyze(request, tx).await });

    let mut failed: Option<String> = None;
    while let Some(event) = rx.recv().await {
        match format {
            Format::Ndjson => println!("{}", serde_json::to_string(&event)?),
            Format::Summary => print_summary_line(&event),
            Format::Dot => {
                if let AnalysisEvent::Complete { entities, .. } = &event {
                    let dependency_graph = GraphBuilder::from_entities(entities);
                    print!("{}", graph::to_dot(&dependency_graph));
                }
            }
        }
        if let AnalysisEvent::Error { message } = event {
            failed = Some(message);
        }
    }
    pipeline.await?;

    if let Some(message) = failed {
        anyhow::bail!("analysis failed: {message}");
    }
    Ok(())
}

fn print_summary_line(event: &AnalysisEvent) {
    match event {
        AnalysisEvent::Status { message } => println!("{message}"),
        AnalysisEvent::Files { files, repo } => {
            println!("{repo}: {} files listed", files.len());
        }
        AnalysisEvent::Progress {
            current,
            total,
            path,
        } => println!("[{current}/{total}] {path}"),
        AnalysisEvent::Component { entity } => {
            println!("  + {} ({})", entity.name, entity.role.as_str());
        }
        AnalysisEvent::Complete {
            entities,
            total_files,
            analyzed_files,
            from_cache,
        } => {
            println!(
                "Done: {} entities from {analyzed_files}/{total_files} files{}",
                entities.len(),
                if *from_cache { " (cached)" } else { "" }
            );
        }
        AnalysisEvent::Error { message } => println!("Error: {message}"),
    }
}
