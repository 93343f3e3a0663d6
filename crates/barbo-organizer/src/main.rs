//! barbo: command-line front end for the bookmark organizer.
//!
//! Works on a bookmark tree stored as JSON (an array of root nodes in the
//! browser's export shape) and keeps metadata in a JSON store under the
//! data directory.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use barbo_analysis::{sort_similar_groups, SimilarSortKey, SortOrder};
use barbo_core::{BookmarkStore, BulkSummary, ImportBundle, OperationOutcome, OrganizerConfig};
use barbo_organizer::Organizer;
use barbo_store::{InMemoryBookmarkStore, JsonFileBackend, MetadataStore};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "barbo")]
#[command(author, version, about = "Find duplicates, review, tag and archive bookmarks")]
#[command(propagate_version = true)]
struct Cli {
    /// Bookmark tree JSON file
    #[arg(short, long, global = true, default_value = "bookmarks.json")]
    tree: PathBuf,

    /// Metadata directory (overrides BARBO_DATA_DIR)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List bookmarks that share a normalized URL
    Duplicates,

    /// List clusters of near-identical URLs
    Similar {
        /// Sort key
        #[arg(long, value_enum, default_value = "similarity")]
        sort: SortArg,

        /// Sort direction
        #[arg(long, value_enum, default_value = "desc")]
        order: OrderArg,
    },

    /// Hide a similar group (given by its exact member ids)
    Dismiss {
        #[arg(required_unless_present = "clear")]
        ids: Vec<String>,

        /// Forget every dismissal instead
        #[arg(long, conflicts_with = "ids")]
        clear: bool,
    },

    /// Pick random bookmarks due for review
    Review {
        /// Batch size (default: from settings)
        #[arg(short, long)]
        count: Option<usize>,

        /// Days before a reviewed bookmark is due again (default: from settings)
        #[arg(short, long)]
        interval: Option<u32>,

        /// Mark these bookmarks as reviewed instead of picking a batch
        #[arg(long, num_args = 1..)]
        keep: Vec<String>,
    },

    /// List bookmarks not opened for a while
    Stale {
        /// Threshold in days (default: from settings)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Suggest tags
    Suggest {
        /// Suggest for a single bookmark, combining the user's own patterns
        #[arg(long)]
        id: Option<String>,

        /// Include bookmarks that already have tags
        #[arg(long)]
        all: bool,

        /// Show per-domain bookmark counts instead
        #[arg(long)]
        domains: bool,
    },

    /// Apply every pending tag suggestion
    ApplySuggestions {
        /// Include bookmarks that already have tags
        #[arg(long)]
        all: bool,
    },

    /// Move bookmarks into the archive folder
    Archive {
        #[arg(required_unless_present = "list")]
        ids: Vec<String>,

        /// List archived bookmarks instead
        #[arg(long)]
        list: bool,
    },

    /// Restore archived bookmarks to their original folders
    Unarchive {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Run the startup maintenance pass
    Maintenance {
        /// Also record a visit to this exact URL
        #[arg(long)]
        visit: Option<String>,
    },

    /// Show collection totals
    Overview,

    /// Export metadata and settings
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include the flattened bookmark list
        #[arg(long)]
        include_bookmarks: bool,
    },

    /// Import metadata and settings from an export file
    Import {
        input: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Similarity,
    Count,
    Title,
    Url,
}

impl From<SortArg> for SimilarSortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Similarity => SimilarSortKey::Similarity,
            SortArg::Count => SimilarSortKey::Count,
            SortArg::Title => SimilarSortKey::Title,
            SortArg::Url => SimilarSortKey::Url,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for SortOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Asc => SortOrder::Asc,
            OrderArg::Desc => SortOrder::Desc,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = OrganizerConfig::from_env();
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    init_tracing(config.json_logs);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays clean for results.
///
/// Environment:
///   LOG_FORMAT - "json" or "text" (default: "text")
///   RUST_LOG   - standard env filter (default: "info")
fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli, config: OrganizerConfig) -> anyhow::Result<()> {
    let tree = Arc::new(
        InMemoryBookmarkStore::from_json_file(&cli.tree)
            .await
            .with_context(|| format!("loading bookmark tree {}", cli.tree.display()))?,
    );
    let backend = JsonFileBackend::new(config.store_path());
    let metadata = Arc::new(MetadataStore::new(Arc::new(backend)));
    let organizer = Organizer::new(tree.clone(), metadata, config.similarity_threshold);

    let sync = organizer.sync();
    let events = tree.events().subscribe();
    let sync_task = tokio::spawn(async move { sync.run(events).await });

    let tree_changed = execute(&organizer, cli.command, cli.json).await?;
    if tree_changed {
        tree.save_json_file(&cli.tree)
            .await
            .with_context(|| format!("saving bookmark tree {}", cli.tree.display()))?;
    }

    // Dropping the last store handle closes the event channel.
    drop(organizer);
    drop(tree);
    let synced = sync_task.await.context("metadata sync task")?;
    info!(synced, "barbo finished");
    Ok(())
}

/// Run one command. Returns whether the bookmark tree was modified.
async fn execute(organizer: &Organizer, command: Commands, json: bool) -> anyhow::Result<bool> {
    let metadata = organizer.metadata_store();

    match command {
        Commands::Duplicates => {
            let groups = organizer.duplicates().await?;
            emit(json, &groups, || {
                for group in &groups {
                    println!("{} ({} copies)", group.normalized_url, group.count);
                    for b in &group.bookmarks {
                        println!("  [{}] {} {}", b.id, b.title, b.url_str());
                    }
                }
                println!(
                    "{} groups, {} redundant",
                    groups.len(),
                    barbo_analysis::redundant_count(&groups)
                );
            })?;
            Ok(false)
        }

        Commands::Similar { sort, order } => {
            let mut groups = organizer.similar_groups().await?;
            sort_similar_groups(&mut groups, sort.into(), order.into());
            emit(json, &groups, || {
                for group in &groups {
                    println!(
                        "{} ({} bookmarks, {}% similar) key={}",
                        group.base_url,
                        group.count,
                        group.average_similarity,
                        group.key()
                    );
                    for b in &group.bookmarks {
                        println!("  [{}] {:.2}% {}", b.record.id, b.similarity, b.record.url_str());
                    }
                }
            })?;
            Ok(false)
        }

        Commands::Dismiss { ids, clear } => {
            if clear {
                metadata.clear_dismissed_groups().await?;
                println!("Cleared dismissed groups");
            } else {
                organizer.dismiss_similar_group(&ids).await?;
                println!("Dismissed {}", barbo_core::group_key(&ids));
            }
            Ok(false)
        }

        Commands::Review {
            count,
            interval,
            keep,
        } => {
            let review = organizer.review();
            if !keep.is_empty() {
                for id in &keep {
                    let meta = review.mark_as_reviewed(id).await?;
                    println!("[{}] reviewed {} time(s)", id, meta.review_count);
                }
                return Ok(false);
            }

            let settings = metadata.settings().await?;
            let count = count.unwrap_or(settings.review_count as usize);
            let interval = interval.unwrap_or(settings.review_interval);
            let batch = review.bookmarks_for_review(count, interval).await?;
            let ops = organizer.operations();
            let mut paths = Vec::with_capacity(batch.len());
            for b in &batch {
                let folder = b.parent_id.as_deref().unwrap_or_default();
                paths.push(ops.bookmark_path(folder).await);
            }
            emit(json, &batch, || {
                for (b, path) in batch.iter().zip(&paths) {
                    println!("[{}] {} {} ({})", b.id, b.title, b.url_str(), path);
                }
            })?;
            Ok(false)
        }

        Commands::Stale { days } => {
            let days = match days {
                Some(days) => days,
                None => metadata.settings().await?.old_bookmark_threshold,
            };
            let stale = organizer.review().stale_bookmarks(days).await?;
            emit(json, &stale, || {
                for s in &stale {
                    println!(
                        "[{}] {} days since last access ({} visits)",
                        s.id, s.days_since_access, s.access_count
                    );
                }
            })?;
            Ok(false)
        }

        Commands::Suggest { id, all, domains } => {
            let tagger = organizer.tagger();
            if domains {
                let stats = tagger.domain_stats().await?;
                emit(json, &stats, || {
                    for d in &stats {
                        println!("{:>5} {}", d.count, d.domain);
                    }
                })?;
            } else if let Some(id) = id {
                let record = organizer.bookmark_store().get(&id).await?.to_record();
                let smart = tagger.smart_suggestions(&record).await?;
                emit(json, &smart, || {
                    println!("recommended: {}", smart.recommended.join(", "));
                    println!("all: {}", smart.all.join(", "));
                })?;
            } else {
                let suggestions = if all {
                    tagger.auto_tag_all().await?
                } else {
                    tagger.auto_tag_untagged().await?
                };
                let stats = tagger.auto_tag_stats().await?;
                emit(json, &suggestions, || {
                    for s in &suggestions {
                        println!(
                            "[{}] {} +{} {}",
                            s.bookmark_id,
                            s.bookmark.title,
                            s.new_tags.join(" +"),
                            s.folder_suggestion
                                .map(|f| format!("-> {}", f))
                                .unwrap_or_default()
                        );
                    }
                    println!(
                        "{} bookmarks, {} tagged, {} with suggestions",
                        stats.total_bookmarks, stats.tagged_bookmarks, stats.can_suggest_tags
                    );
                })?;
            }
            Ok(false)
        }

        Commands::ApplySuggestions { all } => {
            let tagger = organizer.tagger();
            let suggestions = if all {
                tagger.auto_tag_all().await?
            } else {
                tagger.auto_tag_untagged().await?
            };
            let outcomes = tagger.apply_all_suggestions(&suggestions).await?;
            report(json, &outcomes)?;
            Ok(false)
        }

        Commands::Archive { ids, list } => {
            let archive = organizer.archive();
            if list {
                let archived = archive.archived_bookmarks().await?;
                emit(json, &archived, || {
                    for a in &archived {
                        println!(
                            "[{}] {} ({} days ago)",
                            a.record.id, a.record.title, a.days_since_archived
                        );
                    }
                })?;
                return Ok(false);
            }
            let outcomes = archive.archive_many(&ids).await?;
            report(json, &outcomes)?;
            Ok(outcomes.iter().any(|o| o.success))
        }

        Commands::Unarchive { ids } => {
            let archive = organizer.archive();
            let mut outcomes = Vec::with_capacity(ids.len());
            for id in &ids {
                outcomes.push(archive.unarchive(id).await?);
            }
            report(json, &outcomes)?;
            Ok(outcomes.iter().any(|o| o.success))
        }

        Commands::Maintenance { visit } => {
            let maintenance = organizer.maintenance();
            let startup = maintenance.on_startup().await?;
            if let Some(url) = visit {
                let ids = maintenance.record_access_for_url(&url).await?;
                info!(result_count = ids.len(), "Visit recorded");
            }
            emit(json, &startup, || {
                println!("initialized: {}", startup.initialized);
                match startup.cleaned {
                    Some(n) => println!("cleaned: {}", n),
                    None => println!("cleaned: skipped"),
                }
                println!("purged: {}", startup.purged.len());
            })?;
            Ok(!startup.purged.is_empty())
        }

        Commands::Overview => {
            let overview = organizer.overview().await?;
            emit(json, &overview, || {
                println!("bookmarks:       {}", overview.total_bookmarks);
                println!("due for review:  {}", overview.due_for_review);
                println!("duplicates:      {}", overview.duplicate_count);
                println!("similar groups:  {}", overview.similar_groups);
                println!("stale:           {}", overview.stale_bookmarks);
                println!("tags:            {}", overview.tag_count);
                println!("archived:        {}", overview.archived_bookmarks);
                println!("auto-taggable:   {}", overview.auto_taggable);
            })?;
            Ok(false)
        }

        Commands::Export {
            output,
            include_bookmarks,
        } => {
            let bundle = organizer.export(include_bookmarks).await?;
            let data = serde_json::to_string_pretty(&bundle)?;
            match output {
                Some(path) => {
                    write_file(&path, &data).await?;
                    println!("Exported {} records to {}", bundle.metadata.len(), path.display());
                }
                None => println!("{}", data),
            }
            Ok(false)
        }

        Commands::Import { input } => {
            let data = tokio::fs::read_to_string(&input)
                .await
                .with_context(|| format!("reading {}", input.display()))?;
            let bundle: ImportBundle = serde_json::from_str(&data)
                .with_context(|| format!("parsing {}", input.display()))?;
            organizer.import(bundle).await?;
            println!("Imported {}", input.display());
            Ok(false)
        }
    }
}

fn emit<T: Serialize + ?Sized>(json: bool, value: &T, text: impl FnOnce()) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text();
    }
    Ok(())
}

fn report(json: bool, outcomes: &[OperationOutcome]) -> anyhow::Result<()> {
    let summary = BulkSummary::from_outcomes(outcomes);
    emit(json, outcomes, || {
        for o in outcomes {
            match &o.error {
                None => println!("[{}] ok", o.id),
                Some(error) => println!("[{}] failed: {}", o.id, error),
            }
        }
        println!("{} succeeded, {} failed", summary.succeeded, summary.failed);
    })
}

async fn write_file(path: &Path, data: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, data)
        .await
        .with_context(|| format!("writing {}", path.display()))
}
