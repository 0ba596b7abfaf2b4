//! Command line front end for the atpblog drafting tools.
//!
//! `atpblog attach` stages images into a markdown draft and uploads them
//! to a local blob store, rewriting the draft in place the same way the
//! editor does. `atpblog mentions` resolves handle completions against a
//! profile list.

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use atpblog_common::{CachedDirectory, InMemoryDirectory, MentionDirectory, MentionKey, Notifier};
use atpblog_composer::{
    Composer, ComposerConfig, ComposerContext, Effect, IncomingFile, RopeSurface, UploadEvent,
};
use atpblog_uploader::{LocalBlobStore, UploadQueue};

#[derive(Parser)]
#[command(version, about = "Markdown drafting tools for AT Protocol blogs", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Attach images to a draft and upload them to a blob store
    Attach {
        /// Path to the markdown draft (treated as empty when missing)
        draft: PathBuf,

        /// Image files to attach
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Directory the blobs are stored under
        #[arg(long, env = "ATPBLOG_STORE", default_value = "blobs")]
        store: PathBuf,

        /// Write the updated draft here instead of in place
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Look up mention candidates from a profile list
    Mentions {
        /// Partial handle to complete
        query: String,

        /// JSON file holding an array of profiles
        #[arg(long, default_value = "profiles.json")]
        profiles: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_miette();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Attach {
            draft,
            files,
            store,
            out,
        } => attach(draft, files, store, out).await,
        Commands::Mentions { query, profiles } => mentions(query, profiles).await,
    }
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");

    miette::set_panic_hook();
}

/// Routes composer notices to the terminal.
struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&self, message: &str) {
        println!("⚠ {message}");
    }
}

async fn attach(
    draft: PathBuf,
    files: Vec<PathBuf>,
    store: PathBuf,
    out: Option<PathBuf>,
) -> Result<()> {
    let content = match tokio::fs::read_to_string(&draft).await {
        Ok(content) => content,
        Err(error) if error.kind() == ErrorKind::NotFound => String::new(),
        Err(error) => return Err(error).into_diagnostic(),
    };

    let mut composer = Composer::new(
        RopeSurface::from(content),
        ComposerConfig::with_all_commands(),
        ComposerContext::default(),
        StdoutNotifier,
    );

    tracing::debug!(files = files.len(), "staging attachments");

    let mut incoming = Vec::with_capacity(files.len());
    for path in &files {
        let data = tokio::fs::read(path).await.into_diagnostic()?;
        let name = path
            .file_name()
            .and_then(OsStr::to_str)
            .ok_or_else(|| miette::miette!("not a file path: {}", path.display()))?;
        incoming.push(IncomingFile::new(name, content_type_for(path), data));
    }

    composer.attach_files(incoming);

    let jobs: Vec<_> = composer
        .take_effects()
        .into_iter()
        .flat_map(|effect| match effect {
            Effect::StartUploads(jobs) => jobs,
            Effect::FetchMentions(_) => Vec::new(),
        })
        .collect();
    if jobs.is_empty() {
        println!("⚠ Nothing to upload");
        return Ok(());
    }

    println!("→ Storing {} file(s) under {}", jobs.len(), store.display());

    let (queue, mut events) = UploadQueue::spawn(LocalBlobStore::new(store));
    queue.push_batch(jobs).await?;
    drop(queue);

    while let Some(event) = events.recv().await {
        match &event {
            UploadEvent::Started(id) => {
                if let Some(task) = composer.upload_task(*id) {
                    println!("→ Uploading {}", task.file.name);
                }
            }
            UploadEvent::Finished(id, Ok(url)) => {
                if let Some(task) = composer.upload_task(*id) {
                    println!("✓ Stored {} at {url}", task.file.name);
                }
            }
            UploadEvent::Finished(..) => {}
        }
        composer.handle_upload_event(event);
    }

    let target = out.unwrap_or(draft);
    tokio::fs::write(&target, composer.content())
        .await
        .into_diagnostic()?;
    println!(
        "✓ Attached {} image(s), draft written to {}",
        composer.uploaded(),
        target.display()
    );

    Ok(())
}

async fn mentions(query: String, profiles: PathBuf) -> Result<()> {
    let data = tokio::fs::read(&profiles).await.into_diagnostic()?;
    let directory = CachedDirectory::new(InMemoryDirectory::from_json_slice(&data)?);

    let key = MentionKey::new(query.as_str(), None, None);
    let candidates = directory.lookup(&key).await?;
    if candidates.is_empty() {
        println!("⚠ No matches for @{query}");
        return Ok(());
    }

    for profile in candidates {
        match profile.name {
            Some(name) => println!("✓ @{} ({name})", profile.username),
            None => println!("✓ @{}", profile.username),
        }
    }

    Ok(())
}

/// Maps a file extension to the content type declared on the staged file.
fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
