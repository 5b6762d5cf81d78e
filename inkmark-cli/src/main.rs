//! Inkmark CLI - Annotate markdown files from the command line

mod io;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use inkmark_core::codec;
use inkmark_core::offsets::LineIndex;
use inkmark_core::{summarize, AnnotatorConfig, Document, MarkId, SelectionContext, Session};

#[derive(Parser)]
#[command(version, about = "Inkmark - Inline annotations for markdown files", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a config file (defaults to ~/.inkmark/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print clean text, marks and annotations
    Show { file: PathBuf },
    /// Annotate a passage of the file
    Annotate {
        file: PathBuf,

        /// Selected text
        #[arg(long)]
        text: String,

        /// Text immediately before the selection
        #[arg(long, default_value = "")]
        before: String,

        /// Text immediately after the selection
        #[arg(long, default_value = "")]
        after: String,

        /// Note to attach
        #[arg(long)]
        note: String,
    },
    /// Replace the note of an annotation
    Edit { file: PathBuf, id: MarkId, note: String },
    /// Delete an annotation and its mark
    Delete { file: PathBuf, id: MarkId },
    /// Write a snapshot of the file's annotations
    Export {
        file: PathBuf,

        /// Output path (defaults to ~/.inkmark/<name>.json)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Omit the document text
        #[arg(long)]
        simplified: bool,
    },
    /// Print the clean text with highlight spans for a markdown renderer
    Highlight { file: PathBuf },
    /// Restore a file and its annotations from a snapshot
    Import { snapshot: PathBuf, file: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("INKMARK_LOG").unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = io::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Show { file } => show(&file),
        Commands::Annotate {
            file,
            text,
            before,
            after,
            note,
        } => {
            let mut session = open(&file, config)?;
            session.select(&text, SelectionContext::new(before, after));
            let mark = session.confirm(&note, None).context("Failed to annotate")?;
            save(&mut session)?;

            let doc = current(&session)?;
            let (line, col) = LineIndex::new(doc.clean()).position(mark.start());
            println!("Added annotation {} at {}:{}", mark.id, line + 1, col + 1);
            Ok(())
        }
        Commands::Edit { file, id, note } => {
            let mut session = open(&file, config)?;
            session
                .edit_annotation(id, &note)
                .with_context(|| format!("Failed to edit annotation {id}"))?;
            save(&mut session)?;
            println!("Updated annotation {id}");
            Ok(())
        }
        Commands::Delete { file, id } => {
            let mut session = open(&file, config)?;
            if !session.delete_annotation(id) {
                bail!("No annotation with id {id}");
            }
            save(&mut session)?;
            println!("Deleted annotation {id}");
            Ok(())
        }
        Commands::Export {
            file,
            out,
            simplified,
        } => {
            let doc = io::load_file(&file)?;
            let path = io::export_document(&doc, &config, out, simplified)?;
            println!("Exported to {}", path.display());
            Ok(())
        }
        Commands::Highlight { file } => {
            let doc = io::load_file(&file)?;
            print!("{}", codec::highlight(doc.clean(), doc.marks(), &config.highlight_class));
            Ok(())
        }
        Commands::Import { snapshot, file } => import(&snapshot, &file),
    }
}

fn open(file: &Path, config: AnnotatorConfig) -> Result<Session> {
    let doc = io::load_file(file)?;
    let mut session = Session::new(config);
    session.load_document(doc);
    Ok(session)
}

fn current(session: &Session) -> Result<&Document> {
    session.document.as_ref().context("No document loaded")
}

/// Flush the session's pending save to disk
fn save(session: &mut Session) -> Result<()> {
    let Some(snapshot) = session.flush_save() else {
        return Ok(());
    };
    io::save_document(current(session)?, &snapshot)
}

fn show(file: &Path) -> Result<()> {
    let doc = io::load_file(file)?;
    print!("{}", render_show(&doc));
    Ok(())
}

/// Clean text, marks with line:col, then the annotation summary
fn render_show(doc: &Document) -> String {
    let mut out = format!("{}\n", doc.clean());

    if !doc.marks().is_empty() {
        let lines = LineIndex::new(doc.clean());
        out.push_str("\n--- marks ---\n");
        for mark in doc.marks() {
            let (line, col) = lines.position(mark.start());
            let text = mark.text(doc.clean()).unwrap_or_default();
            out.push_str(&format!("[{}] {}:{} {:?}\n", mark.id, line + 1, col + 1, text));
        }
    }

    out.push('\n');
    out.push_str(&summarize(doc));
    out
}

fn import(snapshot: &Path, file: &Path) -> Result<()> {
    let snapshot = io::read_snapshot(snapshot)?;
    let title = file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Untitled".to_string());

    let mut doc = snapshot.clone().into_document(title);
    doc.filepath = Some(file.to_string_lossy().to_string());
    io::save_document(&doc, &snapshot)?;

    println!(
        "Imported {} annotations into {}",
        doc.annotations().len(),
        file.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkmark_core::Snapshot;

    #[test]
    fn test_show_lists_orphaned_annotations() {
        let json = r#"{"annotations": [{"id": 3, "note": "lost"}], "marks": [], "markdown": "no marks left"}"#;
        let doc = Snapshot::from_json(json).unwrap().into_document("notes".to_string());
        let out = render_show(&doc);
        assert!(!out.contains("--- marks ---"));
        assert!(out.contains("**[3] (mark missing)**"));
        assert!(out.contains("- Note: lost"));
    }

    #[test]
    fn test_show_marks_with_positions() {
        let doc = Document::new("notes".to_string(), "one\ntwo <mark_1>three</mark_1>".to_string());
        let out = render_show(&doc);
        assert!(out.contains("[1] 2:5 \"three\""));
        assert!(out.contains("No annotations."));
    }
}
