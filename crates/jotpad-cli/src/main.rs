#![forbid(unsafe_code)]

use std::{fs, path::PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use jotpad_core::{CaretEstimator, Editor, Effect, IncomingFile, MemoryStore, PendingAction};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jotpad", about = "Inspect text and markdown files the way jotpad sees them", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open a file through the editor's checks and print word and character counts.
    Stats {
        /// Path to a `.txt` or `.md` file.
        path: PathBuf,
    },
    /// Print the estimated caret position at a char offset.
    Caret {
        path: PathBuf,
        /// Char offset of the caret; clamped to the end of the text.
        offset: usize,
        #[arg(long, default_value_t = 16.0)]
        font_size: f32,
        /// Width of the editing surface in pixels; without it the estimate
        /// ignores soft wrapping.
        #[arg(long)]
        wrap_width: Option<f32>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Stats { path } => {
            let editor = load(path)?;
            let counts = editor.counts();
            println!("file:  {}", editor.document().filename());
            println!("words: {}", counts.words);
            println!("chars: {}", counts.chars);
            println!("bytes: {}", editor.document().byte_len());
        }
        Command::Caret {
            path,
            offset,
            font_size,
            wrap_width,
        } => {
            let editor = load(path)?;
            let estimator = CaretEstimator::for_font_size(font_size, wrap_width);
            let point = estimator.estimate(editor.document().text(), offset);
            println!("{:.1} {:.1}", point.x, point.y);
        }
    }

    Ok(())
}

fn load(path: PathBuf) -> anyhow::Result<Editor<MemoryStore>> {
    let file = IncomingFile::from_path(&path)
        .with_context(|| format!("failed to inspect {}", path.display()))?;
    if !file.is_text_like() {
        bail!("{} is not a .txt or .md file", path.display());
    }

    let mut editor = Editor::new(MemoryStore::new());
    let Effect::Read(file) = editor.request(PendingAction::Load(file))? else {
        bail!("editor did not ask for a read");
    };

    let text = fs::read_to_string(&path);
    editor
        .finish_load(&file.name, text)
        .with_context(|| format!("failed to open {}", path.display()))?;
    Ok(editor)
}
