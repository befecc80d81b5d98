use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vsthumb::jobs::{DEFAULT_BATCH_ROOT, load_batch_sets, load_quick_job};
use vsthumb::render::compositor::{DEFAULT_BASE_IMAGE, DEFAULT_CHARACTER_DIR, DEFAULT_COLOR};
use vsthumb::render::output::DEFAULT_OUTPUT_DIR;

#[derive(Parser, Debug)]
#[command(name = "vsthumb", version, about = "Compose match-up thumbnails")]
struct Cli {
    /// Project root holding `configs/` and `assets/`.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one thumbnail from command line arguments.
    Render(RenderArgs),
    /// Render one thumbnail from a JSON config.
    Quick(QuickArgs),
    /// Render a list of sets into a fresh numbered directory.
    Batch(BatchArgs),
    /// Check that the linked image codecs work.
    Check,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Left-side player name.
    #[arg(long)]
    player1: String,

    /// Right-side player name.
    #[arg(long)]
    player2: String,

    #[arg(long)]
    p1_character: String,

    #[arg(long)]
    p2_character: String,

    #[arg(long, default_value = DEFAULT_COLOR)]
    p1_color: String,

    #[arg(long, default_value = DEFAULT_COLOR)]
    p2_color: String,

    /// Round title; replaces `round_title.text` when that block is enabled.
    #[arg(long)]
    round: String,

    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: String,

    /// Output file name without extension; derived from the inputs when omitted.
    #[arg(long)]
    slug: Option<String>,

    #[arg(long, default_value = DEFAULT_CHARACTER_DIR)]
    character_dir: String,

    /// vs_screen, portraits or stock_icons.
    #[arg(long, default_value = "vs_screen", value_parser = parse_asset_set)]
    character_set: vsthumb::AssetSet,

    /// Base image used when the event config names none.
    #[arg(long, default_value = DEFAULT_BASE_IMAGE)]
    base_image: String,

    /// Also write a `<slug>.json` metadata sidecar.
    #[arg(long)]
    metadata: bool,
}

#[derive(Parser, Debug)]
struct QuickArgs {
    /// Path to the quick config JSON.
    #[arg(long, default_value = "configs/quick_set_thumbnail.json")]
    config: PathBuf,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// JSON array of set objects, or a roster sweep object.
    #[arg(long)]
    sets: PathBuf,

    /// Directory that receives `set_thumbnail_test_<N>`.
    #[arg(long, default_value = DEFAULT_BATCH_ROOT)]
    output_root: PathBuf,

    /// Render at most this many sets.
    #[arg(long)]
    limit: Option<usize>,

    /// Seed for a roster sweep; overrides the file's `seed`.
    #[arg(long)]
    seed: Option<u64>,
}

fn parse_asset_set(s: &str) -> Result<vsthumb::AssetSet, String> {
    vsthumb::AssetSet::parse(s).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vsthumb=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    vsthumb::Capabilities::probe()?;
    match cli.cmd {
        Command::Render(args) => cmd_render(&cli.root, args),
        Command::Quick(args) => cmd_quick(&cli.root, args),
        Command::Batch(args) => cmd_batch(&cli.root, args),
        Command::Check => cmd_check(),
    }
}

fn cmd_render(root: &Path, args: RenderArgs) -> anyhow::Result<()> {
    let job = vsthumb::RenderJob {
        request: vsthumb::ThumbnailRequest {
            player1: args.player1,
            player2: args.player2,
            p1_character: args.p1_character,
            p2_character: args.p2_character,
            p1_color: args.p1_color,
            p2_color: args.p2_color,
            round: args.round,
            character_set: args.character_set,
        },
        slug: args.slug,
        output_dir: Some(args.output_dir),
        character_dir: Some(args.character_dir),
        base_image: Some(args.base_image),
        metadata: args.metadata,
    };
    let mut engine = vsthumb::TextEngine::new();
    let saved = vsthumb::run_job(root, &job, &mut engine)?;
    println!("ok: wrote thumbnail to {}", saved.image.display());
    if let Some(meta) = saved.metadata {
        println!("ok: wrote metadata to {}", meta.display());
    }
    Ok(())
}

fn cmd_quick(root: &Path, args: QuickArgs) -> anyhow::Result<()> {
    let job = load_quick_job(root, &args.config)?;
    let mut engine = vsthumb::TextEngine::new();
    let saved = vsthumb::run_job(root, &job, &mut engine)?;
    println!("ok: wrote thumbnail to {}", saved.image.display());
    Ok(())
}

fn cmd_batch(root: &Path, args: BatchArgs) -> anyhow::Result<()> {
    let sets_path = root.join(&args.sets);
    let sets = load_batch_sets(root, &sets_path, args.limit, args.seed)?;
    let mut engine = vsthumb::TextEngine::new();
    let report = vsthumb::run_batch(root, &sets, &root.join(&args.output_root), &mut engine)?;
    println!(
        "ok: wrote {} thumbnail(s) to {}",
        report.rendered.len(),
        report.output_dir.display()
    );
    if report.failures > 0 {
        anyhow::bail!("{} set(s) failed", report.failures);
    }
    Ok(())
}

fn cmd_check() -> anyhow::Result<()> {
    let caps = vsthumb::Capabilities::probe()?;
    println!("{}", serde_json::to_string_pretty(&caps)?);
    Ok(())
}
