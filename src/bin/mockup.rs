use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use mockup::{
    ComposerConfig, ComposerSession, GarmentColor, ImageUploader, ImgbbUploader,
    OfflineUploader, OrderDraft, PointerEvent, RenderMode, ViewSide,
};

#[derive(Parser, Debug)]
#[command(name = "mockup", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the editor view (or the clean export) as a PNG.
    Preview(PreviewArgs),
    /// Save the mockup through the image host and write its descriptor JSON.
    Save(SaveArgs),
}

#[derive(Parser, Debug)]
struct SceneArgs {
    /// Composer config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Design image (PNG or JPEG).
    #[arg(long)]
    design: PathBuf,

    /// JSON array of pointer events to replay before rendering.
    #[arg(long)]
    events: Option<PathBuf>,

    /// Garment color as #RRGGBB.
    #[arg(long)]
    color: Option<GarmentColor>,

    /// Show the back of the garment.
    #[arg(long, default_value_t = false)]
    back: bool,

    /// Longer side of the design in pixels (slider).
    #[arg(long)]
    size: Option<f64>,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Draw the selection outline and resize handle.
    #[arg(long, default_value_t = false)]
    chrome: bool,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct SaveArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Skip the image host and store the mockup inline.
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Output descriptor JSON path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Preview(args) => cmd_preview(args),
        Command::Save(args) => cmd_save(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ComposerConfig> {
    Ok(match path {
        Some(p) => ComposerConfig::from_path(p)?,
        None => {
            let mut cfg = ComposerConfig::default();
            cfg.apply_env_overrides();
            cfg
        }
    })
}

fn build_session(args: &SceneArgs) -> anyhow::Result<ComposerSession> {
    let cfg = load_config(args.config.as_deref())?;
    let mut session = ComposerSession::new(cfg)?;

    let bytes = std::fs::read(&args.design)
        .with_context(|| format!("read design '{}'", args.design.display()))?;
    session.load_design(&bytes, None)?;

    if let Some(color) = args.color {
        session.set_garment_color(color);
    }
    if args.back {
        session.set_view_side(ViewSide::Back);
    }
    if let Some(size) = args.size {
        session.set_design_size(size);
    }
    if let Some(path) = &args.events {
        let f = std::fs::File::open(path)
            .with_context(|| format!("open events '{}'", path.display()))?;
        let events: Vec<PointerEvent> = serde_json::from_reader(std::io::BufReader::new(f))
            .with_context(|| format!("parse events '{}'", path.display()))?;
        session.dispatch(events);
    }
    Ok(session)
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let session = build_session(&args.scene)?;
    let mode = if args.chrome {
        RenderMode::Interactive
    } else {
        RenderMode::Export
    };
    let frame = session
        .render(mode)
        .context("garment base image unavailable; set garmentBase in the config")?;
    let png = frame.encode_png()?;

    ensure_parent(&args.out)?;
    std::fs::write(&args.out, png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_save(args: SaveArgs) -> anyhow::Result<()> {
    let mut session = build_session(&args.scene)?;
    let uploader: Box<dyn ImageUploader> = if args.offline {
        Box::new(OfflineUploader)
    } else {
        match ImgbbUploader::from_config(&session.config().upload) {
            Ok(up) => Box::new(up),
            Err(err) => {
                tracing::warn!(%err, "image host not configured; saving inline");
                Box::new(OfflineUploader)
            }
        }
    };

    let ticket = session.begin_save()?;
    let uploaded = match std::thread::spawn(move || ticket.upload(uploader.as_ref())).join() {
        Ok(uploaded) => uploaded,
        Err(_) => {
            session.abandon_save();
            anyhow::bail!("upload worker panicked");
        }
    };

    let mut draft = OrderDraft::start("cli", "Mockup", 0.0);
    let outcome = session.finish_save(uploaded, &mut draft);
    let descriptor = outcome.descriptor().context("save was discarded")?;

    ensure_parent(&args.out)?;
    let json = serde_json::to_vec_pretty(descriptor)?;
    std::fs::write(&args.out, json)
        .with_context(|| format!("write descriptor '{}'", args.out.display()))?;

    if let Some(notice) = outcome.notice() {
        eprintln!("{notice}");
    }
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
