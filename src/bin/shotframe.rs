use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "shotframe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose a template and screenshots into a PNG.
    Render(RenderArgs),
    /// Suggest background colors for a screenshot.
    Palette(PaletteArgs),
    /// List the templates found in a directory.
    Templates(TemplatesArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Template JSON.
    #[arg(long)]
    template: PathBuf,

    /// Desktop capture: path, URL or data URI.
    #[arg(long)]
    desktop: Option<String>,

    /// Mobile capture: path, URL or data URI.
    #[arg(long)]
    mobile: Option<String>,

    /// Title of the captured page.
    #[arg(long)]
    title: Option<String>,

    /// Style JSON.
    #[arg(long)]
    style: Option<PathBuf>,

    /// Text override as `element-id=content`. Repeatable.
    #[arg(long = "text", value_parser = parse_text_override)]
    text: Vec<(String, String)>,

    /// Extra font file to register. Repeatable.
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,

    /// Runtime configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base directory for relative asset references.
    #[arg(long)]
    assets_root: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PaletteArgs {
    /// Image path, URL or data URI.
    #[arg(long)]
    image: String,

    /// Runtime configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print JSON instead of one color per line.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct TemplatesArgs {
    /// Directory holding template JSON files.
    #[arg(long)]
    dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Palette(args) => cmd_palette(args),
        Command::Templates(args) => cmd_templates(args),
    }
}

fn parse_text_override(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((id, content)) if !id.is_empty() => Ok((id.to_owned(), content.to_owned())),
        _ => Err(format!("expected `element-id=content`, got '{s}'")),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<shotframe::ShotframeConfig> {
    let cfg = match path {
        Some(p) => shotframe::ShotframeConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => shotframe::ShotframeConfig::default(),
    };
    Ok(cfg.with_env_overrides())
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("start async runtime")
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(root) = args.assets_root {
        config.assets_root = root;
    }
    config.fonts.extend(args.fonts);

    let template = shotframe::Template::from_path(&args.template)
        .with_context(|| format!("load template '{}'", args.template.display()))?;
    let style = match &args.style {
        Some(p) => {
            let f = std::fs::File::open(p)
                .with_context(|| format!("open style '{}'", p.display()))?;
            shotframe::StyleParams::from_reader(std::io::BufReader::new(f))?
        }
        None => shotframe::StyleParams::default(),
    };

    let captures = shotframe::CaptureSet {
        desktop: args.desktop.as_deref().map(shotframe::AssetSource::parse),
        mobile: args.mobile.as_deref().map(shotframe::AssetSource::parse),
        page_title: args.title,
    };
    let mut input = shotframe::RenderInput::new(Arc::new(template))
        .with_style(style)
        .with_captures(captures);
    for (id, content) in args.text {
        input = input.with_text(id, content);
    }

    let fonts = shotframe::FontBook::from_files(&config.fonts, config.fallback_family.clone())?;
    if fonts.is_empty() && !input.template.elements.is_empty() {
        tracing::warn!("no fonts registered, text elements will be skipped");
    }

    let mut loader = shotframe::AssetLoader::new(
        shotframe::DefaultFetcher::new(&config.assets_root),
        config.asset_cache_capacity,
    );
    let assets = runtime()?.block_on(loader.load(&input));
    for f in assets.failures() {
        eprintln!("warning: {}: {}", f.role, f.error);
    }

    let mut compositor = shotframe::Compositor::new(config.render, fonts);
    let frame = compositor.compose(&shotframe::RenderPass {
        input: &input,
        assets: &assets,
    })?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame
        .save_png(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_palette(args: PaletteArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let loader = shotframe::AssetLoader::new(
        shotframe::DefaultFetcher::new(&config.assets_root),
        config.asset_cache_capacity,
    );
    let source = shotframe::AssetSource::parse(&args.image);
    let image = match runtime()?.block_on(loader.fetch_image(&source)) {
        Ok(img) => Some(img),
        Err(e) => {
            tracing::warn!(error = %e, "image unavailable, using preset palette");
            None
        }
    };
    let palette = shotframe::suggest_palette(image.as_ref(), &config.extract);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&palette)?);
    } else {
        for entry in &palette {
            println!("{}\t{}", entry.color.to_hex(), entry.label);
        }
    }
    Ok(())
}

fn cmd_templates(args: TemplatesArgs) -> anyhow::Result<()> {
    let library = shotframe::TemplateLibrary::load_dir(&args.dir)
        .with_context(|| format!("load templates from '{}'", args.dir.display()))?;
    let mut ids: Vec<&str> = library.ids().collect();
    ids.sort_unstable();
    for id in ids {
        println!("{id}");
    }
    Ok(())
}
