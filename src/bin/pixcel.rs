use std::{
    fs::File,
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "pixcel", version, about = "Render images as HTML table pixel art")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an image or animated GIF into an HTML document.
    Convert(ConvertArgs),
    /// Dump the meshed cell layout as JSON.
    Layout(LayoutArgs),
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input image (PNG, JPEG, GIF, ...).
    input: PathBuf,

    /// Target width in table cells [default: 56].
    #[arg(short = 'W', long)]
    width: Option<u32>,

    /// Target height in table cells [default: proportional].
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Output HTML path.
    #[arg(short, long, default_value = "pixel_art.html")]
    output: PathBuf,

    /// Output only the table, without the HTML page wrapper.
    #[arg(long)]
    no_html: bool,

    /// Title of the HTML page.
    #[arg(short, long)]
    title: Option<String>,

    /// Hide the page until it has fully loaded.
    #[arg(long)]
    smooth_load: bool,

    /// Scaling algorithm.
    #[arg(long, value_enum)]
    scaler: Option<ScalerChoice>,

    /// JSON file with conversion options; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Input image (PNG, JPEG, GIF, ...).
    input: PathBuf,

    /// Target width in table cells [default: 56].
    #[arg(short = 'W', long)]
    width: Option<u32>,

    /// Target height in table cells [default: proportional].
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Scaling algorithm.
    #[arg(long, value_enum)]
    scaler: Option<ScalerChoice>,

    /// Output JSON path; stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScalerChoice {
    Nearest,
    Catmullrom,
    Bilinear,
    Approxbilinear,
}

impl From<ScalerChoice> for pixcel::Scaler {
    fn from(choice: ScalerChoice) -> Self {
        match choice {
            ScalerChoice::Nearest => pixcel::Scaler::Nearest,
            ScalerChoice::Catmullrom => pixcel::Scaler::CatmullRom,
            ScalerChoice::Bilinear => pixcel::Scaler::Bilinear,
            ScalerChoice::Approxbilinear => pixcel::Scaler::ApproxBilinear,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Convert(args) => cmd_convert(args),
        Command::Layout(args) => cmd_layout(args),
    }
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("open image '{}'", path.display()))
}

fn apply_size(
    mut opts: pixcel::ConvertOptions,
    width: Option<u32>,
    height: Option<u32>,
    scaler: Option<ScalerChoice>,
) -> pixcel::ConvertOptions {
    if let Some(w) = width {
        opts.width = w;
    }
    if let Some(h) = height {
        opts.height = (h > 0).then_some(h);
    }
    if let Some(s) = scaler {
        opts.scaler = s.into();
    }
    opts
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let base = match &args.config {
        Some(path) => pixcel::ConvertOptions::from_json_path(path)?,
        None => pixcel::ConvertOptions::default(),
    };
    let mut opts = apply_size(base, args.width, args.height, args.scaler);
    if args.no_html {
        opts.with_html = false;
    }
    if let Some(title) = args.title.as_deref().filter(|t| !t.is_empty()) {
        opts.title = title.to_string();
    }
    if args.smooth_load {
        opts.smooth_load = true;
    }

    let converter = pixcel::Converter::new(opts)?;
    let bytes = read_input(&args.input)?;
    let cancel = pixcel::CancelToken::new();

    let doc = converter
        .layout_bytes(&bytes, &cancel)
        .with_context(|| format!("convert '{}'", args.input.display()))?;
    match &doc {
        pixcel::Document::Static(d) => eprintln!(
            "loaded image from {} ({}x{} cells, {} merged)",
            args.input.display(),
            d.width,
            d.height,
            d.layout.cell_count()
        ),
        pixcel::Document::Animated(d) => eprintln!(
            "loaded animated gif ({} frames) from {}",
            d.frames.len(),
            args.input.display()
        ),
    }

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let mut out = File::create(&args.output)
        .with_context(|| format!("create output file '{}'", args.output.display()))?;
    converter
        .write_document(&mut out, &doc)
        .with_context(|| format!("write '{}'", args.output.display()))?;

    eprintln!("wrote {}", args.output.display());
    Ok(())
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let opts = apply_size(
        pixcel::ConvertOptions::default(),
        args.width,
        args.height,
        args.scaler,
    );
    let converter = pixcel::Converter::new(opts)?;
    let bytes = read_input(&args.input)?;
    let doc = converter
        .layout_bytes(&bytes, &pixcel::CancelToken::new())
        .with_context(|| format!("mesh '{}'", args.input.display()))?;

    match &args.output {
        Some(path) => {
            let f = File::create(path)
                .with_context(|| format!("create output file '{}'", path.display()))?;
            let mut w = BufWriter::new(f);
            serde_json::to_writer_pretty(&mut w, &doc)
                .with_context(|| "serialize layout JSON")?;
            w.flush()
                .with_context(|| format!("write '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            serde_json::to_writer_pretty(stdout.lock(), &doc)
                .with_context(|| "serialize layout JSON")?;
            println!();
        }
    }
    Ok(())
}
