use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use inkpost::config::Settings;
use inkpost::markdown::{MarkdownRenderer, Profile, SequentialIds};
use inkpost::resolve::{AssumeLoads, BlogPost, HttpProbe, ImageProbe, resolve_displayed};
use inkpost::stylesheet::StyleRegistry;
use inkpost::title_image::{TitleImageGenerator, escape_markup};

/// Markdown-lite previews and generated title images for blog posts
#[derive(Parser, Debug)]
#[command(name = "inkpost")]
#[command(version)]
#[command(about = "Render post previews and title images", long_about = None)]
struct Cli {
    /// Settings file (TOML or YAML)
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Log at info level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render Markdown-lite source to an HTML fragment
    Render(RenderArgs),
    /// Generate a title card as PNG or data URI
    TitleImage(TitleImageArgs),
    /// Resolve the image shown for a stored post record (JSON)
    Resolve(ResolveArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Input file (use "-" for stdin)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file; stdout when omitted
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Styling profile; overrides the config file
    #[arg(short, long, value_enum)]
    profile: Option<Profile>,

    /// Wrap the fragment in a complete HTML document with styles and scripts
    #[arg(long)]
    standalone: bool,

    /// Number code blocks sequentially instead of randomly
    #[arg(long)]
    stable_ids: bool,
}

#[derive(Args, Debug)]
struct TitleImageArgs {
    /// Title text
    #[arg(value_name = "TITLE")]
    title: String,

    /// Output file (.png writes image bytes, anything else the data URI); stdout when omitted
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Starting font size in pixels
    #[arg(long)]
    font_size: Option<f32>,
}

#[derive(Args, Debug)]
struct ResolveArgs {
    /// Post record as JSON (use "-" for stdin)
    #[arg(value_name = "POST")]
    post: PathBuf,

    /// Position of the post in its listing, used to pick a fallback image
    #[arg(short, long, default_value_t = 0)]
    index: usize,

    /// Check that a featured image actually loads
    #[arg(long)]
    probe: bool,
}

fn main() -> Result<(), String> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = match cli.config {
        Some(ref path) => Settings::load(path).map_err(|e| e.to_string())?,
        None => Settings::default(),
    };

    match cli.command {
        Command::Render(args) => run_render(args, &settings),
        Command::TitleImage(args) => run_title_image(args, &settings),
        Command::Resolve(args) => run_resolve(args, &settings),
    }
}

fn run_render(args: RenderArgs, settings: &Settings) -> Result<(), String> {
    let source = read_input(&args.input)?;
    let profile = args.profile.unwrap_or(settings.render.profile);

    let fragment = if args.stable_ids {
        MarkdownRenderer::with_ids(profile, SequentialIds::default()).render(&source)
    } else {
        MarkdownRenderer::new(profile).render(&source)
    };

    let html = if args.standalone {
        let title = args
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| *s != "-")
            .unwrap_or("Preview");
        standalone_document(title, &fragment, profile)
    } else {
        fragment
    };

    write_text(args.output.as_deref(), &html)
}

fn standalone_document(title: &str, fragment: &str, profile: Profile) -> String {
    let registry = StyleRegistry::global();
    registry.ensure_all(profile.stylesheets());

    let script = profile.copy_script();
    let script = if script.is_empty() {
        String::new()
    } else {
        format!("<script>{script}</script>")
    };

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n{}\n{}\n</head>\n<body>\n<article>{}</article>\n</body>\n</html>\n",
        escape_markup(title),
        registry.head_html(),
        script,
        fragment,
    )
}

fn run_title_image(args: TitleImageArgs, settings: &Settings) -> Result<(), String> {
    let mut request = settings.image.request(args.title);
    if let Some(width) = args.width {
        request.width = width;
    }
    if let Some(height) = args.height {
        request.height = height;
    }
    if let Some(font_size) = args.font_size {
        request.font_size = font_size;
    }

    let mut generator = TitleImageGenerator::new();

    let wants_png = args
        .output
        .as_deref()
        .and_then(Path::extension)
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"));

    match args.output {
        Some(ref path) if wants_png => {
            let png = generator.render_png(&request).map_err(|e| e.to_string())?;
            std::fs::write(path, png).map_err(|e| format!("Failed to write PNG: {}", e))?;
            tracing::info!(path = %path.display(), "PNG saved");
            Ok(())
        }
        output => {
            let uri = generator.generate(&request).map_err(|e| e.to_string())?;
            write_text(output.as_deref(), &uri)
        }
    }
}

fn run_resolve(args: ResolveArgs, settings: &Settings) -> Result<(), String> {
    let record = read_input(&args.post)?;
    let post = BlogPost::from_json(&record).map_err(|e| e.to_string())?;
    let fallbacks = settings.fallback.images().map_err(|e| e.to_string())?;

    let probe: Box<dyn ImageProbe> = if args.probe {
        Box::new(HttpProbe::new())
    } else {
        Box::new(AssumeLoads)
    };

    let mut generator = TitleImageGenerator::new();
    let resolved = resolve_displayed(&post, &fallbacks, args.index, &mut generator, probe.as_ref());
    println!("{resolved}");
    Ok(())
}

fn read_input(path: &Path) -> Result<String, String> {
    if path.to_str() == Some("-") {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read input file: {}", e))
    }
}

fn write_text(output: Option<&Path>, text: &str) -> Result<(), String> {
    match output {
        Some(path) => {
            std::fs::write(path, text).map_err(|e| format!("Failed to write output: {}", e))?;
            tracing::info!(path = %path.display(), "Output saved");
        }
        None => println!("{text}"),
    }
    Ok(())
}
