//! # docdown CLI
//!
//! Converts a file, URI or stdin to Markdown.
//!
//! ## Examples
//!
//! ```bash
//! # Convert a file
//! docdown report.html
//!
//! # Read from stdin with a type hint
//! cat table.csv | docdown -x csv
//!
//! # Save to a file
//! docdown notebook.ipynb -o notebook.md
//!
//! # JSON output with the detected title
//! docdown page.html --format json
//!
//! # Serve the REST API (built with --features api)
//! docdown --serve --host 0.0.0.0 --port 8000
//! ```

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use docdown::{ConversionConfig, ConversionResult, DispatchEngine, StreamInfo};
use encoding_rs::Encoding;
use serde_json::json;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docdown")]
#[command(about = "Convert documents to Markdown")]
#[command(version)]
struct Cli {
    /// File path or file:, data:, http(s): URI. Reads stdin when omitted.
    filename: Option<String>,

    /// Output file name. Written to stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Hint about the file extension (e.g. when reading from stdin)
    #[arg(short = 'x', long)]
    extension: Option<String>,

    /// Hint about the MIME type
    #[arg(short, long = "mime-type")]
    mime_type: Option<String>,

    /// Hint about the charset (e.g. UTF-8)
    #[arg(short, long)]
    charset: Option<String>,

    /// Keep data URIs (like base64-encoded images) in the output
    #[arg(long)]
    keep_data_uris: bool,

    /// Config file (default: docdown.toml in the current directory or a parent)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// List registered converters in dispatch order and exit
    #[arg(long)]
    list_converters: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Serve the REST API instead of converting
    #[cfg(feature = "api")]
    #[arg(long)]
    serve: bool,

    /// Address the API server binds to
    #[cfg(feature = "api")]
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port the API server listens on
    #[cfg(feature = "api")]
    #[arg(long, default_value_t = 8000)]
    port: u16,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let hints = StreamInfo {
        extension: normalize_extension(cli.extension.as_deref()),
        mimetype: normalize_mime_type(cli.mime_type.as_deref())?,
        charset: normalize_charset(cli.charset.as_deref())?,
        ..StreamInfo::default()
    };

    let mut config = load_config(cli.config.as_deref())?;
    if cli.keep_data_uris {
        config.keep_data_uris = true;
    }

    let engine = DispatchEngine::with_builtins()
        .context("Failed to register built-in converters")?
        .with_config(config);

    if cli.list_converters {
        return list_converters(&engine, cli.format);
    }

    #[cfg(feature = "api")]
    if cli.serve {
        return serve(engine, &cli.host, cli.port);
    }

    let result = match &cli.filename {
        Some(source) => engine
            .convert(source, &hints)
            .with_context(|| format!("Failed to convert {}", source))?,
        None => engine
            .convert_reader(io::stdin().lock(), &hints)
            .context("Failed to convert stdin")?,
    };

    let rendered = render(&result, cli.format)?;
    match &cli.output {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", rendered)?;
        }
    }

    Ok(())
}

#[cfg(feature = "api")]
fn serve(engine: DispatchEngine, host: &str, port: u16) -> Result<()> {
    let limits = docdown::api::parse_size_limits_from_env();
    let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
    runtime
        .block_on(docdown::api::serve_with_engine(host, port, engine, limits))
        .with_context(|| format!("API server on {}:{} failed", host, port))
}

fn load_config(path: Option<&Path>) -> Result<ConversionConfig> {
    match path {
        Some(path) => ConversionConfig::from_file(path).with_context(|| format!("Failed to load {}", path.display())),
        None => Ok(ConversionConfig::discover()?.unwrap_or_default()),
    }
}

fn render(result: &ConversionResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(result.markdown.clone()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
            "markdown": result.markdown,
            "title": result.title,
        }))?),
    }
}

fn list_converters(engine: &DispatchEngine, format: OutputFormat) -> Result<()> {
    let registrations = engine.registry().snapshot_sorted();

    match format {
        OutputFormat::Text => {
            println!("Registered converters (in dispatch order):\n");
            for registration in &registrations {
                println!("  * {:<24}\tpriority {}", registration.name(), registration.priority());
            }
        }
        OutputFormat::Json => {
            let items: Vec<_> = registrations
                .iter()
                .map(|registration| json!({ "name": registration.name(), "priority": registration.priority() }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
    }

    Ok(())
}

/// `"CSV"` and `".csv"` both become `".csv"`; blank means no hint.
fn normalize_extension(raw: Option<&str>) -> Option<String> {
    let extension = raw?.trim().to_lowercase();
    if extension.is_empty() {
        None
    } else if extension.starts_with('.') {
        Some(extension)
    } else {
        Some(format!(".{}", extension))
    }
}

fn normalize_mime_type(raw: Option<&str>) -> Result<Option<String>> {
    let Some(mime_type) = raw.map(str::trim).filter(|m| !m.is_empty()) else {
        return Ok(None);
    };
    if mime_type.matches('/').count() != 1 {
        bail!("Invalid MIME type: {}", mime_type);
    }
    Ok(Some(mime_type.to_string()))
}

fn normalize_charset(raw: Option<&str>) -> Result<Option<String>> {
    let Some(label) = raw.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };
    match Encoding::for_label(label.as_bytes()) {
        Some(encoding) => Ok(Some(encoding.name().to_string())),
        None => bail!("Invalid charset: {}", label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension(Some("CSV")).as_deref(), Some(".csv"));
        assert_eq!(normalize_extension(Some(" .Md ")).as_deref(), Some(".md"));
        assert_eq!(normalize_extension(Some("   ")), None);
        assert_eq!(normalize_extension(None), None);
    }

    #[test]
    fn test_normalize_mime_type() {
        assert_eq!(
            normalize_mime_type(Some(" text/html ")).unwrap().as_deref(),
            Some("text/html")
        );
        assert!(normalize_mime_type(Some("texthtml")).is_err());
        assert!(normalize_mime_type(Some("a/b/c")).is_err());
        assert_eq!(normalize_mime_type(Some("")).unwrap(), None);
    }

    #[test]
    fn test_normalize_charset() {
        assert_eq!(normalize_charset(Some("utf8")).unwrap().as_deref(), Some("UTF-8"));
        assert_eq!(normalize_charset(Some("latin1")).unwrap().as_deref(), Some("windows-1252"));
        assert!(normalize_charset(Some("not-a-charset")).is_err());
        assert_eq!(normalize_charset(None).unwrap(), None);
    }

    #[test]
    fn test_render_json() {
        let result = ConversionResult::new("# Hi").with_title(Some("Hi".to_string()));
        let rendered = render(&result, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["markdown"], "# Hi");
        assert_eq!(value["title"], "Hi");
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
