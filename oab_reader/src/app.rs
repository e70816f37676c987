use std::{
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use memmap2::Mmap;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    oab::{DecodeOptions, OabDocument, PropertySchema, UnresolvedPolicy, DEFAULT_MAX_RECORDS},
    output::{self, OutputFormat},
};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "oab-reader",
    author,
    version,
    about = "Parse OAB (Offline Address Book) data and export to JSON or CSV",
    long_about = None
)]
pub struct Args {
    /// Path to the input OAB file
    #[arg(value_name = "INPUT_FILE")]
    pub input_file: PathBuf,

    /// Path to the output file; stdout when omitted
    #[arg(short, long, value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Output format: json or csv
    #[arg(short, long, default_value = "json")]
    pub format: OutputFormat,

    /// JSON property table merged over the built-in one
    #[arg(long, value_name = "PATH")]
    pub schema: Option<PathBuf>,

    /// Maximum number of records to decode
    #[arg(long, default_value_t = DEFAULT_MAX_RECORDS)]
    pub max_records: usize,

    /// Consume the bytes of unresolved properties instead of leaving them
    #[arg(long)]
    pub consume_unresolved: bool,

    /// Keep records with no decoded fields and read past them
    #[arg(long)]
    pub keep_empty_records: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input_file: PathBuf,
    pub output_file: Option<PathBuf>,
    pub format: OutputFormat,
    pub schema_path: Option<PathBuf>,
    pub options: DecodeOptions,
}

impl From<Args> for AppConfig {
    fn from(value: Args) -> Self {
        Self {
            input_file: value.input_file,
            output_file: value.output_file,
            format: value.format,
            schema_path: value.schema,
            options: DecodeOptions {
                max_records: value.max_records,
                unresolved: if value.consume_unresolved {
                    UnresolvedPolicy::Consume
                } else {
                    UnresolvedPolicy::Skip
                },
                keep_empty_records: value.keep_empty_records,
            },
        }
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub async fn run(config: AppConfig) -> Result<()> {
    ensure_input_file(&config.input_file).await?;
    let schema = load_schema(config.schema_path.as_deref()).await?;

    let input = config.input_file.clone();
    let options = config.options;
    let document = tokio::task::spawn_blocking(move || decode_file(&input, &schema, options))
        .await
        .context("decode task failed")??;

    let rendered = output::render(document.records(), config.format)?;

    match &config.output_file {
        Some(path) => {
            tokio::fs::write(path, rendered)
                .await
                .with_context(|| format!("failed to write output file {}", path.display()))?;
            info!(
                records = document.len(),
                output = %path.display(),
                "Parsed {} records",
                document.len()
            );
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

pub async fn ensure_input_file(path: &Path) -> Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_file() {
                anyhow::bail!("Input path is not a file: {}", path.display());
            }
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            anyhow::bail!("Input file not found: {}", path.display());
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to inspect input file {}", path.display()));
        }
    }

    Ok(())
}

/// Built-in properties, overridden by an optional JSON table.
pub async fn load_schema(path: Option<&Path>) -> Result<PropertySchema> {
    let mut schema = PropertySchema::builtin();
    if let Some(path) = path {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read property schema {}", path.display()))?;
        let custom = PropertySchema::from_json_str(&json)
            .with_context(|| format!("invalid property schema {}", path.display()))?;
        info!(entries = custom.len(), "Loaded property schema");
        schema.extend(custom);
    }
    Ok(schema)
}

/// Memory-map `path` and decode it.
pub fn decode_file(
    path: &Path,
    schema: &PropertySchema,
    options: DecodeOptions,
) -> Result<OabDocument> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let len = file
        .metadata()
        .with_context(|| format!("failed to stat {}", path.display()))?
        .len();

    let document = if len == 0 {
        OabDocument::parse(&[], schema, options)
    } else {
        // SAFETY: the mapping is read-only and dropped before returning
        let mmap = unsafe { Mmap::map(&file) }
            .with_context(|| format!("failed to map {}", path.display()))?;
        OabDocument::parse(&mmap, schema, options)
    };

    document.with_context(|| format!("Error during OAB parsing of {}", path.display()))
}
