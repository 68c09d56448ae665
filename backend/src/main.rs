//! camconv CLI - Convert camera location CSV files
//!
//! # Main Commands
//!
//! ```bash
//! camconv serve                     # Start HTTP server + UI (port 3000)
//! camconv convert events.csv \
//!     --source-frame ITRF2014 --source-epoch 2023.5 \
//!     --target-frame NAD83CSRS --target-epoch 2002 -o out.csv
//! camconv grids sync                # Download missing geoid grids
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! camconv parse events.csv          # Parse CSV and print JSON rows
//! camconv validate events.csv       # Check required columns and coordinates
//! camconv options                   # Show selectable parameters
//! camconv grids list                # Show grid files on disk
//! ```

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use camconv::{
    api::init_tracing, convert_file, parse_csv_file_auto, validate_upload, AppConfig, ConversionContext,
    ConvertRequest, CsrsEngine, ImageType, OptionsResponse, SideSelection, TransformEngine,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "camconv")]
#[command(about = "Convert camera location CSV files between geodetic reference frames", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Directory holding geoid grids (overrides CAMCONV_GRID_DIR)
    #[arg(long, global = true)]
    grid_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Address to bind (overrides CAMCONV_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides CAMCONV_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Built frontend directory (overrides CAMCONV_STATIC_DIR)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Full conversion pipeline: CSV → validate → transform → CSV
    Convert {
        /// Input CSV file
        input: PathBuf,

        #[arg(long)]
        source_frame: Option<String>,
        /// Geographic, Cartesian or Projected
        #[arg(long, default_value = "Geographic")]
        source_coords: String,
        #[arg(long)]
        source_utm_zone: Option<u8>,
        #[arg(long)]
        source_vd: Option<String>,
        /// Decimal year
        #[arg(long)]
        source_epoch: Option<f64>,
        /// Calendar date (YYYY-MM-DD), used when no decimal year is given
        #[arg(long)]
        source_date: Option<NaiveDate>,

        #[arg(long)]
        target_frame: Option<String>,
        #[arg(long, default_value = "Geographic")]
        target_coords: String,
        #[arg(long)]
        target_utm_zone: Option<u8>,
        #[arg(long)]
        target_vd: Option<String>,
        #[arg(long)]
        target_epoch: Option<f64>,
        #[arg(long)]
        target_date: Option<NaiveDate>,

        /// Only normalise coordinates and derive filenames
        #[arg(long)]
        no_transform: bool,

        /// Append a derived filename column (RGBI or RGB)
        #[arg(long)]
        image_type: Option<String>,

        /// Output file (default: <input>_converted.csv next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the inspection snapshot as JSON to stderr
        #[arg(long)]
        inspect: bool,
    },

    /// Parse a CSV file and output JSON rows
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a CSV file against the required columns
    Validate {
        /// Input CSV file
        input: PathBuf,
    },

    /// Show selectable frames, datums and coordinate types
    Options,

    /// Manage geoid grid files
    Grids {
        #[command(subcommand)]
        action: GridAction,
    },
}

#[derive(Subcommand)]
enum GridAction {
    /// List grid files and whether they are present
    List,

    /// Download missing grids from CAMCONV_GRID_URL
    Sync {
        /// Base URL (overrides CAMCONV_GRID_URL)
        #[arg(long)]
        url: Option<String>,
    },
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let result = match AppConfig::from_env() {
        Ok(mut config) => {
            if let Some(dir) = cli.grid_dir {
                config.grid_dir = dir;
            }
            run(cli.command, config).await
        }
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, mut config: AppConfig) -> CliResult {
    match command {
        Commands::Serve {
            host,
            port,
            static_dir,
        } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(dir) = static_dir {
                config.static_dir = dir;
            }
            camconv::server::start_server(config).await?;
            Ok(())
        }

        Commands::Convert {
            input,
            source_frame,
            source_coords,
            source_utm_zone,
            source_vd,
            source_epoch,
            source_date,
            target_frame,
            target_coords,
            target_utm_zone,
            target_vd,
            target_epoch,
            target_date,
            no_transform,
            image_type,
            output,
            inspect,
        } => {
            let side = |frame: Option<String>, coords, utm_zone, vd, epoch, date| {
                frame.map(|ref_frame| SideSelection {
                    ref_frame,
                    coords,
                    utm_zone,
                    vertical_datum: vd,
                    epoch,
                    epoch_date: date,
                })
            };
            let image_type = image_type.map(|s| s.parse::<ImageType>()).transpose()?;
            let request = ConvertRequest {
                source: side(source_frame, source_coords, source_utm_zone, source_vd, source_epoch, source_date),
                target: side(target_frame, target_coords, target_utm_zone, target_vd, target_epoch, target_date),
                transform: !no_transform,
                image_type,
                job_id: None,
            };
            cmd_convert(&input, &request, output.as_deref(), inspect, &config)
        }

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Options => cmd_options(&config),

        Commands::Grids { action } => cmd_grids(action, config).await,
    }
}

fn cmd_convert(
    input: &Path,
    request: &ConvertRequest,
    output: Option<&Path>,
    inspect: bool,
    config: &AppConfig,
) -> CliResult {
    eprintln!("Processing: {}", input.display());

    let parameters = request.parameters()?;
    let engine = if parameters.is_some() {
        CsrsEngine::new(config.grid_store().load_models()?)
    } else {
        CsrsEngine::without_geoids()
    };

    let file_name = input.file_name().map(|n| n.to_string_lossy().into_owned());
    let ctx = ConversionContext::new(file_name, request.options(config.sample_rows), parameters);
    let result = convert_file(input, &ctx, &engine)?;

    eprintln!("   Encoding: {}", result.csv_info.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(result.csv_info.delimiter));
    eprintln!("   Rows: {}", result.table.row_count());
    eprintln!("   Input format: {}", result.input_format.id());

    if inspect {
        if let Some(snapshot) = &result.inspection {
            eprintln!("{}", serde_json::to_string_pretty(snapshot)?);
        }
    }

    let out_path = match output {
        Some(p) => p.to_path_buf(),
        None => input.with_file_name(&result.file_name),
    };
    fs::write(&out_path, &result.csv)?;
    eprintln!("Output written to: {}", out_path.display());
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> CliResult {
    eprintln!("Parsing CSV: {}", input.display());

    let result = parse_csv_file_auto(input)?;
    eprintln!("   Encoding: {}", result.encoding);
    eprintln!("   Delimiter: '{}' (auto-detected)", format_delimiter(result.delimiter));
    eprintln!("   Columns: {}", result.table.headers.join(", "));
    eprintln!("Parsed {} rows", result.table.row_count());

    let json = serde_json::to_string_pretty(&result.table.preview(result.table.row_count()))?;
    write_output(&json, output)
}

fn cmd_validate(input: &Path) -> CliResult {
    eprintln!("Validating: {}", input.display());

    let result = parse_csv_file_auto(input)?;
    let validated = validate_upload(result.table)?;

    eprintln!("   Layout: {:?}", validated.layout());
    eprintln!("   Coordinates: {}", validated.format().id());
    eprintln!("   Rows: {}", validated.row_count());
    if let (Some(first), Some(last)) = (validated.records().first(), validated.records().last()) {
        eprintln!("   First: {} {}", first.id, first.position);
        eprintln!("   Last:  {} {}", last.id, last.position);
    }
    eprintln!("Valid");
    Ok(())
}

fn cmd_options(config: &AppConfig) -> CliResult {
    let models = config.grid_store().load_models()?;
    let engine = CsrsEngine::new(models);
    let options = OptionsResponse::new(engine.name(), &engine.geoids().datums());
    println!("{}", serde_json::to_string_pretty(&options)?);
    Ok(())
}

async fn cmd_grids(action: GridAction, config: AppConfig) -> CliResult {
    match action {
        GridAction::List => {
            let store = config.grid_store();
            eprintln!("Grid directory: {}\n", store.dir().display());
            for status in store.list() {
                let state = match status.size {
                    Some(size) => format!("present ({size} bytes)"),
                    None => "missing".to_string(),
                };
                println!("  {:<12} {:<20} {}", status.datum.id(), status.file, state);
            }
        }

        GridAction::Sync { url } => {
            let store = config.grid_store().with_source(url.or(config.grid_url.clone()));
            let fetched = store.sync().await?;
            if fetched.is_empty() {
                eprintln!("All grids present in {}", store.dir().display());
            } else {
                for file in &fetched {
                    eprintln!("Downloaded {file}");
                }
            }
        }
    }
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> CliResult {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{content}");
        }
    }
    Ok(())
}
