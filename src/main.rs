use clap::{Parser, Subcommand};
use qr_catalog::compose::Composer;
use qr_catalog::config::{self, CatalogConfig};
use qr_catalog::generate::{BatchCount, Generator};
use qr_catalog::output;
use qr_catalog::store::QrStore;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qr-catalog")]
#[command(about = "Generate timestamped QR codes and lay them out in a PDF catalog")]
#[command(long_about = "\
Generate timestamped QR codes and lay them out in a PDF catalog

Every QR code encodes the instant it was generated. Files land in one flat
directory and their names carry the metadata the catalog shows:

  qr-codes/
  ├── 2024-01-01T12-00-00-000Z.png            # single  → \"Single QR\"
  ├── batch-1-2024-01-01T12-00-00-000Z.png    # batch   → \"Batch #1\"
  └── batch-2-2024-01-01T12-00-00-001Z.png

'compose' places every stored image on an A4 grid with a caption under each
and writes pdf-output/qr-codes-collection.pdf.

Set RUST_LOG=debug for detailed logs.
Run 'qr-catalog gen-config' to generate a documented qr-catalog.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Image directory (overrides storage.qr_dir)
    #[arg(long, global = true)]
    qr_dir: Option<PathBuf>,

    /// PDF output directory (overrides storage.output_dir)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate one QR code
    Single,
    /// Generate a numbered batch of QR codes
    Batch {
        /// Number of codes, 1 to 100
        #[arg(allow_hyphen_values = true)]
        count: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Lay out every stored QR code in a PDF catalog
    Compose,
    /// List stored QR codes with their caption metadata
    List,
    /// Print a stock qr-catalog.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Single => {
            let (config, store) = setup(&cli)?;
            let generator = Generator::with_encoder(store, config.qr.encoder());
            let record = generator.generate_single()?;
            output::print_single_output(&record);
        }
        Command::Batch { ref count, json } => {
            let count: BatchCount = count.parse()?;
            let (config, store) = setup(&cli)?;
            init_thread_pool(&config.processing);
            let generator = Generator::with_encoder(store, config.qr.encoder());
            let records = generator.generate_batch_of(count)?;
            if json {
                output::print_batch_json(&records)?;
            } else {
                output::print_batch_output(&records);
            }
        }
        Command::Compose => {
            let (config, store) = setup(&cli)?;
            let output_dir = resolve_output_dir(&cli, &config);
            let composer =
                Composer::new(store, output_dir).with_geometry(config.layout.geometry());
            let report = composer.compose_report()?;
            output::print_compose_output(&report);
        }
        Command::List => {
            let (_, store) = setup(&cli)?;
            let names = store.list_images()?;
            output::print_list_output(&names);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Start logging, load config, and open the image store.
fn setup(cli: &Cli) -> Result<(CatalogConfig, QrStore), config::ConfigError> {
    init_logging();
    let config = config::load_config(&cli.config)?;
    let root = cli
        .qr_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.storage.qr_dir));
    Ok((config, QrStore::new(root)))
}

/// Structured logs on stderr so stdout stays clean for `--json`.
///
/// Level defaults to `info`; `RUST_LOG` overrides it.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. Users can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn resolve_output_dir(cli: &Cli, config: &CatalogConfig) -> PathBuf {
    cli.output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.storage.output_dir))
}
