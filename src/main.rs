use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use stockroom::application::engine::Storefront;
use stockroom::config::{DEFAULT_PORT, ServeConfig, StorageConfig};
use stockroom::domain::identity::{Identity, Role};
use stockroom::domain::item::Item;
use stockroom::infrastructure::jwt::{JwtConfig, JwtIdentityProvider};
use stockroom::interfaces::csv::item_reader::ItemReader;
use stockroom::interfaces::csv::item_writer::ItemWriter;
use stockroom::interfaces::http::{self, AppState};
use stockroom::logging;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true, env = "STOCKROOM_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Upper bound for a single store call, in milliseconds.
    #[arg(long, global = true, default_value_t = 5000)]
    store_timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve {
        #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Shared HS256 secret used to verify bearer tokens.
        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        jwt_secret: String,

        /// Required `iss` claim, if any.
        #[arg(long, env = "JWT_ISSUER")]
        jwt_issuer: Option<String>,

        #[arg(long, default_value_t = 30)]
        request_timeout_secs: u64,

        /// Catalog CSV to load before accepting requests.
        #[arg(long)]
        seed: Option<PathBuf>,
    },
    /// Add the rows of a catalog CSV file as items and print them.
    Import {
        /// Input catalog CSV file
        input: PathBuf,

        /// Vendor id recorded as the owner of imported items.
        #[arg(long, default_value = "system")]
        owner: String,
    },
    /// Print the catalog as CSV.
    Items,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let storage = StorageConfig {
        db_path: cli.db_path,
        store_timeout: Duration::from_millis(cli.store_timeout_ms),
    };
    let shop = storage.open().into_diagnostic()?;

    match cli.command {
        Command::Serve {
            port,
            jwt_secret,
            jwt_issuer,
            request_timeout_secs,
            seed,
        } => {
            let config = ServeConfig {
                port,
                jwt: JwtConfig::new(jwt_secret)
                    .into_diagnostic()?
                    .with_issuer(jwt_issuer),
                request_timeout: Duration::from_secs(request_timeout_secs),
                seed,
            };
            serve(shop, config).await
        }
        Command::Import { input, owner } => {
            let created = import(&shop, &input, &Identity::new(owner, Role::Vendor)).await?;
            let stdout = io::stdout();
            let mut writer = ItemWriter::new(stdout.lock());
            writer.write_items(created).into_diagnostic()
        }
        Command::Items => {
            let items = shop.list_items().await.into_diagnostic()?;
            let stdout = io::stdout();
            let mut writer = ItemWriter::new(stdout.lock());
            writer.write_items(items).into_diagnostic()
        }
    }
}

async fn serve(shop: Storefront, config: ServeConfig) -> Result<()> {
    if let Some(seed) = &config.seed {
        let created = import(&shop, seed, &Identity::system()).await?;
        info!(count = created.len(), "catalog seeded");
    }

    let state = AppState::new(
        Arc::new(shop),
        Arc::new(JwtIdentityProvider::new(&config.jwt)),
    );
    let app = http::router(state, config.request_timeout);

    let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], config.port)))
        .await
        .into_diagnostic()?;
    info!(addr = %listener.local_addr().into_diagnostic()?, "stockroom listening");

    http::serve(listener, app).await.into_diagnostic()
}

/// Creates an item for every valid row; invalid rows are reported and skipped.
async fn import(shop: &Storefront, path: &Path, owner: &Identity) -> Result<Vec<Item>> {
    let file = File::open(path).into_diagnostic()?;
    let reader = ItemReader::new(file);

    let mut created = Vec::new();
    for (index, draft) in reader.drafts().enumerate() {
        let result = match draft {
            Ok(draft) => shop.create_item(owner, draft).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(item) => created.push(item),
            Err(e) => warn!(row = index + 1, error = %e, "skipping catalog row"),
        }
    }
    Ok(created)
}
