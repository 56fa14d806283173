use actix_cors::Cors;
use actix_web::{web::Data, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use phonebook_server::routes::{configure, request_logger};
use store::{
    database::{database::Database, options::DatabaseOptions},
    persistence::{storage::StorageEngine, transaction::TransactionWriteMode},
};

/// 📇 Phonebook Server, serves the phonebook over a JSON HTTP API
#[derive(Parser, Debug)]
struct Cli {
    /// Store connection string: `memory://`, `file://<directory>` or a directory. Note: Does not support shell paths, e.g. ~
    #[clap(long, env = "PHONEBOOK_STORE_URI", default_value = "file://data")]
    store_uri: StorageEngine,

    /// Port the http server will run on
    #[clap(short, long, env = "PORT", default_value = "3001")]
    port: u16,

    /// Address the http server will run on
    #[clap(short, long, env = "ADDRESS", default_value = "0.0.0.0")]
    address: String,

    #[clap(long, env = "HTTP_WORKERS", default_value_t = 1)]
    http_workers: usize,

    /// Lets the OS buffer transaction log writes instead of syncing each one
    #[clap(long)]
    no_sync: bool,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Cli::parse();

    let write_mode = if args.no_sync {
        TransactionWriteMode::OSBuffered
    } else {
        TransactionWriteMode::Sync
    };

    let database_options = DatabaseOptions::default()
        .set_storage_engine(args.store_uri)
        .set_sync_file_write(write_mode);

    let request_manager = Database::new(database_options)
        .context("Unable to open the store")?
        .run()
        .context("Unable to start the store")?;

    log::info!("Server running on port {}", args.port);

    let server_request_manager = request_manager.clone();

    // Start HTTP server, returns once it has been stopped (e.g. Ctrl-C)
    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(server_request_manager.clone()))
            .configure(configure)
            .wrap(Cors::permissive())
            .wrap(request_logger())
    })
    .workers(args.http_workers)
    .bind((args.address.as_str(), args.port))
    .with_context(|| format!("Unable to bind {}:{}", args.address, args.port))?
    .run()
    .await?;

    let shutdown_response = request_manager.send_shutdown_request()?;

    log::info!("Shutting down server: {}", shutdown_response);

    Ok(())
}
