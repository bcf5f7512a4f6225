//! CLI command implementations

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use skiff_core::config::{DEFAULT_PORT, ServerConfig, SkiffConfig};
use skiff_core::share::{ContentSource, FileSource};
use skiff_web::{Server, ServerHandle};
use tracing::info;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Serve a browsable directory tree (full-storage mode)
    Serve {
        /// Root directory to expose
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
        /// Port to bind to
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Reject requested sub-paths that escape the root
        #[arg(long)]
        strict_paths: bool,
    },
    /// Share an explicit set of files (shared mode)
    Share {
        /// Files to share, in listing order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Port to bind to
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Keep the full-storage root browsable alongside the shared set
        #[arg(long)]
        public: bool,
        /// Full-storage root used by the escape hatch when --public is set
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns an error when the listening socket cannot be bound or a shared
/// file does not exist.
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Serve {
            root,
            port,
            strict_paths,
        } => {
            let mut config = SkiffConfig::from_env();
            config.server.port = port;
            config.storage.root_dir = root;
            config.storage.strict_paths |= strict_paths;
            run_until_shutdown(config.into_full_storage()).await
        }
        Commands::Share {
            files,
            port,
            public,
            root,
        } => {
            let mut shared: Vec<Arc<dyn ContentSource>> = Vec::with_capacity(files.len());
            for path in &files {
                anyhow::ensure!(path.is_file(), "not a file: {}", path.display());
                shared.push(Arc::new(FileSource::new(path)));
            }

            let mut config = SkiffConfig::from_env();
            config.server.port = port;
            config.storage.root_dir = root;
            config.sharing.private = !public;
            run_until_shutdown(config.into_shared(shared)).await
        }
    }
}

async fn run_until_shutdown(config: ServerConfig) -> anyhow::Result<()> {
    let shared_items = config.shared.len();
    let handle = Server::start(config)
        .await
        .context("failed to start server")?;

    print_banner(&handle, shared_items);

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutting down");
    handle.stop().await;
    Ok(())
}

fn print_banner(handle: &ServerHandle, shared_items: usize) {
    let addr = handle.local_addr();
    if shared_items > 0 {
        println!("Sharing {shared_items} item(s)");
    }
    println!("Skiff running on http://{addr}/");
    println!("Open this address from any device on the local network. Ctrl-C stops the server.");
}
