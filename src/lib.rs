// Library root
// -----------
// This crate exposes the library surface of the MintScan CLI. The binary
// (`main.rs`) parses arguments and drives these modules.
//
// Module responsibilities:
// - `config`: explicit runtime configuration (base URL, default credentials).
// - `error`: error taxonomy and the `MintError` type every service returns.
// - `api`: blocking JSON client for the document-processing service.
// - `models`: wire types and the closed value sets (types, categories, statuses).
// - `files`: validation and base64 encoding of local document files.
// - `auth`, `process`, `listing`: the services behind each command.
// - `ui`: terminal output, password prompt and spinner.
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod files;
pub mod listing;
pub mod models;
pub mod process;
pub mod ui;

pub use api::ApiClient;
pub use auth::AuthService;
pub use config::Config;
pub use error::{ErrorKind, MintError};
pub use listing::ListService;
pub use process::{ProcessService, SubmitOptions};

/// Initialize tracing for the CLI binary. Logs go to stderr so they never mix
/// with command output; `RUST_LOG` overrides the default filter.
pub fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "mintscan_cli=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();
}
