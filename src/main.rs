// Entrypoint for the CLI application.
// - Parses arguments, builds the configuration once and hands it to the
//   services through an `ApiClient`.
// - Any error ends the invocation with exit code 1 after printing the message
//   (and the service detail when present).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mintscan_cli::files::validate_files;
use mintscan_cli::listing::{sort_by_date, statistics, ListFilter};
use mintscan_cli::models::{parse_uuid, DocumentType, ProcessStatus, VehicleCategory};
use mintscan_cli::{
    init_tracing, ui, ApiClient, AuthService, Config, ListService, MintError, ProcessService,
    SubmitOptions,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const APP_NAME: &str = "mintscan-cli";

const AFTER_HELP: &str = "\
Environment variables:
  MINTSCAN_USER     Username for login
  MINTSCAN_PASS     Password for login
  MINTSCAN_TOKEN    Token, to skip login
  MINTSCAN_API_URL  Base URL of the API

Examples:
  mintscan-cli login myuser
  mintscan-cli list --estado COMPLETED
  mintscan-cli process --tipo coc --categoria M1 document.pdf
  mintscan-cli retrieve 731cb083-7d83-4ce7-a0ce-1a3b19b7e422";

#[derive(Parser)]
#[command(
    name = APP_NAME,
    version,
    about = "Command-line client for the MintScan document API",
    after_help = AFTER_HELP,
    arg_required_else_help = true
)]
struct Cli {
    /// Show detailed progress
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print a bearer token
    Login {
        /// Username (defaults to MINTSCAN_USER)
        user: Option<String>,
        /// Password (defaults to MINTSCAN_PASS, then an interactive prompt)
        password: Option<String>,
        /// Print only the token
        #[arg(short, long)]
        quiet: bool,
        /// Never prompt for the password
        #[arg(long)]
        no_interactive: bool,
    },
    /// List processed documents
    List {
        /// Bearer token (defaults to MINTSCAN_TOKEN)
        #[arg(short, long)]
        token: Option<String>,
        /// Filter by status
        #[arg(short, long)]
        estado: Option<String>,
        /// Filter by document type
        #[arg(long)]
        tipo: Option<String>,
        /// Filter by vehicle category
        #[arg(short, long)]
        categoria: Option<String>,
        /// Filter by ITV station
        #[arg(short, long)]
        itv: Option<String>,
        /// Maximum number of documents to show
        #[arg(short, long, default_value_t = 10)]
        limite: usize,
        /// Show only the statistics
        #[arg(short, long)]
        resumen: bool,
        /// Save the filtered list (or the statistics with --resumen) to a JSON file
        #[arg(short, long)]
        json: Option<PathBuf>,
        /// Order by creation date
        #[arg(short, long, value_enum, default_value_t = SortOrder::FechaDesc)]
        orden: SortOrder,
    },
    /// Submit document images for processing
    Process {
        /// Image or PDF files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Document type
        #[arg(long)]
        tipo: String,
        /// Vehicle category
        #[arg(short, long)]
        categoria: String,
        /// Bearer token (defaults to MINTSCAN_TOKEN)
        #[arg(short, long)]
        token: Option<String>,
        /// Descriptive name (cut to 100 characters)
        #[arg(short, long)]
        nombre: Option<String>,
        /// Process UUID (generated when omitted)
        #[arg(short, long)]
        id: Option<String>,
        /// Ask the service to compute extraction accuracy
        #[arg(short, long)]
        precision: bool,
    },
    /// Fetch one processed document
    Retrieve {
        /// Process UUID
        id: String,
        /// Bearer token (defaults to MINTSCAN_TOKEN)
        #[arg(short, long)]
        token: Option<String>,
        /// Save the document to a JSON file
        #[arg(short, long)]
        json: Option<PathBuf>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Completo)]
        format: OutputFormat,
    },
    /// Abort a submitted process
    Abort {
        /// Process UUID
        id: String,
        /// Bearer token (defaults to MINTSCAN_TOKEN)
        #[arg(short, long)]
        token: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortOrder {
    FechaAsc,
    FechaDesc,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Completo,
    Resumen,
    JsonRaw,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::from_env();
    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::print_error(&err);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli, config: &Config) -> Result<()> {
    let client = ApiClient::new(config)?;
    let verbose = cli.verbose;

    match cli.command {
        Commands::Login {
            user,
            password,
            quiet,
            no_interactive,
        } => login(client, config, user, password, quiet, no_interactive),
        Commands::List {
            token,
            estado,
            tipo,
            categoria,
            itv,
            limite,
            resumen,
            json,
            orden,
        } => {
            let token = require_token(token, config)?;
            let filter = ListFilter {
                status: estado.as_deref().map(str::parse::<ProcessStatus>).transpose()?,
                document_type: tipo.as_deref().map(str::parse::<DocumentType>).transpose()?,
                category: categoria
                    .as_deref()
                    .map(str::parse::<VehicleCategory>)
                    .transpose()?,
                itv,
            };

            let spinner = ui::spinner("Fetching processed documents...");
            let docs = ListService::new(client).list(&token);
            spinner.finish_and_clear();
            let docs = docs?;
            if verbose {
                println!("Documents fetched: {}", docs.len());
            }

            let filtered = filter.apply(&docs);
            let sorted = sort_by_date(&filtered, true, matches!(orden, SortOrder::FechaDesc));

            let stats = resumen.then(|| statistics(&sorted));
            match &stats {
                Some(stats) => ui::print_statistics(stats),
                None if sorted.is_empty() => println!("No documents match the given filters."),
                None => ui::print_document_list(&sorted, limite),
            }

            if let Some(path) = json {
                match &stats {
                    Some(stats) => save_json(&path, stats)?,
                    None => save_json(&path, &sorted)?,
                }
                if verbose {
                    println!("\nResults saved to: {}", path.display());
                }
            }
            Ok(())
        }
        Commands::Process {
            files,
            tipo,
            categoria,
            token,
            nombre,
            id,
            precision,
        } => {
            let token = require_token(token, config)?;
            let document_type: DocumentType = tipo.parse()?;
            let category: VehicleCategory = categoria.parse()?;
            let process_id = id.as_deref().map(parse_uuid).transpose()?;

            let validation = validate_files(&files);
            if !validation.has_valid_files() {
                return Err(MintError::validation("no valid files to process").into());
            }
            if validation.has_errors() {
                eprintln!("Warnings: {}", validation.errors.join(", "));
            }

            if verbose {
                println!("Processing {} file(s)...", validation.valid_files.len());
                match process_id {
                    Some(id) => println!("Process ID: {}", id),
                    None => println!("Process ID: generated"),
                }
                println!("Document type: {}", document_type);
                println!("Vehicle category: {}", category);
                if let Some(name) = &nombre {
                    println!("Name: {}", name);
                }
            }

            let options = SubmitOptions {
                name: nombre,
                extract_accuracy: precision,
                process_id,
            };
            let service = ProcessService::new(client);
            let spinner = ui::spinner("Submitting...");
            let response = match validation.valid_files.as_slice() {
                [single] => {
                    service.submit_single(&token, single, document_type, category, &options)
                }
                many => service.submit_multiple(&token, many, document_type, category, &options),
            };
            spinner.finish_and_clear();
            let response = response?;

            if response.success {
                ui::print_success("Processing started");
                println!("Process ID: {}", response.id);
                println!("\nCheck its status with:");
                println!("  {} retrieve {}", APP_NAME, response.id);
            } else {
                println!("\n✗ Processing was not accepted: {}", response.message);
                if verbose {
                    println!("{}", serde_json::to_string_pretty(&response)?);
                }
            }
            Ok(())
        }
        Commands::Retrieve {
            id,
            token,
            json,
            format,
        } => {
            let token = require_token(token, config)?;
            let process_id = parse_uuid(&id)?;
            if verbose {
                println!("Retrieving document: {}", process_id);
            }

            let spinner = ui::spinner("Retrieving...");
            let document = ProcessService::new(client).retrieve(&token, process_id);
            spinner.finish_and_clear();
            let document = document?;

            match format {
                OutputFormat::JsonRaw => println!("{}", serde_json::to_string_pretty(&document)?),
                OutputFormat::Resumen => ui::print_document_summary(&document),
                OutputFormat::Completo => ui::print_document_details(&document),
            }
            if !document.status.is_terminal() && !matches!(format, OutputFormat::JsonRaw) {
                println!(
                    "\nStill processing; run '{} retrieve {}' again later.",
                    APP_NAME, process_id
                );
            }

            if let Some(path) = json {
                save_json(&path, &document)?;
                if verbose {
                    println!("\nResult saved to: {}", path.display());
                }
            }
            Ok(())
        }
        Commands::Abort { id, token } => {
            let token = require_token(token, config)?;
            let process_id = parse_uuid(&id)?;
            let response = ProcessService::new(client).abort(&token, process_id)?;
            if response.success {
                ui::print_success(&format!("Process {} aborted", process_id));
            } else {
                println!("✗ Process {} was not aborted: {}", process_id, response.message);
            }
            Ok(())
        }
    }
}

fn login(
    client: ApiClient,
    config: &Config,
    user: Option<String>,
    password: Option<String>,
    quiet: bool,
    no_interactive: bool,
) -> Result<()> {
    let username = user
        .or_else(|| config.user.clone())
        .context("a username is required (argument or MINTSCAN_USER)")?;

    let password = match password.or_else(|| config.password.clone()) {
        Some(p) => p,
        None if no_interactive => {
            bail!("a password is required (argument, MINTSCAN_PASS or interactive prompt)")
        }
        None => {
            if !quiet {
                println!("User: {}", username);
            }
            ui::prompt_password()?
        }
    };

    let token = AuthService::new(client).login(&username, &password)?;

    if quiet {
        println!("{}", token);
    } else {
        ui::print_success("Login successful");
        println!("Token: {}", token);
        println!("\nUse it in the other commands with:");
        println!("  export MINTSCAN_TOKEN='{}'", token);
    }
    Ok(())
}

fn require_token(token: Option<String>, config: &Config) -> Result<String> {
    token
        .filter(|t| !t.trim().is_empty())
        .or_else(|| config.token.clone())
        .with_context(|| {
            format!(
                "a token is required (--token or MINTSCAN_TOKEN); run '{} login' to get one",
                APP_NAME
            )
        })
}

fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize result")?;
    std::fs::write(path, out).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
