use clap::Parser;
use reqs_lsp::cli::{self, ColorChoice};
use reqs_lsp::server::Backend;
use std::path::PathBuf;
use tower_lsp_server::{LspService, Server};
use tracing_subscriber::EnvFilter;

/// Language server and checker for pip requirements files.
///
/// With no arguments, speaks the language server protocol on stdio.
#[derive(Parser)]
#[command(name = "reqs-lsp", version)]
struct Cli {
    /// Check files and print their errors and warnings; the exit code is
    /// the count of findings at warning severity or above.
    #[arg(long, value_name = "FILE", num_args = 1..)]
    check: Vec<PathBuf>,

    /// Re-sort files in place.
    #[arg(long, value_name = "FILE", num_args = 1..)]
    format: Vec<PathBuf>,

    /// When to display color.
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorChoice,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    if !args.check.is_empty() || !args.format.is_empty() {
        cli::format_files(&args.format);
        if args.check.is_empty() {
            return;
        }
        let lookup = cli::offline_lookup().await;
        let count = cli::check(&args.check, args.color.colorize(), lookup);
        std::process::exit(count.try_into().unwrap_or(i32::MAX));
    }

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(Backend::new);

    Server::new(stdin, stdout, socket).serve(service).await;
}
