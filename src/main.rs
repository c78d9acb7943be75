//! docqa CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use docqa::{
    api::ApiClient,
    app::AppOptions,
    commands::{
        cmd_ask, cmd_delete, cmd_init, cmd_list, cmd_preview, cmd_shell, cmd_upload,
        print_answer, print_deleted, print_documents, print_init_summary, print_saved_preview,
        print_upload_outcome, AskOptions, InitOptions, PreviewOptions,
    },
    config::Config,
    error::Result,
    progress::LogWriterFactory,
};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "docqa")]
#[command(version, about = "Upload documents and ask questions about them", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides the config file)
    #[arg(long, global = true, env = "DOCQA_API_BASE_URL")]
    api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive shell (default)
    Shell,

    /// List documents and their processing status
    List,

    /// Upload a document (.pdf, .docx, .txt)
    Upload {
        file: PathBuf,

        /// Wait until the document is ready or has failed
        #[arg(long)]
        wait: bool,
    },

    /// Delete a document
    Delete {
        doc_id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Ask a question
    Ask {
        question: String,

        /// Only search this document
        #[arg(long)]
        doc: Option<String>,

        /// Number of chunks to retrieve
        #[arg(long)]
        top_n: Option<usize>,

        /// Also print the retrieved chunks
        #[arg(long)]
        sources: bool,
    },

    /// Save a document's preview to disk
    Preview {
        doc_id: String,

        /// Output file (defaults to the document's filename)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing output file
        #[arg(long)]
        force: bool,
    },

    /// Write a config file
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        if let Some(hint) = e.hint() {
            eprintln!("{}", hint);
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(LogWriterFactory::default()))
        .with(filter)
        .init();

    let command = cli.command.unwrap_or(Commands::Shell);

    // Commands that do not need a resolved config
    match command {
        Commands::Init { force } => {
            let config_path = cli.config.unwrap_or_else(Config::default_config_path);
            let config = cmd_init(InitOptions {
                config_path,
                api_url: cli.api_url,
                force,
            })
            .await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print_init_summary(&config);
            }
            return Ok(());
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "docqa", &mut std::io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let config = Config::resolve(cli.config.as_deref(), cli.api_url)?;
    let client = ApiClient::new(config.api_base_url()?)?;
    let options = AppOptions::from_config(&config);

    match command {
        Commands::Shell => {
            let endpoint = client.base_url().to_string();
            cmd_shell(client, options, &endpoint).await?;
        }

        Commands::List => {
            let documents = cmd_list(&client).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&documents)?);
            } else {
                print_documents(&documents);
            }
        }

        Commands::Upload { file, wait } => {
            let outcome = cmd_upload(client, options, &file, wait).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_upload_outcome(&outcome);
            }
        }

        Commands::Delete { doc_id, yes } => {
            let deleted = cmd_delete(client, options, &doc_id, yes).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&deleted)?);
            } else {
                print_deleted(deleted.as_ref());
            }
        }

        Commands::Ask {
            question,
            doc,
            top_n,
            sources,
        } => {
            let ask_options = AskOptions {
                doc_id: doc,
                top_n: top_n.or(options.top_n),
            };
            let response = cmd_ask(&client, &question, ask_options).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_answer(&response, sources);
            }
        }

        Commands::Preview {
            doc_id,
            output,
            force,
        } => {
            let saved = cmd_preview(&client, &doc_id, PreviewOptions { output, force }).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&saved)?);
            } else {
                print_saved_preview(&saved);
            }
        }

        Commands::Init { .. } | Commands::Completions { .. } => unreachable!(),
    }

    Ok(())
}
