use clap::{Parser, Subcommand};
use paymeta_core::{
    constants::DEFAULT_ACTION, format_description, CoreConfig, Document, MetadataService,
    StorageSettings, DEFAULT_DATA_DIR,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "paymeta")]
#[command(about = "Payment metadata identifiers, storage and descriptions")]
struct Cli {
    /// Root directory of the local document store
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,
    /// Public base URL used to build document URLs
    #[arg(long, global = true, default_value = "http://localhost:3000")]
    public_url: String,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new identifier
    Generate,
    /// Check whether an identifier is valid
    Validate {
        /// Identifier to check
        id: String,
    },
    /// Show the creation time embedded in an identifier
    Timestamp {
        /// Identifier to inspect
        id: String,
    },
    /// Build a payment description
    Describe {
        /// Payment action (boost, stream, ...)
        action: String,
        /// URL to embed
        url: String,
        /// Free-text message (optional)
        #[arg(long)]
        message: Option<String>,
    },
    /// Store a JSON document
    Put {
        /// Path to a JSON file containing an object
        file: PathBuf,
        /// Payment action for the description
        #[arg(long, default_value = DEFAULT_ACTION)]
        action: String,
        /// Message for the description (optional)
        #[arg(long)]
        message: Option<String>,
    },
    /// Print a stored document
    Get {
        /// Document identifier
        id: String,
    },
    /// List stored documents, newest first
    List,
}

fn open_service(cli: &Cli) -> Result<MetadataService, Box<dyn std::error::Error>> {
    let cfg = CoreConfig::new(
        StorageSettings::Local {
            root: cli.data_dir.clone(),
        },
        cli.public_url.clone(),
    )?;
    Ok(MetadataService::open(Arc::new(cfg))?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Generate) => {
            println!("{}", paymeta_id::generate());
        }
        Some(Commands::Validate { id }) => {
            if paymeta_id::validate(id) {
                println!("valid");
            } else {
                println!("invalid");
                std::process::exit(1);
            }
        }
        Some(Commands::Timestamp { id }) => match paymeta_id::timestamp_of(id) {
            Ok(millis) => match chrono::DateTime::from_timestamp_millis(millis) {
                Some(at) => println!("{} ({} ms)", at.to_rfc3339(), millis),
                None => println!("{} ms (out of calendar range)", millis),
            },
            Err(e) => eprintln!("Error reading timestamp: {}", e),
        },
        Some(Commands::Describe {
            action,
            url,
            message,
        }) => {
            println!("{}", format_description(action, url, message.as_deref()));
        }
        Some(Commands::Put {
            file,
            action,
            message,
        }) => {
            let contents = std::fs::read_to_string(file)?;
            let value: serde_json::Value = serde_json::from_str(&contents)?;
            let document = Document::try_from(value)?;
            let service = open_service(&cli)?;
            match service.submit(document, action, message.as_deref()).await {
                Ok(submission) => {
                    println!("Stored document with ID: {}", submission.id);
                    println!("URL: {}", submission.url);
                    println!("Description: {}", submission.description);
                }
                Err(e) => eprintln!("Error storing document: {}", e),
            }
        }
        Some(Commands::Get { id }) => {
            let service = open_service(&cli)?;
            match service.get(id).await {
                Ok(document) => println!("{}", serde_json::to_string_pretty(&document)?),
                Err(e) => eprintln!("Error reading document {}: {}", id, e),
            }
        }
        Some(Commands::List) => {
            let service = open_service(&cli)?;
            let documents = service.list().await?;
            if documents.is_empty() {
                println!("No documents found.");
            } else {
                for document in documents {
                    println!("{}", serde_json::to_string(&document)?);
                }
            }
        }
        None => {
            println!("Use 'paymeta --help' for commands");
        }
    }

    Ok(())
}
