use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

// Import the library
use vast_codec::{loader, parser, serializer};

/// VAST codec and inspection tool
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Timeout for fetching remote ad tags, in milliseconds
    #[arg(long, default_value_t = 3000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a VAST file or URL and print the document tree
    Parse {
        /// Path to the VAST file or URL
        #[arg(short, long)]
        input: String,

        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,

        /// Print the tree as JSON instead of debug output
        #[arg(short, long)]
        json: bool,
    },

    /// Report whether a document is a wrapper, VPAID or standard ad
    Classify {
        /// Path to the VAST file or URL
        #[arg(short, long)]
        input: String,
    },

    /// Strip tracking pixels, normalize, and re-serialize
    Strip {
        /// Path to the VAST file or URL
        #[arg(short, long)]
        input: String,

        /// Output file path (if not specified, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let timeout = Duration::from_millis(cli.timeout_ms);

    match &cli.command {
        Commands::Parse {
            input,
            pretty,
            json,
        } => {
            let content = loader::fetch_content(input, timeout).await?;
            let vast = parser::parse_vast(&content)?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&vast)?);
            } else if *pretty {
                println!("{vast:#?}");
            } else {
                println!("{vast:?}");
            }
        }
        Commands::Classify { input } => {
            let content = loader::fetch_content(input, timeout).await?;
            let vast = parser::parse_vast(&content)?;
            println!("{:?}", vast.classify()?);
        }
        Commands::Strip { input, output } => {
            let content = loader::fetch_content(input, timeout).await?;
            let mut vast = parser::parse_vast(&content)?;

            vast.strip_tracking_pixels();
            vast.normalize(None);
            let xml = serializer::serialize_vast(&vast)?;

            if let Some(output_path) = output {
                tokio::fs::write(output_path, &xml).await?;
                println!("Stripped VAST written to {}", output_path.display());
            } else {
                println!("{xml}");
            }
        }
    }

    Ok(())
}
