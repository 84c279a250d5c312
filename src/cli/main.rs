use clap::{Parser, Subcommand};
use course_search::{catalog, config::Config, search::BulkSummary};
use reqwest::Client;
use std::error::Error;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "course-search-cli")]
#[command(about = "Course search CLI", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search courses
    Search {
        /// Free-text query
        #[arg(value_name = "QUERY")]
        q: Option<String>,

        #[arg(long)]
        min_age: Option<i32>,

        #[arg(long)]
        max_age: Option<i32>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short = 'T', long = "type")]
        course_type: Option<String>,

        #[arg(long)]
        min_price: Option<f64>,

        #[arg(long)]
        max_price: Option<f64>,

        /// Earliest session start (RFC 3339)
        #[arg(long)]
        start_date: Option<String>,

        /// upcoming, priceAsc or priceDesc
        #[arg(short, long, default_value = "upcoming")]
        sort: String,

        #[arg(short, long, default_value = "0")]
        page: usize,

        #[arg(short = 'n', long, default_value = "10")]
        size: usize,
    },

    /// Suggest titles for a partial title
    Suggest {
        #[arg(value_name = "PREFIX")]
        q: String,
    },

    /// Index a JSON catalog directly into the configured store
    Index {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Search {
            q,
            min_age,
            max_age,
            category,
            course_type,
            min_price,
            max_price,
            start_date,
            sort,
            page,
            size,
        } => {
            let mut params: Vec<(&str, String)> = vec![
                ("sort", sort),
                ("page", page.to_string()),
                ("size", size.to_string()),
            ];
            let optional = [
                ("q", q),
                ("minAge", min_age.map(|v| v.to_string())),
                ("maxAge", max_age.map(|v| v.to_string())),
                ("category", category),
                ("type", course_type),
                ("minPrice", min_price.map(|v| v.to_string())),
                ("maxPrice", max_price.map(|v| v.to_string())),
                ("startDate", start_date),
            ];
            params.extend(
                optional
                    .into_iter()
                    .filter_map(|(key, value)| value.map(|v| (key, v))),
            );

            let response = client
                .get(format!("{}/api/search", cli.endpoint))
                .query(&params)
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Suggest { q } => {
            let response = client
                .get(format!("{}/api/search/suggest", cli.endpoint))
                .query(&[("q", q)])
                .send()
                .await?;

            let titles: Vec<String> = response.json().await?;
            for title in titles {
                println!("{}", title);
            }
        }

        Commands::Index { file } => {
            let summary = index_catalog(&file).await?;

            println!("Indexed {} of {} courses", summary.indexed(), summary.total);
            for error in &summary.errors {
                eprintln!("  {}", error);
            }
        }

        Commands::Health => {
            let response = client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}

async fn index_catalog(file: &Path) -> course_search::Result<BulkSummary> {
    let config = Config::load()?;
    catalog::index_file(&config, file).await
}
