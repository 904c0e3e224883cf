use cfbc_site::config::{self, SiteConfig};
use cfbc_site::content::ContentResolver;
use cfbc_site::output::{self, CheckReport};
use cfbc_site::render::{self, SiteContext};
use cfbc_site::seed;
use cfbc_site::server::{self, ApiState};
use cfbc_site::store::client::AirtableClient;
use cfbc_site::store::{RecordStore, StoreCredentials, StoreError};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "cfbc-site")]
#[command(about = "Website for Calvary Fellowship Baptist Church")]
#[command(long_about = "\
Website for Calvary Fellowship Baptist Church

Pages are rendered from an Airtable base. When the base cannot be reached,
is empty, or no credentials are set, every page falls back to content
compiled into the binary, so the site never shows an empty page.

Credentials come from the environment only:

  AIRTABLE_API_TOKEN   personal access token
  AIRTABLE_BASE_ID     base id (app...)

Everything else lives in site.toml. Run 'cfbc-site gen-config' to print a
documented one.")]
#[command(version = version_string())]
struct Cli {
    /// Site config file
    #[arg(long, default_value = "site.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the site over HTTP
    Serve {
        /// Address to listen on (overrides [server] bind)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Render every page to static HTML
    Render {
        /// Output directory
        #[arg(long, default_value = "dist")]
        output: PathBuf,
    },
    /// Validate config and report where each kind of content comes from
    Check,
    /// Print a stock site.toml with all options documented
    GenConfig,
    /// Maintenance commands against the Airtable base
    #[command(subcommand)]
    Seed(SeedCommand),
}

#[derive(Subcommand)]
enum SeedCommand {
    /// Create the content tables in the base
    CreateTables,
    /// List the bases the token can access
    ListBases,
    /// Add the leadership team
    Leadership,
    /// Add the ministries
    Ministries,
    /// Add the supported missionaries
    Missions,
    /// Add the weekly schedule as recurring events
    Events,
    /// Add one published sermon
    Sermon {
        #[arg(long)]
        title: String,
        /// Date preached, YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        /// Defaults to the pastor
        #[arg(long)]
        speaker: Option<String>,
        #[arg(long)]
        video: Option<String>,
        #[arg(long)]
        download: Option<String>,
        #[arg(long)]
        series: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Fill in missing ministry slugs
    AddSlugs,
    /// Dump every content table as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Pause between table creations to stay under the API rate limit.
const CREATE_TABLE_PAUSE: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cfbc_site=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Serve { bind } => {
            let site_config = config::load_config(&cli.config)?;
            let bind = bind.unwrap_or_else(|| site_config.server.bind.clone());
            let resolver = resolver_or_offline(&site_config);
            let state = Arc::new(ApiState::new(SiteContext::new(site_config, resolver)));
            server::serve(state, &bind).await?;
        }
        Command::Render { output: out_dir } => {
            let site_config = config::load_config(&cli.config)?;
            let resolver = resolver_or_offline(&site_config);
            let site = SiteContext::new(site_config, resolver);
            println!("==> Rendering → {}", out_dir.display());
            let report = render::render_site(&site, &out_dir, chrono::Utc::now()).await?;
            output::print_render_output(&report);
        }
        Command::Check => {
            let site_config = config::load_config(&cli.config)?;
            let config_file = cli
                .config
                .exists()
                .then(|| cli.config.display().to_string());
            let store = match connect(&site_config) {
                Ok(client) => Ok(client.base_id().to_string()),
                Err(e) => Err(e.to_string()),
            };
            let resolver = resolver_or_offline(&site_config);
            let site = SiteContext::new(site_config, resolver);
            let report = CheckReport {
                config_file,
                store,
                content: site.content_status().await,
            };
            output::print_check_output(&report);
            println!("==> Config is valid");
        }
        Command::Seed(command) => {
            let site_config = config::load_config(&cli.config)?;
            let client = connect(&site_config)?;
            run_seed(command, &client).await?;
        }
    }

    Ok(())
}

fn connect(site_config: &SiteConfig) -> Result<AirtableClient, StoreError> {
    let credentials = StoreCredentials::from_env()?;
    AirtableClient::new(credentials, &site_config.store)
}

/// Live resolver when credentials are set, otherwise one that always serves
/// the compiled content.
fn resolver_or_offline(site_config: &SiteConfig) -> ContentResolver {
    match connect(site_config) {
        Ok(client) => {
            let store: Arc<dyn RecordStore> = Arc::new(client);
            ContentResolver::new(Some(store), site_config.store.page_budget())
        }
        Err(e) => {
            tracing::warn!("serving fallback content only: {e}");
            ContentResolver::offline()
        }
    }
}

async fn run_seed(
    command: SeedCommand,
    client: &AirtableClient,
) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = match command {
        SeedCommand::CreateTables => {
            let outcome = seed::create_tables(client, CREATE_TABLE_PAUSE).await;
            output::print_seed_outcome("Tables", &outcome);
            outcome
        }
        SeedCommand::ListBases => {
            let bases = client.list_bases().await?;
            output::print_bases(&bases);
            return Ok(());
        }
        SeedCommand::Leadership => {
            let outcome = seed::seed_leadership(client).await;
            output::print_seed_outcome("Leadership", &outcome);
            outcome
        }
        SeedCommand::Ministries => {
            let outcome = seed::seed_ministries(client).await;
            output::print_seed_outcome("Ministries", &outcome);
            outcome
        }
        SeedCommand::Missions => {
            let outcome = seed::seed_missions(client).await;
            output::print_seed_outcome("Missions", &outcome);
            outcome
        }
        SeedCommand::Events => {
            let outcome = seed::seed_events(client, &chrono::Local::now()).await;
            output::print_seed_outcome("Weekly schedule", &outcome);
            outcome
        }
        SeedCommand::Sermon {
            title,
            date,
            speaker,
            video,
            download,
            series,
            description,
        } => {
            let sermon = seed::NewSermon {
                title,
                date,
                speaker,
                video_link: video,
                download_link: download,
                series,
                description,
            };
            let outcome = seed::add_sermon(client, sermon).await;
            output::print_seed_outcome("Sermon", &outcome);
            outcome
        }
        SeedCommand::AddSlugs => {
            let outcome = seed::add_slugs(client).await?;
            output::print_seed_outcome("Ministry slugs", &outcome);
            outcome
        }
        SeedCommand::Export { output: path } => {
            let export = seed::export(client).await?;
            let json = seed::export_json(&export)?;
            match path {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("==> Exported → {}", path.display());
                }
                None => println!("{json}"),
            }
            return Ok(());
        }
    };

    if outcome.is_success() {
        Ok(())
    } else {
        Err(format!("{} item(s) failed", outcome.failed.len()).into())
    }
}
