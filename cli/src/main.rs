use anyhow::Result;
use clap::{Parser, Subcommand};
use fragments_cli::utils::{parse_param, to_params};
use fragments_cli::{CONFIG_FILE, Command, EntityKind, FetchCommand, FragmentsConfig, QueryCommand, init_logging};
use fragments_sdk::{ResultMode, Value};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "fragments")]
#[command(about = "Fetch typed entities through named api methods")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one entity by id
    Get {
        #[arg(short, long, value_enum)]
        kind: EntityKind,
        /// Identifier of the entity
        #[arg(long)]
        id: String,
        /// Extra call parameter as NAME=VALUE
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, Value)>,
    },
    /// Fetch every entity matching the parameters
    Find {
        #[arg(short, long, value_enum)]
        kind: EntityKind,
        /// Call parameter as NAME=VALUE
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, Value)>,
    },
    /// Print the query a get (with --id) or find would run
    Query {
        #[arg(short, long, value_enum)]
        kind: EntityKind,
        /// Identifier, selects the single-entity method
        #[arg(long)]
        id: Option<String>,
        /// Call parameter as NAME=VALUE
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, Value)>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = FragmentsConfig::load_or_default(&cli.config)?;
    init_logging(cli.debug, &config.log_level);
    debug!(?config, "loaded configuration");

    let command: Box<dyn Command> = match cli.command {
        Commands::Get { kind, id, params } => Box::new(FetchCommand {
            kind,
            mode: ResultMode::Single,
            params: to_params(Some(id.as_str()), &params),
            config,
        }),
        Commands::Find { kind, params } => Box::new(FetchCommand {
            kind,
            mode: ResultMode::Multiple,
            params: to_params(None, &params),
            config,
        }),
        Commands::Query { kind, id, params } => Box::new(QueryCommand {
            kind,
            mode: if id.is_some() { ResultMode::Single } else { ResultMode::Multiple },
            params: to_params(id.as_deref(), &params),
            config,
        }),
    };

    command.execute().await
}
