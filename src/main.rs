use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use promql_language_support::config::PluginConfig;
use promql_language_support::logging::init_logger;
use promql_language_support::lsp::features::CompletionContext;
use promql_language_support::lsp::LanguageServiceRegistry;
use promql_language_support::syntax::highlight::semantic_tokens_legend;
use promql_language_support::syntax::{promql_syntax, SemanticCategory};

/// Inspect the PromQL language-support tables and strategies
#[derive(Parser, Debug)]
#[command(name = "promql-lang", version, about)]
struct Args {
    /// Disable ANSI colors in log output
    #[arg(long)]
    no_color: bool,

    /// Log level (overrides RUST_LOG)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Also write a debug session log under the user cache directory
    #[arg(long)]
    log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the highlighting category of each node type
    Classify {
        #[arg(value_name = "NODE_TYPE", required = true)]
        node_types: Vec<String>,
    },

    /// Print the declared node groups
    Groups,

    /// Print the semantic tokens legend (index, category, LSP token type)
    Legend,

    /// Run the configured completion strategy on a query
    Complete {
        query: String,

        /// Cursor byte offset (defaults to the end of the query)
        #[arg(long)]
        offset: Option<usize>,

        /// JSON file with initialization options
        #[arg(short = 'c', long = "config", value_name = "FILE")]
        config_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _guard = init_logger(args.no_color, args.log_level.as_deref(), args.log_file)?;
    debug!("Running {:?}", args.command);

    match args.command {
        Command::Classify { node_types } => {
            let syntax = promql_syntax();
            for node_type in node_types {
                let category = syntax.classify(&node_type).map_or("-", |c| c.tag());
                println!("{}\t{}", node_type, category);
            }
        }

        Command::Groups => {
            for group in promql_syntax().table.groups() {
                println!("{}\t{}", group.category, group.node_types.join(" "));
            }
        }

        Command::Legend => {
            let legend = semantic_tokens_legend();
            for (category, token_type) in SemanticCategory::ALL.iter().zip(&legend.token_types) {
                println!("{}\t{}\t{}", category.legend_index(), category, token_type.as_str());
            }
        }

        Command::Complete { query, offset, config_file } => {
            let options: Option<serde_json::Value> = match config_file {
                Some(path) => Some(serde_json::from_str(&std::fs::read_to_string(path)?)?),
                None => None,
            };
            let config = PluginConfig::from_init_options(options.as_ref())?;

            let registry = LanguageServiceRegistry::new();
            registry.apply_config(&config)?;
            let extension = registry.compose_extension();

            let offset = offset.unwrap_or(query.len());
            let context = CompletionContext::new(query, offset).explicit();
            match extension.completion.complete(&context).await? {
                Some(result) => {
                    for item in result.items {
                        println!("{}", item.label);
                    }
                }
                None => println!("no suggestions"),
            }
        }
    }

    Ok(())
}
