use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use modelstack_config::env::collect_placeholders;
use modelstack_config::{ConfigLoader, EnvResolver, PlaceholderOp};
use modelstack_registry::{ModelRegistry, ProviderRegistry};
use tracing_subscriber::EnvFilter;

mod doc;

#[derive(Parser)]
#[command(
    name = "modelstack",
    version,
    about = "Validate, inspect, and document model-serving distributions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Environment override applied before interpolation (repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE", global = true)]
    env: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a distribution file against the schema and cross-reference rules
    Validate {
        /// Path to a distribution file, or the name of an installed distribution
        #[arg(long = "yaml-config", value_name = "PATH")]
        yaml_config: String,
    },

    /// Print the fully resolved configuration
    Show {
        #[arg(long = "yaml-config", value_name = "PATH")]
        yaml_config: String,

        /// Override the configured server port
        #[arg(long)]
        port: Option<u16>,

        /// Emit JSON instead of YAML
        #[arg(long)]
        json: bool,
    },

    /// List model registry entries
    Models {
        #[arg(long = "yaml-config", value_name = "PATH")]
        yaml_config: String,
    },

    /// List provider bindings per API
    Providers {
        #[arg(long = "yaml-config", value_name = "PATH")]
        yaml_config: String,
    },

    /// List environment variables the file references
    EnvVars {
        #[arg(long = "yaml-config", value_name = "PATH")]
        yaml_config: String,
    },

    /// Generate markdown documentation for a distribution
    Doc {
        #[arg(long = "yaml-config", value_name = "PATH")]
        yaml_config: String,

        /// Write to a file instead of stdout
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Let a .env file participate in interpolation, like any process variable.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let resolver = EnvResolver::from_pairs(&cli.env)?;
    let loader = ConfigLoader::new();

    match cli.command {
        Commands::Validate { yaml_config } => {
            let path = loader.resolve_path(&yaml_config)?;
            let config = loader.load_file(&path, &resolver)?;

            let report = modelstack_registry::validate(&config);
            report.print_summary();
            if report.is_ok() {
                println!("{} {}", "ok".green().bold(), path.display());
            } else {
                println!("{} {}", "failed".red().bold(), path.display());
                std::process::exit(1);
            }
        }

        Commands::Show {
            yaml_config,
            port,
            json,
        } => {
            let path = loader.resolve_path(&yaml_config)?;
            let mut config = loader.load_file(&path, &resolver)?;
            if let Some(port) = port {
                config.server.port = port;
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", serde_yaml::to_string(&config)?);
            }
        }

        Commands::Models { yaml_config } => {
            let path = loader.resolve_path(&yaml_config)?;
            let config = loader.load_file(&path, &resolver)?;
            let models = ModelRegistry::from_config(&config);

            if models.is_empty() {
                println!("(no models registered)");
            }
            for entry in models.list() {
                print!(
                    "{}  provider={}  native={}",
                    entry.model_id,
                    entry.provider_id,
                    entry.native_model_id()
                );
                if !entry.aliases.is_empty() {
                    let aliases: Vec<_> =
                        entry.aliases.iter().map(|a| a.as_str()).collect();
                    print!("  aliases={}", aliases.join(","));
                }
                println!();
            }
        }

        Commands::Providers { yaml_config } => {
            let path = loader.resolve_path(&yaml_config)?;
            let config = loader.load_file(&path, &resolver)?;
            let providers = ProviderRegistry::from_config(&config);

            for api in providers.apis() {
                println!("{api}:");
                for spec in providers.providers_for(api) {
                    println!("  {}  [{}]", spec.provider_id, spec.provider_type);
                }
            }
        }

        Commands::EnvVars { yaml_config } => {
            let path = loader.resolve_path(&yaml_config)?;
            let raw = loader.read_raw(&path)?;

            let mut seen = std::collections::HashSet::new();
            for placeholder in collect_placeholders(&raw) {
                if !seen.insert(placeholder.name.clone()) {
                    continue;
                }
                match &placeholder.op {
                    PlaceholderOp::Required => println!("{}  (required)", placeholder.name),
                    PlaceholderOp::Default(default) if default.is_empty() => {
                        println!("{}  (optional, empty default)", placeholder.name)
                    }
                    PlaceholderOp::Default(default) => {
                        println!("{}  (default: {default})", placeholder.name)
                    }
                    PlaceholderOp::IfSet(alt) => {
                        println!("{}  (when set: {alt})", placeholder.name)
                    }
                }
            }
        }

        Commands::Doc {
            yaml_config,
            output,
        } => {
            let path = loader.resolve_path(&yaml_config)?;
            let raw = loader.read_raw(&path)?;
            let config = loader.load_file(&path, &resolver)?;

            let rendered = doc::render(&config, &raw);
            match output {
                Some(out) => {
                    std::fs::write(&out, rendered)?;
                    println!("wrote {}", out.display());
                }
                None => print!("{rendered}"),
            }
        }
    }

    Ok(())
}
