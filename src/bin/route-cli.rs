use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pathmark::{
    load_config, load_table, match_request, normalize_path, save_table, MatchError, Method,
    RouterConfig, RoutingTable,
};

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Management CLI for the pathmark routing engine", long_about = None)]
struct Cli {
    /// Route table declaration file
    #[arg(short, long, default_value = "router.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the route table and write the cache artifact
    Compile,
    /// Resolve a path and method against the table
    Match {
        path: String,

        #[arg(short, long, default_value = "GET")]
        method: String,
    },
    /// Show the compiled table layout
    Routes,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pathmark=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Compile => {
            let table =
                RoutingTable::compile_with(&config.to_routes(), &config.compile_options())?;
            let out = config
                .router
                .cache_path
                .clone()
                .unwrap_or_else(|| "routes.cache.json".to_string());
            save_table(&table, Path::new(&out))?;
            println!("compiled {} routes into {}", config.routes.len(), out);
        }
        Commands::Match { path, method } => {
            let table = load_or_compile(&config)?;
            let method: Method = method.parse()?;
            let normalized = normalize_path(&path);

            match match_request(&table, &normalized, method) {
                Ok(result) => println!("{}", serde_json::to_string_pretty(&result)?),
                Err(MatchError::NotFound) => {
                    eprintln!("404: no route found for {normalized}");
                    std::process::exit(1);
                }
                Err(MatchError::MethodNotAllowed { allowed }) => {
                    let allow: Vec<&str> = allowed.iter().map(|m| m.as_str()).collect();
                    eprintln!("405: allow: {}", allow.join(", "));
                    std::process::exit(1);
                }
            }
        }
        Commands::Routes => {
            let table = load_or_compile(&config)?;
            let data = table.data();

            let mut paths: Vec<&String> = data.static_index.keys().collect();
            paths.sort();
            println!("static paths ({}):", paths.len());
            for path in paths {
                for entry in &data.static_index[path] {
                    println!("  {path} -> {}", entry.action);
                }
            }

            println!("dynamic chunks ({}):", data.chunks.len());
            for chunk in &data.chunks {
                println!("  [mark {}] {}", chunk.start_mark, chunk.pattern);
            }
        }
    }

    Ok(())
}

/// Reuse the cache artifact when it exists, otherwise compile from the
/// declarations.
fn load_or_compile(config: &RouterConfig) -> Result<RoutingTable, Box<dyn std::error::Error>> {
    if let Some(cache) = &config.router.cache_path {
        if Path::new(cache).is_file() {
            return Ok(load_table(Path::new(cache))?);
        }
    }
    Ok(RoutingTable::compile_with(
        &config.to_routes(),
        &config.compile_options(),
    )?)
}
