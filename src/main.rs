use anyhow::Result;
use baconlink::{Config, OracleClient, QueryParameters, QueryResponse};
use clap::Parser;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "baconlink")]
#[command(about = "Find how two actors are connected through the Oracle of Bacon")]
struct Args {
    /// Starting actor
    from: String,

    /// Target actor
    to: String,

    /// API key (defaults to the variable named by oracle.api_key_env)
    #[arg(long)]
    api_key: Option<String>,

    /// Print the classified response as JSON
    #[arg(long)]
    json: bool,

    /// Print the request URI and exit without querying
    #[arg(long)]
    uri_only: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", &config.oracle.log_level)
    ).init();

    match &config.source {
        Some(path) => log::debug!("Loaded configuration from {}", path.display()),
        None => log::debug!("No config.toml found, using defaults"),
    }

    let api_key = config.resolve_api_key(args.api_key);

    let params = match QueryParameters::configure(args.from, args.to, api_key) {
        Ok(params) => params,
        Err(errors) => {
            for error in errors.iter() {
                eprintln!("{}: {}", error.field, error.message);
            }
            return Ok(ExitCode::from(2));
        }
    };

    let client = OracleClient::new().with_endpoint(config.base_url()?);

    if args.uri_only {
        println!("{}", client.request_uri(&params));
        return Ok(ExitCode::SUCCESS);
    }

    let response = client.query(&params)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    }

    match &response {
        QueryResponse::Graph { records, degrees } => {
            if !args.json {
                println!("{} degrees: {}", degrees, records.join(" => "));
            }
            Ok(ExitCode::SUCCESS)
        }
        QueryResponse::SpellingSuggestions { suggestions } => {
            if !args.json {
                println!("No exact match. Did you mean:");
                for suggestion in suggestions {
                    println!("  {}", suggestion);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        QueryResponse::AuthorizationError { message } => {
            eprintln!("Oracle refused the request: {}", message);
            Ok(ExitCode::FAILURE)
        }
        QueryResponse::Unknown { raw } => {
            log::debug!("Unrecognized payload: {}", raw);
            eprintln!("Unrecognized response from the Oracle (run with RUST_LOG=debug to see it)");
            Ok(ExitCode::FAILURE)
        }
    }
}
