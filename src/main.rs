//! CLI entry point for the wikibase-edit tool.

use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, info};
use wikibase_edit::{
    ClaimBuilder, ClaimInput, ClaimValue, HttpTimeouts, LoginMethod, OAuthToken, PropertyTable,
    RequestConfig, ReqwestTransport, ResilientPoster, SessionAuthProvider,
};

mod cli;

use cli::{Args, SnaktypeArg, parse_value_arg};

const USERNAME_ENV: &str = "WIKIBASE_USERNAME";
const PASSWORD_ENV: &str = "WIKIBASE_PASSWORD";
const OAUTH_TOKEN_ENV: &str = "WIKIBASE_OAUTH_TOKEN";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let properties = load_properties(&args)?;
    let value = match (args.snaktype, args.value.as_deref()) {
        (Some(SnaktypeArg::Novalue), _) => ClaimValue::NoValue,
        (Some(SnaktypeArg::Somevalue), _) => ClaimValue::SomeValue,
        (None, Some(raw)) => {
            ClaimValue::from(parse_value_arg(raw).context("--value is not valid JSON")?)
        }
        (None, None) => bail!("either --value or --snaktype is required"),
    };
    let input = ClaimInput::new(&args.entity, &args.property, value);

    let request = ClaimBuilder::new(&properties, &args.instance)
        .build(&input)
        .context("failed to build claim")?;

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&request)?);
        return Ok(());
    }

    let mut config = RequestConfig::new(&args.instance)
        .with_bot(args.bot)
        .with_summary(&args.summary);
    if let Some(user_agent) = &args.user_agent {
        config = config.with_user_agent(user_agent);
    }
    let method = login_method_from_env()?;
    if let LoginMethod::OAuth(token) = &method {
        config = config.with_oauth(token.clone());
    }
    config.validate()?;

    let auth = SessionAuthProvider::new(&config, method)?;
    let transport = ReqwestTransport::new(HttpTimeouts::default())?;
    let poster = ResilientPoster::new(Arc::new(transport), Arc::new(auth));

    info!(entity = %args.entity, property = %args.property, "creating claim");
    let response = poster.post_claim(&request, &config).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}

fn load_properties(args: &Args) -> Result<PropertyTable> {
    if let Some(datatype) = &args.datatype {
        return Ok(PropertyTable::new().with(&args.property, datatype));
    }
    let Some(path) = &args.properties else {
        if args.snaktype.is_some() {
            return Ok(PropertyTable::new());
        }
        bail!("either --datatype or --properties is required to encode a value");
    };
    let file = File::open(path)
        .with_context(|| format!("failed to open properties file {}", path.display()))?;
    let table = PropertyTable::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse properties file {}", path.display()))?;
    debug!(properties = table.len(), "loaded property metadata");
    Ok(table)
}

fn login_method_from_env() -> Result<LoginMethod> {
    if let Ok(token) = std::env::var(OAUTH_TOKEN_ENV) {
        return Ok(LoginMethod::OAuth(OAuthToken::new(token)));
    }
    match (std::env::var(USERNAME_ENV), std::env::var(PASSWORD_ENV)) {
        (Ok(username), Ok(password)) => Ok(LoginMethod::BotPassword { username, password }),
        _ => bail!(
            "no credentials: set {USERNAME_ENV} and {PASSWORD_ENV}, or {OAUTH_TOKEN_ENV}"
        ),
    }
}
