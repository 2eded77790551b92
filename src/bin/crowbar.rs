//! Command line front end for the Crowbar API.
//!
//! ```text
//! crowbar -E http://127.0.0.1:3000 -U crowbar -P crowbar ping
//! crowbar nodes list
//! crowbar nodes show 3
//! crowbar nodes create '{"name": "d52-54-00-01-02-03.example.com"}'
//! crowbar nodes patch 3 '[{"op": "replace", "path": "/alive", "value": false}]'
//! ```

use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use crowbar_api::{ClientConfig, Session};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "crowbar", version, about = "A CLI application for interacting with the Crowbar API")]
struct Cli {
    /// The Crowbar API endpoint to talk to
    #[arg(short = 'E', long, env = "CROWBAR_ENDPOINT", global = true)]
    endpoint: Option<String>,

    /// Name of the Crowbar user to talk as [env: CROWBAR_KEY]
    #[arg(short = 'U', long, global = true)]
    username: Option<String>,

    /// Password of the Crowbar user [env: CROWBAR_KEY]
    #[arg(short = 'P', long, global = true)]
    password: Option<String>,

    /// Log requests and challenge handling to stderr
    #[arg(short, long, global = true)]
    debug: bool,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Test to see if we can connect to the Crowbar API endpoint
    Ping,
    /// `<resources> <action>`, e.g. `nodes list`
    #[command(external_subcommand)]
    Resource(Vec<String>),
}

#[derive(Debug, Parser)]
struct ResourceCli {
    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// List all objects
    List,
    /// List all objects that match the template in [json]
    Match { json: String },
    /// Show a single object by id
    Show { id: String },
    /// Get the default values for a new object
    Sample,
    /// Create a new object with the passed-in JSON
    Create { json: String },
    /// Unsafely update an object by id, overlaying the passed-in JSON fields
    Update { id: String, json: String },
    /// Apply the passed-in JSON patch document to an object by id
    Patch { id: String, patch: String },
    /// Destroy an object by id
    Destroy { id: String },
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn config_from(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::from_env()?;
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(username) = &cli.username {
        config.username = username.clone();
    }
    if let Some(password) = &cli.password {
        config.password = password.clone();
    }
    if let Some(secs) = cli.timeout {
        config.request_timeout = Some(Duration::from_secs(secs));
    }
    Ok(config)
}

/// Resource name and action from the words after the global flags
fn parse_resource(args: &[String]) -> Result<(String, Action), clap::Error> {
    // the resource name takes the place of the binary name
    let sub = ResourceCli::try_parse_from(args)?;
    let name = args.first().cloned().unwrap_or_default();
    Ok((name, sub.action))
}

fn parse_json(what: &str, src: &str) -> anyhow::Result<Value> {
    serde_json::from_str(src).with_context(|| format!("{} is not valid JSON", what))
}

/// Overlay the top-level fields of `changes` onto `target`
fn overlay(target: &mut Value, changes: Value) -> anyhow::Result<()> {
    match (target, changes) {
        (Value::Object(target), Value::Object(changes)) => {
            target.extend(changes);
            Ok(())
        }
        _ => bail!("update needs JSON objects on both sides"),
    }
}

async fn run_resource(session: &Session, name: &str, action: Action) -> anyhow::Result<()> {
    let item = |id: &str| format!("{}/{}", name, id);

    let out: Value = match action {
        Action::List => session.fetch(name).await?,
        Action::Match { json } => {
            let template = parse_json("match template", &json)?;
            let mut found = Value::Null;
            session
                .request(http::Method::POST, &format!("{}/match", name), Some(&template), Some(&mut found))
                .await?;
            found
        }
        Action::Show { id } => session
            .fetch(&item(&id))
            .await
            .with_context(|| format!("unable to load {} {}", name, id))?,
        Action::Sample => session.fetch(&format!("{}/sample", name)).await?,
        Action::Create { json } => {
            let mut obj = parse_json("object", &json)?;
            session
                .post(&mut obj, name)
                .await
                .with_context(|| format!("unable to create new {}", name))?;
            obj
        }
        Action::Update { id, json } => {
            let changes = parse_json("changes", &json)?;
            let mut obj: Value = session
                .fetch(&item(&id))
                .await
                .with_context(|| format!("failed to fetch {} from the server", id))?;
            overlay(&mut obj, changes)?;
            session.put(&mut obj, &item(&id)).await?;
            obj
        }
        Action::Patch { id, patch } => {
            let patch = parse_json("patch", &patch)?;
            let mut obj = Value::Null;
            session
                .patch(&mut obj, &item(&id), &patch)
                .await
                .with_context(|| format!("unable to patch {}", id))?;
            obj
        }
        Action::Destroy { id } => {
            session
                .delete(&item(&id))
                .await
                .with_context(|| format!("unable to destroy {} {}", name, id))?;
            println!("Deleted {} {}", name, id);
            return Ok(());
        }
    };

    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // settle the whole command line before touching the network
    let resource = match &cli.command {
        Command::Ping => None,
        Command::Resource(args) => Some(parse_resource(args).unwrap_or_else(|e| e.exit())),
    };
    init_logging(cli.debug);

    let config = config_from(&cli)?;
    tracing::debug!(endpoint = %config.endpoint, username = %config.username, "talking to Crowbar");

    let session = Session::establish(config.clone())
        .await
        .context("could not connect to Crowbar")?;

    match resource {
        None => {
            println!(
                "Able to connect to Crowbar at {} (user: {})",
                session.base_url(),
                config.username
            );
        }
        Some((name, action)) => run_resource(&session, &name, action).await?,
    }

    Ok(())
}
