mod cloud;
mod config;
mod consts;
mod environment;
mod session;

use crate::cloud::types::{
    CreateInstancePayload, CreateRunPayload, SetInstanceTestsPayload,
    UpdateInstanceResultsPayload,
};
use crate::cloud::error::CloudError;
use crate::cloud::{CloudClient, Reporter};
use crate::config::{Config, get_config_path};
use crate::environment::Environment;
use crate::session::{ReportBundle, RunSession};
use clap::{Parser, Subcommand};
use log::error;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Command-line arguments
struct Args {
    /// Enable debug logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Path to the config file. Defaults to ./currents.config.json or ~/.currents/config.json
    #[arg(long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create or join a run (POST /runs)
    CreateRun {
        /// JSON file with the run payload
        #[arg(long, value_name = "FILE")]
        payload: PathBuf,
    },
    /// Claim the next spec of a run (POST /runs/{runId}/instances)
    CreateInstance {
        /// JSON file with the instance payload
        #[arg(long, value_name = "FILE")]
        payload: PathBuf,
    },
    /// Describe the tests of an instance (POST /instances/{id}/tests)
    SetTests {
        #[arg(long, value_name = "INSTANCE_ID")]
        instance_id: String,
        #[arg(long, value_name = "FILE")]
        payload: PathBuf,
    },
    /// Report the results of an instance (POST /instances/{id}/results)
    UpdateResults {
        #[arg(long, value_name = "INSTANCE_ID")]
        instance_id: String,
        #[arg(long, value_name = "FILE")]
        payload: PathBuf,
    },
    /// Upload the captured stdout of an instance (PUT /instances/{id}/stdout)
    UpdateStdout {
        #[arg(long, value_name = "INSTANCE_ID")]
        instance_id: String,
        /// Text file with the output, or `-` for stdin
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
    },
    /// Create a run, then claim and report specs until none are left
    Record {
        /// JSON file with the run payload
        #[arg(long, value_name = "FILE")]
        run: PathBuf,
        /// JSON file with per-spec tests, results and stdout
        #[arg(long, value_name = "FILE")]
        bundle: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(args).await {
        error!("{}", error_report(e.as_ref()));
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config_path = match args.config {
        Some(path) => path,
        None => get_config_path()?,
    };
    let config = Config::load_or_default(&config_path)?;
    Environment::install(Environment::resolve(config.api_base_url.as_deref()));
    let environment = Environment::current().clone();
    let client = CloudClient::with_timeout(environment, config.request_timeout())?;

    execute(args.command, &config, client).await
}

/// Human-readable form of a failure. Service error bodies are pretty-printed below the message.
fn error_report(e: &(dyn Error + 'static)) -> String {
    let pretty = e.downcast_ref::<CloudError>().and_then(|err| err.to_pretty());
    match pretty {
        Some(body) => format!("{}\n{}", e, body),
        None => e.to_string(),
    }
}

async fn execute(command: Command, config: &Config, client: CloudClient) -> Result<(), Box<dyn Error>> {
    match command {
        Command::CreateRun { payload } => {
            let payload = run_payload(&payload, config)?;
            print_json(&client.create_run(&payload).await?)
        }
        Command::CreateInstance { payload } => {
            let payload: CreateInstancePayload = read_json(&payload)?;
            print_json(&client.create_instance(&payload).await?)
        }
        Command::SetTests { instance_id, payload } => {
            let payload: SetInstanceTestsPayload = read_json(&payload)?;
            print_json(&client.set_instance_tests(&instance_id, &payload).await?)
        }
        Command::UpdateResults { instance_id, payload } => {
            let payload: UpdateInstanceResultsPayload = read_json(&payload)?;
            print_json(&client.update_instance_results(&instance_id, &payload).await?)
        }
        Command::UpdateStdout { instance_id, file } => {
            let stdout = read_text(&file)?;
            let status = client.update_instance_stdout(&instance_id, &stdout).await?;
            println!("{}", status);
            Ok(())
        }
        Command::Record { run, bundle } => {
            let payload = run_payload(&run, config)?;
            let bundle: ReportBundle = read_json(&bundle)?;
            let session = RunSession::start(Box::new(client), &payload).await?;
            let reported = session.record(&payload.platform, &bundle).await?;
            println!("Run: {}", session.run().run_url);
            print_json(&reported)
        }
    }
}

/// Read a run payload, filling project id and record key from config when the file leaves them empty.
fn run_payload(path: &Path, config: &Config) -> Result<CreateRunPayload, Box<dyn Error>> {
    let mut payload: CreateRunPayload = read_json(path)?;
    if payload.project_id.is_empty() {
        payload.project_id = config.project_id.clone();
    }
    if payload.record_key.is_empty() {
        payload.record_key = config.record_key.clone();
    }
    Ok(payload)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let text = read_text(path)?;
    serde_json::from_str(&text)
        .map_err(|e| format!("Invalid JSON in {}: {}", path.display(), e).into())
}

fn read_text(path: &Path) -> Result<String, Box<dyn Error>> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    Ok(std::fs::read_to_string(path)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
