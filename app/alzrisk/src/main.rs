use std::fs;
use std::io::{self, Read};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use alzrisk_model::Artifacts;
use alzrisk_pipeline::{check_classes, error_banner, render_text, InputRecord, Pipeline};
use alzrisk_schema::FeatureSchema;
use clap::{Args, Parser, Subcommand};

mod config;
mod web;

use config::AppConfig;

#[derive(Debug, Parser)]
#[command(
    name = "alzrisk",
    version,
    about = "Alzheimer's risk prediction from clinical attributes",
    long_about = "alzrisk serves a single-page form that collects 32 clinical attributes,\n\
        encodes and scales them, and reports the classifier's risk verdict.\n\n\
        EXAMPLES:\n\
        \n  alzrisk                                        Serve the form on 127.0.0.1:8501\n\
        \n  alzrisk serve --model demos/model_random_forest_alzheimer.json --scaler demos/scaler.json\n\
        \n  alzrisk predict patient.json                   Predict one record from a JSON file\n\
        \n  echo '{\"Age\": 70}' | alzrisk predict --json   Predict from stdin, JSON output"
)]
struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the prediction form over HTTP (default)
    Serve(ServeArgs),

    /// Run one input record through the pipeline and print the result
    Predict(PredictArgs),

    /// Print the feature schema as JSON
    Schema,
}

#[derive(Debug, Args, Clone, Default)]
struct ArtifactArgs {
    /// Classifier artifact (JSON)
    #[arg(long = "model", value_name = "FILE")]
    model: Option<PathBuf>,

    /// Scaler artifact (JSON)
    #[arg(long = "scaler", value_name = "FILE")]
    scaler: Option<PathBuf>,
}

#[derive(Debug, Args, Clone, Default)]
struct ServeArgs {
    #[command(flatten)]
    artifacts: ArtifactArgs,

    /// Address to listen on
    #[arg(long = "bind", value_name = "ADDR")]
    bind: Option<SocketAddr>,
}

#[derive(Debug, Args, Clone)]
struct PredictArgs {
    #[command(flatten)]
    artifacts: ArtifactArgs,

    /// JSON input record (reads from stdin if not provided). Absent fields
    /// take the form defaults.
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

/// Builds the shared pipeline. Any failure here is fatal.
fn load_pipeline(config: &AppConfig) -> Option<Pipeline> {
    let schema = FeatureSchema::alzheimers();
    if let Err(e) = schema.validate() {
        log::error!("feature schema is inconsistent: {e}");
        eprintln!("error: {e}");
        return None;
    }
    let artifacts = match Artifacts::load(&config.model_path, &config.scaler_path) {
        Ok(artifacts) => artifacts,
        Err(e) => {
            log::error!("startup failed: {e}");
            eprintln!("error: {e}");
            return None;
        }
    };
    if let Err(e) = check_classes(artifacts.classifier.as_ref()) {
        log::error!("startup failed: {}: {e}", config.model_path.display());
        eprintln!("error: {}: {e}", config.model_path.display());
        return None;
    }
    Some(Pipeline::new(Arc::new(schema), artifacts))
}

fn read_record(input: &Option<PathBuf>) -> Result<InputRecord, String> {
    let text = match input {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("cannot read stdin: {e}"))?;
            buf
        }
    };
    serde_json::from_str(&text).map_err(|e| format!("invalid input record: {e}"))
}

fn run_predict(args: &PredictArgs) -> i32 {
    let config = AppConfig::with_overrides(
        args.artifacts.model.clone(),
        args.artifacts.scaler.clone(),
        None,
    );
    let Some(pipeline) = load_pipeline(&config) else {
        return 1;
    };
    let partial = match read_record(&args.input) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return 2;
        }
    };
    let record = partial.completed(pipeline.schema());

    match pipeline.run(&record) {
        Ok(report) => {
            if args.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(s) => println!("{s}"),
                    Err(e) => {
                        eprintln!("error: {e}");
                        return 2;
                    }
                }
            } else {
                print!("{}", render_text(&report));
            }
            0
        }
        Err(e) => {
            eprintln!("{}", error_banner(&e).message);
            2
        }
    }
}

fn run_serve(args: &ServeArgs) -> i32 {
    let config = AppConfig::with_overrides(
        args.artifacts.model.clone(),
        args.artifacts.scaler.clone(),
        args.bind,
    );
    let Some(pipeline) = load_pipeline(&config) else {
        return 1;
    };
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: cannot start runtime: {e}");
            return 1;
        }
    };
    match runtime.block_on(web::serve(pipeline, config.bind)) {
        Ok(()) => 0,
        Err(e) => {
            log::error!("server stopped: {e}");
            eprintln!("error: {e}");
            1
        }
    }
}

fn run_schema() -> i32 {
    match serde_json::to_string_pretty(&FeatureSchema::alzheimers()) {
        Ok(s) => {
            println!("{s}");
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            2
        }
    }
}

fn run_cli() -> i32 {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => run_serve(&args),
        Command::Predict(args) => run_predict(&args),
        Command::Schema => run_schema(),
    }
}

fn main() {
    std::process::exit(run_cli());
}
