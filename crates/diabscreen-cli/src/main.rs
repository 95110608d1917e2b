use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use diabscreen::schema::FeatureSchema;
use diabscreen::Screener;
use diabscreen_cli::config::{ScreenConfig, DEFAULT_MODEL_DIR};
use diabscreen_cli::screen::{bmi_from_arguments, input_from_arguments, run_screen, write_report};
use diabscreen_cli::server;
use diabscreen_cli::util::validate_csv_file;

fn model_dir_arg() -> Arg {
    Arg::new("model_dir")
        .short('m')
        .long("model-dir")
        .help("Directory holding manifest.json and the model file")
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::DirPath)
}

fn yes_no_arg(id: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(long)
        .help(help)
        .required(true)
        .value_parser(["yes", "no", "Yes", "No", "1", "0"])
        .value_hint(ValueHint::Other)
}

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("DIABSCREEN_LOG", "error,diabscreen=info"))
        .init();

    let matches = Command::new("diabscreen")
        .version(clap::crate_version!())
        .about("Diabetes risk screening with a pre-trained classifier")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("serve")
                .about("Serve the screening form over HTTP")
                .arg(
                    Arg::new("config")
                        .help("Path to a JSON server configuration file")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("bind")
                        .short('b')
                        .long("bind")
                        .help("Address to listen on. Overrides the bind address in the configuration file.")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::Other),
                )
                .arg(model_dir_arg()),
        )
        .subcommand(
            Command::new("screen")
                .about("Screen one person and print the outcome as JSON")
                .arg(yes_no_arg("highbp", "highbp", "High blood pressure?"))
                .arg(yes_no_arg("highchol", "highchol", "High cholesterol?"))
                .arg(yes_no_arg("smoker", "smoker", "Smoker?"))
                .arg(yes_no_arg("phys_activity", "phys-activity", "Physically active?"))
                .arg(
                    Arg::new("bmi")
                        .long("bmi")
                        .help("Body-mass index. Alternative to --height-cm/--weight-kg.")
                        .value_parser(clap::value_parser!(f32))
                        .conflicts_with_all(["height_cm", "weight_kg"]),
                )
                .arg(
                    Arg::new("height_cm")
                        .long("height-cm")
                        .help("Height in centimetres")
                        .value_parser(clap::value_parser!(f32))
                        .requires("weight_kg"),
                )
                .arg(
                    Arg::new("weight_kg")
                        .long("weight-kg")
                        .help("Weight in kilograms")
                        .value_parser(clap::value_parser!(f32))
                        .requires("height_cm"),
                )
                .arg(
                    Arg::new("genhlth")
                        .long("genhlth")
                        .help("General health, 1 = Excellent .. 5 = Poor")
                        .required(true)
                        .value_parser(clap::value_parser!(u8)),
                )
                .arg(
                    Arg::new("age")
                        .long("age")
                        .help("Age-group code, 1 (18-24) .. 13 (80+)")
                        .required(true)
                        .value_parser(clap::value_parser!(u8)),
                )
                .arg(model_dir_arg())
                .arg(
                    Arg::new("report")
                        .short('r')
                        .long("report")
                        .help("Also write an HTML report with the charts to this path")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("batch")
                .about("Screen every row of a CSV file")
                .arg(
                    Arg::new("input")
                        .help("CSV with highbp,highchol,bmi,smoker,phys_activity,genhlth,age columns")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output")
                        .help("Path to write the scored CSV. Defaults to stdout.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(model_dir_arg()),
        )
        .subcommand(
            Command::new("schema")
                .about("Print the feature schema, or check a model artifact against it")
                .arg(
                    Arg::new("check")
                        .long("check")
                        .help("Model directory to verify against the schema")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                ),
        )
        .subcommand(
            Command::new("bmi")
                .about("Compute BMI from height and weight")
                .arg(
                    Arg::new("height_cm")
                        .long("height-cm")
                        .required(true)
                        .value_parser(clap::value_parser!(f32)),
                )
                .arg(
                    Arg::new("weight_kg")
                        .long("weight-kg")
                        .required(true)
                        .value_parser(clap::value_parser!(f32)),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("serve", sub_m)) => handle_serve(sub_m),
        Some(("screen", sub_m)) => handle_screen(sub_m),
        Some(("batch", sub_m)) => handle_batch(sub_m),
        Some(("schema", sub_m)) => handle_schema(sub_m),
        Some(("bmi", sub_m)) => handle_bmi(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn model_dir(matches: &ArgMatches) -> PathBuf {
    matches
        .get_one::<PathBuf>("model_dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_DIR))
}

fn load_screener(dir: &Path) -> Result<Screener> {
    let screener = Screener::from_dir(dir)
        .with_context(|| format!("Failed to load model from {}", dir.display()))?;
    log::info!(
        "[diabscreen] Loaded model '{}' from {}",
        screener.model_name(),
        dir.display()
    );
    Ok(screener)
}

fn handle_serve(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    match config_path {
        Some(path) => log::info!("[diabscreen::serve] Using config: {:?}", path),
        None => log::info!("[diabscreen::serve] No config provided; using defaults."),
    }
    let config = ScreenConfig::from_arguments(config_path, matches)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(server::serve(&config))
}

fn handle_screen(matches: &ArgMatches) -> Result<()> {
    let input = input_from_arguments(matches)?;
    let screener = load_screener(&model_dir(matches))?;
    let outcome = run_screen(&screener, &input)?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if let Some(report) = matches.get_one::<PathBuf>("report") {
        write_report(&outcome, report)?;
    }
    Ok(())
}

fn handle_batch(matches: &ArgMatches) -> Result<()> {
    let input_path: &PathBuf = matches
        .get_one("input")
        .context("Input CSV is required")?;
    validate_csv_file(input_path)?;
    let screener = load_screener(&model_dir(matches))?;

    let summary = match matches.get_one::<PathBuf>("output_file") {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            diabscreen::io::screen_csv(&screener, input_path, BufWriter::new(file))?
        }
        None => diabscreen::io::screen_csv(&screener, input_path, std::io::stdout().lock())?,
    };

    eprintln!(
        "[diabscreen::batch] Screened {} rows: {} high risk, {} low risk, {} failed.",
        summary.total, summary.high_risk, summary.low_risk, summary.failed
    );
    Ok(())
}

fn handle_schema(matches: &ArgMatches) -> Result<()> {
    match matches.get_one::<PathBuf>("check") {
        Some(dir) => {
            let screener = load_screener(dir)?;
            println!(
                "Model '{}' matches feature schema {}",
                screener.model_name(),
                screener.schema().version
            );
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&FeatureSchema::default())?);
        }
    }
    Ok(())
}

fn handle_bmi(matches: &ArgMatches) -> Result<()> {
    let height_cm = *matches.get_one::<f32>("height_cm").context("--height-cm is required")?;
    let weight_kg = *matches.get_one::<f32>("weight_kg").context("--weight-kg is required")?;
    println!("{:.1}", bmi_from_arguments(height_cm, weight_kg)?);
    Ok(())
}
