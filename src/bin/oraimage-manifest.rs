//! oraimage manifest generator binary

use clap::Parser;
use oraimage::exit_codes::{EXIT_PANIC, EXIT_SUCCESS, exit_code_for};
use oraimage::{GenerateOptions, GenerateReport, generate_manifests};
use std::{env, panic, path::PathBuf, process};

const VERSION: &str = oraimage::version::VERSION;

#[derive(Parser, Debug)]
#[command(
    version = VERSION,
    about = "Generate per-architecture package manifests from an AutoUpgrade download log"
)]
struct Args {
    /// AutoUpgrade log to read (defaults to the newest log in the software directory)
    input: Option<PathBuf>,

    /// Product (database version) directory the manifests are written to
    #[arg(short, long, default_value = ".")]
    product_dir: PathBuf,

    /// Software directory holding the logs (defaults to <product-dir>/software)
    #[arg(short, long)]
    software_dir: Option<PathBuf>,

    /// Release update version, e.g. 19.27.0.0 (defaults to the one in the log)
    #[arg(short, long = "ru")]
    release_update: Option<String>,

    /// Base release archive for AMD64
    #[arg(long)]
    base_amd64: Option<String>,

    /// Base release archive for ARM64
    #[arg(long)]
    base_arm64: Option<String>,

    /// Overwrite existing manifests
    #[arg(short, long)]
    force: bool,

    /// Glob pattern used to find the newest log
    #[arg(long)]
    log_pattern: Option<String>,

    /// Print the generated manifests as JSON
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error; prefix with json: for JSON logs)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() {
    // Set up panic handler to return specific exit code
    panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC: {}", panic_info);
        process::exit(EXIT_PANIC);
    }));

    let result = panic::catch_unwind(run);

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(_) => {
            eprintln!("Fatal: Unhandled panic in manifest generator");
            process::exit(EXIT_PANIC);
        }
    }
}

fn print_report(report: &GenerateReport, json: bool) -> i32 {
    if json {
        let manifests: serde_json::Map<String, serde_json::Value> = report
            .manifests
            .iter()
            .map(|m| {
                (
                    m.architecture.to_string(),
                    serde_json::json!({
                        "path": m.path,
                        "packages": m.manifest,
                    }),
                )
            })
            .collect();
        let doc = serde_json::json!({
            "release_update": report.release_update,
            "input": report.input,
            "manifests": manifests,
        });
        return match serde_json::to_string_pretty(&doc) {
            Ok(text) => {
                println!("{}", text);
                EXIT_SUCCESS
            }
            Err(e) => {
                eprintln!("Error: Failed to serialize report: {}", e);
                oraimage::exit_codes::EXIT_ERROR
            }
        };
    }

    println!("🏷️ Release update {}", report.release_update);
    for generated in &report.manifests {
        println!(
            "✅ {} manifest: {}",
            generated.architecture,
            generated.path.display()
        );
    }
    EXIT_SUCCESS
}

fn run() -> i32 {
    // Handle --version before clap
    if env::args().nth(1).as_deref() == Some("--version") {
        println!("oraimage-manifest {}", oraimage::version::full_version());
        return EXIT_SUCCESS;
    }

    let args = Args::parse();
    oraimage::logger::JsonLogger::init_from_cli(args.log_level.as_deref());

    let mut options = GenerateOptions::from_env(args.product_dir);
    options.input = args.input;
    options.release_update = args.release_update;
    options.base_amd64 = args.base_amd64;
    options.base_arm64 = args.base_arm64;
    options.force |= args.force;
    if args.software_dir.is_some() {
        options.software_dir = args.software_dir;
    }
    if args.log_pattern.is_some() {
        options.log_pattern = args.log_pattern;
    }

    match generate_manifests(&options) {
        Ok(report) => print_report(&report, args.json),
        Err(e) => {
            log::error!("❌ Manifest generation failed: {}", e);
            eprintln!("Error: {}", e);
            exit_code_for(&e)
        }
    }
}
