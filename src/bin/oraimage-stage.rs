//! oraimage build-context staging binary

use clap::{Parser, Subcommand};
use oraimage::exit_codes::{
    EXIT_INVALID_ARGS, EXIT_PANIC, EXIT_SUCCESS, EXIT_UNRESOLVED_FILES, exit_code_for,
};
use oraimage::patches::cli::{print_stage_report, show_manifest};
use oraimage::patches::defaults::{DEFAULT_SOFTWARE_SUBDIR, DEFAULT_STAGE_SUBDIR, ENV_SOFTWARE_DIR};
use oraimage::utils::env_path;
use oraimage::{
    Architecture, StageOptions, clean_build_context, locate_manifest, stage_build_context,
};
use std::{env, panic, path::PathBuf, process};

const VERSION: &str = oraimage::version::VERSION;

#[derive(Parser, Debug)]
#[command(version = VERSION, about = "Stage manifest packages into a container build context")]
struct Cli {
    /// Log level (trace, debug, info, warn, error; prefix with json: for JSON logs)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy the files a manifest names into the build context
    Stage {
        /// Package manifest to stage
        #[arg(short, long, conflicts_with = "release_update")]
        manifest: Option<PathBuf>,

        /// Pick the manifest for this release update from the product directory
        #[arg(short, long = "ru", required_unless_present = "manifest")]
        release_update: Option<String>,

        /// Architecture of the manifest picked with --ru (defaults to the host's)
        #[arg(long)]
        arch: Option<Architecture>,

        /// Product directory searched with --ru
        #[arg(short, long, default_value = ".")]
        product_dir: PathBuf,

        /// Base software directory, searched first (defaults to <manifest dir>/software)
        #[arg(short, long)]
        software_dir: Option<PathBuf>,

        /// Release update directory, searched second (defaults to <software-dir>/<RU>)
        #[arg(long)]
        ru_dir: Option<PathBuf>,

        /// Build context root (defaults to the manifest's directory)
        #[arg(short, long)]
        context: Option<PathBuf>,

        /// Staging subdirectory inside the context
        #[arg(long, default_value = DEFAULT_STAGE_SUBDIR)]
        stage_subdir: String,

        /// Fail when a listed file cannot be found
        #[arg(long)]
        strict: bool,
    },
    /// Remove the staging tree and restore the context's ignore file
    Clean {
        /// Build context root
        #[arg(short, long, default_value = ".")]
        context: PathBuf,

        /// Staging subdirectory inside the context
        #[arg(long, default_value = DEFAULT_STAGE_SUBDIR)]
        stage_subdir: String,
    },
    /// Show a manifest's contents
    Show {
        /// Package manifest
        manifest: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
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
            eprintln!("Fatal: Unhandled panic in stager");
            process::exit(EXIT_PANIC);
        }
    }
}

fn default_software_dir(manifest: &std::path::Path) -> PathBuf {
    env_path(ENV_SOFTWARE_DIR).unwrap_or_else(|| {
        manifest
            .parent()
            .map(|p| p.join(DEFAULT_SOFTWARE_SUBDIR))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOFTWARE_SUBDIR))
    })
}

fn run() -> i32 {
    // Handle --version before clap
    if env::args().nth(1).as_deref() == Some("--version") {
        println!("oraimage-stage {}", oraimage::version::full_version());
        return EXIT_SUCCESS;
    }

    let cli = Cli::parse();
    oraimage::logger::JsonLogger::init_from_cli(cli.log_level.as_deref());

    match cli.command {
        Commands::Stage {
            manifest,
            release_update,
            arch,
            product_dir,
            software_dir,
            ru_dir,
            context,
            stage_subdir,
            strict,
        } => {
            let manifest = match (manifest, release_update) {
                (Some(manifest), _) => manifest,
                (None, Some(ru)) => match locate_manifest(&product_dir, &ru, arch) {
                    Ok(path) => path,
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        return exit_code_for(&e);
                    }
                },
                (None, None) => {
                    eprintln!("Error: either --manifest or --ru is required");
                    return EXIT_INVALID_ARGS;
                }
            };
            let base_dir = software_dir.unwrap_or_else(|| default_software_dir(&manifest));
            let mut options = StageOptions::new(manifest, base_dir);
            options.ru_dir = ru_dir;
            options.context_dir = context;
            options.stage_subdir = stage_subdir;

            match stage_build_context(options) {
                Ok(report) => {
                    print_stage_report(&report);
                    if strict && !report.is_complete() {
                        eprintln!(
                            "Error: {} listed file(s) could not be found",
                            report.warnings.len()
                        );
                        EXIT_UNRESOLVED_FILES
                    } else {
                        EXIT_SUCCESS
                    }
                }
                Err(e) => {
                    log::error!("❌ Staging failed: {}", e);
                    eprintln!("Error: {}", e);
                    exit_code_for(&e)
                }
            }
        }
        Commands::Clean {
            context,
            stage_subdir,
        } => match clean_build_context(&context, &stage_subdir) {
            Ok(()) => {
                println!("🧹 Cleaned {}", context.join(&stage_subdir).display());
                EXIT_SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                exit_code_for(&e)
            }
        },
        Commands::Show { manifest, json } => show_manifest(&manifest, json),
    }
}
