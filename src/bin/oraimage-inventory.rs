//! oraimage patch inventory binary

use clap::Parser;
use oraimage::exit_codes::{EXIT_PANIC, EXIT_SUCCESS, exit_code_for};
use oraimage::utils::is_env_true;
use oraimage::write_patch_inventory;
use std::{env, panic, path::PathBuf, process};

const VERSION: &str = oraimage::version::VERSION;

#[derive(Parser, Debug)]
#[command(version = VERSION, about = "Write a Markdown inventory of the patch archives in a directory")]
struct Args {
    /// Directory holding the patch archives
    dir: PathBuf,

    /// Output file (defaults to <dir>/PATCHES.md)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite an existing inventory
    #[arg(short, long)]
    force: bool,

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
            eprintln!("Fatal: Unhandled panic in inventory");
            process::exit(EXIT_PANIC);
        }
    }
}

fn run() -> i32 {
    // Handle --version before clap
    if env::args().nth(1).as_deref() == Some("--version") {
        println!("oraimage-inventory {}", oraimage::version::full_version());
        return EXIT_SUCCESS;
    }

    let args = Args::parse();
    oraimage::logger::JsonLogger::init_from_cli(args.log_level.as_deref());

    let force = args.force || is_env_true(oraimage::patches::defaults::ENV_FORCE);
    match write_patch_inventory(&args.dir, args.output.as_deref(), force) {
        Ok(path) => {
            println!("📝 {}", path.display());
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code_for(&e)
        }
    }
}
