//! CLI display helpers for manifests and staging results

use super::manifest::PackageManifest;
use super::paths::parse_manifest_file_name;
use super::stager::StageReport;
use std::path::Path;

/// Show a manifest's contents; returns a process exit code
pub fn show_manifest(path: &Path, json: bool) -> i32 {
    log::trace!("show_manifest starting for: {:?}", path);
    let manifest = match PackageManifest::read(path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    if json {
        return match serde_json::to_string_pretty(&manifest) {
            Ok(text) => {
                println!("{}", text);
                0
            }
            Err(e) => {
                eprintln!("Error: Failed to serialize manifest: {}", e);
                1
            }
        };
    }

    println!("📄 Manifest: {}", path.display());
    if let Some((arch, ru)) = parse_manifest_file_name(path) {
        println!("  Architecture: {}", arch);
        println!("  Release update: {}", ru);
    }
    println!();
    for (key, value) in manifest.fields() {
        let shown = if value.is_empty() { "-" } else { value };
        println!("  {:<18} {}", key, shown);
    }
    0
}

/// Print a staging summary
pub fn print_stage_report(report: &StageReport) {
    println!("🚚 Staged into {}", report.stage_dir.display());
    for file in &report.staged {
        println!("  ✓ {} ({} bytes)", file.filename, file.bytes);
    }
    for warning in &report.warnings {
        println!("  ✗ {}", warning);
    }
    println!("🛡️ Ignore file: {}", report.ignore_file.display());
    println!("📄 Manifest in context: {}", report.manifest_in_context);
}
