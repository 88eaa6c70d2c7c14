//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `tdl_core` linkage with a deterministic ping/version check.
//! - Optionally load a save file, verify it and print entity counts, plus a
//!   TaskPaper rendering when a view name is given.
//!
//! Usage: `tdl [SAVE_FILE [VIEW]]`
//!
//! Environment:
//! - `TDL_CONFIG`: path of an engine TOML config; defaults apply when unset.
//! - `TDL_LOG_DIR`: absolute directory for rolling log files; no logging when unset.

use std::process::ExitCode;
use tdl_core::export::as_taskpaper;
use tdl_core::{
    default_log_level, init_logging, load_from_path, Document, EngineConfig, Lookups, Timestamp,
    UidAllocator, ViewFilter, ViewKind,
};

const CONFIG_ENV: &str = "TDL_CONFIG";
const LOG_DIR_ENV: &str = "TDL_LOG_DIR";

fn main() -> ExitCode {
    println!("tdl_core ping={}", tdl_core::ping());
    println!("tdl_core version={}", tdl_core::core_version());

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        return ExitCode::SUCCESS;
    };
    match inspect(&path, args.next().as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("tdl: {message}");
            ExitCode::FAILURE
        }
    }
}

fn inspect(path: &str, view: Option<&str>) -> Result<(), String> {
    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        init_logging(default_log_level(), &log_dir).map_err(|err| err.to_string())?;
    }
    let config = match std::env::var(CONFIG_ENV) {
        Ok(config_path) => EngineConfig::load(&config_path)
            .map_err(|err| format!("cannot use config `{config_path}`: {err}"))?,
        Err(_) => EngineConfig::default(),
    };

    let ids = UidAllocator::new(config.uid_mode);
    let doc = load_from_path(path, &ids, &config.serialization, &config.inbox_name)
        .map_err(|err| format!("cannot load `{path}`: {err}"))?;
    doc.check_is_well_formed()
        .map_err(|err| format!("`{path}` is not well formed: {err}"))?;
    print_counts(&doc);

    if let Some(view) = view {
        let kind: ViewKind = view.parse().map_err(|err| format!("{err}"))?;
        let filter = ViewFilter::new(kind, Lookups::from_document(&doc), Timestamp::now());
        println!("{}", as_taskpaper(&doc, &filter));
    }
    Ok(())
}

fn print_counts(doc: &Document) {
    println!("projects={}", doc.projects().len());
    println!("folders={}", doc.folders().len());
    println!("actions={}", doc.actions().len());
    println!("contexts={}", doc.contexts().len());
    println!("global_notes={}", doc.notes().len());
}
