//! `codeindex call <tool>` (spec §4.8, §6): ad-hoc invocation of one
//! named operation against an already-built index, printing its JSON
//! result.

use crate::config::Settings;
use crate::engine::CodeIndexEngine;
use serde_json::Value;
use std::error::Error;
use std::path::Path;

pub fn run_call(tool: &str, path: &Path, params: Option<String>) -> Result<(), Box<dyn Error>> {
    let params: Value = match params {
        Some(raw) => serde_json::from_str(&raw)?,
        None => Value::Object(Default::default()),
    };

    let settings = Settings::load().unwrap_or_default();
    let mut engine = CodeIndexEngine::new(&settings);
    if !engine.set_project_path(path, Vec::new()) {
        return Err(format!("not a directory: {}", path.display()).into());
    }
    if engine.load_index().is_err() {
        engine.build_index()?;
    }

    let output = match tool {
        "find_files" => {
            let pattern = params.get("pattern").and_then(Value::as_str).unwrap_or("*");
            serde_json::to_value(engine.find_files(pattern)?)?
        }
        "get_file_summary" => {
            let relative_path = params
                .get("path")
                .and_then(Value::as_str)
                .ok_or("get_file_summary requires a \"path\" parameter")?;
            serde_json::to_value(engine.get_file_summary(relative_path)?)?
        }
        "get_index_stats" => serde_json::to_value(engine.get_index_stats()?)?,
        "get_file_list" => serde_json::to_value(engine.get_file_list())?,
        "search" => {
            let pattern = params
                .get("pattern")
                .and_then(Value::as_str)
                .ok_or("search requires a \"pattern\" parameter")?;
            let start_index = params.get("start_index").and_then(Value::as_u64).unwrap_or(0) as usize;
            let max_results = params.get("max_results").and_then(Value::as_u64).map(|n| n as usize);
            let (rows, pagination) = engine.search(pattern, start_index, max_results)?;
            serde_json::json!({ "rows": rows, "pagination": pagination })
        }
        other => return Err(format!("unknown tool: {other}").into()),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
