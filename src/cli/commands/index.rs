//! `codeindex index` (spec §4.8, §6): builds the deep and shallow
//! indexes for a project path and prints the resulting stats.

use crate::config::Settings;
use crate::engine::CodeIndexEngine;
use std::error::Error;
use std::path::Path;

pub fn run_index(path: &Path, additional_excludes: Vec<String>) -> Result<(), Box<dyn Error>> {
    let settings = Settings::load().unwrap_or_default();
    let mut engine = CodeIndexEngine::new(&settings);

    if !engine.set_project_path(path, additional_excludes) {
        return Err(format!("not a directory: {}", path.display()).into());
    }

    engine.build_index()?;
    let stats = engine.get_index_stats()?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
