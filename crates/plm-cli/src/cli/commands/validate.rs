//! `plm validate` – load and flatten a manifest without downloading.

use anyhow::Result;
use plm_core::manifest::Manifest;
use std::path::Path;

/// Parse the manifest and run the same flatten checks the mirror would
/// (duplicate filenames, unsafe names). Prints the task list on success.
pub fn run_validate(path: &Path) -> Result<()> {
    let manifest = Manifest::from_path(path)?;
    let tasks = manifest.flatten(Path::new("."))?;
    for task in &tasks {
        println!("{}/{}  {}", task.category, task.file_name, task.url);
    }
    println!("{} file(s), manifest OK", tasks.len());
    Ok(())
}
