//! Delete and clear commands - remove markers.

use dialoguer::Confirm;
use waymark::marker::MarkerId;
use waymark::store::MarkerStore;

use super::common;
use crate::error::CliError;

/// Run the delete command for a single marker.
pub fn run(id: i64, yes: bool) -> Result<(), CliError> {
    let config = common::load_config()?;
    let store = common::open_store(&config)?;

    let marker_id = MarkerId(id);
    let marker = store.get_marker(marker_id)?;

    if !yes && !confirm(&format!("Delete {marker} and its photos?"))? {
        println!("Aborted.");
        return Ok(());
    }

    store.delete_marker(marker_id)?;
    println!("Deleted {marker}");
    Ok(())
}

/// Run the clear command - delete every marker.
pub fn run_clear(yes: bool) -> Result<(), CliError> {
    let config = common::load_config()?;
    let store = common::open_store(&config)?;

    let count = store.list_markers()?.len();
    if count == 0 {
        println!("No markers to delete.");
        return Ok(());
    }

    if !yes && !confirm(&format!("Delete all {count} markers and their photos?"))? {
        println!("Aborted.");
        return Ok(());
    }

    let removed = store.delete_all_markers()?;
    println!("Deleted {} markers", removed.len());
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool, CliError> {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| CliError::Input(e.to_string()))
}
