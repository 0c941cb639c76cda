//! List command - show all markers.

use console::style;
use waymark::store::MarkerStore;

use super::common;
use crate::error::CliError;

/// Run the list command.
pub fn run(json: bool) -> Result<(), CliError> {
    let config = common::load_config()?;
    let store = common::open_store(&config)?;

    let markers = store.list_markers()?;

    if json {
        let rendered = serde_json::to_string_pretty(&markers)
            .map_err(|e| CliError::Input(e.to_string()))?;
        println!("{rendered}");
        return Ok(());
    }

    if markers.is_empty() {
        println!("No markers saved. Add one with 'waymark add <lat> <lon> <title>'.");
        return Ok(());
    }

    for marker in &markers {
        let photos = store.list_photos(marker.id)?.len();
        let photo_note = match photos {
            0 => String::new(),
            1 => " (1 photo)".to_string(),
            n => format!(" ({n} photos)"),
        };
        println!("{}{}", marker, style(photo_note).dim());
    }

    Ok(())
}
