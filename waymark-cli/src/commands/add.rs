//! Add command - create a new marker.

use console::style;
use waymark::store::MarkerStore;

use super::common;
use crate::error::CliError;

/// Run the add command.
pub fn run(latitude: f64, longitude: f64, title: &str) -> Result<(), CliError> {
    let config = common::load_config()?;
    let store = common::open_store(&config)?;

    let id = store.add_marker(latitude, longitude, title)?;
    let marker = store.get_marker(id)?;

    println!("Added {}", style(&marker).green());
    Ok(())
}
