//! Photo subcommands - attach, list, and remove marker photos.

use clap::Subcommand;
use waymark::marker::{MarkerId, PhotoId};
use waymark::store::MarkerStore;

use super::common;
use crate::error::CliError;

/// Photo subcommands.
#[derive(Debug, Subcommand)]
pub enum PhotoCommands {
    /// Attach a photo to a marker
    Add {
        /// Marker id the photo belongs to
        marker_id: i64,

        /// Photo location (file path or URI)
        uri: String,
    },

    /// List photos attached to a marker
    List {
        /// Marker id
        marker_id: i64,
    },

    /// Remove a photo
    Delete {
        /// Photo id
        photo_id: i64,
    },
}

/// Run a photo subcommand.
pub fn run(command: PhotoCommands) -> Result<(), CliError> {
    let config = common::load_config()?;
    let store = common::open_store(&config)?;

    match command {
        PhotoCommands::Add { marker_id, uri } => {
            let id = store.add_photo(MarkerId(marker_id), &uri)?;
            println!("Attached photo {id} to marker #{marker_id}");
        }
        PhotoCommands::List { marker_id } => {
            let photos = store.list_photos(MarkerId(marker_id))?;
            if photos.is_empty() {
                println!("No photos attached to marker #{marker_id}.");
            }
            for photo in photos {
                println!("{} {}", photo.id, photo.uri);
            }
        }
        PhotoCommands::Delete { photo_id } => {
            store.delete_photo(PhotoId(photo_id))?;
            println!("Deleted photo #{photo_id}");
        }
    }

    Ok(())
}
