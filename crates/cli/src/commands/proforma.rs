//! Proforma export command.
//!
//! # Usage
//!
//! ```bash
//! # Write Proforma-PF-XXXXXXXX.html into the current directory
//! glossy proforma
//!
//! # Into another directory
//! glossy proforma --out exports/
//! ```

use std::path::{Path, PathBuf};

use glossy_cart::Proforma;
use tracing::{info, instrument};

use super::{CommandError, open_cart};
use crate::config::CliConfig;

/// Export the current cart as a proforma document.
///
/// # Errors
///
/// Returns `CommandError::EmptyCart` if there is nothing to export, or an
/// error if rendering or writing the file fails.
#[instrument(skip(config))]
pub fn export(config: &CliConfig, out_dir: &Path) -> Result<PathBuf, CommandError> {
    let (_storage, store) = open_cart(config);
    if store.is_empty() {
        return Err(CommandError::EmptyCart);
    }

    let proforma = Proforma::from_cart(&store);
    let path = proforma.write_to(out_dir, store.config())?;

    info!(
        "Proforma {} written to {} (total {}, valid until {})",
        proforma.reference,
        path.display(),
        store.config().format_price(proforma.total),
        proforma.valid_until()
    );
    Ok(path)
}
