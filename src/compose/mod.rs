//! # Page Composers
//!
//! The two document templates. Each composer paints records onto a
//! [`PageCanvas`] and hands back the finished pages for the PDF writer.
//!
//! - [`InvoiceComposer`]: one quotation or invoice on a pre-printed
//!   background, flowing onto extra pages when the item table runs long.
//! - [`ReceiptComposer`]: a batch of shipping receipt stubs stacked down the
//!   page, each block moved whole to the next page when it does not fit.

pub mod invoice;
pub mod receipt;

use std::path::Path;

use crate::canvas::{ImageHandle, PageCanvas};
use crate::error::NotaError;
use crate::image_loader::load_image_file;

pub use invoice::{ComposedInvoice, InvoiceComposer};
pub use receipt::ReceiptComposer;

/// Load an optional image asset and register it on `canvas`.
///
/// An unset path yields `None`. A set path that cannot be read or decoded
/// is an error.
pub(crate) fn register_asset(
    canvas: &mut PageCanvas<'_>,
    path: Option<&Path>,
    what: &str,
) -> Result<Option<ImageHandle>, NotaError> {
    let Some(path) = path else {
        tracing::debug!(asset = what, "no image configured, skipping");
        return Ok(None);
    };
    let image = load_image_file(path)?;
    tracing::debug!(
        asset = what,
        width = image.width_px,
        height = image.height_px,
        "loaded image asset"
    );
    Ok(Some(canvas.add_image(image)))
}
