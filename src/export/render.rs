//! Replay laid-out pages into a PDF with pdfium.
//!
//! All functions here are blocking; [`super::export_pdf`] calls them from
//! `tokio::task::spawn_blocking`.
//!
//! The pdfium library is bound once per process and shared. It is looked up
//! in this order:
//!
//! 1. `PDFIUM_LIB_PATH`, when set.
//! 2. The platform library name in the working directory.
//! 3. The system library search path.

use super::layout::{DrawOp, PageLayout};
use super::PageGeometry;
use crate::error::CatalogError;
use image::DynamicImage;
use once_cell::sync::OnceCell;
use pdfium_render::prelude::*;
use tracing::{debug, info};

static PDFIUM: OnceCell<Pdfium> = OnceCell::new();

/// The process-wide pdfium instance, binding it on first use.
pub fn pdfium() -> Result<&'static Pdfium, CatalogError> {
    PDFIUM.get_or_try_init(|| bind_pdfium().map(Pdfium::new))
}

fn bind_pdfium() -> Result<Box<dyn PdfiumLibraryBindings>, CatalogError> {
    if let Ok(path) = std::env::var("PDFIUM_LIB_PATH") {
        info!("Binding pdfium from PDFIUM_LIB_PATH={}", path);
        return Pdfium::bind_to_library(&path)
            .map_err(|e| CatalogError::PdfiumBindingFailed(format!("{path}: {e:?}")));
    }

    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| CatalogError::PdfiumBindingFailed(format!("{e:?}")))
}

/// Build a PDF from `pages`. `images[i]` is the image for `DrawOp::Image { index: i }`.
pub fn render_pdf(
    pages: &[PageLayout],
    images: &[DynamicImage],
    geometry: &PageGeometry,
) -> Result<Vec<u8>, CatalogError> {
    let pdfium = pdfium()?;
    let mut document = pdfium
        .create_new_pdf()
        .map_err(|e| CatalogError::ExportFailed(format!("create document: {e:?}")))?;
    let font = document.fonts_mut().helvetica();
    let font_size = PdfPoints::new(geometry.font_size);
    let paper = PdfPagePaperSize::Custom(
        PdfPoints::new(geometry.width),
        PdfPoints::new(geometry.height),
    );

    for (page_no, layout) in pages.iter().enumerate() {
        let mut page = document
            .pages_mut()
            .create_page_at_end(paper)
            .map_err(|e| CatalogError::ExportFailed(format!("page {}: {e:?}", page_no + 1)))?;

        for op in &layout.ops {
            match op {
                DrawOp::Image {
                    index,
                    x,
                    y,
                    width,
                    height,
                } => {
                    let img = images.get(*index).ok_or_else(|| {
                        CatalogError::Internal(format!("no image for layout index {index}"))
                    })?;
                    page.objects_mut()
                        .create_image_object(
                            PdfPoints::new(*x),
                            PdfPoints::new(*y),
                            img,
                            Some(PdfPoints::new(*width)),
                            Some(PdfPoints::new(*height)),
                        )
                        .map_err(|e| {
                            CatalogError::ExportFailed(format!("image on page {}: {e:?}", page_no + 1))
                        })?;
                }
                DrawOp::Text { x, y, text } => {
                    page.objects_mut()
                        .create_text_object(
                            PdfPoints::new(*x),
                            PdfPoints::new(*y),
                            text,
                            font,
                            font_size,
                        )
                        .map_err(|e| {
                            CatalogError::ExportFailed(format!("text on page {}: {e:?}", page_no + 1))
                        })?;
                }
            }
        }
        debug!("Rendered page {} ({} ops)", page_no + 1, layout.ops.len());
    }

    document
        .save_to_bytes()
        .map_err(|e| CatalogError::ExportFailed(format!("serialise: {e:?}")))
}
