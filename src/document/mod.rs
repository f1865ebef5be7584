//! Contract document renderer.
//!
//! Turns a [`Contract`] into a paginated PDF in two phases: the layout engine
//! places every element onto pages as draw operations, then the PDF engine
//! serialises those pages. The only I/O is reading the optional logo.

pub mod clauses;
pub mod common;
pub mod decor;
pub mod engine;
pub mod layout;
pub mod metrics;
pub mod style;
pub mod traits;

pub use clauses::{contract_clauses, Clause};
pub use engine::{LogoImage, PdfRenderEngine};
pub use layout::{DrawOp, Extent, Page, Region};
pub use style::{PageGeometry, PageSize};
pub use traits::Generator;

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

use crate::contract::model::Contract;
use common::contract_filename;
use layout::LayoutEngine;
use style::{Margins, DOCUMENT_TITLE, RESERVED_FOOTER};

/// Errors that can occur during document generation.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read logo: {0}")]
    LogoIo(#[source] std::io::Error),
    #[error("failed to decode logo: {0}")]
    LogoDecode(#[from] image::ImageError),
    #[error("document produced no pages")]
    EmptyDocument,
}

/// Result of a successful document generation.
#[derive(Debug)]
pub struct GeneratedDocument {
    pub filename: String,
    pub pdf: Vec<u8>,
    pub page_count: usize,
    pub dateline: String,
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub page_size: PageSize,
    pub margins: Margins,
    /// Logo drawn in the header; skipped when `None`.
    pub logo_path: Option<PathBuf>,
    /// Date printed in the dateline.
    pub today: NaiveDate,
}

impl RenderOptions {
    pub fn new(page_size: PageSize, today: NaiveDate) -> Self {
        Self {
            page_size,
            margins: Margins::default(),
            logo_path: None,
            today,
        }
    }

    pub fn with_logo(mut self, logo_path: Option<PathBuf>) -> Self {
        self.logo_path = logo_path;
        self
    }
}

/// Laid-out pages before serialisation.
#[derive(Debug, Clone)]
pub struct Composition {
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
    pub dateline: String,
}

/// Generator for the service contract document.
pub struct ContractGenerator {
    options: RenderOptions,
}

impl ContractGenerator {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    fn load_logo(&self) -> Result<Option<LogoImage>, RenderError> {
        match &self.options.logo_path {
            Some(path) if path.is_file() => LogoImage::load(path).map(Some),
            Some(path) => {
                log::debug!("logo {} not found, header drawn without it", path.display());
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Run the layout phase only.
    pub fn compose(&self, contract: &Contract) -> Result<Composition, RenderError> {
        let logo = self.load_logo()?;
        Ok(self.compose_with_logo(contract, logo.as_ref()))
    }

    fn compose_with_logo(&self, contract: &Contract, logo: Option<&LogoImage>) -> Composition {
        let geometry = PageGeometry::new(self.options.page_size, self.options.margins);
        let mut layout = LayoutEngine::new(geometry, RESERVED_FOOTER);

        decor::draw_header(&mut layout, logo);
        let dateline = decor::draw_title_block(&mut layout, self.options.today);
        decor::draw_detail_block(&mut layout, contract);
        decor::draw_clauses(&mut layout, &contract_clauses(contract));
        decor::draw_closing(&mut layout, &contract.nome);
        decor::draw_footer(&mut layout, contract);

        Composition {
            geometry,
            pages: layout.finish(),
            dateline,
        }
    }
}

impl Generator<Contract> for ContractGenerator {
    fn generate(&self, contract: &Contract) -> Result<GeneratedDocument, RenderError> {
        let logo = self.load_logo()?;
        let composition = self.compose_with_logo(contract, logo.as_ref());
        if composition.pages.is_empty() {
            return Err(RenderError::EmptyDocument);
        }

        let pdf = PdfRenderEngine::render(
            &composition.pages,
            &composition.geometry,
            logo.as_ref(),
            DOCUMENT_TITLE,
        );
        log::debug!(
            "rendered contract {} into {} page(s), {} bytes",
            contract.id,
            composition.pages.len(),
            pdf.len()
        );

        Ok(GeneratedDocument {
            filename: contract_filename(&contract.nome),
            pdf,
            page_count: composition.pages.len(),
            dateline: composition.dateline,
        })
    }
}
