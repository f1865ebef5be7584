//! Constants table for the contract document.
//!
//! Margins, font sizes, gaps and fixed literals live here so the layout code
//! stays free of magic numbers.

use std::str::FromStr;

use super::metrics::Font;

/// One centimetre in PDF points.
pub const CM: f32 = 72.0 / 2.54;

/// Height unit used for the signature reservation.
pub const UNIT_BLOCK: f32 = 2.0 * CM;

pub const MARGIN: f32 = 2.0 * CM;
/// Space kept free above the bottom margin while flowing body text.
pub const RESERVED_FOOTER: f32 = 4.0 * CM;

pub const LOGO_WIDTH: f32 = 3.5 * CM;
pub const LOGO_FILE: &str = "logo.png";

pub const HEADER_TEXT_GAP: f32 = 0.2 * CM;
pub const DIVIDER_GAP: f32 = 0.5 * CM;
pub const DIVIDER_WIDTH: f32 = 0.8;
pub const TITLE_GAP: f32 = 1.0 * CM;
pub const DATELINE_GAP: f32 = 0.5 * CM;
pub const SECTION_GAP: f32 = 0.3 * CM;
pub const ROW_GAP: f32 = 0.2 * CM;
pub const PARAGRAPH_GAP: f32 = 0.2 * CM;
pub const CLAUSE_GAP: f32 = 0.4 * CM;
pub const ACCEPTANCE_GAP: f32 = 1.0 * CM;

/// Gap between the two data columns of the detail block.
pub const COLUMN_GUTTER: f32 = 0.6 * CM;
/// Share of a data column given to labels.
pub const LABEL_SHARE: f32 = 0.42;
pub const LABEL_PADDING: f32 = 4.0;

pub const SIGNATURE_DROP: f32 = 2.0 * CM;
pub const SIGNATURE_LINE_LENGTH: f32 = 6.0 * CM;
pub const SIGNATURE_LABEL_GAP: f32 = 0.2 * CM;
/// Longer party names are cut with an ellipsis so the closing block stays
/// within three unit blocks.
pub const SIGNATURE_NAME_MAX_LINES: usize = 3;

/// Distance from the bottom margin down to the top of a one-line footer.
pub const FOOTER_OFFSET: f32 = 0.5 * CM;

pub const COMPANY_NAME: &str = "M.A. Automatização";
pub const COMPANY_CNPJ: &str = "27.857.310/0001-83";
pub const LOCATION: &str = "São Paulo";

pub const DOCUMENT_TITLE: &str = "CONTRATO DE PRESTAÇÃO DE SERVIÇOS";
pub const DETAIL_HEADING: &str = "Informações do Contrato";
pub const ACCEPTANCE_TEXT: &str = "Li e concordo com os termos do contrato.";
pub const COMPANY_SIGNATURE_LABEL: &str = "Assinatura Empresa";
pub const PARTY_SIGNATURE_LABEL: &str = "Assinatura Contratante";

pub const END_DATE_UNDEFINED: &str = "Não definido";
pub const INDEX_NOT_INFORMED: &str = "Não Informado";

/// Font, size and line height of a run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    pub leading: f32,
}

impl TextStyle {
    pub const fn new(font: Font, size: f32, leading: f32) -> Self {
        Self { font, size, leading }
    }
}

pub const COMPANY_STYLE: TextStyle = TextStyle::new(Font::Bold, 15.0, 18.0);
pub const COMPANY_CNPJ_STYLE: TextStyle = TextStyle::new(Font::Regular, 10.0, 12.0);
pub const TITLE_STYLE: TextStyle = TextStyle::new(Font::Bold, 14.0, 17.0);
pub const BODY_STYLE: TextStyle = TextStyle::new(Font::Regular, 11.0, 14.0);
pub const BODY_BOLD_STYLE: TextStyle = TextStyle::new(Font::Bold, 11.0, 14.0);
pub const SECTION_STYLE: TextStyle = TextStyle::new(Font::Bold, 12.0, 15.0);
pub const LABEL_STYLE: TextStyle = TextStyle::new(Font::Bold, 10.0, 12.5);
pub const VALUE_STYLE: TextStyle = TextStyle::new(Font::Regular, 10.0, 12.5);
pub const SIGNATURE_STYLE: TextStyle = TextStyle::new(Font::Regular, 10.0, 12.0);
pub const SIGNATURE_NAME_STYLE: TextStyle = TextStyle::new(Font::Bold, 10.0, 12.0);
pub const FOOTER_STYLE: TextStyle = TextStyle::new(Font::Regular, 8.0, 9.6);

/// Physical page size of the generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    Letter,
    A4,
}

impl PageSize {
    /// Width and height in points.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::Letter => (612.0, 792.0),
            PageSize::A4 => (595.28, 841.89),
        }
    }
}

impl FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "letter" | "us-letter" | "carta" => Ok(PageSize::Letter),
            "a4" => Ok(PageSize::A4),
            other => Err(format!("unknown page size '{other}' (expected letter or a4)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Margins {
    pub const fn all(value: f32) -> Self {
        Self {
            top: value,
            bottom: value,
            left: value,
            right: value,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::all(MARGIN)
    }
}

/// Page size plus margins; everything the layout engine needs to know
/// about the sheet it writes on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margins: Margins,
}

impl PageGeometry {
    pub fn new(size: PageSize, margins: Margins) -> Self {
        let (width, height) = size.dimensions();
        Self {
            width,
            height,
            margins,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width - self.margins.left - self.margins.right
    }

    /// Cursor position at the top of a fresh page.
    pub fn top_y(&self) -> f32 {
        self.height - self.margins.top
    }

    pub fn left_x(&self) -> f32 {
        self.margins.left
    }
}
