//! Fixed decorative elements of the contract document, drawn in order:
//! header, title, dateline, detail block, clauses, acceptance line,
//! signatures and footer.

use chrono::NaiveDate;

use super::clauses::{end_date_text, index_text, Clause};
use super::common::{format_currency, format_date};
use super::engine::LogoImage;
use super::layout::{
    wrap_text, wrap_text_limited, Align, ColumnSpec, DetailRow, LayoutEngine, Region,
};
use super::style::*;
use crate::contract::model::Contract;

/// Logo, company name and CNPJ, followed by the divider.
///
/// The text block is centred against the logo's vertical centre, or hangs
/// from the top margin when there is no logo.
pub fn draw_header(layout: &mut LayoutEngine, logo: Option<&LogoImage>) {
    let geometry = *layout.geometry();
    let top = geometry.top_y();
    let left = geometry.left_x();
    let width = geometry.content_width();

    let text_height = COMPANY_STYLE.leading + HEADER_TEXT_GAP + COMPANY_CNPJ_STYLE.leading;

    let (text_top, logo_bottom) = match logo {
        Some(logo) => {
            let logo_height = LOGO_WIDTH * logo.aspect_ratio();
            let logo_bottom = top - logo_height;
            layout.draw_image(left, logo_bottom, LOGO_WIDTH, logo_height);
            let centre = top - logo_height / 2.0;
            (centre + text_height / 2.0, Some(logo_bottom))
        }
        None => (top, None),
    };

    let below_name = layout.anchored_text(
        COMPANY_NAME,
        COMPANY_STYLE,
        Align::Center,
        left,
        width,
        text_top,
        Region::Header,
    );
    let text_bottom = layout.anchored_text(
        &format!("CNPJ: {COMPANY_CNPJ}"),
        COMPANY_CNPJ_STYLE,
        Align::Center,
        left,
        width,
        below_name - HEADER_TEXT_GAP,
        Region::Header,
    );

    let lowest = logo_bottom.map_or(text_bottom, |bottom| bottom.min(text_bottom));
    let divider_y = lowest - DIVIDER_GAP;
    layout.draw_rule(left, divider_y, left + width, divider_y, DIVIDER_WIDTH);
    layout.set_cursor(divider_y - DIVIDER_GAP);
}

/// Centred title and the right-aligned dateline. Returns the dateline.
pub fn draw_title_block(layout: &mut LayoutEngine, today: NaiveDate) -> String {
    layout.paragraph(DOCUMENT_TITLE, TITLE_STYLE, Align::Center, TITLE_GAP);

    let dateline = format!("{LOCATION}, {}", format_date(Some(today.into()), true));
    layout.paragraph(&dateline, BODY_STYLE, Align::Right, DATELINE_GAP);
    dateline
}

/// Label/value rows of the detail block, in reading order.
pub fn detail_rows(contract: &Contract) -> Vec<DetailRow> {
    vec![
        DetailRow::new("Nome:", &contract.nome),
        DetailRow::new("CNPJ:", &contract.cnpj),
        DetailRow::new("Endereço:", &contract.endereco),
        DetailRow::new("CEP:", &contract.cep),
        DetailRow::new("Estado:", &contract.estado),
        DetailRow::new("Telefone:", &contract.telefone),
        DetailRow::new("Email:", &contract.email),
        DetailRow::new("Valor do Contrato:", format_currency(contract.valor_contrato)),
        DetailRow::new(
            "Início do Contrato:",
            format_date(Some(contract.inicio_contrato.into()), true),
        ),
        DetailRow::new("Término do Contrato:", end_date_text(contract)),
        DetailRow::new("Abrangência do Contrato:", &contract.abrangencia_contrato),
        DetailRow::new("Tipo de Índice de Reajuste:", index_text(contract)),
    ]
}

/// Section heading plus the two-column detail block.
///
/// The first half of the rows goes to the left column.
pub fn draw_detail_block(layout: &mut LayoutEngine, contract: &Contract) {
    let geometry = *layout.geometry();
    layout.ensure_flow_space(SECTION_STYLE.leading + SECTION_GAP + LABEL_STYLE.leading);
    layout.paragraph(DETAIL_HEADING, SECTION_STYLE, Align::Left, SECTION_GAP);

    let rows = detail_rows(contract);
    let split = rows.len().div_ceil(2);
    let (left_rows, right_rows) = rows.split_at(split);

    let column_width = (geometry.content_width() - COLUMN_GUTTER) / 2.0;
    let label_width = column_width * LABEL_SHARE;
    let value_width = column_width - label_width;
    let spec = |x: f32| ColumnSpec {
        x,
        label_width,
        value_width,
        padding: LABEL_PADDING,
    };
    let left = geometry.left_x();

    layout.detail_columns(
        [left_rows, right_rows],
        [spec(left), spec(left + column_width + COLUMN_GUTTER)],
        LABEL_STYLE,
        VALUE_STYLE,
        ROW_GAP,
    );
    layout.advance(SECTION_GAP);
}

pub fn draw_clauses(layout: &mut LayoutEngine, clauses: &[Clause]) {
    for clause in clauses {
        // keep the heading with the first body line
        layout.ensure_flow_space(BODY_BOLD_STYLE.leading + PARAGRAPH_GAP + BODY_STYLE.leading);
        layout.paragraph(&clause.title, BODY_BOLD_STYLE, Align::Left, PARAGRAPH_GAP);
        for paragraph in &clause.paragraphs {
            layout.paragraph(paragraph, BODY_STYLE, Align::Left, PARAGRAPH_GAP);
        }
        layout.advance(CLAUSE_GAP);
    }
}

fn lines_height(text: &str, style: TextStyle, width: f32) -> f32 {
    wrap_text(text, style.font, style.size, width).len() as f32 * style.leading
}

/// Party name as drawn under the signature line.
pub fn signature_name_lines(party_name: &str) -> Vec<String> {
    wrap_text_limited(
        party_name,
        SIGNATURE_NAME_STYLE.font,
        SIGNATURE_NAME_STYLE.size,
        SIGNATURE_LINE_LENGTH,
        SIGNATURE_NAME_MAX_LINES,
    )
}

/// Height of the acceptance line plus both signature blocks.
pub fn closing_height(layout: &LayoutEngine, party_name: &str) -> f32 {
    let width = layout.geometry().content_width();
    let acceptance = lines_height(ACCEPTANCE_TEXT, BODY_STYLE, width);

    let company = lines_height(COMPANY_SIGNATURE_LABEL, SIGNATURE_STYLE, SIGNATURE_LINE_LENGTH);
    let party = signature_name_lines(party_name).len() as f32 * SIGNATURE_NAME_STYLE.leading
        + lines_height(PARTY_SIGNATURE_LABEL, SIGNATURE_STYLE, SIGNATURE_LINE_LENGTH);

    acceptance + ACCEPTANCE_GAP + SIGNATURE_DROP + SIGNATURE_LABEL_GAP + company.max(party)
}

/// Acceptance line and the two signature blocks, never split across pages.
///
/// At least three unit blocks are reserved above the bottom margin.
pub fn draw_closing(layout: &mut LayoutEngine, party_name: &str) {
    let needed = closing_height(layout, party_name).max(3.0 * UNIT_BLOCK);
    layout.keep_together(needed);

    let geometry = *layout.geometry();
    let left = geometry.left_x();
    let width = geometry.content_width();
    let top = layout.cursor();

    let below_acceptance = layout.anchored_text(
        ACCEPTANCE_TEXT,
        BODY_STYLE,
        Align::Left,
        left,
        width,
        top,
        Region::Flow,
    );

    let line_y = below_acceptance - ACCEPTANCE_GAP - SIGNATURE_DROP;
    let right = left + width - SIGNATURE_LINE_LENGTH;
    let label_top = line_y - SIGNATURE_LABEL_GAP;

    layout.draw_rule(left, line_y, left + SIGNATURE_LINE_LENGTH, line_y, DIVIDER_WIDTH);
    let company_bottom = layout.anchored_text(
        COMPANY_SIGNATURE_LABEL,
        SIGNATURE_STYLE,
        Align::Center,
        left,
        SIGNATURE_LINE_LENGTH,
        label_top,
        Region::Flow,
    );

    layout.draw_rule(right, line_y, right + SIGNATURE_LINE_LENGTH, line_y, DIVIDER_WIDTH);
    let below_name = layout.anchored_lines(
        &signature_name_lines(party_name),
        SIGNATURE_NAME_STYLE,
        Align::Center,
        right,
        SIGNATURE_LINE_LENGTH,
        label_top,
        Region::Flow,
    );
    let party_bottom = layout.anchored_text(
        PARTY_SIGNATURE_LABEL,
        SIGNATURE_STYLE,
        Align::Center,
        right,
        SIGNATURE_LINE_LENGTH,
        below_name,
        Region::Flow,
    );

    layout.set_cursor(company_bottom.min(party_bottom));
}

pub fn footer_text(contract: &Contract) -> String {
    format!(
        "{COMPANY_NAME} - {}, {}, {} | Telefone: {} | Email: {}",
        contract.endereco, contract.cep, contract.estado, contract.telefone, contract.email
    )
}

/// Footer on the current (last) page, below the bottom margin.
///
/// The last line keeps the position of a one-line footer; extra lines grow
/// upward and are cut with an ellipsis before reaching the bottom margin.
pub fn draw_footer(layout: &mut LayoutEngine, contract: &Contract) {
    let geometry = *layout.geometry();
    let ceiling = geometry.margins.bottom;
    let floor = (ceiling - FOOTER_OFFSET - FOOTER_STYLE.leading).max(0.0);
    let max_lines = (((ceiling - floor) / FOOTER_STYLE.leading).floor() as usize).max(1);

    let width = geometry.content_width();
    let lines = wrap_text_limited(
        &footer_text(contract),
        FOOTER_STYLE.font,
        FOOTER_STYLE.size,
        width,
        max_lines,
    );
    let top = floor + lines.len() as f32 * FOOTER_STYLE.leading;
    layout.anchored_lines(
        &lines,
        FOOTER_STYLE,
        Align::Center,
        geometry.left_x(),
        width,
        top,
        Region::Footer,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::style::{Margins, PageGeometry, PageSize};

    fn engine() -> LayoutEngine {
        let geometry = PageGeometry::new(PageSize::Letter, Margins::all(MARGIN));
        LayoutEngine::new(geometry, RESERVED_FOOTER)
    }

    fn closing_texts() -> [&'static str; 4] {
        [ACCEPTANCE_TEXT, COMPANY_SIGNATURE_LABEL, "ACME Ltda", PARTY_SIGNATURE_LABEL]
    }

    #[test]
    fn test_closing_moves_to_new_page_below_three_unit_blocks() {
        let mut layout = engine();
        let bottom = layout.geometry().margins.bottom;
        assert!(closing_height(&layout, "ACME Ltda") < 3.0 * UNIT_BLOCK);

        // the block itself would fit, the three unit reservation does not
        layout.set_cursor(bottom + 3.0 * UNIT_BLOCK - 1.0);
        draw_closing(&mut layout, "ACME Ltda");

        let pages = layout.finish();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].texts().count(), 0);
        let texts: Vec<&str> = pages[1].texts().collect();
        for needle in closing_texts() {
            assert!(texts.contains(&needle), "missing {needle} in {texts:?}");
        }
    }

    #[test]
    fn test_closing_stays_when_three_unit_blocks_remain() {
        let mut layout = engine();
        let bottom = layout.geometry().margins.bottom;
        layout.set_cursor(bottom + 3.0 * UNIT_BLOCK + 1.0);
        draw_closing(&mut layout, "ACME Ltda");

        let pages = layout.finish();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].texts().count(), closing_texts().len());
        assert!(pages[0].extents.iter().all(|e| e.bottom >= bottom - 0.01));
    }

    #[test]
    fn test_long_party_name_keeps_closing_within_reservation() {
        let name = "Condomínio Residencial ".repeat(60);
        let layout = engine();
        assert_eq!(signature_name_lines(&name).len(), SIGNATURE_NAME_MAX_LINES);
        assert!(closing_height(&layout, &name) <= 3.0 * UNIT_BLOCK);
    }
}
