//! PDF serialisation of laid-out pages.
//!
//! Writes the catalog, page tree, the two standard Type1 fonts and an
//! optional logo image, then replays every page's draw operations into a
//! content stream. Nothing time-dependent is written, so identical pages
//! produce identical bytes.

use image::DynamicImage;
use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str, TextStr};
use std::path::Path;

use super::layout::{DrawOp, Page};
use super::metrics::{encode_win_ansi, Font};
use super::style::PageGeometry;
use super::RenderError;

const LOGO_NAME: Name<'static> = Name(b"Im1");

/// Decoded logo ready to be embedded as an image XObject.
#[derive(Debug, Clone)]
pub struct LogoImage {
    pub width: u32,
    pub height: u32,
    rgb: Vec<u8>,
    alpha: Option<Vec<u8>>,
}

impl LogoImage {
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let bytes = std::fs::read(path).map_err(RenderError::LogoIo)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RenderError> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_image(img))
    }

    /// Split the image into RGB samples and, when present, an alpha mask.
    pub fn from_image(img: DynamicImage) -> Self {
        if img.color().has_alpha() {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            let mut rgb = Vec::with_capacity((width * height * 3) as usize);
            let mut alpha = Vec::with_capacity((width * height) as usize);
            for px in rgba.into_raw().chunks_exact(4) {
                rgb.extend_from_slice(&px[..3]);
                alpha.push(px[3]);
            }
            Self {
                width,
                height,
                rgb,
                alpha: Some(alpha),
            }
        } else {
            let rgb = img.to_rgb8();
            let (width, height) = rgb.dimensions();
            Self {
                width,
                height,
                rgb: rgb.into_raw(),
                alpha: None,
            }
        }
    }

    /// Height divided by width.
    pub fn aspect_ratio(&self) -> f32 {
        if self.width == 0 {
            return 0.0;
        }
        self.height as f32 / self.width as f32
    }
}

/// Sequential object id allocator.
struct RefAlloc(i32);

impl RefAlloc {
    fn next(&mut self) -> Ref {
        let id = Ref::new(self.0);
        self.0 += 1;
        id
    }
}

/// Stateless engine turning pages into PDF bytes.
pub struct PdfRenderEngine;

impl PdfRenderEngine {
    pub fn render(
        pages: &[Page],
        geometry: &PageGeometry,
        logo: Option<&LogoImage>,
        title: &str,
    ) -> Vec<u8> {
        let mut alloc = RefAlloc(1);
        let catalog_id = alloc.next();
        let tree_id = alloc.next();
        let regular_id = alloc.next();
        let bold_id = alloc.next();
        let info_id = alloc.next();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(tree_id);
        pdf.document_info(info_id).title(TextStr(title));

        for (font, id) in [(Font::Regular, regular_id), (Font::Bold, bold_id)] {
            pdf.type1_font(id)
                .base_font(font.base_font())
                .encoding_predefined(Name(b"WinAnsiEncoding"));
        }

        let logo_id = logo.map(|logo| write_logo(&mut pdf, &mut alloc, logo));

        let mut page_ids = Vec::with_capacity(pages.len());
        for page in pages {
            let page_id = alloc.next();
            let content_id = alloc.next();
            page_ids.push(page_id);

            let uses_logo = page.ops.iter().any(|op| matches!(op, DrawOp::Image { .. }));
            let stream = page_content(page);
            pdf.stream(content_id, &stream);

            let mut page_writer = pdf.page(page_id);
            page_writer
                .media_box(Rect::new(0.0, 0.0, geometry.width, geometry.height))
                .parent(tree_id)
                .contents(content_id);
            let mut resources = page_writer.resources();
            resources
                .fonts()
                .pair(Font::Regular.resource_name(), regular_id)
                .pair(Font::Bold.resource_name(), bold_id);
            if let (true, Some(id)) = (uses_logo, logo_id) {
                resources.x_objects().pair(LOGO_NAME, id);
            }
        }

        let count = page_ids.len() as i32;
        pdf.pages(tree_id).kids(page_ids).count(count);

        pdf.finish()
    }
}

fn write_logo(pdf: &mut Pdf, alloc: &mut RefAlloc, logo: &LogoImage) -> Ref {
    let mask_id = logo.alpha.as_ref().map(|alpha| {
        let id = alloc.next();
        let mut mask = pdf.image_xobject(id, alpha);
        mask.width(logo.width as i32);
        mask.height(logo.height as i32);
        mask.color_space().device_gray();
        mask.bits_per_component(8);
        id
    });

    let image_id = alloc.next();
    let mut xobject = pdf.image_xobject(image_id, &logo.rgb);
    xobject.width(logo.width as i32);
    xobject.height(logo.height as i32);
    xobject.color_space().device_rgb();
    xobject.bits_per_component(8);
    if let Some(mask_id) = mask_id {
        xobject.s_mask(mask_id);
    }
    image_id
}

fn page_content(page: &Page) -> Vec<u8> {
    let mut content = Content::new();

    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                font,
                size,
                text,
            } => {
                let encoded = encode_win_ansi(text);
                content.begin_text();
                content.set_font(font.resource_name(), *size);
                content.next_line(*x, *y);
                content.show(Str(&encoded));
                content.end_text();
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
            } => {
                content.set_line_width(*width);
                content.move_to(*x1, *y1);
                content.line_to(*x2, *y2);
                content.stroke();
            }
            DrawOp::Image {
                x,
                y,
                width,
                height,
            } => {
                content.save_state();
                content.transform([*width, 0.0, 0.0, *height, *x, *y]);
                content.x_object(LOGO_NAME);
                content.restore_state();
            }
        }
    }

    content.finish()
}
