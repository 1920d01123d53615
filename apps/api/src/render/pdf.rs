//! A4 PDF output using the built-in Helvetica faces.
//!
//! Layout is a single top-down cursor: every line is measured with the static
//! metric tables, wrapped greedily, and moved to a fresh page when it would
//! cross the bottom margin.

use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

use crate::render::font_metrics::{get_metrics, FontStyle};
use crate::render::{DocumentRenderer, RenderError};
use crate::resume::assemble::{DocumentModel, Header, SectionBody};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MM_PER_PT: f32 = 0.352_778;
const LAYER_NAME: &str = "Layer 1";
const BULLET_MARKER: &str = "-";

/// Page geometry and type sizes, in points.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    pub margin_x_pt: f32,
    pub margin_y_pt: f32,
    pub name_size_pt: f32,
    pub body_size_pt: f32,
    pub small_size_pt: f32,
    /// Baseline-to-baseline distance as a multiple of the font size.
    pub line_height: f32,
    pub bullet_indent_pt: f32,
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self {
            margin_x_pt: 32.0,
            margin_y_pt: 28.0,
            name_size_pt: 18.0,
            body_size_pt: 11.0,
            small_size_pt: 10.0,
            line_height: 1.35,
            bullet_indent_pt: 12.0,
        }
    }
}

impl DocumentRenderer for PdfRenderer {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, doc: &DocumentModel) -> Result<Vec<u8>, RenderError> {
        let (pdf, _pages) = self.layout(doc)?;
        pdf.save_to_bytes()
            .map_err(|e| RenderError::Pdf(format!("{e:?}")))
    }
}

impl PdfRenderer {
    /// Lays the document out, returning the PDF and its page count.
    fn layout(&self, doc: &DocumentModel) -> Result<(PdfDocumentReference, usize), RenderError> {
        let title = match doc.title.trim() {
            "" => "Resume",
            t => t,
        };
        let (pdf, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
        let regular = pdf
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Pdf(format!("{e:?}")))?;
        let bold = pdf
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Pdf(format!("{e:?}")))?;

        let pages = {
            let mut writer = PageWriter {
                pdf: &pdf,
                layer: pdf.get_page(page).get_layer(layer),
                regular,
                bold,
                config: self,
                cursor_mm: PAGE_HEIGHT_MM - self.margin_y_pt * MM_PER_PT,
                pages: 1,
            };

            for section in &doc.sections {
                match &section.body {
                    SectionBody::Header(header) => writer.header(header),
                    body => {
                        writer.section_title(section.kind.title());
                        writer.section_body(body);
                    }
                }
            }
            writer.pages
        };

        Ok((pdf, pages))
    }
}

struct PageWriter<'a> {
    pdf: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    config: &'a PdfRenderer,
    /// Baseline of the last written line, measured from the page bottom.
    cursor_mm: f32,
    pages: usize,
}

impl PageWriter<'_> {
    fn header(&mut self, header: &Header) {
        let cfg = self.config;
        self.paragraph(&header.name, cfg.name_size_pt, FontStyle::Bold, 0.0);
        self.gap_pt(2.0);
        self.paragraph(&header.headline, cfg.body_size_pt, FontStyle::Regular, 0.0);
        if let Some(contact) = &header.contact {
            self.paragraph(contact, cfg.small_size_pt, FontStyle::Regular, 0.0);
        }
        if !header.links.is_empty() {
            let links = header
                .links
                .iter()
                .map(|l| format!("{}: {}", l.label, l.url))
                .collect::<Vec<_>>()
                .join("   ");
            self.paragraph(&links, cfg.small_size_pt, FontStyle::Regular, 0.0);
        }
        self.gap_pt(12.0);
    }

    fn section_title(&mut self, title: &str) {
        // Keep the title on the same page as at least one body line.
        let cfg = self.config;
        self.ensure_space(2.0 * self.line_mm(cfg.body_size_pt));
        self.paragraph(
            &title.to_uppercase(),
            cfg.body_size_pt,
            FontStyle::Bold,
            0.0,
        );
        self.gap_pt(3.0);
    }

    fn section_body(&mut self, body: &SectionBody) {
        let size = self.config.body_size_pt;
        match body {
            SectionBody::Paragraph(text) => self.paragraph(text, size, FontStyle::Regular, 0.0),
            SectionBody::Bullets(items) => {
                for item in items {
                    self.bullet(item, size);
                }
            }
            SectionBody::Composite(blocks) => {
                for block in blocks {
                    self.paragraph(&block.heading, size, FontStyle::Bold, 0.0);
                    for bullet in &block.bullets {
                        self.bullet(bullet, size);
                    }
                    self.gap_pt(3.0);
                }
            }
            SectionBody::Header(header) => self.header(header),
        }
        self.gap_pt(10.0);
    }

    fn paragraph(&mut self, text: &str, size_pt: f32, style: FontStyle, indent_mm: f32) {
        for line in self.wrap(text, size_pt, style, indent_mm) {
            self.line(&line, size_pt, style, indent_mm);
        }
    }

    fn bullet(&mut self, text: &str, size_pt: f32) {
        let indent_mm = self.config.bullet_indent_pt * MM_PER_PT;
        for (i, line) in self
            .wrap(text, size_pt, FontStyle::Regular, indent_mm)
            .into_iter()
            .enumerate()
        {
            self.line(&line, size_pt, FontStyle::Regular, indent_mm);
            if i == 0 {
                self.put(BULLET_MARKER, size_pt, FontStyle::Regular, 0.0);
            }
        }
    }

    fn wrap(&self, text: &str, size_pt: f32, style: FontStyle, indent_mm: f32) -> Vec<String> {
        let width_mm = PAGE_WIDTH_MM - 2.0 * self.config.margin_x_pt * MM_PER_PT - indent_mm;
        let width_em = width_mm / (size_pt * MM_PER_PT);
        get_metrics(style).wrap(&pdf_safe(text), width_em)
    }

    /// Advances the cursor one line and writes `text` on it.
    fn line(&mut self, text: &str, size_pt: f32, style: FontStyle, indent_mm: f32) {
        let line_mm = self.line_mm(size_pt);
        self.ensure_space(line_mm);
        self.cursor_mm -= line_mm;
        self.put(text, size_pt, style, indent_mm);
    }

    /// Writes at the current baseline without moving the cursor.
    fn put(&self, text: &str, size_pt: f32, style: FontStyle, indent_mm: f32) {
        let font = match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
        };
        let x_mm = self.config.margin_x_pt * MM_PER_PT + indent_mm;
        self.layer
            .use_text(text, size_pt, Mm(x_mm), Mm(self.cursor_mm), font);
    }

    fn gap_pt(&mut self, pt: f32) {
        self.cursor_mm -= pt * MM_PER_PT;
    }

    fn line_mm(&self, size_pt: f32) -> f32 {
        size_pt * self.config.line_height * MM_PER_PT
    }

    fn ensure_space(&mut self, needed_mm: f32) {
        let bottom_mm = self.config.margin_y_pt * MM_PER_PT;
        if self.cursor_mm - needed_mm >= bottom_mm {
            return;
        }
        let (page, layer) = self
            .pdf
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
        self.layer = self.pdf.get_page(page).get_layer(layer);
        self.cursor_mm = PAGE_HEIGHT_MM - self.config.margin_y_pt * MM_PER_PT;
        self.pages += 1;
    }
}

/// CP1252 characters in 0x80..=0x9F that WinAnsiEncoding defines.
const WIN_ANSI_EXTRAS: [char; 27] = [
    '€', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', 'Ž', '‘', '’', '“', '”', '•', '–',
    '—', '˜', '™', 'š', '›', 'œ', 'ž', 'Ÿ',
];

/// Keeps what the built-in fonts can encode (WinAnsi: ASCII, Latin-1 and the
/// CP1252 extras). Other whitespace becomes a space, anything else `?`.
fn pdf_safe(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            ' '..='~' | '\u{A0}'..='\u{FF}' => c,
            c if WIN_ANSI_EXTRAS.contains(&c) => c,
            c if c.is_whitespace() => ' ',
            _ => '?',
        })
        .collect()
}
