use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rect, Rgb,
};

use super::layout::{ScoreSheet, SheetCell, RANKING_TITLE};
use super::ReportError;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const ROW_HEIGHT: f32 = 7.0;
const LABEL_COLUMN: f32 = 24.0;
const CELL_PADDING: f32 = 1.5;

const TITLE_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 12.0;

fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn black() -> Color {
    rgb(0.0, 0.0, 0.0)
}

fn render_error(e: impl std::fmt::Display) -> ReportError {
    ReportError::Render(e.to_string())
}

/// Row styling inside the score table
#[derive(Clone, Copy)]
enum RowStyle {
    Header,
    Round,
    Totals,
}

/// Current page plus a top-down cursor, in millimetres from the bottom edge
struct Canvas<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    cursor: f32,
    pages: usize,
}

impl Canvas<'_> {
    fn new_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Page {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = PAGE_HEIGHT - MARGIN;
    }

    /// Starts a new page when `height` no longer fits; returns whether it did
    fn reserve(&mut self, height: f32) -> bool {
        if self.cursor - height < MARGIN {
            self.new_page();
            true
        } else {
            false
        }
    }

    fn paragraph(&mut self, text: &str, size: f32, font: &IndirectFontRef) {
        let line_height = size * 0.3528 + 2.0; // pt → mm plus leading
        self.reserve(line_height);
        self.cursor -= line_height;
        self.layer
            .use_text(text, size, Mm(MARGIN), Mm(self.cursor), font);
    }

    fn gap(&mut self, height: f32) {
        self.cursor -= height;
    }

    fn line(&self, from: (f32, f32), to: (f32, f32)) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(from.0), Mm(from.1)), false),
                (Point::new(Mm(to.0), Mm(to.1)), false),
            ],
            is_closed: false,
        });
    }

    fn fill(&self, x: f32, width: f32, color: Color) {
        self.layer.set_fill_color(color);
        self.layer.add_rect(Rect::new(
            Mm(x),
            Mm(self.cursor - ROW_HEIGHT),
            Mm(x + width),
            Mm(self.cursor),
        ));
        self.layer.set_fill_color(black());
    }

    /// Draws one table row below the cursor with its grid lines
    fn table_row(
        &mut self,
        label: &str,
        cells: &[(&str, bool)],
        cell_width: f32,
        font_size: f32,
        style: RowStyle,
        font: &IndirectFontRef,
    ) {
        let table_width = LABEL_COLUMN + cell_width * cells.len() as f32;
        let top = self.cursor;
        let bottom = top - ROW_HEIGHT;

        match style {
            RowStyle::Header => self.fill(MARGIN, table_width, rgb(0.5, 0.5, 0.5)),
            RowStyle::Totals => self.fill(MARGIN, table_width, rgb(0.68, 0.85, 0.9)),
            RowStyle::Round => self.fill(MARGIN, table_width, rgb(0.96, 0.96, 0.86)),
        }
        for (index, (_, is_winner)) in cells.iter().enumerate() {
            if *is_winner {
                let x = MARGIN + LABEL_COLUMN + cell_width * index as f32;
                self.fill(x, cell_width, rgb(0.56, 0.93, 0.56));
            }
        }

        if let RowStyle::Header = style {
            self.layer.set_fill_color(rgb(0.96, 0.96, 0.96));
        }
        let baseline = bottom + 2.2;
        self.layer.use_text(
            label,
            font_size,
            Mm(MARGIN + CELL_PADDING),
            Mm(baseline),
            font,
        );
        for (index, (text, _)) in cells.iter().enumerate() {
            let x = MARGIN + LABEL_COLUMN + cell_width * index as f32 + CELL_PADDING;
            self.layer
                .use_text(*text, font_size, Mm(x), Mm(baseline), font);
        }
        self.layer.set_fill_color(black());

        self.line((MARGIN, top), (MARGIN + table_width, top));
        self.line((MARGIN, bottom), (MARGIN + table_width, bottom));
        self.line((MARGIN, top), (MARGIN, bottom));
        for column in 0..=cells.len() {
            let x = MARGIN + LABEL_COLUMN + cell_width * column as f32;
            self.line((x, top), (x, bottom));
        }

        self.cursor = bottom;
    }
}

fn cells_of(row: &[SheetCell]) -> Vec<(&str, bool)> {
    row.iter()
        .map(|cell| (cell.text.as_str(), cell.is_winner))
        .collect()
}

/// Renders the score sheet to PDF bytes, breaking the table across pages as needed
pub fn render_pdf(sheet: &ScoreSheet) -> Result<Vec<u8>, ReportError> {
    let (doc, page, layer) = PdfDocument::new(
        sheet.title.as_str(),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Page 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(render_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(render_error)?;

    {
        let mut canvas = Canvas {
            doc: &doc,
            layer: doc.get_page(page).get_layer(layer),
            cursor: PAGE_HEIGHT - MARGIN,
            pages: 1,
        };

        canvas.paragraph(&sheet.title, TITLE_SIZE, &bold);
        canvas.paragraph(&sheet.summary, BODY_SIZE, &regular);
        canvas.gap(6.0);

        let players = sheet.header.len().saturating_sub(1).max(1);
        let cell_width = (PAGE_WIDTH - 2.0 * MARGIN - LABEL_COLUMN) / players as f32;
        let font_size = if players > 6 { 8.0 } else { 10.0 };

        let header_label = sheet.header.first().map(String::as_str).unwrap_or_default();
        let header_cells: Vec<(&str, bool)> = sheet
            .header
            .iter()
            .skip(1)
            .map(|name| (name.as_str(), false))
            .collect();

        canvas.reserve(ROW_HEIGHT * 2.0);
        canvas.table_row(
            header_label,
            &header_cells,
            cell_width,
            font_size,
            RowStyle::Header,
            &bold,
        );

        for row in &sheet.rounds {
            if canvas.reserve(ROW_HEIGHT) {
                canvas.table_row(
                    header_label,
                    &header_cells,
                    cell_width,
                    font_size,
                    RowStyle::Header,
                    &bold,
                );
            }
            canvas.table_row(
                &row.label,
                &cells_of(&row.cells),
                cell_width,
                font_size,
                RowStyle::Round,
                &regular,
            );
        }

        canvas.reserve(ROW_HEIGHT);
        canvas.table_row(
            &sheet.totals.label,
            &cells_of(&sheet.totals.cells),
            cell_width,
            font_size,
            RowStyle::Totals,
            &bold,
        );

        canvas.gap(8.0);
        canvas.paragraph(RANKING_TITLE, HEADING_SIZE, &bold);
        for line in &sheet.ranking {
            canvas.paragraph(line, BODY_SIZE, &regular);
        }

        canvas.gap(6.0);
        canvas.paragraph(&sheet.generated_at, BODY_SIZE, &regular);
    }

    doc.save_to_bytes().map_err(render_error)
}
