use std::{fs::File, io::BufWriter, path::Path};

use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook};

use spendlog_core::{format_date, models::EXPENSE_COLUMNS, ExpenseRecord};

use crate::export_registry::{ExportError, Exporter};

fn record_fields(r: &ExpenseRecord) -> [String; 7] {
    [
        r.id.to_string(),
        format_date(r.date),
        r.payee.to_string(),
        r.description.to_string(),
        r.category.to_string(),
        r.amount.to_string(),
        r.mode.to_string(),
    ]
}

pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn export(&self, records: &[ExpenseRecord], destination: &Path) -> Result<(), ExportError> {
        let mut wtr = csv::Writer::from_path(destination)?;
        wtr.write_record(EXPENSE_COLUMNS)?;
        for record in records {
            wtr.write_record(record_fields(record))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

pub struct XlsxExporter;

impl Exporter for XlsxExporter {
    fn export(&self, records: &[ExpenseRecord], destination: &Path) -> Result<(), ExportError> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Expenses")?;

        for (col, title) in EXPENSE_COLUMNS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *title, &header)?;
        }

        for (i, r) in records.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet.write_number(row, 0, r.id as f64)?;
            sheet.write_string(row, 1, &format_date(r.date))?;
            sheet.write_string(row, 2, r.payee.as_ref())?;
            sheet.write_string(row, 3, r.description.as_ref())?;
            sheet.write_string(row, 4, r.category.as_ref())?;
            sheet.write_number(row, 5, r.amount.to_f64().unwrap_or_default())?;
            sheet.write_string(row, 6, r.mode.as_ref())?;
        }

        workbook.save(destination)?;
        Ok(())
    }
}

/// Bordered grid of fixed-size cells on A4 pages, header repeated on every page.
pub struct PdfExporter {
    page_width: f32,
    page_height: f32,
    margin: f32,
    cell_width: f32,
    cell_height: f32,
    font_size: f32,
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin: 10.0,
            cell_width: 27.0,
            cell_height: 10.0,
            font_size: 10.0,
        }
    }
}

impl PdfExporter {
    /// Rows that fit on one page, header included.
    pub fn rows_per_page(&self) -> usize {
        (((self.page_height - 2.0 * self.margin) / self.cell_height).floor() as usize).max(2)
    }

    /// Widest text that stays inside a cell at the configured font size.
    fn max_chars(&self) -> usize {
        // Helvetica averages roughly half an em per glyph
        let glyph_mm = self.font_size * 0.5 * 0.3528;
        ((self.cell_width - 2.0) / glyph_mm).floor() as usize
    }

    fn fit(&self, text: &str) -> String {
        let max = self.max_chars();
        if text.chars().count() <= max {
            return text.to_string();
        }
        let mut cut: String = text.chars().take(max.saturating_sub(2)).collect();
        cut.push_str("..");
        cut
    }

    fn draw_row(&self, layer: &PdfLayerReference, font: &IndirectFontRef, row: usize, cells: &[String]) {
        let top = self.page_height - self.margin - row as f32 * self.cell_height;
        let bottom = top - self.cell_height;

        for (col, value) in cells.iter().enumerate() {
            let left = self.margin + col as f32 * self.cell_width;
            let right = left + self.cell_width;

            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(left), Mm(bottom)), false),
                    (Point::new(Mm(right), Mm(bottom)), false),
                    (Point::new(Mm(right), Mm(top)), false),
                    (Point::new(Mm(left), Mm(top)), false),
                ],
                is_closed: true,
            });
            layer.use_text(self.fit(value), self.font_size, Mm(left + 1.0), Mm(bottom + 3.5), font);
        }
    }
}

impl Exporter for PdfExporter {
    fn export(&self, records: &[ExpenseRecord], destination: &Path) -> Result<(), ExportError> {
        let (doc, page, layer) = PdfDocument::new(
            "Expense Report",
            Mm(self.page_width),
            Mm(self.page_height),
            "Expenses",
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::Document(format!("{:?}", e)))?;

        let header: Vec<String> = EXPENSE_COLUMNS.iter().map(|c| c.to_string()).collect();
        let body_rows = self.rows_per_page() - 1;

        let mut layer_ref = doc.get_page(page).get_layer(layer);
        for (chunk_index, chunk) in records.chunks(body_rows).enumerate() {
            if chunk_index > 0 {
                let (next_page, next_layer) =
                    doc.add_page(Mm(self.page_width), Mm(self.page_height), "Expenses");
                layer_ref = doc.get_page(next_page).get_layer(next_layer);
            }

            self.draw_row(&layer_ref, &font, 0, &header);
            for (i, record) in chunk.iter().enumerate() {
                self.draw_row(&layer_ref, &font, i + 1, &record_fields(record));
            }
        }

        let file = File::create(destination)?;
        doc.save(&mut BufWriter::new(file))
            .map_err(|e| ExportError::Document(format!("{:?}", e)))?;
        Ok(())
    }
}
