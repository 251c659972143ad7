use std::io::BufWriter;

use printpdf::*;

use crate::error::{CaixaError, Result};
use crate::fmt::{date, money};
use crate::reports::MonthSection;

// A4 landscape (mm)
const PAGE_W: f32 = 297.0;
const PAGE_H: f32 = 210.0;
const MARGIN_TOP: f32 = 20.0;
const MARGIN_BOTTOM: f32 = 20.0;
const MARGIN_LEFT: f32 = 15.0;
const MARGIN_RIGHT: f32 = 15.0;
const ROW_H: f32 = 5.5;
const FONT_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 16.0;
const SUBTITLE_SIZE: f32 = 10.0;

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.18
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Col {
    width: f32,
    align: Align,
}

const STATEMENT_COLS: &[Col] = &[
    Col { width: 30.0, align: Align::Left },
    Col { width: 30.0, align: Align::Left },
    Col { width: 127.0, align: Align::Left },
    Col { width: 40.0, align: Align::Right },
    Col { width: 40.0, align: Align::Left },
];

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    current_page: PdfPageIndex,
    current_layer: PdfLayerIndex,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| CaixaError::Pdf(format!("{e:?}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| CaixaError::Pdf(format!("{e:?}")))?;
        Ok(Self {
            doc,
            font,
            font_bold,
            current_page: page,
            current_layer: layer,
            y: MARGIN_TOP,
        })
    }

    fn pdf_y(&self) -> f32 {
        PAGE_H - self.y
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer");
        self.current_page = page;
        self.current_layer = layer;
        self.y = MARGIN_TOP;
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y + needed > PAGE_H - MARGIN_BOTTOM {
            self.new_page();
        }
    }

    fn text(&self, s: &str, x: f32, size: f32, bold: bool) {
        let font = if bold { &self.font_bold } else { &self.font };
        let layer = self.doc.get_page(self.current_page).get_layer(self.current_layer);
        layer.use_text(s, size, Mm(x), Mm(self.pdf_y()), font);
    }

    fn hline(&self, x1: f32, x2: f32) {
        let layer = self.doc.get_page(self.current_page).get_layer(self.current_layer);
        layer.set_outline_thickness(0.5);
        let line = Line {
            points: vec![
                (Point::new(Mm(x1), Mm(self.pdf_y())), false),
                (Point::new(Mm(x2), Mm(self.pdf_y())), false),
            ],
            is_closed: false,
        };
        layer.add_line(line);
    }

    fn title(&mut self, title: &str, owner: &str) {
        self.text(title, MARGIN_LEFT, TITLE_SIZE, true);
        self.y += 7.0;
        if !owner.is_empty() {
            self.text(owner, MARGIN_LEFT, SUBTITLE_SIZE, false);
            self.y += 5.0;
        }
        let ts = chrono::Local::now().format("Gerado em %d/%m/%Y %H:%M").to_string();
        self.text(&ts, MARGIN_LEFT, 8.0, false);
        self.y += 5.0;
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 5.0;
    }

    fn row(&mut self, cols: &[Col], values: &[&str], bold: bool) {
        self.ensure_space(ROW_H);
        let mut x = MARGIN_LEFT;
        for (col, value) in cols.iter().zip(values) {
            match col.align {
                Align::Left => self.text(value, x, FONT_SIZE, bold),
                Align::Right => {
                    let tw = approx_text_width(value, FONT_SIZE);
                    self.text(value, x + col.width - tw, FONT_SIZE, bold);
                }
            }
            x += col.width;
        }
        self.y += ROW_H;
    }

    fn table_header(&mut self, cols: &[Col], headers: &[&str]) {
        self.ensure_space(ROW_H * 2.0);
        self.row(cols, headers, true);
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 2.0;
    }

    fn blank_row(&mut self) {
        self.y += ROW_H;
    }

    fn separator(&mut self) {
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 2.0;
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| CaixaError::Pdf(format!("{e:?}")))?;
        buf.into_inner().map_err(|e| CaixaError::Pdf(e.to_string()))
    }
}

fn render_month(pdf: &mut PdfWriter, section: &MonthSection) {
    pdf.ensure_space(ROW_H * 4.0);
    pdf.text(&section.label(), MARGIN_LEFT, 13.0, true);
    pdf.y += 8.0;
    pdf.table_header(STATEMENT_COLS, &["Data", "Tipo", "Descrição", "Valor", "Pagamento"]);
    for t in &section.transactions {
        let r = &t.record;
        let d = date(r.date);
        let amount = money(r.amount);
        pdf.row(
            STATEMENT_COLS,
            &[&d, r.kind.label(), &r.description, &amount, r.payment_method.label()],
            false,
        );
    }
    pdf.separator();

    let totals = &section.totals;
    let summary_cols = &[
        Col { width: 187.0, align: Align::Left },
        Col { width: 40.0, align: Align::Right },
    ];
    let income = money(totals.income);
    let expenses = money(totals.expenses);
    let balance = money(totals.balance());
    pdf.row(summary_cols, &["Entradas", &income], false);
    pdf.row(summary_cols, &["Saídas", &expenses], false);
    pdf.row(summary_cols, &["Saldo", &balance], true);
}

/// One section per month; each month after the first starts a new page.
pub fn render_statement(months: &[MonthSection], owner: &str) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new("Extrato")?;
    pdf.title("Extrato financeiro", owner);
    if months.is_empty() {
        pdf.text("Nenhuma transação registrada.", MARGIN_LEFT, FONT_SIZE, false);
        pdf.blank_row();
    }
    for (i, section) in months.iter().enumerate() {
        if i > 0 {
            pdf.new_page();
        }
        render_month(&mut pdf, section);
    }
    pdf.to_bytes()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::{PaymentMethod, Transaction, TransactionKind, TransactionRecord};
    use crate::reports::group_by_month;

    fn txn(id: i64, m: u32, kind: TransactionKind) -> Transaction {
        Transaction {
            id,
            import_id: None,
            record: TransactionRecord {
                date: NaiveDate::from_ymd_opt(2024, m, 1).unwrap(),
                kind,
                description: format!("item {id}"),
                amount: Decimal::new(10050, 2),
                payment_method: PaymentMethod::Pix,
                note: String::new(),
            },
        }
    }

    #[test]
    fn test_render_statement_produces_pdf() {
        let months = group_by_month(vec![
            txn(1, 3, TransactionKind::Income),
            txn(2, 3, TransactionKind::Expense),
            txn(3, 4, TransactionKind::Expense),
        ]);
        let bytes = render_statement(&months, "Ana").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_empty_statement() {
        let bytes = render_statement(&[], "").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_month_spills_onto_new_pages() {
        let many: Vec<Transaction> = (0..80).map(|i| txn(i, 5, TransactionKind::Expense)).collect();
        let bytes = render_statement(&group_by_month(many), "").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
