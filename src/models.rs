use chrono::NaiveDate;
use rust_decimal::Decimal;

/// One spreadsheet cell, tagged by what the row source could tell about it.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Blank,
    Numeric(Decimal),
    DateTyped(NaiveDate),
    Text(String),
}

static BLANK: CellValue = CellValue::Blank;

impl CellValue {
    /// Blank cells and whitespace-only text both count as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Blank => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Display form used for text matching and diagnostics.
    pub fn display(&self) -> String {
        match self {
            Self::Blank => String::new(),
            Self::Numeric(d) => d.normalize().to_string(),
            Self::DateTyped(d) => d.format("%d/%m/%Y").to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// Trimmed, upper-cased display text.
    pub fn normalized(&self) -> String {
        self.display().trim().to_uppercase()
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Blank
        } else {
            Self::Text(s.to_string())
        }
    }
}

/// Fixed column positions of the cash-book layout.
pub mod columns {
    pub const DATE: usize = 0;
    pub const KIND: usize = 2;
    pub const DESCRIPTION: usize = 3;
    pub const AMOUNT: usize = 4;
    pub const PAYMENT_METHOD: usize = 5;
    pub const NOTE: usize = 6;
}

/// A row as produced by a row source. `line` is 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub line: usize,
    pub cells: Vec<CellValue>,
}

impl RawRow {
    pub fn new(line: usize, cells: Vec<CellValue>) -> Self {
        Self { line, cells }
    }

    /// Cells past the end of the row read as blank.
    pub fn cell(&self, index: usize) -> &CellValue {
        self.cells.get(index).unwrap_or(&BLANK)
    }

    pub fn non_blank_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_blank()).count()
    }

    pub fn dump(&self) -> String {
        self.cells
            .iter()
            .map(|c| if c.is_blank() { "[vazio]".to_string() } else { c.display() })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "ENTRADA",
            Self::Expense => "SAÍDA",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    Debit,
    Credit,
    Pix,
    Cash,
    Pending,
    Transfer,
    Other,
}

pub const ALL_PAYMENT_METHODS: &[PaymentMethod] = &[
    PaymentMethod::Debit,
    PaymentMethod::Credit,
    PaymentMethod::Pix,
    PaymentMethod::Cash,
    PaymentMethod::Pending,
    PaymentMethod::Transfer,
    PaymentMethod::Other,
];

impl PaymentMethod {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
            Self::Pix => "pix",
            Self::Cash => "cash",
            Self::Pending => "pending",
            Self::Transfer => "transfer",
            Self::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Debit => "DÉBITO",
            Self::Credit => "CRÉDITO",
            Self::Pix => "PIX",
            Self::Cash => "DINHEIRO",
            Self::Pending => "EM ABERTO",
            Self::Transfer => "TRANSFERÊNCIA",
            Self::Other => "OUTROS",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        ALL_PAYMENT_METHODS.iter().find(|m| m.key() == key).copied()
    }
}

/// A validated movement. Never constructed without a resolved date.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub description: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub note: String,
}

/// A record as stored in the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: i64,
    pub import_id: Option<i64>,
    pub record: TransactionRecord,
}
