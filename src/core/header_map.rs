//! Spreadsheet header dictionary.
//!
//! POS exports rename columns between versions and locales, so headers are normalised
//! (whitespace removed) and looked up in an explicit alias table. Headers the table does
//! not know pass through under their own text so new columns survive extraction.

use crate::errors::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Canonical fields of a sold line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Business day
    OrderBaseDate,
    /// POS order number
    OrderNumber,
    /// Order open timestamp
    OrderStartTime,
    /// Sales channel
    OrderChannel,
    /// Payment status
    PaymentStatus,
    /// Category name
    CategoryName,
    /// Product name
    ProductName,
    /// Units sold
    Quantity,
    /// Unit price
    UnitPrice,
    /// Option name
    OptionName,
    /// Option surcharge
    OptionPrice,
    /// Product discount
    ProductDiscount,
    /// Order discount
    OrderDiscount,
    /// Realized sales amount
    ActualSalesAmount,
    /// Tax classification
    TaxType,
    /// VAT amount
    VatAmount,
}

impl Field {
    /// Every canonical field, in record order.
    pub const ALL: [Self; 16] = [
        Self::OrderBaseDate,
        Self::OrderNumber,
        Self::OrderStartTime,
        Self::OrderChannel,
        Self::PaymentStatus,
        Self::CategoryName,
        Self::ProductName,
        Self::Quantity,
        Self::UnitPrice,
        Self::OptionName,
        Self::OptionPrice,
        Self::ProductDiscount,
        Self::OrderDiscount,
        Self::ActualSalesAmount,
        Self::TaxType,
        Self::VatAmount,
    ];

    /// Fields a row must carry to become a record.
    pub const REQUIRED: [Self; 2] = [Self::OrderNumber, Self::ProductName];

    /// Canonical (camelCase) field name, as used in processed JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrderBaseDate => "orderBaseDate",
            Self::OrderNumber => "orderNumber",
            Self::OrderStartTime => "orderStartTime",
            Self::OrderChannel => "orderChannel",
            Self::PaymentStatus => "paymentStatus",
            Self::CategoryName => "categoryName",
            Self::ProductName => "productName",
            Self::Quantity => "quantity",
            Self::UnitPrice => "unitPrice",
            Self::OptionName => "optionName",
            Self::OptionPrice => "optionPrice",
            Self::ProductDiscount => "productDiscount",
            Self::OrderDiscount => "orderDiscount",
            Self::ActualSalesAmount => "actualSalesAmount",
            Self::TaxType => "taxType",
            Self::VatAmount => "vatAmount",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| Error::Config {
                message: format!("Unknown canonical field '{s}'"),
            })
    }
}

/// Where a column's values end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A canonical field
    Field(Field),
    /// Unknown column, kept under this (deduplicated) name
    Passthrough(String),
}

const BUILTIN_ALIASES: &[(&str, Field)] = &[
    ("주문기준일자", Field::OrderBaseDate),
    ("주문일자", Field::OrderBaseDate),
    ("주문기준날짜", Field::OrderBaseDate),
    ("주문기준일시", Field::OrderBaseDate),
    ("주문번호", Field::OrderNumber),
    ("주문시작시각", Field::OrderStartTime),
    ("주문시작시각(시분초)", Field::OrderStartTime),
    ("주문시작시간", Field::OrderStartTime),
    ("주문채널", Field::OrderChannel),
    ("결제상태", Field::PaymentStatus),
    ("카테고리", Field::CategoryName),
    ("상품명", Field::ProductName),
    ("수량", Field::Quantity),
    ("상품가격", Field::UnitPrice),
    ("옵션", Field::OptionName),
    ("옵션명", Field::OptionName),
    ("옵션가격", Field::OptionPrice),
    ("상품할인금액", Field::ProductDiscount),
    ("주문할인금액", Field::OrderDiscount),
    ("실판매금액", Field::ActualSalesAmount),
    ("실판매금액(할인,옵션포함)", Field::ActualSalesAmount),
    ("실판매금액(할인옵션포함)", Field::ActualSalesAmount),
    ("과세여부", Field::TaxType),
    ("부가세액", Field::VatAmount),
];

/// Collapses a header cell into its lookup form: line breaks and all whitespace removed.
#[must_use]
pub fn normalize_header(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Header text → canonical field dictionary.
#[derive(Debug, Clone)]
pub struct HeaderMap {
    aliases: HashMap<String, Field>,
}

impl Default for HeaderMap {
    fn default() -> Self {
        let mut aliases: HashMap<String, Field> = BUILTIN_ALIASES
            .iter()
            .map(|(header, field)| (normalize_header(header), *field))
            .collect();
        // Exports that already use canonical names map onto themselves.
        for field in Field::ALL {
            aliases.insert(field.as_str().to_string(), field);
        }
        Self { aliases }
    }
}

impl HeaderMap {
    /// Adds or replaces an alias. Later aliases win over built-in ones.
    pub fn insert_alias(&mut self, header: &str, field: Field) {
        self.aliases.insert(normalize_header(header), field);
    }

    /// Looks up a single header.
    #[must_use]
    pub fn lookup(&self, header: &str) -> Option<Field> {
        self.aliases.get(&normalize_header(header)).copied()
    }

    /// Resolves a whole header row into column targets.
    ///
    /// A field that appears twice keeps its first column; later duplicates and repeated
    /// unknown headers are passed through with a `_2`, `_3`, … suffix.
    #[must_use]
    pub fn resolve(&self, headers: &[String]) -> Vec<Target> {
        let mut seen_fields = HashSet::new();
        let mut seen_names = HashSet::new();
        headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                let trimmed = header.trim();
                if let Some(field) = self.lookup(trimmed)
                    && seen_fields.insert(field)
                {
                    return Target::Field(field);
                }
                let base = if trimmed.is_empty() {
                    format!("column_{}", index + 1)
                } else {
                    trimmed.to_string()
                };
                let mut name = base.clone();
                let mut suffix = 2;
                while !seen_names.insert(name.clone()) {
                    name = format!("{base}_{suffix}");
                    suffix += 1;
                }
                Target::Passthrough(name)
            })
            .collect()
    }

    /// Required fields absent from a resolved header row.
    #[must_use]
    pub fn missing_required(targets: &[Target]) -> Vec<Field> {
        Field::REQUIRED
            .into_iter()
            .filter(|required| !targets.contains(&Target::Field(*required)))
            .collect()
    }
}
