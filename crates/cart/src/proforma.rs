//! Proforma (pre-invoice) export.
//!
//! A [`Proforma`] is a pure projection of the cart at one instant: the
//! lines, the totals block, a reference number and the issue date. It is
//! rendered to a fixed-layout HTML page the shopper can print or send.

use std::path::{Path, PathBuf};

use askama::Template;
use chrono::{DateTime, Days, NaiveDate, Utc};
use glossy_core::Price;
use thiserror::Error;
use tracing::{info, instrument};

use crate::config::CartConfig;
use crate::line::CartLine;
use crate::store::CartStore;
use crate::totals::CartTotals;

/// Days a proforma stays valid after issue.
pub const VALIDITY_DAYS: u64 = 7;

/// Errors produced while exporting a proforma.
#[derive(Debug, Error)]
pub enum ProformaError {
    #[error("Template error: {0}")]
    Render(#[from] askama::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One row of the proforma table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProformaLine {
    pub product_name: String,
    pub variant_label: String,
    pub quantity: u32,
    pub unit_price: Price,
    pub line_total: Price,
}

impl From<&CartLine> for ProformaLine {
    fn from(line: &CartLine) -> Self {
        Self {
            product_name: line.product.name.clone(),
            variant_label: line.selected_variant.tone_name.clone(),
            quantity: line.quantity,
            unit_price: line.selected_variant.price,
            line_total: line.line_total(),
        }
    }
}

/// Snapshot of a cart prepared for export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proforma {
    pub reference: String,
    pub issued_at: DateTime<Utc>,
    pub lines: Vec<ProformaLine>,
    pub subtotal: Price,
    pub shipping_fee: Price,
    pub total: Price,
}

impl Proforma {
    /// Build a proforma from cart lines and their totals.
    #[must_use]
    pub fn new(lines: &[CartLine], totals: &CartTotals, issued_at: DateTime<Utc>) -> Self {
        Self {
            reference: reference_for(issued_at),
            issued_at,
            lines: lines.iter().map(ProformaLine::from).collect(),
            subtotal: totals.subtotal,
            shipping_fee: totals.shipping_fee,
            total: totals.total,
        }
    }

    /// Build a proforma from the store's current contents, issued now.
    #[must_use]
    pub fn from_cart(cart: &CartStore) -> Self {
        let lines = cart.items();
        let totals = CartTotals::compute(&lines, &cart.config().shipping);
        Self::new(&lines, &totals, Utc::now())
    }

    #[must_use]
    pub fn issued_on(&self) -> NaiveDate {
        self.issued_at.date_naive()
    }

    /// Last day the proforma is valid.
    #[must_use]
    pub fn valid_until(&self) -> NaiveDate {
        let issued = self.issued_on();
        issued
            .checked_add_days(Days::new(VALIDITY_DAYS))
            .unwrap_or(issued)
    }

    #[must_use]
    pub fn ships_free(&self) -> bool {
        self.shipping_fee.is_zero()
    }

    /// Suggested download name.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("Proforma-{}.html", self.reference)
    }

    /// Render the document.
    ///
    /// # Errors
    ///
    /// Returns `ProformaError::Render` if the template fails to render.
    pub fn render(&self, config: &CartConfig) -> Result<String, ProformaError> {
        let fmt = |price: Price| config.format_price(price);

        let template = ProformaTemplate {
            store_name: &config.store_name,
            reference: &self.reference,
            issued_on: self.issued_on().format("%d %B %Y").to_string(),
            valid_until: self.valid_until().format("%d %B %Y").to_string(),
            validity_days: VALIDITY_DAYS,
            rows: self
                .lines
                .iter()
                .map(|line| ProformaRow {
                    product_name: &line.product_name,
                    variant_label: &line.variant_label,
                    quantity: line.quantity,
                    unit_price: fmt(line.unit_price),
                    line_total: fmt(line.line_total),
                })
                .collect(),
            subtotal: fmt(self.subtotal),
            shipping: if self.ships_free() {
                "FREE".to_string()
            } else {
                fmt(self.shipping_fee)
            },
            ships_free: self.ships_free(),
            total: fmt(self.total),
        };

        Ok(template.render()?)
    }

    /// Render the document into `dir` under [`file_name`](Self::file_name).
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing the file fails.
    #[instrument(skip(self, config), fields(reference = %self.reference))]
    pub fn write_to(&self, dir: &Path, config: &CartConfig) -> Result<PathBuf, ProformaError> {
        let html = self.render(config)?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, html)?;
        info!(path = %path.display(), lines = self.lines.len(), "Proforma written");
        Ok(path)
    }
}

/// `PF-` followed by the last 8 digits of the issue time in milliseconds.
#[must_use]
pub fn reference_for(issued_at: DateTime<Utc>) -> String {
    format!("PF-{:08}", issued_at.timestamp_millis().rem_euclid(100_000_000))
}

struct ProformaRow<'a> {
    product_name: &'a str,
    variant_label: &'a str,
    quantity: u32,
    unit_price: String,
    line_total: String,
}

#[derive(Template)]
#[template(path = "proforma.html")]
struct ProformaTemplate<'a> {
    store_name: &'a str,
    reference: &'a str,
    issued_on: String,
    valid_until: String,
    validity_days: u64,
    rows: Vec<ProformaRow<'a>>,
    subtotal: String,
    shipping: String,
    ships_free: bool,
    total: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::line::fixtures::{product, variant};
    use crate::totals::ShippingPolicy;

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 15, 30, 0).unwrap()
    }

    fn lines() -> Vec<CartLine> {
        vec![
            CartLine {
                product: product(1, "Labial Mate"),
                selected_variant: variant(10, "Rojo Pasión", 1250, 10),
                quantity: 3,
            },
            CartLine {
                product: product(2, "Rubor <Glow>"),
                selected_variant: variant(20, "Coral", 500, 10),
                quantity: 1,
            },
        ]
    }

    #[test]
    fn test_reference_uses_last_eight_digits() {
        let at = Utc.timestamp_millis_opt(1_760_715_000_123).unwrap();
        assert_eq!(reference_for(at), "PF-15000123");

        let early = Utc.timestamp_millis_opt(42).unwrap();
        assert_eq!(reference_for(early), "PF-00000042");
    }

    #[test]
    fn test_projection_matches_cart() {
        let lines = lines();
        let totals = CartTotals::compute(&lines, &ShippingPolicy::default());
        let proforma = Proforma::new(&lines, &totals, issued_at());

        assert_eq!(proforma.lines.len(), 2);
        assert_eq!(proforma.lines[0].variant_label, "Rojo Pasión");
        assert_eq!(proforma.lines[0].line_total, Price::from_cents(3750));
        assert_eq!(proforma.subtotal, Price::from_cents(4250));
        assert_eq!(proforma.shipping_fee, Price::from_cents(500));
        assert_eq!(proforma.total, Price::from_cents(4750));
        assert_eq!(
            proforma.valid_until(),
            NaiveDate::from_ymd_opt(2026, 10, 24).unwrap()
        );
    }

    #[test]
    fn test_render_lists_lines_and_totals() {
        let lines = lines();
        let totals = CartTotals::compute(&lines, &ShippingPolicy::default());
        let proforma = Proforma::new(&lines, &totals, issued_at());

        let html = proforma.render(&CartConfig::default()).unwrap();

        assert!(html.contains("GLOSSY BEAUTY"));
        assert!(html.contains(&proforma.reference));
        assert!(html.contains("17 October 2026"));
        assert!(html.contains("Labial Mate"));
        assert!(html.contains("37.50"));
        assert!(html.contains("42.50"));
        assert!(html.contains("5.00"));
        assert!(html.contains("47.50"));
        assert!(!html.contains("FREE"));
        // Catalog text is escaped
        assert!(!html.contains("<Glow>"));
    }

    #[test]
    fn test_render_free_shipping_label() {
        let mut lines = lines();
        lines[0].quantity = 4;
        let totals = CartTotals::compute(&lines, &ShippingPolicy::default());
        let proforma = Proforma::new(&lines, &totals, issued_at());
        assert!(proforma.ships_free());

        let html = proforma.render(&CartConfig::default()).unwrap();
        assert!(html.contains("FREE"));
        assert!(html.contains("55.00"));
    }

    #[test]
    fn test_write_to_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let lines = lines();
        let totals = CartTotals::compute(&lines, &ShippingPolicy::default());
        let proforma = Proforma::new(&lines, &totals, issued_at());

        let path = proforma
            .write_to(&dir.path().join("out"), &CartConfig::default())
            .unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            proforma.file_name()
        );
        assert!(std::fs::read_to_string(path).unwrap().contains("Coral"));
    }
}
