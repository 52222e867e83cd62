//! Invoice records produced by the aggregation engine, and the priced
//! invoice handed to a renderer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Hours accumulated for one billcode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Empty for lines typed without a billcode.
    pub billcode: String,
    pub hours: f64,
}

/// Hours since the previous invoice, split by billcode in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub id: String,
    pub description: String,
    pub hours: f64,
    pub items: Vec<LineItem>,
}

/// Splits the `# id, description` comment of an invoice marker line.
///
/// Returns `None` when the line has no comment.
pub fn marker_comment(line: &str) -> Option<(String, String)> {
    let (_, comment) = line.split_once('#')?;
    let comment = comment.trim();
    if comment.is_empty() {
        return None;
    }
    Some(match comment.split_once(',') {
        Some((id, description)) => (id.trim().to_string(), description.trim().to_string()),
        None => (comment.to_string(), String::new()),
    })
}

/// One priced row of an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub name: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub description: String,
}

impl InvoiceItem {
    pub fn total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// A complete invoice, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub client_name: String,
    pub client_details: Vec<String>,
    pub currency: String,
    pub date: NaiveDate,
    pub body: String,
    pub footer: Vec<String>,
    pub items: Vec<InvoiceItem>,
}

impl Invoice {
    /// Prices `record` with the configured billcode rates.
    ///
    /// Billcodes without a configured rate are billed at zero.
    pub fn from_record(record: &InvoiceRecord, settings: &Settings, date: NaiveDate) -> Self {
        let items = record
            .items
            .iter()
            .map(|item| {
                let (description, rate) = match settings.billcodes.get(&item.billcode) {
                    Some(code) => (code.description.clone(), code.rate),
                    None => {
                        tracing::warn!(
                            invoice = %record.id,
                            billcode = %item.billcode,
                            "no rate configured for billcode"
                        );
                        (record.description.clone(), 0.0)
                    }
                };
                InvoiceItem {
                    name: if item.billcode.is_empty() {
                        "hours".to_string()
                    } else {
                        item.billcode.clone()
                    },
                    quantity: item.hours,
                    unit_price: rate,
                    description,
                }
            })
            .collect();

        let body = if record.description.is_empty() {
            settings.invoice_body.clone()
        } else {
            record.description.clone()
        };

        Self {
            id: record.id.clone(),
            client_name: settings.client_name.clone(),
            client_details: settings.client_details.clone(),
            currency: settings.currency.clone(),
            date,
            body,
            footer: settings.invoice_footer.clone(),
            items,
        }
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(InvoiceItem::total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Billcode;

    fn record() -> InvoiceRecord {
        InvoiceRecord {
            id: "VES001".to_string(),
            description: "August hours".to_string(),
            hours: 52.25,
            items: vec![
                LineItem {
                    billcode: "DEV".to_string(),
                    hours: 50.25,
                },
                LineItem {
                    billcode: "OPS".to_string(),
                    hours: 2.0,
                },
            ],
        }
    }

    #[test]
    fn marker_comment_splits_on_first_comma() {
        assert_eq!(
            marker_comment("==== # INV1, description, with comma"),
            Some(("INV1".to_string(), "description, with comma".to_string()))
        );
        assert_eq!(
            marker_comment("==== #INV2"),
            Some(("INV2".to_string(), String::new()))
        );
        assert_eq!(marker_comment("===="), None);
        assert_eq!(marker_comment("==== #   "), None);
    }

    #[test]
    fn invoice_prices_items_from_billcodes() {
        let mut settings = Settings::default();
        settings.client_name = "Vestorly".to_string();
        settings.billcodes.insert(
            "DEV".to_string(),
            Billcode {
                description: "Development".to_string(),
                rate: 125.0,
            },
        );
        let date = NaiveDate::from_ymd_opt(2015, 9, 1).unwrap();

        let invoice = Invoice::from_record(&record(), &settings, date);

        assert_eq!(invoice.id, "VES001");
        assert_eq!(invoice.client_name, "Vestorly");
        assert_eq!(invoice.currency, "USD");
        assert_eq!(invoice.body, "August hours");
        assert_eq!(invoice.items[0].name, "DEV");
        assert_eq!(invoice.items[0].description, "Development");
        assert_eq!(invoice.items[0].total(), 6281.25);
        // OPS has no rate configured.
        assert_eq!(invoice.items[1].unit_price, 0.0);
        assert_eq!(invoice.total(), 6281.25);
    }

    #[test]
    fn default_billcode_is_named_hours() {
        let record = InvoiceRecord {
            id: "INV1".to_string(),
            description: String::new(),
            hours: 3.0,
            items: vec![LineItem {
                billcode: String::new(),
                hours: 3.0,
            }],
        };
        let mut settings = Settings::default();
        settings.invoice_body = "Consulting".to_string();
        settings.billcodes.insert(
            String::new(),
            Billcode {
                description: "Consulting hours".to_string(),
                rate: 100.0,
            },
        );
        let date = NaiveDate::from_ymd_opt(2015, 9, 1).unwrap();

        let invoice = Invoice::from_record(&record, &settings, date);

        assert_eq!(invoice.items[0].name, "hours");
        assert_eq!(invoice.body, "Consulting");
        assert_eq!(invoice.total(), 300.0);
    }

    #[test]
    fn invoice_serializes_for_renderer() {
        let settings = Settings::default();
        let date = NaiveDate::from_ymd_opt(2015, 9, 1).unwrap();
        let invoice = Invoice::from_record(&record(), &settings, date);

        let json = serde_json::to_value(&invoice).unwrap();
        assert_eq!(json["date"], "2015-09-01");
        assert_eq!(json["items"][1]["name"], "OPS");
    }
}
