//! Processing options consumed by the parser, formatter and aggregation engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What triggers a weekly summary or an invoice flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    /// A line starting with the configured marker string.
    Marker,
    /// An ISO-week change between consecutive data lines.
    Weekly,
}

/// Pricing for one billcode.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Billcode {
    pub description: String,
    /// Price per hour, in the invoice currency.
    pub rate: f64,
}

/// Immutable options for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Always render the billcode column.
    pub billcode: bool,

    /// Marker placed in front of data lines that were typed without one.
    pub prefix: String,

    pub summary_on: Trigger,
    pub invoice_on: Trigger,

    pub summary_marker: String,
    pub invoice_marker: String,

    /// Supports `{hours_this_week}` and `{hours_since_invoice}`.
    pub weekly_summary_template: String,
    /// Supports `{hours_this_week}` and `{hours_since_invoice}`.
    pub invoice_template: String,

    pub verbose: u8,

    pub billcodes: BTreeMap<String, Billcode>,

    pub client_name: String,
    pub client_details: Vec<String>,
    pub currency: String,
    pub invoice_body: String,
    pub invoice_footer: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            billcode: false,
            prefix: String::new(),
            summary_on: Trigger::Weekly,
            invoice_on: Trigger::Marker,
            summary_marker: "----".to_string(),
            invoice_marker: "====".to_string(),
            weekly_summary_template: "# {hours_this_week} hours this week".to_string(),
            invoice_template: "# {hours_since_invoice} hours since last invoice".to_string(),
            verbose: 0,
            billcodes: BTreeMap::new(),
            client_name: String::new(),
            client_details: Vec::new(),
            currency: "USD".to_string(),
            invoice_body: String::new(),
            invoice_footer: Vec::new(),
        }
    }
}
