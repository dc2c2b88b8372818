//! Fuel grades and the client-side price table.
//!
//! Prices here only drive what the customer sees before confirming a
//! dispense. The charged total always comes back from the backend.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[default]
    G91,
    G95,
    Diesel,
}

impl Grade {
    pub const ALL: [Grade; 3] = [Grade::G91, Grade::G95, Grade::Diesel];

    pub fn code(self) -> &'static str {
        match self {
            Grade::G91 => "G91",
            Grade::G95 => "G95",
            Grade::Diesel => "Diesel",
        }
    }

    /// Price per liter in SAR.
    pub fn unit_price(self) -> f64 {
        match self {
            Grade::G91 => 2.18,
            Grade::G95 => 2.33,
            Grade::Diesel => 1.66,
        }
    }

    pub fn next(self) -> Grade {
        let idx = self.index();
        Grade::ALL[(idx + 1) % Grade::ALL.len()]
    }

    pub fn prev(self) -> Grade {
        let idx = self.index();
        Grade::ALL[(idx + Grade::ALL.len() - 1) % Grade::ALL.len()]
    }

    fn index(self) -> usize {
        Grade::ALL.iter().position(|g| *g == self).unwrap_or(0)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Pre-confirmation estimate shown on the dispense screen.
pub fn estimate_total(liters: f64, grade: Grade) -> f64 {
    liters * grade.unit_price()
}

/// Balance style used across the UI, e.g. `120.50 SAR`.
pub fn format_sar(amount: f64) -> String {
    format!("{:.2} SAR", amount)
}

/// The "Prices — ..." banner on the owner dashboard.
pub fn price_banner() -> String {
    Grade::ALL
        .iter()
        .map(|g| format!("{} {}", g.code(), g.unit_price()))
        .collect::<Vec<_>>()
        .join(" • ")
}
