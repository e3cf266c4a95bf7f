use serde::{Deserialize, Serialize};
use std::fmt;

/// Monetary amount in paise (hundredths of a rupee). Invoice math stays in
/// integer paise so the componentwise ceiling is exact.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Paise(pub u64);

impl Paise {
    pub const fn from_rupees(rupees: u64) -> Self {
        Self(rupees * 100)
    }

    pub fn rupees(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Paise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Field-scoped validation failures for invoice generation.
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("agency amount is not set on this job post")]
    MissingAgencyAmount,
    #[error("agency category (agreed percentage) is not set on this job post")]
    MissingAgencyCategory,
    #[error("agreed percentage {value} is outside the valid 0-100 range")]
    InvalidPercentage { value: f64 },
}

/// Invoice components for an agency job post. Every component is ceiled to
/// the next paise independently; `deducted` is the sum of the already-ceiled
/// components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceBreakdown {
    pub amount: Paise,
    pub service_tax: Paise,
    pub swachh_bharat_cess: Paise,
    pub krishi_kalyan_cess: Paise,
    pub agreed_percentage_amount: Paise,
    pub deducted: Paise,
    pub total_invoice: Paise,
}

const SERVICE_TAX: (u64, u64) = (14, 100);
const CESS: (u64, u64) = (5, 1000);

fn ceil_ratio(amount: u64, numerator: u64, denominator: u64) -> u64 {
    let product = amount as u128 * numerator as u128;
    let denominator = denominator as u128;
    ((product + denominator - 1) / denominator) as u64
}

/// Compute the invoice breakdown for an agency amount and agreed percentage.
///
/// The percentage is snapped to basis points (two decimal places), matching
/// the granularity agency categories are configured with.
pub fn invoice_breakdown(amount: Paise, percentage: f64) -> Result<InvoiceBreakdown, BillingError> {
    if !percentage.is_finite() || !(0.0..=100.0).contains(&percentage) {
        return Err(BillingError::InvalidPercentage { value: percentage });
    }
    let basis_points = (percentage * 100.0).round() as u64;

    let service_tax = Paise(ceil_ratio(amount.0, SERVICE_TAX.0, SERVICE_TAX.1));
    let swachh_bharat_cess = Paise(ceil_ratio(amount.0, CESS.0, CESS.1));
    let krishi_kalyan_cess = Paise(ceil_ratio(amount.0, CESS.0, CESS.1));
    let agreed_percentage_amount = Paise(ceil_ratio(amount.0, basis_points, 10_000));

    let deducted = Paise(
        service_tax.0 + swachh_bharat_cess.0 + krishi_kalyan_cess.0 + agreed_percentage_amount.0,
    );
    let total_invoice = Paise(amount.0.saturating_sub(deducted.0));

    Ok(InvoiceBreakdown {
        amount,
        service_tax,
        swachh_bharat_cess,
        krishi_kalyan_cess,
        agreed_percentage_amount,
        deducted,
        total_invoice,
    })
}
