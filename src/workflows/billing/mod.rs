//! Agency invoice math.
//!
//! The rounding policy here is a business-compatibility contract: every
//! invoice component is independently rounded up to the next hundredth of a
//! rupee before the components are summed. Summing first and rounding once
//! produces different totals and must not be substituted.

mod invoice;

pub use invoice::{invoice_breakdown, BillingError, InvoiceBreakdown, Paise};
