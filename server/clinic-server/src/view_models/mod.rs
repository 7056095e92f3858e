//! Display-ready shapes for the reception screens
//!
//! Every amount comes with a formatted string in the clinic's currency and
//! every date with its Jalali rendering, so templates do no arithmetic.

#[cfg(test)]
pub(crate) mod fixtures;
pub mod insurance;
pub mod receipt;
pub mod reception_form;

pub use insurance::{
    CalculationRowViewModel, CombinedInsuranceCalculationViewModel, InsuranceShareViewModel,
};
pub use receipt::{PaymentReceiptViewModel, ReceiptItemViewModel};
pub use reception_form::{FormSection, FormSectionKey, ReceptionFormViewModel};
