//! Mobile-money payment instructions
//!
//! Payment confirmation is manual: the customer pays out-of-band via a
//! USSD menu and an administrator validates the order afterwards. This
//! module only knows how to tell the customer where to send the money.

use crate::db::models::PaymentMethod;
use serde::Serialize;

/// Instructions returned with a freshly created order
#[derive(Debug, Clone, Serialize)]
pub struct PaymentInstructions {
    pub ussd: &'static str,
    pub steps: &'static str,
    pub recipient: String,
    pub amount: f64,
    pub currency: &'static str,
}

/// USSD menu walk per provider
fn menu(method: PaymentMethod) -> (&'static str, &'static str) {
    match method {
        PaymentMethod::Mpesa => ("*150#", "Option 1 → Option 3 → Enter the amount → Confirm"),
        PaymentMethod::Orange => ("*144#", "Option 1 → Option 2 → Enter the amount → Confirm"),
        PaymentMethod::Airtel => ("*501#", "Option 1 → Option 4 → Enter the amount → Confirm"),
        PaymentMethod::Africell => ("*555#", "Option 1 → Option 3 → Enter the amount → Confirm"),
    }
}

/// Build the instruction block for one order
pub fn instructions_for(
    method: PaymentMethod,
    recipient: &str,
    amount: f64,
) -> PaymentInstructions {
    let (ussd, steps) = menu(method);
    PaymentInstructions {
        ussd,
        steps,
        recipient: recipient.to_string(),
        amount,
        currency: "CDF",
    }
}
