//! Course catalogue and price table.
//!
//! All amounts are CAD cents. The checkout-session flow charges a single
//! all-in unit price (base + 13% HST + 3% processing fee); the payment-intent
//! flow charges the base price per lesson plus HST.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const CURRENCY: &str = "cad";

/// Ontario HST, in percent.
pub const HST_PERCENT: u64 = 13;

/// HST plus the card processing fee folded into checkout-session prices.
pub const CHECKOUT_SURCHARGE_PERCENT: u64 = 16;

pub const MAX_LESSONS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Course {
    #[serde(rename = "bde")]
    Bde,
    #[serde(rename = "individual")]
    Individual,
    #[serde(rename = "carRental")]
    CarRental,
}

impl Course {
    pub const ALL: [Course; 3] = [Course::Bde, Course::Individual, Course::CarRental];

    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "bde" => Some(Self::Bde),
            "individual" => Some(Self::Individual),
            "carRental" => Some(Self::CarRental),
            _ => None,
        }
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Bde => "bde",
            Self::Individual => "individual",
            Self::CarRental => "carRental",
        }
    }

    /// Base price before tax and fees.
    #[must_use]
    pub fn base_price_cents(self) -> u64 {
        match self {
            Self::Bde => 45_000,
            Self::Individual => 4_000,
            Self::CarRental => 8_000,
        }
    }

    /// Unit amount sent on checkout-session line items.
    #[must_use]
    pub fn checkout_unit_amount_cents(self) -> u64 {
        self.base_price_cents() * (100 + CHECKOUT_SURCHARGE_PERCENT) / 100
    }

    /// Product name shown on the hosted checkout page.
    #[must_use]
    pub fn checkout_name(self) -> &'static str {
        match self {
            Self::Bde => "BDE Course",
            Self::Individual => "Individual Driving Lesson",
            Self::CarRental => "Car Rental for Road Test",
        }
    }

    /// Name used for payment-intent descriptions and API responses.
    #[must_use]
    pub fn receipt_name(self) -> &'static str {
        match self {
            Self::Bde => "MTO Approved BDE Course",
            Self::Individual => "Individual Driving Lesson",
            Self::CarRental => "Rent Car for Road Test",
        }
    }

    /// Name used in the confirmation email.
    #[must_use]
    pub fn long_name(self) -> &'static str {
        match self {
            Self::Bde => "MTO Approved Beginner Driver Education (BDE) Course",
            Self::Individual => "Individual Driving Lesson",
            Self::CarRental => "Rent Car for Road Test",
        }
    }

    /// Only individual lessons are sold in multiples.
    #[must_use]
    pub fn quantity(self, lessons: Option<u32>) -> u32 {
        match self {
            Self::Individual => clamp_lessons(lessons),
            Self::Bde | Self::CarRental => 1,
        }
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[must_use]
pub fn clamp_lessons(lessons: Option<u32>) -> u32 {
    lessons.unwrap_or(1).clamp(1, MAX_LESSONS)
}

/// HST on `amount_cents`, rounded half up to the nearest cent.
#[must_use]
pub fn hst_cents(amount_cents: u64) -> u64 {
    (amount_cents * HST_PERCENT + 50) / 100
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentQuote {
    pub course: Course,
    pub quantity: u32,
    pub subtotal_cents: u64,
    pub tax_cents: u64,
    pub total_cents: u64,
}

/// Server-side quote for the payment-intent flow.
#[must_use]
pub fn payment_intent_quote(course: Course, lessons: Option<u32>) -> PaymentQuote {
    let quantity = course.quantity(lessons);
    let subtotal_cents = course.base_price_cents() * u64::from(quantity);
    let tax_cents = hst_cents(subtotal_cents);
    PaymentQuote {
        course,
        quantity,
        subtotal_cents,
        tax_cents,
        total_cents: subtotal_cents + tax_cents,
    }
}

/// Formats cents as a dollar amount with two decimals, e.g. `508.50`.
#[must_use]
pub fn format_dollars(cents: u64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}
