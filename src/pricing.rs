//! Cart arithmetic shared by the quote endpoint and order creation.
//!
//! All amounts are computed in integer cents and only converted to dollars
//! at the edges.

use serde::Serialize;
use thiserror::Error;

use crate::utils::{from_cents, to_cents};

/// Sales tax, in percent of the subtotal.
pub const TAX_PERCENT: i64 = 8;
pub const DELIVERY_FEE_CENTS: i64 = 299;
/// Carts strictly above this subtotal are delivered for free.
pub const FREE_DELIVERY_THRESHOLD_CENTS: i64 = 2500;
/// Upper bound for a single price or tip ($100,000).
pub const MAX_AMOUNT_CENTS: i64 = 10_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("Amount must be a non-negative number")]
    InvalidAmount,
    #[error("Amount must not exceed $100,000")]
    AmountTooLarge,
    #[error("Order total is too large")]
    Overflow,
}

/// Validates a dollar amount coming from a client and converts it to cents.
pub fn parse_amount(amount: f64) -> Result<i64, PricingError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(PricingError::InvalidAmount);
    }
    if amount * 100.0 > MAX_AMOUNT_CENTS as f64 {
        return Err(PricingError::AmountTooLarge);
    }
    Ok(to_cents(amount))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartLine {
    pub unit_price_cents: i64,
    pub quantity: i64,
}

impl CartLine {
    pub fn new(unit_price: f64, quantity: u32) -> Self {
        Self {
            unit_price_cents: to_cents(unit_price),
            quantity: i64::from(quantity),
        }
    }

    fn line_total_cents(&self) -> Option<i64> {
        self.unit_price_cents.checked_mul(self.quantity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub delivery_fee_cents: i64,
    pub tip_cents: i64,
    pub total_cents: i64,
}

/// Dollar view of a [`PriceBreakdown`] for JSON responses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSummary {
    pub subtotal: f64,
    pub tax: f64,
    pub delivery_fee: f64,
    pub tip: f64,
    pub total: f64,
}

impl From<PriceBreakdown> for PriceSummary {
    fn from(p: PriceBreakdown) -> Self {
        Self {
            subtotal: from_cents(p.subtotal_cents),
            tax: from_cents(p.tax_cents),
            delivery_fee: from_cents(p.delivery_fee_cents),
            tip: from_cents(p.tip_cents),
            total: from_cents(p.total_cents),
        }
    }
}

/// Half-up rounding to the cent. `None` on overflow.
pub fn tax_for(subtotal_cents: i64) -> Option<i64> {
    Some(subtotal_cents.checked_mul(TAX_PERCENT)?.checked_add(50)? / 100)
}

pub fn delivery_fee_for(subtotal_cents: i64) -> i64 {
    if subtotal_cents > 0 && subtotal_cents <= FREE_DELIVERY_THRESHOLD_CENTS {
        DELIVERY_FEE_CENTS
    } else {
        0
    }
}

pub fn price_cart(lines: &[CartLine], tip_cents: i64) -> Result<PriceBreakdown, PricingError> {
    let subtotal_cents = lines
        .iter()
        .try_fold(0i64, |acc, line| acc.checked_add(line.line_total_cents()?))
        .ok_or(PricingError::Overflow)?;
    let tax_cents = tax_for(subtotal_cents).ok_or(PricingError::Overflow)?;
    let delivery_fee_cents = delivery_fee_for(subtotal_cents);
    let total_cents = [tax_cents, delivery_fee_cents, tip_cents]
        .into_iter()
        .try_fold(subtotal_cents, i64::checked_add)
        .ok_or(PricingError::Overflow)?;

    Ok(PriceBreakdown {
        subtotal_cents,
        tax_cents,
        delivery_fee_cents,
        tip_cents,
        total_cents,
    })
}
