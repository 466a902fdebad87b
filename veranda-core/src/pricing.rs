use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fees layered on top of the room subtotal. Amounts are in the
/// currency's minor unit; the tax rate is a percentage of the
/// taxable base (subtotal + fees).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeeSchedule {
    pub cleaning_fee: i64,
    pub service_fee: i64,
    pub tax_rate_percent: f64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        // 18% = CGST 9% + SGST 9%
        Self {
            cleaning_fee: 0,
            service_fee: 0,
            tax_rate_percent: 18.0,
        }
    }
}

/// Itemised price for a stay. Field names serialize to the order
/// payload keys the backend expects (basePrice, taxRate, ...).
///
/// The total computed here is advisory display data only. The backend
/// recomputes the charge at order creation and its figure is the one
/// that settles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub base_price: i64,
    pub nights: i64,
    pub rooms: u32,
    pub subtotal: i64,
    pub cleaning_fee: i64,
    pub service_fee: i64,
    pub tax_rate: f64,
    pub taxes: i64,
    pub cgst: i64,
    pub sgst: i64,
    pub total_amount: i64,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PricingError {
    #[error("Check-out date must be after check-in date ({check_in} to {check_out})")]
    InvalidRange {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("Nightly rate must be positive, got {0}")]
    InvalidRate(i64),

    #[error("At least one room is required")]
    NoRooms,

    #[error("Fees and tax rate cannot be negative")]
    NegativeFee,
}

/// Quote a stay: nights x rate x rooms, plus fees, plus tax on the
/// taxable base. Pure and deterministic; no I/O.
pub fn quote(
    nightly_rate: i64,
    check_in: NaiveDate,
    check_out: NaiveDate,
    rooms: u32,
    fees: &FeeSchedule,
) -> Result<PriceBreakdown, PricingError> {
    if nightly_rate <= 0 {
        return Err(PricingError::InvalidRate(nightly_rate));
    }
    if rooms == 0 {
        return Err(PricingError::NoRooms);
    }
    if fees.cleaning_fee < 0 || fees.service_fee < 0 || fees.tax_rate_percent < 0.0 {
        return Err(PricingError::NegativeFee);
    }

    let nights = (check_out - check_in).num_days();
    if nights <= 0 {
        return Err(PricingError::InvalidRange {
            check_in,
            check_out,
        });
    }

    let subtotal = nightly_rate * nights * rooms as i64;
    let taxable_base = subtotal + fees.cleaning_fee + fees.service_fee;
    let taxes = round_half_up(taxable_base as f64 * fees.tax_rate_percent / 100.0);
    // SGST takes the rounding remainder so the halves always sum to the tax
    let cgst = round_half_up(taxes as f64 / 2.0);
    let sgst = taxes - cgst;

    Ok(PriceBreakdown {
        base_price: nightly_rate,
        nights,
        rooms,
        subtotal,
        cleaning_fee: fees.cleaning_fee,
        service_fee: fees.service_fee,
        tax_rate: fees.tax_rate_percent,
        taxes,
        cgst,
        sgst,
        total_amount: taxable_base + taxes,
    })
}

/// Round to the nearest minor unit, halves away from zero.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
