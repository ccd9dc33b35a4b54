//! Pricing engine: line subtotals, discounts, and the tax breakdown.
//!
//! Every total shown anywhere in the flow comes from [`BookingTotals`], so
//! the payment screen, the order payload, and the receipt always agree.

use crate::types::{Discount, Money, SnackLine, TicketLine};
use serde::{Deserialize, Serialize};

/// Default tax rate, in percent, included in every price
pub const DEFAULT_TAX_RATE_PERCENT: u8 = 15;

impl Discount {
    /// Parse the backend's loose discount label
    ///
    /// `"50% OFF"` is a percentage, `"$2 OFF"` or `"$2.50"` a fixed amount.
    /// Labels without a number (`"ESPECIAL"`, `"2x1"`) and fractional
    /// percentages (`"12.5%"`) grant no discount.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();

        if let Some(pos) = label.find('%') {
            let number: String = label[..pos]
                .trim_end()
                .chars()
                .rev()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            let (whole, fraction) = number.split_once('.').unwrap_or((number.as_str(), ""));
            if !fraction.chars().all(|c| c == '0') {
                tracing::warn!(label, "Fractional percentage discounts are not supported");
                return None;
            }
            let percent: u32 = whole.parse().ok()?;
            return u8::try_from(percent.min(100)).ok().map(Self::Percentage);
        }

        if let Some(pos) = label.find('$') {
            let amount: String = label[pos + 1..]
                .trim_start()
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            let dollars: f64 = amount.parse().ok()?;
            let money = Money::from_dollars(dollars);
            return (!money.is_zero()).then_some(Self::Fixed(money));
        }

        None
    }

    /// Amount taken off `subtotal`; never more than the subtotal itself
    #[must_use]
    pub fn amount_off(&self, subtotal: Money) -> Money {
        let off = match *self {
            Self::Percentage(percent) => subtotal.percent(percent.min(100)),
            Self::Fixed(amount) => amount,
        };
        off.min(subtotal)
    }
}

/// Sum of ticket lines
#[must_use]
pub fn ticket_subtotal(tickets: &[TicketLine]) -> Money {
    tickets.iter().map(TicketLine::line_total).sum()
}

/// Sum of snack lines
#[must_use]
pub fn snack_subtotal(snacks: &[SnackLine]) -> Money {
    snacks.iter().map(SnackLine::line_total).sum()
}

/// Totals for a cart, computed in one place
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BookingTotals {
    /// Tickets
    pub tickets: Money,
    /// Snacks
    pub snacks: Money,
    /// Discount granted by the promotion
    pub discount: Money,
}

impl BookingTotals {
    /// Compute totals for a cart with an optional discount
    #[must_use]
    pub fn compute(tickets: &[TicketLine], snacks: &[SnackLine], discount: Option<&Discount>) -> Self {
        let tickets = ticket_subtotal(tickets);
        let snacks = snack_subtotal(snacks);
        let subtotal = tickets.saturating_add(snacks);
        Self {
            tickets,
            snacks,
            discount: discount.map_or(Money::ZERO, |d| d.amount_off(subtotal)),
        }
    }

    /// Tickets plus snacks
    #[must_use]
    pub const fn subtotal(&self) -> Money {
        self.tickets.saturating_add(self.snacks)
    }

    /// The canonical amount charged: subtotal minus discount
    #[must_use]
    pub const fn total(&self) -> Money {
        self.subtotal().saturating_sub(self.discount)
    }

    /// Break the tax out of the tax-inclusive total
    #[must_use]
    pub const fn breakdown(&self, tax_rate_percent: u8) -> PriceBreakdown {
        let total = self.total();
        let tax = total.percent(tax_rate_percent);
        PriceBreakdown {
            subtotal: self.subtotal(),
            discount: self.discount,
            net: total.saturating_sub(tax),
            tax,
            total,
        }
    }
}

/// What the payment screen shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Tickets plus snacks, before discount
    pub subtotal: Money,
    /// Discount granted
    pub discount: Money,
    /// Total minus tax
    pub net: Money,
    /// Tax included in the total
    pub tax: Money,
    /// Amount charged
    pub total: Money,
}
