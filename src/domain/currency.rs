//! Static currency projection over the INR base unit.
//!
//! Rates are fixed constants, not a data feed. Conversion goes through the
//! base unit: `amount / rate(from) * rate(to)`.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Inr,
    Usd,
    Eur,
    Gbp,
    Jpy,
}

impl Currency {
    pub const ALL: [Currency; 5] = [
        Currency::Inr,
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Jpy,
    ];

    /// Exchange rate relative to the INR base unit.
    pub fn rate(&self) -> Decimal {
        match self {
            Currency::Inr => Decimal::ONE,
            Currency::Usd => Decimal::new(12, 3),  // 0.012
            Currency::Eur => Decimal::new(11, 3),  // 0.011
            Currency::Gbp => Decimal::new(95, 4),  // 0.0095
            Currency::Jpy => Decimal::new(18, 1),  // 1.8
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Inr => "₹",
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Jpy => "¥",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Currency::Inr => "Indian Rupee",
            Currency::Usd => "US Dollar",
            Currency::Eur => "Euro",
            Currency::Gbp => "British Pound",
            Currency::Jpy => "Japanese Yen",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
        }
    }

    pub fn parse(code: &str) -> Option<Currency> {
        let code = code.to_ascii_uppercase();
        Currency::ALL.iter().copied().find(|c| c.code() == code)
    }

    fn decimal_places(&self) -> u32 {
        match self {
            Currency::Jpy => 0,
            _ => 2,
        }
    }

    fn grouping(&self) -> Grouping {
        match self {
            Currency::Inr => Grouping::Indian,
            _ => Grouping::Thousands,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Convert `amount` from one currency to another via the base unit.
pub fn convert(amount: Decimal, from: Currency, to: Currency) -> Decimal {
    let base = if from == Currency::Inr {
        amount
    } else {
        amount / from.rate()
    };
    base * to.rate()
}

/// Unit rate: how much of `to` one unit of `from` buys.
pub fn exchange_rate(from: Currency, to: Currency) -> Decimal {
    to.rate() / from.rate()
}

/// Format an amount in a currency's display convention: symbol prefix,
/// per-currency digit grouping, two fraction digits except for the yen,
/// which rounds to a whole number.
pub fn format(amount: Decimal, currency: Currency) -> String {
    let places = currency.decimal_places();
    let rounded = amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() { "-" } else { "" };
    let rendered = format!("{:.*}", places as usize, rounded.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (rendered, None),
    };
    let grouped = group_digits(&int_part, currency.grouping());
    match frac_part {
        Some(frac) => format!("{sign}{}{grouped}.{frac}", currency.symbol()),
        None => format!("{sign}{}{grouped}", currency.symbol()),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Grouping {
    /// Repeating groups of three: `1,234,567`.
    Thousands,
    /// Indian convention, last three then pairs: `12,34,567`.
    Indian,
}

fn group_digits(digits: &str, grouping: Grouping) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let mut out = String::with_capacity(chars.len() + chars.len() / 2);
    for (i, c) in chars.iter().enumerate() {
        let from_right = chars.len() - i;
        let boundary = match grouping {
            Grouping::Thousands => from_right % 3 == 0,
            Grouping::Indian => from_right == 3 || (from_right > 3 && (from_right - 3) % 2 == 0),
        };
        if i > 0 && boundary {
            out.push(',');
        }
        out.push(*c);
    }
    out
}
