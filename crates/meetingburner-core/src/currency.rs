//! Currency selection and money formatting.
//!
//! Currency only affects how amounts are rendered; every computation in
//! the engine is currency-agnostic.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    #[serde(alias = "USD")]
    Usd,
    #[serde(alias = "EUR")]
    Eur,
}

impl Currency {
    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    /// Attach the symbol on the side this currency uses.
    fn wrap(self, body: &str) -> String {
        match self {
            Currency::Usd => format!("${body}"),
            Currency::Eur => format!("{body}€"),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "usd" | "$" => Ok(Currency::Usd),
            "eur" | "€" => Ok(Currency::Eur),
            other => Err(ValidationError::InvalidValue {
                field: "currency".into(),
                message: format!("unsupported currency '{other}' (expected usd or eur)"),
            }),
        }
    }
}

/// Two decimals with en-US digit grouping: `$1,234.50` or `1,234.50€`.
pub fn format_currency(amount: f64, currency: Currency) -> String {
    currency.wrap(&group_thousands(&format!("{amount:.2}")))
}

/// Compact form for axis labels: `$1.5k` from 1000 upward, whole units below.
pub fn format_currency_short(amount: f64, currency: Currency) -> String {
    let body = if amount >= 1000.0 {
        format!("{:.1}k", amount / 1000.0)
    } else {
        format!("{amount:.0}")
    };
    currency.wrap(&body)
}

/// Amount per unit, e.g. `$5.00/min`.
pub fn format_rate(amount: f64, currency: Currency, unit: &str) -> String {
    format!("{}/{unit}", format_currency(amount, currency))
}

fn group_thousands(fixed: &str) -> String {
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let digits = int_part.as_bytes();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, &d) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(d as char);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}
