//! Value-to-text conversion.
//!
//! Cell values are rendered either in a canonical dot-decimal form or in a
//! locale-aware form resembling a general-purpose number format (digit
//! grouping, at most three fraction digits). Integral doubles always render
//! without a fraction, whatever the locale.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::sheet::Value;

/// Maximum fraction digits in the locale-aware form.
const MAX_FRACTION_DIGITS: usize = 3;

/// Locale used by [`to_display_string`], resolved once from the environment.
static PROCESS_LOCALE: Lazy<NumberLocale> = Lazy::new(NumberLocale::from_env);

/// Separators used when rendering numbers for a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberLocale {
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl NumberLocale {
    pub const fn english() -> Self {
        Self {
            decimal_separator: '.',
            grouping_separator: ',',
        }
    }

    pub const fn german() -> Self {
        Self {
            decimal_separator: ',',
            grouping_separator: '.',
        }
    }

    pub const fn french() -> Self {
        Self {
            decimal_separator: ',',
            grouping_separator: '\u{00A0}',
        }
    }

    /// Resolve a POSIX or BCP 47 locale tag such as `de_DE.UTF-8` or `fr-CA`.
    ///
    /// Unknown languages use the English separators.
    pub fn from_tag(tag: &str) -> Self {
        let language = tag
            .split(['_', '-', '.', '@'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match language.as_str() {
            "de" | "es" | "it" | "nl" | "pt" | "da" | "tr" | "id" | "el" => Self::german(),
            "fr" | "ru" | "pl" | "sv" | "fi" | "nb" | "no" | "cs" | "sk" | "uk" | "hu" => Self::french(),
            _ => Self::english(),
        }
    }

    /// Resolve the locale from `LC_ALL`, `LC_NUMERIC` or `LANG`, in that order.
    pub fn from_env() -> Self {
        ["LC_ALL", "LC_NUMERIC", "LANG"]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.is_empty())
            .map(|tag| Self::from_tag(&tag))
            .unwrap_or_else(Self::english)
    }

    /// Locale of the running process.
    pub fn process() -> Self {
        *PROCESS_LOCALE
    }
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self::english()
    }
}

/// Renders cell values as text for a fixed locale.
#[derive(Debug, Clone, Copy)]
pub struct ValueConverter {
    locale: NumberLocale,
}

impl ValueConverter {
    pub fn new(locale: NumberLocale) -> Self {
        Self { locale }
    }

    /// Render `value`; absent values render as the empty string.
    pub fn display(&self, value: Option<&Value>, use_locale: bool) -> String {
        match value {
            None => String::new(),
            Some(Value::Number(number)) => self.display_number(*number, use_locale),
            Some(other) => natural_string(other),
        }
    }

    pub fn display_number(&self, value: f64, use_locale: bool) -> String {
        if let Some(integral) = as_integral(value) {
            return itoa::Buffer::new().format(integral).to_string();
        }

        let text = if use_locale && value.is_finite() {
            format_locale(value, self.locale)
        } else {
            ryu::Buffer::new().format(value).to_string()
        };
        strip_trailing_zero(text)
    }
}

impl Default for ValueConverter {
    fn default() -> Self {
        Self::new(NumberLocale::process())
    }
}

/// Render a value with the process locale.
pub fn to_display_string(value: Option<&Value>, use_locale: bool) -> String {
    ValueConverter::default().display(value, use_locale)
}

/// Drop absent entries, keeping the order of the rest.
pub fn without_nulls<T, I>(items: I) -> Box<[T]>
where
    I: IntoIterator<Item = Option<T>>,
{
    items.into_iter().flatten().collect()
}

fn natural_string(value: &Value) -> String {
    match value {
        Value::Text(text) => text.clone(),
        Value::Number(number) => ryu::Buffer::new().format(*number).to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::ErrorCode(code) => itoa::Buffer::new().format(*code).to_string(),
    }
}

/// The value as an integer when truncation to i64 loses nothing.
///
/// The cast saturates, so magnitudes beyond i64 only match at the boundary.
fn as_integral(value: f64) -> Option<i64> {
    let truncated = value as i64;
    (truncated as f64 == value).then_some(truncated)
}

fn strip_trailing_zero(mut text: String) -> String {
    if text.ends_with(".0") || text.ends_with(",0") {
        text.truncate(text.len() - 2);
    }
    text
}

/// Grouped integer digits, up to three fraction digits rounded half to even,
/// trailing fraction zeros dropped.
fn format_locale(value: f64, locale: NumberLocale) -> String {
    let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut out = String::with_capacity(fixed.len() + integer.len() / 3 + 1);
    if value < 0.0 {
        out.push('-');
    }
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            out.push(locale.grouping_separator);
        }
        out.push(digit);
    }
    if !fraction.is_empty() {
        out.push(locale.decimal_separator);
        out.push_str(fraction);
    }
    out
}
