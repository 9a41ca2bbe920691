//! Numeric Adapter
//!
//! Interprets the buffer of an Integer/Float/Double field as a clamped number.
//!
//! Parsing is locale-agnostic and lenient: the longest leading numeric prefix is used and
//! anything unparseable counts as `0`. Formatting produces the shortest text that parses back
//! to the same value, optionally rounded to a display precision.
//!
//! Step buttons count steps from the value at press time instead of adding to the live value,
//! so holding a button never accumulates floating-point drift.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;

/// Delay before a held step button starts repeating.
pub const SPIN_INITIAL_DELAY: Duration = Duration::from_millis(500);

/// Interval between repeats of a held step button.
pub const SPIN_REPEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Values at or above this magnitude are rendered as plain integers.
const PLAIN_INTEGER_THRESHOLD: f64 = 1e16;

static NUMERIC_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("valid numeric regex")
});

/// Numeric interpretation of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericKind {
    /// Whole numbers; clamps to the `i32` range unless bounds are configured.
    Integer,
    /// Single precision.
    Float,
    /// Double precision.
    Double,
}

/// Bounds, step and display precision of a numeric field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumericConfig {
    /// Lower bound (inclusive).
    pub min: Option<f64>,
    /// Upper bound (inclusive).
    pub max: Option<f64>,
    /// Amount added or subtracted by one step button press.
    pub step: f64,
    /// Fractional digits shown; `None` means shortest round-trip.
    pub precision: Option<usize>,
}

impl Default for NumericConfig {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            step: 1.0,
            precision: None,
        }
    }
}

/// Direction of a step button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinDirection {
    /// Increment.
    Up,
    /// Decrement.
    Down,
}

impl SpinDirection {
    fn sign(self) -> i64 {
        match self {
            SpinDirection::Up => 1,
            SpinDirection::Down => -1,
        }
    }
}

/// Parser, formatter and step state of a numeric field.
#[derive(Debug, Clone)]
pub struct NumericAdapter {
    kind: NumericKind,
    config: NumericConfig,
    value: f64,
    stale: bool,
    reference: f64,
    accumulator: i64,
    spinning: Option<SpinDirection>,
}

impl NumericAdapter {
    /// Create an adapter holding the clamped zero value.
    pub fn new(kind: NumericKind, config: NumericConfig) -> Self {
        let mut adapter = Self {
            kind,
            config,
            value: 0.0,
            stale: false,
            reference: 0.0,
            accumulator: 0,
            spinning: None,
        };
        adapter.value = adapter.clamp(0.0);
        adapter
    }

    /// Numeric kind.
    pub fn kind(&self) -> NumericKind {
        self.kind
    }

    /// Configuration.
    pub fn config(&self) -> &NumericConfig {
        &self.config
    }

    /// Effective inclusive bounds.
    pub fn bounds(&self) -> (f64, f64) {
        let (lo, hi) = match self.kind {
            NumericKind::Integer => (i32::MIN as f64, i32::MAX as f64),
            NumericKind::Float => (f32::MIN as f64, f32::MAX as f64),
            NumericKind::Double => (f64::MIN, f64::MAX),
        };
        let lo = self.config.min.unwrap_or(lo);
        let hi = self.config.max.unwrap_or(hi);
        match self.kind {
            NumericKind::Integer => (lo.ceil(), hi.floor()),
            _ => (lo, hi),
        }
    }

    /// Clamp into bounds and quantize to the kind (rounding for Integer, `f32` for Float).
    pub fn clamp(&self, value: f64) -> f64 {
        let (lo, hi) = self.bounds();
        let value = match self.kind {
            NumericKind::Integer => value.round(),
            NumericKind::Float => value as f32 as f64,
            NumericKind::Double => value,
        };
        let value = value.max(lo).min(hi);
        if value == 0.0 { 0.0 } else { value }
    }

    /// Parse the longest numeric prefix of `text` and clamp it. Unparseable text is `0`.
    pub fn parse(&self, text: &str) -> f64 {
        let raw = NUMERIC_PREFIX
            .find(text)
            .and_then(|m| m.as_str().trim_start().parse::<f64>().ok())
            .unwrap_or(0.0);
        self.clamp(raw)
    }

    /// Render `value` for display.
    pub fn format(&self, value: f64) -> String {
        let value = if value == 0.0 { 0.0 } else { value };

        let text = if self.kind == NumericKind::Integer {
            format!("{}", value.round() as i64)
        } else if value.abs() >= PLAIN_INTEGER_THRESHOLD {
            format!("{:.0}", value)
        } else if let Some(precision) = self.config.precision {
            strip_fraction(format!("{:.*}", precision, value))
        } else if self.kind == NumericKind::Float {
            format!("{}", value as f32)
        } else {
            format!("{}", value)
        };

        if text == "-0" { "0".to_string() } else { text }
    }

    /// Current value, re-parsing `text` first if the buffer was edited since the last parse.
    pub fn value(&mut self, text: &str) -> f64 {
        if self.stale {
            self.value = self.parse(text);
            self.stale = false;
            tracing::trace!(value = self.value, "numeric value re-parsed");
        }
        self.value
    }

    /// Cached value without re-parsing.
    pub fn cached_value(&self) -> f64 {
        self.value
    }

    /// Whether the buffer changed since the last parse.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Mark the cached value as out of date.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Store a programmatic value. Returns the clamped value.
    pub fn set(&mut self, value: f64) -> f64 {
        self.value = self.clamp(value);
        self.stale = false;
        self.value
    }

    /// Whether `ch` may be typed into the field.
    pub fn accepts_char(&self, ch: char) -> bool {
        match self.kind {
            NumericKind::Integer => ch.is_ascii_digit() || ch == '+' || ch == '-',
            NumericKind::Float | NumericKind::Double => {
                ch.is_ascii_digit() || matches!(ch, '+' | '-' | '.' | 'e' | 'E')
            }
        }
    }

    /// Press a step button: snapshot `current` as the reference and apply the first step.
    pub fn begin_step(&mut self, direction: SpinDirection, current: f64) -> f64 {
        self.reference = current;
        self.accumulator = 0;
        self.spinning = Some(direction);
        self.apply_step()
    }

    /// Apply one auto-repeat step. `None` when no button is held.
    pub fn repeat_step(&mut self) -> Option<f64> {
        self.spinning?;
        Some(self.apply_step())
    }

    /// Release the step button.
    pub fn end_step(&mut self) {
        self.spinning = None;
    }

    /// Button currently held.
    pub fn spinning(&self) -> Option<SpinDirection> {
        self.spinning
    }

    fn apply_step(&mut self) -> f64 {
        let Some(direction) = self.spinning else {
            return self.value;
        };
        let next = self.accumulator + direction.sign();
        let value = self.clamp(self.reference + next as f64 * self.config.step);
        // Stop counting once pinned at a bound so reversing responds immediately.
        if value != self.value || self.accumulator == 0 {
            self.accumulator = next;
        }
        self.set(value)
    }
}

fn strip_fraction(mut text: String) -> String {
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(kind: NumericKind, min: Option<f64>, max: Option<f64>) -> NumericAdapter {
        NumericAdapter::new(
            kind,
            NumericConfig {
                min,
                max,
                ..NumericConfig::default()
            },
        )
    }

    #[test]
    fn test_parse_prefix() {
        let a = adapter(NumericKind::Double, None, None);
        assert_eq!(a.parse("12.5abc"), 12.5);
        assert_eq!(a.parse("  -3e2x"), -300.0);
        assert_eq!(a.parse(".25"), 0.25);
        assert_eq!(a.parse("7."), 7.0);
        assert_eq!(a.parse("1e"), 1.0);
        assert_eq!(a.parse(""), 0.0);
        assert_eq!(a.parse("abc"), 0.0);
        assert_eq!(a.parse("-"), 0.0);
    }

    #[test]
    fn test_integer_rounds_and_clamps_to_i32() {
        let a = adapter(NumericKind::Integer, None, None);
        assert_eq!(a.parse("42.6"), 43.0);
        assert_eq!(a.parse("99999999999"), i32::MAX as f64);
        assert_eq!(a.parse("-99999999999"), i32::MIN as f64);
    }

    #[test]
    fn test_explicit_bounds() {
        let a = adapter(NumericKind::Integer, Some(0.0), Some(10.0));
        assert_eq!(a.parse("-5"), 0.0);
        assert_eq!(a.parse("50"), 10.0);
        assert_eq!(a.format(a.parse("-5")), "0");
    }

    #[test]
    fn test_format_shortest() {
        let a = adapter(NumericKind::Double, None, None);
        assert_eq!(a.format(1234.5), "1234.5");
        assert_eq!(a.format(2.0), "2");
        assert_eq!(a.format(-0.0), "0");
        assert_eq!(a.format(1e16), "10000000000000000");

        let f = adapter(NumericKind::Float, None, None);
        assert_eq!(f.format(f.parse("0.1")), "0.1");
    }

    #[test]
    fn test_format_precision() {
        let a = NumericAdapter::new(
            NumericKind::Double,
            NumericConfig {
                precision: Some(2),
                ..NumericConfig::default()
            },
        );
        assert_eq!(a.format(3.14159), "3.14");
        assert_eq!(a.format(2.0), "2");
        assert_eq!(a.format(2.50), "2.5");
        assert_eq!(a.format(-0.001), "0");
    }

    #[test]
    fn test_format_parse_idempotent() {
        let a = adapter(NumericKind::Double, None, None);
        for input in ["0.1", "1e-7", "123456789.125", "-42", "1e300", "3.0000"] {
            let once = a.format(a.parse(input));
            let twice = a.format(a.parse(&once));
            assert_eq!(once, twice, "input {input}");
        }
    }

    #[test]
    fn test_step_counts_from_reference() {
        let mut a = NumericAdapter::new(
            NumericKind::Double,
            NumericConfig {
                step: 0.1,
                ..NumericConfig::default()
            },
        );
        a.begin_step(SpinDirection::Up, 0.0);
        for _ in 0..9 {
            a.repeat_step();
        }
        a.end_step();
        assert_eq!(a.cached_value(), 1.0);
        assert_eq!(a.format(a.cached_value()), "1");
        assert_eq!(a.repeat_step(), None);
    }

    #[test]
    fn test_step_clamps() {
        let mut a = adapter(NumericKind::Integer, Some(0.0), Some(3.0));
        a.set(2.0);
        assert_eq!(a.begin_step(SpinDirection::Up, 2.0), 3.0);
        assert_eq!(a.repeat_step(), Some(3.0));
        assert_eq!(a.repeat_step(), Some(3.0));
        a.end_step();
        assert_eq!(a.begin_step(SpinDirection::Down, 3.0), 2.0);
    }

    #[test]
    fn test_stale_reparse() {
        let mut a = adapter(NumericKind::Integer, None, None);
        a.set(5.0);
        assert_eq!(a.value("9"), 5.0);
        a.invalidate();
        assert!(a.is_stale());
        assert_eq!(a.value("9"), 9.0);
        assert!(!a.is_stale());
    }

    #[test]
    fn test_char_filter() {
        let i = adapter(NumericKind::Integer, None, None);
        assert!(i.accepts_char('7'));
        assert!(i.accepts_char('-'));
        assert!(!i.accepts_char('.'));
        let d = adapter(NumericKind::Double, None, None);
        assert!(d.accepts_char('.'));
        assert!(d.accepts_char('e'));
        assert!(!d.accepts_char('x'));
    }
}
