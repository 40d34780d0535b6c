//! Native-style constraint validation for input elements

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::models::FieldKind;

/// A single validation constraint, in the order the browser reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    ValueMissing,
    TypeMismatch,
    BadInput,
    PatternMismatch,
    TooLong,
    TooShort,
    RangeUnderflow,
    RangeOverflow,
    StepMismatch,
    CustomError,
}

/// Per-constraint validity flags of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidityState {
    pub value_missing: bool,
    pub type_mismatch: bool,
    pub bad_input: bool,
    pub pattern_mismatch: bool,
    pub too_long: bool,
    pub too_short: bool,
    pub range_underflow: bool,
    pub range_overflow: bool,
    pub step_mismatch: bool,
    pub custom_error: bool,
}

impl ValidityState {
    pub fn valid(&self) -> bool {
        !self.has_constraint_failure() && !self.custom_error
    }

    /// True when any built-in constraint fails. Custom errors are excluded.
    pub fn has_constraint_failure(&self) -> bool {
        self.bad_input
            || self.pattern_mismatch
            || self.range_overflow
            || self.range_underflow
            || self.step_mismatch
            || self.too_long
            || self.too_short
            || self.type_mismatch
            || self.value_missing
    }

    pub fn failures(&self) -> Vec<Constraint> {
        let flags = [
            (self.value_missing, Constraint::ValueMissing),
            (self.type_mismatch, Constraint::TypeMismatch),
            (self.bad_input, Constraint::BadInput),
            (self.pattern_mismatch, Constraint::PatternMismatch),
            (self.too_long, Constraint::TooLong),
            (self.too_short, Constraint::TooShort),
            (self.range_underflow, Constraint::RangeUnderflow),
            (self.range_overflow, Constraint::RangeOverflow),
            (self.step_mismatch, Constraint::StepMismatch),
            (self.custom_error, Constraint::CustomError),
        ];
        flags
            .into_iter()
            .filter_map(|(failed, constraint)| failed.then_some(constraint))
            .collect()
    }
}

/// Constraint attributes of an element, read from its rendered markup.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    pub required: bool,
    pub readonly: bool,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Compiled `^(?:pattern)$`; `None` when absent or not a valid regex
    pub pattern: Option<Regex>,
}

/// Live state the constraints are evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct ControlState<'a> {
    pub kind: FieldKind,
    pub value: &'a str,
    pub checked: bool,
    /// Another radio with the same name is checked
    pub group_checked: bool,
    /// Whether the user has edited the value since it was rendered
    pub dirty: bool,
}

/// Evaluate every built-in constraint. Custom validity is not considered.
pub fn evaluate(constraints: &Constraints, state: ControlState<'_>) -> ValidityState {
    let mut validity = ValidityState::default();
    let kind = state.kind;
    let value = state.value;

    if kind.is_barred() || constraints.readonly {
        return validity;
    }

    if constraints.required {
        validity.value_missing = if kind == FieldKind::Radio {
            !state.checked && !state.group_checked
        } else if kind.is_checkable() {
            !state.checked
        } else {
            value.is_empty()
        };
    }

    if value.is_empty() {
        return validity;
    }

    match kind {
        FieldKind::Email => validity.type_mismatch = !is_email(value),
        FieldKind::Url => validity.type_mismatch = url::Url::parse(value).is_err(),
        _ => {}
    }

    validity.bad_input = !is_well_formed(kind, value);

    if kind.accepts_text_constraints() {
        if let Some(pattern) = &constraints.pattern {
            validity.pattern_mismatch = !pattern.is_match(value);
        }

        if state.dirty {
            let length = value.encode_utf16().count() as u32;
            if let Some(max) = constraints.max_length {
                validity.too_long = length > max;
            }
            if let Some(min) = constraints.min_length {
                validity.too_short = length < min;
            }
        }
    }

    if kind.is_numeric() {
        if let Some(number) = parse_number(value) {
            if let Some(min) = constraints.min {
                validity.range_underflow = number < min;
            }
            if let Some(max) = constraints.max {
                validity.range_overflow = number > max;
            }
            let base = constraints.min.unwrap_or(0.0);
            let offset = (number - base).rem_euclid(1.0);
            let tolerance = 1e-9 * number.abs().max(1.0);
            validity.step_mismatch = offset.min(1.0 - offset) > tolerance;
        }
    }

    validity
}

/// Compile a pattern attribute the way browsers do: anchored to the whole
/// value.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})$", pattern))
}

/// Default message for a failing constraint, mirroring browser wording.
pub fn default_message(
    constraint: Constraint,
    kind: FieldKind,
    constraints: &Constraints,
    value: &str,
) -> String {
    let length = value.encode_utf16().count();
    match constraint {
        Constraint::ValueMissing if kind == FieldKind::Checkbox => {
            "Please check this box if you want to proceed.".to_string()
        }
        Constraint::ValueMissing if kind == FieldKind::Radio => {
            "Please select one of these options.".to_string()
        }
        Constraint::ValueMissing => "Please fill out this field.".to_string(),
        Constraint::TypeMismatch if kind == FieldKind::Email => {
            "Please enter an email address.".to_string()
        }
        Constraint::TypeMismatch => "Please enter a URL.".to_string(),
        Constraint::BadInput if kind.is_numeric() => "Please enter a number.".to_string(),
        Constraint::BadInput => "Please enter a valid value.".to_string(),
        Constraint::PatternMismatch => "Please match the requested format.".to_string(),
        Constraint::TooLong => format!(
            "Please shorten this text to {} characters or less (you are currently using {} characters).",
            constraints.max_length.unwrap_or_default(),
            length
        ),
        Constraint::TooShort => format!(
            "Please lengthen this text to {} characters or more (you are currently using {} characters).",
            constraints.min_length.unwrap_or_default(),
            length
        ),
        Constraint::RangeUnderflow => format!(
            "Value must be greater than or equal to {}.",
            constraints.min.unwrap_or_default()
        ),
        Constraint::RangeOverflow => format!(
            "Value must be less than or equal to {}.",
            constraints.max.unwrap_or_default()
        ),
        Constraint::StepMismatch => "Please enter a valid value.".to_string(),
        Constraint::CustomError => String::new(),
    }
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
        && !domain.contains('@')
}

fn is_well_formed(kind: FieldKind, value: &str) -> bool {
    match kind {
        FieldKind::Number | FieldKind::Range => parse_number(value).is_some(),
        FieldKind::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
        FieldKind::Month => NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").is_ok(),
        FieldKind::Week => is_week(value),
        FieldKind::Time => {
            NaiveTime::parse_from_str(value, "%H:%M").is_ok()
                || NaiveTime::parse_from_str(value, "%H:%M:%S").is_ok()
        }
        FieldKind::DatetimeLocal => {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").is_ok()
                || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
        }
        FieldKind::Color => {
            value.len() == 7
                && value.starts_with('#')
                && value[1..].chars().all(|c| c.is_ascii_hexdigit())
        }
        _ => true,
    }
}

/// Parse a finite number written as `-?(digits | digits.digits | .digits)`
/// with an optional `e`/`E` exponent. No whitespace, `NaN` or `inf`.
pub fn parse_number(value: &str) -> Option<f64> {
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    let unsigned = value.strip_prefix('-').unwrap_or(value);
    let (mantissa, exponent) = match unsigned.find(|c: char| c == 'e' || c == 'E') {
        Some(i) => (&unsigned[..i], Some(&unsigned[i + 1..])),
        None => (unsigned, None),
    };
    let mantissa_ok = match mantissa.split_once('.') {
        Some((int, frac)) => all_digits(frac) && (int.is_empty() || all_digits(int)),
        None => all_digits(mantissa),
    };
    let exponent_ok = exponent.map_or(true, |e| {
        all_digits(e.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(e))
    });
    if !mantissa_ok || !exponent_ok {
        return None;
    }

    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn is_week(value: &str) -> bool {
    let Some((year, week)) = value.split_once("-W") else {
        return false;
    };
    let (Ok(year), Ok(week)) = (year.parse::<i32>(), week.parse::<u32>()) else {
        return false;
    };
    week >= 1 && NaiveDate::from_isoywd_opt(year, week, chrono::Weekday::Mon).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(kind: FieldKind, value: &str) -> ControlState<'_> {
        ControlState {
            kind,
            value,
            checked: false,
            group_checked: false,
            dirty: true,
        }
    }

    #[test]
    fn test_required_text_and_checkbox() {
        let constraints = Constraints {
            required: true,
            ..Default::default()
        };
        assert!(evaluate(&constraints, state(FieldKind::Text, "")).value_missing);
        assert!(evaluate(&constraints, state(FieldKind::Text, "x")).valid());

        let unchecked = state(FieldKind::Checkbox, "on");
        assert!(evaluate(&constraints, unchecked).value_missing);
        let checked = ControlState {
            checked: true,
            ..unchecked
        };
        assert!(evaluate(&constraints, checked).valid());
    }

    #[test]
    fn test_readonly_and_barred_are_always_valid() {
        let constraints = Constraints {
            required: true,
            readonly: true,
            ..Default::default()
        };
        assert!(evaluate(&constraints, state(FieldKind::Text, "")).valid());

        let constraints = Constraints {
            required: true,
            ..Default::default()
        };
        assert!(evaluate(&constraints, state(FieldKind::Hidden, "")).valid());
    }

    #[test]
    fn test_pattern_is_anchored() {
        let constraints = Constraints {
            pattern: Some(compile_pattern("[0-9]+\\.[0-9]+").unwrap()),
            ..Default::default()
        };
        assert!(evaluate(&constraints, state(FieldKind::Text, "1.0")).valid());
        assert!(evaluate(&constraints, state(FieldKind::Text, "v1.0")).pattern_mismatch);
        // Empty values never mismatch.
        assert!(evaluate(&constraints, state(FieldKind::Text, "")).valid());
    }

    #[test]
    fn test_lengths_only_after_edit() {
        let constraints = Constraints {
            min_length: Some(3),
            max_length: Some(5),
            ..Default::default()
        };
        assert!(evaluate(&constraints, state(FieldKind::Text, "ab")).too_short);
        assert!(evaluate(&constraints, state(FieldKind::Text, "abcdef")).too_long);

        let pristine = ControlState {
            dirty: false,
            ..state(FieldKind::Text, "ab")
        };
        assert!(evaluate(&constraints, pristine).valid());
    }

    #[test]
    fn test_numeric_constraints() {
        let constraints = Constraints {
            min: Some(1.0),
            max: Some(10.0),
            ..Default::default()
        };
        assert!(evaluate(&constraints, state(FieldKind::Number, "0")).range_underflow);
        assert!(evaluate(&constraints, state(FieldKind::Number, "11")).range_overflow);
        assert!(evaluate(&constraints, state(FieldKind::Number, "2.5")).step_mismatch);
        assert!(evaluate(&constraints, state(FieldKind::Number, "abc")).bad_input);
        assert!(evaluate(&constraints, state(FieldKind::Number, "4")).valid());
    }

    #[test]
    fn test_non_finite_and_padded_numbers_are_bad_input() {
        let constraints = Constraints {
            required: true,
            min: Some(1.0),
            max: Some(10.0),
            ..Default::default()
        };
        for raw in ["NaN", "nan", "inf", "-infinity", " 5", "5 ", "1.", "1e", "+5", "1e400"] {
            let validity = evaluate(&constraints, state(FieldKind::Number, raw));
            assert!(validity.bad_input, "{:?} should be bad input", raw);
            assert!(!validity.range_overflow, "{:?} is not a number", raw);
            assert!(!validity.valid());
        }
        for raw in ["5", "-0", ".5e1", "1E+0", "2.0"] {
            assert!(!evaluate(&constraints, state(FieldKind::Range, raw)).bad_input, "{:?}", raw);
        }
        assert_eq!(parse_number("-.25"), Some(-0.25));
        assert_eq!(parse_number("1e2"), Some(100.0));
    }

    #[test]
    fn test_step_aligns_to_fractional_min() {
        let constraints = Constraints {
            min: Some(0.3),
            ..Default::default()
        };
        for raw in ["0.3", "1.3", "2.3", "100.3"] {
            assert!(evaluate(&constraints, state(FieldKind::Number, raw)).valid(), "{}", raw);
        }
        assert!(evaluate(&constraints, state(FieldKind::Number, "2.8")).step_mismatch);
        assert!(evaluate(&constraints, state(FieldKind::Number, "2")).step_mismatch);

        let unbounded = Constraints::default();
        assert!(evaluate(&unbounded, state(FieldKind::Number, "-3")).valid());
        assert!(evaluate(&unbounded, state(FieldKind::Number, "0.1")).step_mismatch);
    }

    #[test]
    fn test_required_radio_group() {
        let constraints = Constraints {
            required: true,
            ..Default::default()
        };
        let lone = state(FieldKind::Radio, "a");
        assert!(evaluate(&constraints, lone).value_missing);

        let sibling_checked = ControlState {
            group_checked: true,
            ..lone
        };
        assert!(evaluate(&constraints, sibling_checked).valid());

        // A checkbox never borrows its state from other controls.
        let checkbox = ControlState {
            group_checked: true,
            ..state(FieldKind::Checkbox, "on")
        };
        assert!(evaluate(&constraints, checkbox).value_missing);
    }

    #[test]
    fn test_type_mismatch_and_bad_input() {
        let constraints = Constraints::default();
        assert!(evaluate(&constraints, state(FieldKind::Email, "nobody")).type_mismatch);
        assert!(evaluate(&constraints, state(FieldKind::Email, "a@b.com")).valid());
        assert!(evaluate(&constraints, state(FieldKind::Url, "not a url")).type_mismatch);
        assert!(evaluate(&constraints, state(FieldKind::Url, "https://example.com/")).valid());
        assert!(evaluate(&constraints, state(FieldKind::Date, "2024-02-30")).bad_input);
        assert!(evaluate(&constraints, state(FieldKind::Week, "2024-W10")).valid());
        assert!(evaluate(&constraints, state(FieldKind::Color, "#12345g")).bad_input);
        assert!(evaluate(&constraints, state(FieldKind::Time, "09:30")).valid());
    }

    #[test]
    fn test_failures_and_messages() {
        let validity = ValidityState {
            value_missing: true,
            custom_error: true,
            ..Default::default()
        };
        assert_eq!(
            validity.failures(),
            vec![Constraint::ValueMissing, Constraint::CustomError]
        );
        assert!(validity.has_constraint_failure());

        let custom_only = ValidityState {
            custom_error: true,
            ..Default::default()
        };
        assert!(!custom_only.has_constraint_failure());
        assert!(!custom_only.valid());

        let constraints = Constraints {
            max_length: Some(2),
            ..Default::default()
        };
        let message = default_message(Constraint::TooLong, FieldKind::Text, &constraints, "abcd");
        assert!(message.contains("2 characters or less"));
        assert!(message.contains("using 4 characters"));
    }
}
