//! Parsing raw cells into bounded item scores.
//!
//! Parsing never fails. Anything that cannot be read as a score becomes
//! missing (`None`).
//!
//! # Examples
//!
//! ```
//! use tierscope_analysis::{
//!     response::{ScaleWidth, parse_categorical_or_likert, parse_numeric_likert},
//! };
//!
//! let agree = parse_numeric_likert("4 - Agree").unwrap();
//! assert_eq!(agree.value(), 4);
//! assert_eq!(agree.reversed().value(), 2);
//!
//! let letter = parse_categorical_or_likert("B) Sometimes").unwrap();
//! assert_eq!(letter.value(), 2);
//! assert_eq!(letter.width(), ScaleWidth::FourPoint);
//! assert_eq!(letter.reversed().value(), 3);
//! ```

use crate::{schema::ScaleMode, table::CellValue};

/// Width of the scale a value was read on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleWidth {
    /// Likert 1-5, read from a digit.
    FivePoint,
    /// Categorical A-D mapped to 1-4.
    FourPoint,
}

impl ScaleWidth {
    #[must_use]
    pub const fn max(self) -> u8 {
        match self {
            Self::FivePoint => 5,
            Self::FourPoint => 4,
        }
    }
}

/// A parsed, in-range item value together with its scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemValue {
    value: u8,
    width: ScaleWidth,
}

impl ItemValue {
    /// Returns `None` if `value` is outside `1..=width.max()`.
    #[must_use]
    pub fn new(value: u8, width: ScaleWidth) -> Option<Self> {
        (1..=width.max())
            .contains(&value)
            .then_some(Self { value, width })
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.value
    }

    #[must_use]
    pub const fn width(self) -> ScaleWidth {
        self.width
    }

    /// Mirrors the value on its own scale: `6 - v` on five points, `5 - v` on four.
    ///
    /// Letter answers therefore reverse within A-D (`B` becomes 3), not onto
    /// the five-point range a uniform `6 - v` would give (`B` becoming 4).
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self {
            value: self.width.max() + 1 - self.value,
            width: self.width,
        }
    }
}

/// First digit 1-5 anywhere in `text`.
#[must_use]
pub fn parse_numeric_likert(text: &str) -> Option<ItemValue> {
    text.bytes()
        .find(|b| (b'1'..=b'5').contains(b))
        .and_then(|b| ItemValue::new(b - b'0', ScaleWidth::FivePoint))
}

/// Leading letter A-D (after whitespace) mapped to 1-4, otherwise
/// [`parse_numeric_likert`].
#[must_use]
pub fn parse_categorical_or_likert(text: &str) -> Option<ItemValue> {
    match text.trim_start().bytes().next() {
        Some(b @ b'A'..=b'D') => ItemValue::new(b - b'A' + 1, ScaleWidth::FourPoint),
        _ => parse_numeric_likert(text),
    }
}

/// Parses a cell with the tier's scale mode.
#[must_use]
pub fn parse_cell(cell: &CellValue, mode: ScaleMode) -> Option<ItemValue> {
    let text = cell.text()?;
    match mode {
        ScaleMode::NumericLikert => parse_numeric_likert(&text),
        ScaleMode::CategoricalOrLikert => parse_categorical_or_likert(&text),
    }
}

/// Parses a cell and applies reverse-coding when `reverse` is set.
#[must_use]
pub fn score_cell(cell: &CellValue, mode: ScaleMode, reverse: bool) -> Option<f64> {
    let value = parse_cell(cell, mode)?;
    let value = if reverse { value.reversed() } else { value };
    Some(f64::from(value.value()))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_numeric_likert() {
        assert_eq!(parse_numeric_likert("5").map(ItemValue::value), Some(5));
        assert_eq!(
            parse_numeric_likert("Strongly agree (5)").map(ItemValue::value),
            Some(5)
        );
        assert_eq!(parse_numeric_likert("0 or 7, then 3").map(ItemValue::value), Some(3));
        assert_eq!(parse_numeric_likert("Agree"), None);
        assert_eq!(parse_numeric_likert(""), None);
        assert_eq!(parse_numeric_likert("9"), None);
    }

    #[test]
    fn test_categorical_letters() {
        for (text, expected) in [("A", 1), ("B. Often", 2), ("  C", 3), ("D - Never", 4)] {
            let value = parse_categorical_or_likert(text).unwrap();
            assert_eq!(value.value(), expected);
            assert_eq!(value.width(), ScaleWidth::FourPoint);
        }
        assert_eq!(parse_categorical_or_likert("E"), None);
        assert_eq!(parse_categorical_or_likert("a"), None);
        assert_eq!(parse_categorical_or_likert("nothing here"), None);
    }

    #[test]
    fn test_categorical_falls_back_to_likert() {
        let value = parse_categorical_or_likert("Level 4").unwrap();
        assert_eq!(value.value(), 4);
        assert_eq!(value.width(), ScaleWidth::FivePoint);
    }

    #[test]
    fn test_reverse_uses_scale_of_parsed_value() {
        let four = parse_categorical_or_likert("D").unwrap();
        assert_eq!(four.reversed().value(), 1);
        let five = parse_categorical_or_likert("5").unwrap();
        assert_eq!(five.reversed().value(), 1);
    }

    #[test]
    fn test_letters_reverse_within_four_points() {
        let reversed = ["A", "B", "C", "D"]
            .map(|letter| parse_categorical_or_likert(letter).unwrap().reversed().value());
        assert_eq!(reversed, [4, 3, 2, 1]);
        // The digit "2" sits on the five-point scale and mirrors to 4.
        let digit = parse_categorical_or_likert("2").unwrap();
        assert_eq!(digit.reversed().value(), 4);
    }

    #[test]
    fn test_cells() {
        let mode = ScaleMode::NumericLikert;
        assert_eq!(score_cell(&CellValue::Null, mode, true), None);
        assert_eq!(score_cell(&CellValue::from(4_i64), mode, false), Some(4.0));
        assert_eq!(score_cell(&CellValue::from(4_i64), mode, true), Some(2.0));
        assert_eq!(score_cell(&CellValue::Bool(true), mode, false), None);
        assert_eq!(
            score_cell(&CellValue::from("B"), ScaleMode::CategoricalOrLikert, true),
            Some(3.0)
        );
        assert_eq!(score_cell(&CellValue::from("B"), mode, false), None);
    }

    fn item_value() -> impl Strategy<Value = ItemValue> {
        prop_oneof![
            (1..=5_u8).prop_map(|v| ItemValue::new(v, ScaleWidth::FivePoint).unwrap()),
            (1..=4_u8).prop_map(|v| ItemValue::new(v, ScaleWidth::FourPoint).unwrap()),
        ]
    }

    proptest! {
        #[test]
        fn reverse_is_an_involution(value in item_value()) {
            prop_assert_eq!(value.reversed().reversed(), value);
        }

        #[test]
        fn reverse_stays_in_range(value in item_value()) {
            let reversed = value.reversed();
            prop_assert!((1..=value.width().max()).contains(&reversed.value()));
            prop_assert_eq!(reversed.width(), value.width());
        }

        #[test]
        fn parsing_never_leaves_the_scale(text in ".*") {
            for value in [parse_numeric_likert(&text), parse_categorical_or_likert(&text)]
                .into_iter()
                .flatten()
            {
                prop_assert!((1..=value.width().max()).contains(&value.value()));
            }
        }

        #[test]
        fn letter_prefix_wins_over_digits(letter in 0..4_u8, rest in "[ 0-9a-z]*") {
            let text = format!("{}{rest}", char::from(b'A' + letter));
            let value = parse_categorical_or_likert(&text).unwrap();
            prop_assert_eq!(value.value(), letter + 1);
        }
    }
}
