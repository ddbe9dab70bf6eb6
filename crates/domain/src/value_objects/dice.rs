//! Dice rolling value objects and parsing
//!
//! Supports dice formulas like "1d20+5", "2d6+1d4+3", "1d100", etc.
//! A formula is a sum of dice terms plus a flat modifier; terms are
//! joined by `+` and the flat modifier may be negative ("1d20-2").
//! Also supports manual result input for physical dice rolls.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error when parsing a dice formula
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceParseError {
    /// The formula string is empty
    #[error("Empty dice formula")]
    Empty,
    /// Invalid format - expected XdY joined by + with an optional flat modifier
    #[error("Invalid dice format: {0}")]
    InvalidFormat(String),
    /// Dice count must be at least 1
    #[error("Dice count must be at least 1")]
    InvalidDiceCount,
    /// Die size must be at least 2
    #[error("Die size must be at least 2")]
    InvalidDieSize,
}

/// A single XdY term within a formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceTerm {
    /// Number of dice to roll (X in XdY)
    pub count: u8,
    /// Size of each die (Y in XdY)
    pub size: u8,
}

impl fmt::Display for DiceTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.size)
    }
}

/// A parsed dice formula like "2d6+1d4+3"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceFormula {
    /// The dice terms, in the order they were written
    pub terms: Vec<DiceTerm>,
    /// Flat modifier added after all dice (+Z or -Z)
    pub modifier: i32,
}

impl DiceFormula {
    /// Create a single-term formula
    pub fn single(count: u8, size: u8, modifier: i32) -> Result<Self, DiceParseError> {
        if count == 0 {
            return Err(DiceParseError::InvalidDiceCount);
        }
        if size < 2 {
            return Err(DiceParseError::InvalidDieSize);
        }
        Ok(Self {
            terms: vec![DiceTerm { count, size }],
            modifier,
        })
    }

    /// Parse a dice formula string like "1d20+5", "2d6+1d4+3", "d100"
    ///
    /// Supported formats:
    /// - "XdY" - Roll X dice of size Y ("dY" is shorthand for 1 die)
    /// - "XdY+Z" - add a flat modifier
    /// - "XdY-Z" - subtract a flat modifier
    /// - "XdY+AdB+..." - sum of multiple dice terms
    pub fn parse(input: &str) -> Result<Self, DiceParseError> {
        let input: String = input.trim().to_lowercase().replace(' ', "");
        if input.is_empty() {
            return Err(DiceParseError::Empty);
        }

        let mut terms = Vec::new();
        let mut modifier: i32 = 0;

        for segment in input.split('+') {
            if segment.is_empty() {
                return Err(DiceParseError::InvalidFormat(format!(
                    "Empty segment in '{}'",
                    input
                )));
            }
            if let Some(d_pos) = segment.find('d') {
                // Dice term, possibly with a trailing "-Z" flat modifier ("1d20-2").
                let count_str = &segment[..d_pos];
                let count: u8 = if count_str.is_empty() {
                    1 // "d20" means "1d20"
                } else {
                    count_str.parse().map_err(|_| {
                        DiceParseError::InvalidFormat(format!("Invalid dice count: '{}'", count_str))
                    })?
                };
                if count == 0 {
                    return Err(DiceParseError::InvalidDiceCount);
                }

                let after_d = &segment[d_pos + 1..];
                let (size_str, trailing) = match after_d.find('-') {
                    Some(0) => {
                        return Err(DiceParseError::InvalidFormat(format!(
                            "Invalid die size: '{}'",
                            after_d
                        )))
                    }
                    Some(minus_pos) => (&after_d[..minus_pos], Some(&after_d[minus_pos + 1..])),
                    None => (after_d, None),
                };

                let size: u8 = size_str.parse().map_err(|_| {
                    DiceParseError::InvalidFormat(format!("Invalid die size: '{}'", size_str))
                })?;
                if size < 2 {
                    return Err(DiceParseError::InvalidDieSize);
                }
                terms.push(DiceTerm { count, size });

                if let Some(mod_str) = trailing {
                    let value: i32 = mod_str.parse().map_err(|_| {
                        DiceParseError::InvalidFormat(format!("Invalid modifier: '-{}'", mod_str))
                    })?;
                    modifier -= value;
                }
            } else {
                // Flat segment
                let value: i32 = segment.parse().map_err(|_| {
                    DiceParseError::InvalidFormat(format!("Invalid flat modifier: '{}'", segment))
                })?;
                modifier += value;
            }
        }

        if terms.is_empty() {
            return Err(DiceParseError::InvalidFormat(format!(
                "No dice term in '{}'",
                input
            )));
        }

        Ok(Self { terms, modifier })
    }

    /// Total number of dice across all terms
    pub fn dice_count(&self) -> u32 {
        self.terms.iter().map(|t| t.count as u32).sum()
    }

    /// Roll the dice using the thread-local RNG
    pub fn roll(&self) -> DiceRollResult {
        let mut rng = rand::thread_rng();
        self.roll_with(&mut |size| rng.gen_range(1..=size as i32))
    }

    /// Roll the dice with an injected die roller.
    ///
    /// The roller receives the die size and must return a value in `1..=size`.
    /// This is the seam the engine uses to route randomness through its
    /// `RandomPort`, and tests use to pin rolls.
    pub fn roll_with(&self, roller: &mut dyn FnMut(u8) -> i32) -> DiceRollResult {
        let mut individual_rolls = Vec::with_capacity(self.dice_count() as usize);
        for term in &self.terms {
            for _ in 0..term.count {
                individual_rolls.push(roller(term.size));
            }
        }

        let dice_total: i32 = individual_rolls.iter().sum();
        let total = dice_total + self.modifier;

        DiceRollResult {
            formula: self.clone(),
            individual_rolls,
            dice_total,
            modifier_applied: self.modifier,
            total,
        }
    }

    /// Get the minimum possible roll
    pub fn min_roll(&self) -> i32 {
        self.dice_count() as i32 + self.modifier
    }

    /// Get the maximum possible roll
    pub fn max_roll(&self) -> i32 {
        self.terms
            .iter()
            .map(|t| t.count as i32 * t.size as i32)
            .sum::<i32>()
            + self.modifier
    }

    /// Format as a display string (e.g., "2d6+1d4+3")
    pub fn display(&self) -> String {
        let mut out = self
            .terms
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join("+");
        if self.modifier > 0 {
            out.push_str(&format!("+{}", self.modifier));
        } else if self.modifier < 0 {
            out.push_str(&self.modifier.to_string());
        }
        out
    }
}

impl fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Result of rolling dice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceRollResult {
    /// The formula that was rolled
    pub formula: DiceFormula,
    /// Individual die results, in term order
    pub individual_rolls: Vec<i32>,
    /// Sum of dice before modifier
    pub dice_total: i32,
    /// Modifier that was applied
    pub modifier_applied: i32,
    /// Final total (dice_total + modifier)
    pub total: i32,
}

impl DiceRollResult {
    /// Create a result from a manual input (no actual dice rolled)
    pub fn from_manual(total: i32) -> Self {
        Self {
            formula: DiceFormula {
                terms: vec![],
                modifier: 0,
            },
            individual_rolls: vec![],
            dice_total: total,
            modifier_applied: 0,
            total,
        }
    }

    /// Check if this was a manual roll
    pub fn is_manual(&self) -> bool {
        self.formula.terms.is_empty()
    }

    /// Format as a breakdown string (e.g., "1d20(14) + 5 = 19" or "Manual: 18")
    pub fn breakdown(&self) -> String {
        if self.is_manual() {
            return format!("Manual: {}", self.total);
        }

        let mut parts = Vec::with_capacity(self.formula.terms.len() + 1);
        let mut cursor = 0usize;
        for term in &self.formula.terms {
            let rolls = &self.individual_rolls[cursor..cursor + term.count as usize];
            cursor += term.count as usize;
            if rolls.len() == 1 {
                parts.push(format!("{}({})", term, rolls[0]));
            } else {
                let rolls_str: Vec<String> = rolls.iter().map(|r| r.to_string()).collect();
                parts.push(format!("{}[{}]", term, rolls_str.join(", ")));
            }
        }

        let joined = parts.join(" + ");
        if self.modifier_applied == 0 {
            format!("{} = {}", joined, self.total)
        } else if self.modifier_applied > 0 {
            format!("{} + {} = {}", joined, self.modifier_applied, self.total)
        } else {
            format!("{} - {} = {}", joined, -self.modifier_applied, self.total)
        }
    }

    /// Check if this is a natural 20 (single-d20 formulas only)
    pub fn is_natural_20(&self) -> bool {
        self.is_single_d20() && self.individual_rolls.first() == Some(&20)
    }

    /// Check if this is a natural 1 (single-d20 formulas only)
    pub fn is_natural_1(&self) -> bool {
        self.is_single_d20() && self.individual_rolls.first() == Some(&1)
    }

    fn is_single_d20(&self) -> bool {
        matches!(
            self.formula.terms.as_slice(),
            [DiceTerm { count: 1, size: 20 }]
        )
    }
}

/// Input for a dice roll - either a formula to roll or a manual result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiceRollInput {
    /// Roll dice using a formula string like "1d20+5"
    Formula(String),
    /// Use a manual result (physical dice roll)
    ManualResult(i32),
}

impl DiceRollInput {
    /// Resolve the input to a roll result
    pub fn resolve(&self) -> Result<DiceRollResult, DiceParseError> {
        match self {
            Self::Formula(formula_str) => {
                let formula = DiceFormula::parse(formula_str)?;
                Ok(formula.roll())
            }
            Self::ManualResult(total) => Ok(DiceRollResult::from_manual(*total)),
        }
    }

    /// Resolve with an additional modifier (from character skills)
    pub fn resolve_with_modifier(
        &self,
        skill_modifier: i32,
    ) -> Result<DiceRollResult, DiceParseError> {
        match self {
            Self::Formula(formula_str) => {
                let mut formula = DiceFormula::parse(formula_str)?;
                formula.modifier += skill_modifier;
                Ok(formula.roll())
            }
            Self::ManualResult(total) => {
                // For manual results, the player already factored in their modifier
                Ok(DiceRollResult::from_manual(*total))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(rolls: &[i32]) -> impl FnMut(u8) -> i32 + '_ {
        let mut iter = rolls.iter().copied();
        move |_| iter.next().unwrap_or(1)
    }

    #[test]
    fn test_parse_simple_d20() {
        let formula = DiceFormula::parse("1d20").unwrap();
        assert_eq!(formula.terms, vec![DiceTerm { count: 1, size: 20 }]);
        assert_eq!(formula.modifier, 0);
    }

    #[test]
    fn test_parse_shorthand_d20() {
        let formula = DiceFormula::parse("d20").unwrap();
        assert_eq!(formula.terms, vec![DiceTerm { count: 1, size: 20 }]);
    }

    #[test]
    fn test_parse_with_positive_modifier() {
        let formula = DiceFormula::parse("1d20+5").unwrap();
        assert_eq!(formula.modifier, 5);
    }

    #[test]
    fn test_parse_with_negative_modifier() {
        let formula = DiceFormula::parse("1d20-3").unwrap();
        assert_eq!(formula.modifier, -3);
    }

    #[test]
    fn test_parse_multi_term() {
        let formula = DiceFormula::parse("2d6+1d4+3").unwrap();
        assert_eq!(
            formula.terms,
            vec![DiceTerm { count: 2, size: 6 }, DiceTerm { count: 1, size: 4 }]
        );
        assert_eq!(formula.modifier, 3);
    }

    #[test]
    fn test_parse_case_insensitive_and_whitespace() {
        let formula = DiceFormula::parse("  2D6 + 3 ").unwrap();
        assert_eq!(formula.terms, vec![DiceTerm { count: 2, size: 6 }]);
        assert_eq!(formula.modifier, 3);
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(DiceFormula::parse(""), Err(DiceParseError::Empty)));
    }

    #[test]
    fn test_parse_no_dice_term() {
        assert!(matches!(
            DiceFormula::parse("20"),
            Err(DiceParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_invalid_zero_dice() {
        assert!(matches!(
            DiceFormula::parse("0d20"),
            Err(DiceParseError::InvalidDiceCount)
        ));
    }

    #[test]
    fn test_parse_invalid_die_size() {
        assert!(matches!(
            DiceFormula::parse("1d1"),
            Err(DiceParseError::InvalidDieSize)
        ));
    }

    #[test]
    fn test_roll_range() {
        let formula = DiceFormula::parse("1d20").unwrap();
        for _ in 0..100 {
            let result = formula.roll();
            assert!(result.total >= 1 && result.total <= 20);
        }
    }

    #[test]
    fn test_roll_with_fixed_dice() {
        let formula = DiceFormula::parse("2d6+1d4+3").unwrap();
        let result = formula.roll_with(&mut fixed(&[4, 5, 2]));
        assert_eq!(result.individual_rolls, vec![4, 5, 2]);
        assert_eq!(result.dice_total, 11);
        assert_eq!(result.total, 14);
    }

    #[test]
    fn test_min_max_roll() {
        let formula = DiceFormula::parse("2d6+1d4+3").unwrap();
        assert_eq!(formula.min_roll(), 6);
        assert_eq!(formula.max_roll(), 19);
    }

    #[test]
    fn test_breakdown_single_die() {
        let formula = DiceFormula::parse("1d20+5").unwrap();
        let result = formula.roll_with(&mut fixed(&[14]));
        assert_eq!(result.breakdown(), "1d20(14) + 5 = 19");
    }

    #[test]
    fn test_breakdown_multi_term() {
        let formula = DiceFormula::parse("2d6+1d4+3").unwrap();
        let result = formula.roll_with(&mut fixed(&[4, 5, 2]));
        assert_eq!(result.breakdown(), "2d6[4, 5] + 1d4(2) + 3 = 14");
    }

    #[test]
    fn test_breakdown_manual() {
        let result = DiceRollResult::from_manual(18);
        assert_eq!(result.breakdown(), "Manual: 18");
        assert!(result.is_manual());
    }

    #[test]
    fn test_natural_20_and_1() {
        let formula = DiceFormula::parse("1d20").unwrap();
        assert!(formula.roll_with(&mut fixed(&[20])).is_natural_20());
        assert!(formula.roll_with(&mut fixed(&[1])).is_natural_1());
        assert!(!formula.roll_with(&mut fixed(&[19])).is_natural_20());
        // Multi-term formulas never flag naturals
        let multi = DiceFormula::parse("2d20").unwrap();
        assert!(!multi.roll_with(&mut fixed(&[20, 20])).is_natural_20());
    }

    #[test]
    fn test_dice_roll_input_formula() {
        let input = DiceRollInput::Formula("1d20+5".to_string());
        let result = input.resolve().unwrap();
        assert!(!result.is_manual());
        assert!(result.total >= 6 && result.total <= 25);
    }

    #[test]
    fn test_dice_roll_input_manual() {
        let input = DiceRollInput::ManualResult(18);
        let result = input.resolve().unwrap();
        assert!(result.is_manual());
        assert_eq!(result.total, 18);
    }

    #[test]
    fn test_resolve_with_modifier() {
        let input = DiceRollInput::Formula("1d20".to_string());
        let result = input.resolve_with_modifier(5).unwrap();
        assert!(result.total >= 6 && result.total <= 25);
        assert_eq!(result.modifier_applied, 5);
    }

    #[test]
    fn test_display() {
        assert_eq!(DiceFormula::parse("1d20").unwrap().display(), "1d20");
        assert_eq!(DiceFormula::parse("1d20+5").unwrap().display(), "1d20+5");
        assert_eq!(DiceFormula::parse("1d20-3").unwrap().display(), "1d20-3");
        assert_eq!(
            DiceFormula::parse("2d6+1d4+3").unwrap().display(),
            "2d6+1d4+3"
        );
    }
}
