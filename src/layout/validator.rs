//! Block and flight validation
//!
//! All violations are collected. Block error lists are concatenated in block
//! order between the flight name check and the total rows check.

use serde::{Deserialize, Serialize};

use crate::models::{Block, FieldError, FlightCreate, ValidationErrors};

fn default_max_lines() -> u32 {
    20
}

fn default_max_rows() -> u32 {
    200
}

fn default_max_name_length() -> usize {
    255
}

/// Seating caps applied at flight creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutLimits {
    /// Maximum seats per row in one block
    #[serde(default = "default_max_lines")]
    pub max_lines: u32,
    /// Maximum rows summed over all blocks of a flight
    #[serde(default = "default_max_rows")]
    pub max_rows: u32,
    /// Maximum flight name length in characters
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
}

impl Default for LayoutLimits {
    fn default() -> Self {
        Self {
            max_lines: default_max_lines(),
            max_rows: default_max_rows(),
            max_name_length: default_max_name_length(),
        }
    }
}

/// A block that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBlock {
    pub rows: u32,
    /// Left and right window group sizes
    pub side: [u32; 2],
    pub middle: Vec<u32>,
}

impl ValidatedBlock {
    pub fn seats_per_row(&self) -> u64 {
        self.side
            .iter()
            .chain(&self.middle)
            .fold(0u64, |total, &n| total.saturating_add(u64::from(n)))
    }

    /// Saturates; a block checked alone has no bound on `rows`.
    pub fn seat_count(&self) -> u64 {
        u64::from(self.rows).saturating_mul(self.seats_per_row())
    }

    /// Wire form of this block
    pub fn to_block(&self) -> Block {
        Block::new(
            i64::from(self.rows),
            self.side.iter().map(|&n| i64::from(n)).collect(),
            self.middle.iter().map(|&n| i64::from(n)).collect(),
        )
    }
}

/// A flight ready for seat generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatingPlan {
    pub name: String,
    pub blocks: Vec<ValidatedBlock>,
}

impl SeatingPlan {
    pub fn seat_count(&self) -> u64 {
        self.blocks
            .iter()
            .map(ValidatedBlock::seat_count)
            .fold(0, u64::saturating_add)
    }
}

/// Validate one block against `limits`.
pub fn validate_block(
    block: &Block,
    limits: &LayoutLimits,
) -> Result<ValidatedBlock, Vec<FieldError>> {
    let mut errors = Vec::new();

    if block.rows <= 0 {
        errors.push(FieldError::rule(
            "rows.TooSmall",
            "Rows must be more than zero",
            "rows",
        ));
    }

    if block.side_seat_counts.len() != 2 {
        errors.push(FieldError::rule(
            "side_seat_numbers.Invalid",
            "Must be precisely two side seats",
            "side_seat_numbers",
        ));
    }

    let mut lines: i64 = 0;
    for &count in &block.side_seat_counts {
        if count <= 0 {
            errors.push(FieldError::rule(
                "side_seat_numbers.TooSmall",
                "Side seats must be more than zero",
                "side_seat_numbers",
            ));
        }
        lines = lines.saturating_add(count);
    }

    for &count in &block.middle_seat_groups {
        if count <= 0 {
            errors.push(FieldError::rule(
                "middle_seat_numbers.TooSmall",
                "Middle seats must be more than zero",
                "middle_seat_numbers",
            ));
        }
        lines = lines.saturating_add(count);
    }

    if lines > i64::from(limits.max_lines) {
        errors.push(FieldError::rule(
            "seat_number.TooLarge",
            format!("Seat number must be less than {}", limits.max_lines),
            "side_seat_numbers,middle_seat_numbers",
        ));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // Every count is now in 1..=max_lines.
    Ok(ValidatedBlock {
        rows: narrow(block.rows),
        side: [
            narrow(block.side_seat_counts[0]),
            narrow(block.side_seat_counts[1]),
        ],
        middle: block.middle_seat_groups.iter().map(|&n| narrow(n)).collect(),
    })
}

/// Validate a creation payload and its blocks.
pub fn validate_flight(
    flight: &FlightCreate,
    limits: &LayoutLimits,
) -> Result<SeatingPlan, ValidationErrors> {
    let mut errors = Vec::new();

    if flight.name.chars().count() > limits.max_name_length {
        errors.push(FieldError::rule(
            "name.TooLarge",
            format!(
                "Name must be less than {} characters",
                limits.max_name_length
            ),
            "name",
        ));
    }

    let mut rows: i64 = 0;
    let mut blocks = Vec::with_capacity(flight.blocks.len());
    for block in &flight.blocks {
        match validate_block(block, limits) {
            Ok(validated) => blocks.push(validated),
            Err(block_errors) => errors.extend(block_errors),
        }
        rows = rows.saturating_add(block.rows);
    }

    if rows > i64::from(limits.max_rows) {
        errors.push(FieldError::rule(
            "rows.TooLarge",
            format!("Rows must be less than {}", limits.max_rows),
            "rows",
        ));
    }

    match ValidationErrors::from_vec(errors) {
        Some(errors) => Err(errors),
        None => Ok(SeatingPlan {
            name: flight.name.clone(),
            blocks,
        }),
    }
}

fn narrow(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.code.as_str()).collect()
    }

    #[test]
    fn test_valid_block() {
        let block = Block::new(10, vec![3, 3], vec![4]);
        let validated = validate_block(&block, &LayoutLimits::default()).unwrap();
        assert_eq!(validated.rows, 10);
        assert_eq!(validated.side, [3, 3]);
        assert_eq!(validated.middle, vec![4]);
        assert_eq!(validated.seats_per_row(), 10);
        assert_eq!(validated.seat_count(), 100);
        assert_eq!(validated.to_block(), block);
    }

    #[test]
    fn test_unbounded_rows_do_not_overflow_counts() {
        let block = Block::new(i64::MAX, vec![1, 1], vec![]);
        let validated = validate_block(&block, &LayoutLimits::default()).unwrap();
        assert_eq!(validated.rows, u32::MAX);
        assert_eq!(validated.seat_count(), 2 * u64::from(u32::MAX));

        let extreme = ValidatedBlock {
            rows: u32::MAX,
            side: [u32::MAX, u32::MAX],
            middle: vec![u32::MAX],
        };
        assert_eq!(extreme.seats_per_row(), 3 * u64::from(u32::MAX));
        assert_eq!(extreme.seat_count(), u64::MAX);
    }

    #[test]
    fn test_block_collects_every_violation() {
        let block = Block::new(0, vec![0, -1, 30], vec![0]);
        let errors = validate_block(&block, &LayoutLimits::default()).unwrap_err();
        assert_eq!(
            codes(&errors),
            vec![
                "rows.TooSmall",
                "side_seat_numbers.Invalid",
                "side_seat_numbers.TooSmall",
                "side_seat_numbers.TooSmall",
                "middle_seat_numbers.TooSmall",
                "seat_number.TooLarge",
            ]
        );
        assert_eq!(errors[5].message, "Seat number must be less than 20");
        assert_eq!(errors[5].field, "side_seat_numbers,middle_seat_numbers");
    }

    #[test]
    fn test_max_lines_is_inclusive() {
        let limits = LayoutLimits::default();
        assert!(validate_block(&Block::new(1, vec![5, 5], vec![10]), &limits).is_ok());
        assert!(validate_block(&Block::new(1, vec![5, 5], vec![11]), &limits).is_err());
    }

    #[test]
    fn test_missing_side_seats() {
        let block = Block::new(2, vec![3], vec![]);
        let errors = validate_block(&block, &LayoutLimits::default()).unwrap_err();
        assert_eq!(codes(&errors), vec!["side_seat_numbers.Invalid"]);
    }

    #[test]
    fn test_flight_errors_in_order() {
        let flight = FlightCreate {
            name: "x".repeat(256),
            blocks: vec![
                Block::new(150, vec![0, 1], vec![]),
                Block::new(100, vec![1, 1], vec![-2]),
            ],
        };
        let errors = validate_flight(&flight, &LayoutLimits::default()).unwrap_err();
        assert_eq!(
            errors.codes(),
            vec![
                "name.TooLarge",
                "side_seat_numbers.TooSmall",
                "middle_seat_numbers.TooSmall",
                "rows.TooLarge",
            ]
        );
        assert_eq!(
            errors.errors()[0].message,
            "Name must be less than 255 characters"
        );
        assert_eq!(errors.errors()[3].message, "Rows must be less than 200");
    }

    #[test]
    fn test_name_length_counts_characters() {
        let flight = FlightCreate {
            name: "é".repeat(255),
            blocks: vec![Block::new(1, vec![1, 1], vec![])],
        };
        assert!(validate_flight(&flight, &LayoutLimits::default()).is_ok());
    }

    #[test]
    fn test_custom_limits() {
        let limits = LayoutLimits {
            max_lines: 4,
            max_rows: 10,
            max_name_length: 3,
        };
        let flight = FlightCreate {
            name: "ABCD".to_string(),
            blocks: vec![Block::new(11, vec![2, 2], vec![1])],
        };
        let errors = validate_flight(&flight, &limits).unwrap_err();
        assert_eq!(
            errors.codes(),
            vec!["name.TooLarge", "seat_number.TooLarge", "rows.TooLarge"]
        );
    }

    #[test]
    fn test_plan_seat_count() {
        let flight = FlightCreate {
            name: "LH400".to_string(),
            blocks: vec![
                Block::new(2, vec![2, 2], vec![]),
                Block::new(3, vec![3, 3], vec![4]),
            ],
        };
        let plan = validate_flight(&flight, &LayoutLimits::default()).unwrap();
        assert_eq!(plan.name, "LH400");
        assert_eq!(plan.blocks.len(), 2);
        assert_eq!(plan.seat_count(), 8 + 30);
    }
}
