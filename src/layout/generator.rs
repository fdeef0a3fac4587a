//! Seat generation
//!
//! Pure expansion of validated blocks into seats. For every row of every
//! block, in order: the left side group, each middle group, the right side
//! group. The line letter restarts at `A` on every row while the index runs
//! on across the whole flight.

use crate::models::SeatType;

use super::validator::ValidatedBlock;

/// A seat about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSeat {
    pub index: i64,
    pub row: i64,
    pub line: char,
    pub seat_type: SeatType,
    pub created_at: i64,
}

/// Expand `blocks` into seats stamped with `created_at`.
pub fn generate_seats(blocks: &[ValidatedBlock], created_at: i64) -> Vec<NewSeat> {
    let mut seats = Vec::new();
    let mut index: i64 = 0;

    for block in blocks {
        for row in 1..=i64::from(block.rows) {
            let mut line = 'A';
            let mut emit = |seat_type: SeatType| {
                index += 1;
                seats.push(NewSeat {
                    index,
                    row,
                    line,
                    seat_type,
                    created_at,
                });
                line = next_line(line);
            };

            let left = block.side[0];
            for j in 0..left {
                emit(left_type(j, left));
            }
            for &size in &block.middle {
                for j in 0..size {
                    emit(middle_type(j, size));
                }
            }
            let right = block.side[1];
            for j in 0..right {
                emit(right_type(j, right));
            }
        }
    }

    seats
}

fn left_type(j: u32, size: u32) -> SeatType {
    if j == size - 1 {
        SeatType::Aisle
    } else if j == 0 {
        SeatType::Window
    } else {
        SeatType::Middle
    }
}

fn middle_type(j: u32, size: u32) -> SeatType {
    if j == 0 || j == size - 1 {
        SeatType::Aisle
    } else {
        SeatType::Middle
    }
}

fn right_type(j: u32, size: u32) -> SeatType {
    if j == 0 {
        SeatType::Aisle
    } else if j == size - 1 {
        SeatType::Window
    } else {
        SeatType::Middle
    }
}

fn next_line(line: char) -> char {
    char::from_u32(u32::from(line) + 1).unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use SeatType::{Aisle, Middle, Window};

    fn block(rows: u32, side: [u32; 2], middle: &[u32]) -> ValidatedBlock {
        ValidatedBlock {
            rows,
            side,
            middle: middle.to_vec(),
        }
    }

    #[test]
    fn test_indices_are_contiguous_across_blocks() {
        let blocks = vec![block(3, [2, 2], &[]), block(4, [3, 3], &[2, 4])];
        let seats = generate_seats(&blocks, 100);

        let indices: Vec<i64> = seats.iter().map(|s| s.index).collect();
        let expected: Vec<i64> = (1..=(3 * 4 + 4 * 12)).collect();
        assert_eq!(indices, expected);
        assert!(seats.iter().all(|s| s.created_at == 100));
    }

    #[test]
    fn test_lines_restart_every_row_and_block() {
        let blocks = vec![block(2, [1, 2], &[]), block(1, [2, 2], &[1])];
        let seats = generate_seats(&blocks, 0);

        let rows: Vec<(i64, String)> = seats
            .chunks(3)
            .take(2)
            .map(|chunk| (chunk[0].row, chunk.iter().map(|s| s.line).collect()))
            .collect();
        assert_eq!(rows, vec![(1, "ABC".to_string()), (2, "ABC".to_string())]);

        let last: String = seats[6..].iter().map(|s| s.line).collect();
        assert_eq!(last, "ABCDE");
        assert!(seats[6..].iter().all(|s| s.row == 1));
    }

    #[test]
    fn test_single_seat_groups_are_all_aisle() {
        let seats = generate_seats(&[block(5, [1, 1], &[1])], 0);
        assert_eq!(seats.len(), 15);
        assert!(seats.iter().all(|s| s.seat_type == Aisle));
    }

    #[test]
    fn test_wide_body_row_types() {
        let seats = generate_seats(&[block(1, [3, 3], &[4])], 0);
        let types: Vec<SeatType> = seats.iter().map(|s| s.seat_type).collect();
        assert_eq!(
            types,
            vec![Window, Middle, Aisle, Aisle, Middle, Middle, Aisle, Aisle, Middle, Window]
        );
        let lines: String = seats.iter().map(|s| s.line).collect();
        assert_eq!(lines, "ABCDEFGHIJ");
    }

    #[test]
    fn test_two_seat_side_groups() {
        let seats = generate_seats(&[block(1, [2, 2], &[])], 0);
        let types: Vec<SeatType> = seats.iter().map(|s| s.seat_type).collect();
        assert_eq!(types, vec![Window, Aisle, Aisle, Window]);
    }

    #[test]
    fn test_no_blocks_no_seats() {
        assert!(generate_seats(&[], 0).is_empty());
    }
}
