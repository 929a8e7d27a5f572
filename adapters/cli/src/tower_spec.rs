//! Parsing of `--tower` arguments.

use std::str::FromStr;

use coop_defence_core::{CellCoord, TowerKind};
use thiserror::Error;

/// Delimiter between the cell and the optional tower kind.
const KIND_DELIMITER: char = ':';

/// Tower purchase requested on the command line, written `COLUMN,ROW[:KIND]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TowerPlacement {
    /// Cell the tower is bought for.
    pub(crate) cell: CellCoord,
    /// Kind of tower, Chicken when omitted.
    pub(crate) kind: TowerKind,
}

impl FromStr for TowerPlacement {
    type Err = TowerSpecError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(TowerSpecError::Empty);
        }

        let (cell, kind) = match trimmed.split_once(KIND_DELIMITER) {
            Some((cell, kind)) => (cell, parse_kind(kind)?),
            None => (trimmed, TowerKind::Chicken),
        };

        Ok(Self {
            cell: parse_cell(cell)?,
            kind,
        })
    }
}

/// Errors raised while parsing a `--tower` argument.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum TowerSpecError {
    /// The argument was empty.
    #[error("tower argument was empty")]
    Empty,
    /// The cell part was not `COLUMN,ROW`.
    #[error("could not parse cell '{0}', expected COLUMN,ROW")]
    InvalidCell(String),
    /// The kind part named no known tower.
    #[error("unknown tower kind '{0}', expected chicken or beagle")]
    UnknownKind(String),
}

fn parse_cell(cell: &str) -> Result<CellCoord, TowerSpecError> {
    let (column, row) = cell
        .split_once(',')
        .ok_or_else(|| TowerSpecError::InvalidCell(cell.to_owned()))?;

    let column = column
        .trim()
        .parse::<u32>()
        .map_err(|_| TowerSpecError::InvalidCell(cell.to_owned()))?;
    let row = row
        .trim()
        .parse::<u32>()
        .map_err(|_| TowerSpecError::InvalidCell(cell.to_owned()))?;

    Ok(CellCoord::new(column, row))
}

fn parse_kind(kind: &str) -> Result<TowerKind, TowerSpecError> {
    match kind.trim().to_ascii_lowercase().as_str() {
        "chicken" => Ok(TowerKind::Chicken),
        "beagle" => Ok(TowerKind::Beagle),
        _ => Err(TowerSpecError::UnknownKind(kind.to_owned())),
    }
}
