use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Value of a single grid cell.
///
/// Every non-empty spreadsheet cell is coerced to its raw displayed string,
/// whatever its original data type, because all non-empty values are treated
/// as entity names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(s.as_str()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::text(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::text(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// Identifier of an entity: a positive integer rendered as its decimal string
/// in every serialized document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Returns `None` for zero; ids start at 1.
    pub fn new(value: u32) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    /// Id derived from a grid position: `index - 1`.
    pub fn from_position(index: usize) -> Option<Self> {
        index
            .checked_sub(1)
            .and_then(|v| u32::try_from(v).ok())
            .and_then(Self::new)
    }

    /// Id following a registry holding `count` names: `count + 1`.
    pub(crate) fn after_count(count: usize) -> Self {
        Self(u32::try_from(count).unwrap_or(u32::MAX).saturating_add(1))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid entity id '{0}': expected a positive integer")]
pub struct ParseEntityIdError(String);

impl FromStr for EntityId {
    type Err = ParseEntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| ParseEntityIdError(s.to_string()))
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Rectangular, 0-based `(row, column)` matrix of cells.
///
/// Reads outside the rectangle yield [`CellValue::Empty`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<CellValue>,
}

impl Grid {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![CellValue::Empty; rows * columns],
        }
    }

    /// Builds a grid from row vectors, padding short rows with empty cells.
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = Vec<C>>,
        C: Into<CellValue>,
    {
        let rows: Vec<Vec<CellValue>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut grid = Grid::new(rows.len(), columns);
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                grid.set(r, c, value);
            }
        }
        grid
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, column: usize) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        if row >= self.rows || column >= self.columns {
            return EMPTY;
        }
        &self.cells[row * self.columns + column]
    }

    /// Writes a cell; writes outside the rectangle are ignored.
    pub fn set(&mut self, row: usize, column: usize, value: CellValue) {
        if row < self.rows && column < self.columns {
            self.cells[row * self.columns + column] = value;
        }
    }

    pub fn is_empty_at(&self, row: usize, column: usize) -> bool {
        self.get(row, column).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_from_position_offsets_by_one() {
        assert_eq!(EntityId::from_position(2).map(EntityId::get), Some(1));
        assert_eq!(EntityId::from_position(1), None);
        assert_eq!(EntityId::from_position(0), None);
    }

    #[test]
    fn entity_id_serializes_as_string() {
        let id = EntityId::new(42).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"42\"");
        let parsed: EntityId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(parsed, id);
        assert!(serde_json::from_str::<EntityId>("\"0\"").is_err());
        assert!("abc".parse::<EntityId>().is_err());
    }

    #[test]
    fn grid_reads_outside_bounds_are_empty() {
        let grid = Grid::from_rows(vec![vec!["a", "b"], vec!["c"]]);
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.columns(), 2);
        assert_eq!(grid.get(0, 1).as_text(), Some("b"));
        assert!(grid.is_empty_at(1, 1));
        assert!(grid.is_empty_at(5, 5));
    }

    #[test]
    fn empty_string_is_empty_cell() {
        assert_eq!(CellValue::text(""), CellValue::Empty);
        assert_eq!(CellValue::from(None::<&str>), CellValue::Empty);
        assert_eq!(CellValue::from(" "), CellValue::Text(" ".into()));
    }
}
