use crate::error::{ConvertError, ConvertResult};
use crate::model::{CellValue, Grid};
use std::path::Path;
use umya_spreadsheet::reader::xlsx;
use umya_spreadsheet::{Cell, Spreadsheet, Worksheet};

/// Reads `path` and copies the selected worksheet into a [`Grid`].
///
/// `sheet` picks a worksheet by name; `None` takes the first one.
pub fn load_grid(path: &Path, sheet: Option<&str>) -> ConvertResult<Grid> {
    if !path.is_file() {
        return Err(ConvertError::workbook(path, "file does not exist"));
    }
    let book = xlsx::read(path).map_err(|err| ConvertError::workbook(path, err))?;
    let worksheet = select_sheet(&book, path, sheet)?;
    let grid = grid_from_sheet(worksheet);

    tracing::debug!(
        path = %path.display(),
        sheet = worksheet.get_name(),
        rows = grid.rows(),
        columns = grid.columns(),
        "worksheet loaded"
    );
    Ok(grid)
}

pub fn sheet_names(book: &Spreadsheet) -> Vec<String> {
    book.get_sheet_collection()
        .iter()
        .map(|sheet| sheet.get_name().to_string())
        .collect()
}

fn select_sheet<'a>(
    book: &'a Spreadsheet,
    path: &Path,
    sheet: Option<&str>,
) -> ConvertResult<&'a Worksheet> {
    match sheet {
        Some(name) => book
            .get_sheet_by_name(name)
            .ok_or_else(|| ConvertError::SheetNotFound {
                path: path.to_path_buf(),
                sheet: name.to_string(),
                available: sheet_names(book),
            }),
        None => book
            .get_sheet_collection()
            .first()
            .ok_or_else(|| ConvertError::EmptyWorkbook {
                path: path.to_path_buf(),
            }),
    }
}

/// Copies a worksheet into a grid anchored at A1.
///
/// Grid `(r, c)` is the cell at row `r + 1`, column `c + 1`; the grid spans
/// the highest used row and column.
pub fn grid_from_sheet(sheet: &Worksheet) -> Grid {
    let (max_col, max_row) = sheet.get_highest_column_and_row();
    let mut grid = Grid::new(max_row as usize, max_col as usize);
    for row in 1..=max_row {
        for col in 1..=max_col {
            if let Some(value) = sheet.get_cell((col, row)).map(cell_to_value) {
                grid.set((row - 1) as usize, (col - 1) as usize, value);
            }
        }
    }
    grid
}

/// Raw displayed value of a cell; numbers, booleans and dates become text.
pub fn cell_to_value(cell: &Cell) -> CellValue {
    CellValue::text(cell.get_value().to_string())
}
