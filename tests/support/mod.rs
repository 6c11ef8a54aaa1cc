#![allow(dead_code)]

use std::path::{Path, PathBuf};

use pal_graph::ConvertConfig;
use tempfile::{TempDir, tempdir};
use umya_spreadsheet::{self, Spreadsheet};

pub fn write_workbook_to_path<F>(path: &Path, f: F)
where
    F: FnOnce(&mut Spreadsheet),
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create dir");
    }
    let mut book = umya_spreadsheet::new_file();
    f(&mut book);
    umya_spreadsheet::writer::xlsx::write(&book, path).expect("write workbook");
}

/// Writes `rows` into `sheet`, starting at A1. Empty strings leave the cell unset.
pub fn fill_rows(book: &mut Spreadsheet, sheet: &str, rows: &[&[&str]]) {
    let sheet = book.get_sheet_by_name_mut(sheet).expect("sheet exists");
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let coordinate = (c as u32 + 1, r as u32 + 1);
            sheet.get_cell_mut(coordinate).set_value(*value);
        }
    }
}

/// The element table: axis labels in row/column 0, headers in row/column 1.
pub const FIRE_WATER: &[&[&str]] = &[
    &["", "", "", ""],
    &["", "", "Fire", "Water"],
    &["", "Fire", "Fire", "Steam"],
    &["", "Water", "Steam", "Water"],
];

pub struct TestWorkspace {
    _tempdir: TempDir,
    root: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let tempdir = tempdir().expect("tempdir");
        let root = tempdir.path().to_path_buf();
        Self {
            _tempdir: tempdir,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn create_workbook<F>(&self, name: &str, f: F) -> PathBuf
    where
        F: FnOnce(&mut Spreadsheet),
    {
        let path = self.path(name);
        write_workbook_to_path(&path, f);
        path
    }

    pub fn create_table(&self, name: &str, rows: &[&[&str]]) -> PathBuf {
        self.create_workbook(name, |book| fill_rows(book, "Sheet1", rows))
    }

    pub fn config(&self, input: &Path) -> ConvertConfig {
        ConvertConfig {
            input: input.to_path_buf(),
            sheet: None,
            graph_out: self.path("out/graph_data.json"),
            id_map_out: self.path("out/id_name_map.json"),
        }
    }

    pub fn config_with<F>(&self, input: &Path, configure: F) -> ConvertConfig
    where
        F: FnOnce(&mut ConvertConfig),
    {
        let mut config = self.config(input);
        configure(&mut config);
        config
    }

    pub fn read(&self, path: &Path) -> String {
        std::fs::read_to_string(path).expect("read output")
    }
}

pub fn touch_file(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create dir");
    }
    std::fs::write(path, b"test").expect("write file");
}
