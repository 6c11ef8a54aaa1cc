//! JSON documents handed to downstream consumers.
//!
//! The adjacency document is `{ row_id: { result_id: [column_id, ...] } }`
//! and the id map document is `{ id: name }`, with `null` for blank headers.
//! Ids are strings throughout and both documents keep insertion order.

use crate::error::{ConvertError, ConvertResult};
use crate::graph::{AdjacencyGraph, GraphOutput, IdentifierRegistry};
use crate::model::EntityId;
use indexmap::IndexMap;
use serde::Serialize;
use serde::ser::Error as _;
use serde_json::ser::PrettyFormatter;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const INDENT: &[u8] = b"    ";

/// Destinations of the two documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub graph: PathBuf,
    pub id_map: PathBuf,
}

/// Serializes `value` with four-space indentation and no trailing newline.
pub fn write_pretty<W: Write, T: Serialize + ?Sized>(writer: W, value: &T) -> ConvertResult<()> {
    let formatter = PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    value.serialize(&mut serializer)?;
    Ok(())
}

pub fn to_pretty_string<T: Serialize + ?Sized>(value: &T) -> ConvertResult<String> {
    let mut buf = Vec::new();
    write_pretty(&mut buf, value)?;
    String::from_utf8(buf).map_err(|err| ConvertError::Serialize(serde_json::Error::custom(err)))
}

pub fn adjacency_document(graph: &AdjacencyGraph) -> ConvertResult<String> {
    to_pretty_string(graph)
}

pub fn id_map_document(registry: &IdentifierRegistry) -> ConvertResult<String> {
    to_pretty_string(registry.id_map())
}

/// Parses an adjacency document back into a graph.
pub fn read_adjacency_document(json: &str) -> ConvertResult<AdjacencyGraph> {
    Ok(serde_json::from_str(json)?)
}

/// Parses an id map document back into a registry.
pub fn read_id_map_document(json: &str) -> ConvertResult<IdentifierRegistry> {
    let id_map: IndexMap<EntityId, Option<String>> = serde_json::from_str(json)?;
    Ok(IdentifierRegistry::from_id_map(id_map))
}

/// Writes both documents, creating parent directories as needed.
pub fn write_documents(output: &GraphOutput, paths: &OutputPaths) -> ConvertResult<()> {
    write_file(&paths.graph, &output.graph)?;
    write_file(&paths.id_map, output.registry.id_map())?;
    tracing::debug!(
        graph = %paths.graph.display(),
        id_map = %paths.id_map.display(),
        "documents written"
    );
    Ok(())
}

fn write_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> ConvertResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|err| ConvertError::io(parent, err))?;
    }
    let file = File::create(path).map_err(|err| ConvertError::io(path, err))?;
    let mut writer = BufWriter::new(file);
    write_pretty(&mut writer, value)?;
    writer.flush().map_err(|err| ConvertError::io(path, err))?;
    Ok(())
}
