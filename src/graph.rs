//! Table-to-graph normalization.
//!
//! A combination table is a grid whose row headers sit in column 1 (rows 2..),
//! whose column headers sit in row 1 (columns 2..), and whose body cells name
//! the entity produced by combining the row entity with the column entity.
//! Row 0 and column 0 hold axis labels and are never read.
//!
//! Header entities get positional ids (`index - 1`); result entities first
//! seen in the body get `registry_size + 1`. The two schemes can collide and
//! that numbering is kept as-is because consumers of the documents depend on
//! it. Collisions are counted in [`BuildStats::id_collisions`].

use crate::model::{CellValue, EntityId, Grid};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// First row and column holding entity data.
pub const FIRST_DATA_INDEX: usize = 2;
/// Column holding row headers.
pub const ROW_HEADER_COLUMN: usize = 1;
/// Row holding column headers.
pub const COLUMN_HEADER_ROW: usize = 1;

/// Bidirectional `name <-> id` lookup.
///
/// Both directions keep first-insertion order; overwriting a key keeps its
/// slot. Registering a name that already exists moves it to the new id but
/// leaves the old `id -> name` entry in place.
///
/// Blank header cells share a single nameless key (`None`), so however many
/// there are they count once towards [`len`](Self::len). Their ids map to
/// `None`, written as `null` in the id map document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierRegistry {
    by_name: IndexMap<Option<String>, EntityId>,
    by_id: IndexMap<EntityId, Option<String>>,
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name <-> id`, overwriting both directions.
    pub fn register(&mut self, name: &str, id: EntityId) {
        self.insert(Some(name.to_string()), id);
    }

    /// Registers a blank header at `id` under the shared nameless key.
    pub fn register_blank(&mut self, id: EntityId) {
        self.insert(None, id);
    }

    fn insert(&mut self, name: Option<String>, id: EntityId) {
        self.by_name.insert(name.clone(), id);
        self.by_id.insert(id, name);
    }

    /// Id the next newly discovered name would receive: `len() + 1`.
    pub fn next_id(&self) -> EntityId {
        EntityId::after_count(self.by_name.len())
    }

    pub fn id_of(&self, name: &str) -> Option<EntityId> {
        self.by_name.get(&Some(name.to_string())).copied()
    }

    /// Id last taken by a blank header, if any.
    pub fn blank_id(&self) -> Option<EntityId> {
        self.by_name.get(&None).copied()
    }

    /// Name registered at `id`; `None` for unknown ids and blank headers.
    pub fn name_of(&self, id: EntityId) -> Option<&str> {
        self.by_id.get(&id).and_then(Option::as_deref)
    }

    pub fn contains_id(&self, id: EntityId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Number of distinct names, the blank key included.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = (&str, EntityId)> {
        self.by_name
            .iter()
            .filter_map(|(name, id)| name.as_deref().map(|name| (name, *id)))
    }

    /// The `id -> name` table, as written to the id map document.
    pub fn id_map(&self) -> &IndexMap<EntityId, Option<String>> {
        &self.by_id
    }

    /// Rebuilds a registry from an id map document.
    pub fn from_id_map(id_map: IndexMap<EntityId, Option<String>>) -> Self {
        let mut registry = Self::default();
        for (id, name) in id_map {
            registry.insert(name, id);
        }
        registry
    }
}

/// `row entity -> result entity -> column entities`, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdjacencyGraph {
    edges: IndexMap<EntityId, IndexMap<EntityId, Vec<EntityId>>>,
}

impl AdjacencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `entity1 + entity2 = result`.
    ///
    /// Returns `false` if `entity2` was already listed for `(entity1, result)`.
    pub fn insert(&mut self, entity1: EntityId, result: EntityId, entity2: EntityId) -> bool {
        let partners = self
            .edges
            .entry(entity1)
            .or_default()
            .entry(result)
            .or_default();
        if partners.contains(&entity2) {
            return false;
        }
        partners.push(entity2);
        true
    }

    /// Partners that yield `result` when combined with `entity`.
    pub fn partners(&self, entity: EntityId, result: EntityId) -> &[EntityId] {
        self.edges
            .get(&entity)
            .and_then(|results| results.get(&result))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn results_for(&self, entity: EntityId) -> Option<&IndexMap<EntityId, Vec<EntityId>>> {
        self.edges.get(&entity)
    }

    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.edges.keys().copied()
    }

    /// Total number of `(entity1, result, entity2)` triples.
    pub fn edge_count(&self) -> usize {
        self.edges
            .values()
            .flat_map(|results| results.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Counters collected during a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub header_entities: usize,
    pub blank_headers: usize,
    pub result_entities: usize,
    pub body_cells: usize,
    pub blank_cells: usize,
    pub edges: usize,
    pub id_collisions: usize,
}

/// Everything a build produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphOutput {
    pub registry: IdentifierRegistry,
    pub graph: AdjacencyGraph,
    pub stats: BuildStats,
}

/// Single-use builder owning the registry and graph while the grid is scanned.
#[derive(Debug, Default)]
pub struct TableGraphBuilder {
    registry: IdentifierRegistry,
    graph: AdjacencyGraph,
    stats: BuildStats,
}

impl TableGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(mut self, grid: &Grid) -> GraphOutput {
        self.register_row_headers(grid);
        self.register_column_headers(grid);
        self.scan_body(grid);

        tracing::debug!(
            rows = grid.rows(),
            columns = grid.columns(),
            entities = self.registry.len(),
            edges = self.stats.edges,
            "combination table normalized"
        );

        GraphOutput {
            registry: self.registry,
            graph: self.graph,
            stats: self.stats,
        }
    }

    fn register_row_headers(&mut self, grid: &Grid) {
        for row in FIRST_DATA_INDEX..grid.rows() {
            let cell = grid.get(row, ROW_HEADER_COLUMN);
            self.register_header(cell, "row", row);
        }
    }

    fn register_column_headers(&mut self, grid: &Grid) {
        for column in FIRST_DATA_INDEX..grid.columns() {
            let cell = grid.get(COLUMN_HEADER_ROW, column);
            self.register_header(cell, "column", column);
        }
    }

    fn register_header(&mut self, cell: &CellValue, axis: &str, index: usize) {
        let Some(id) = EntityId::from_position(index) else {
            return;
        };
        match cell {
            CellValue::Empty => {
                tracing::debug!(axis, index, id = %id, "blank header cell registered without a name");
                self.registry.register_blank(id);
                self.stats.blank_headers += 1;
            }
            CellValue::Text(name) => {
                if let Some(previous) = self.registry.id_of(name)
                    && previous != id
                {
                    tracing::debug!(
                        axis,
                        name = %name,
                        previous = %previous,
                        id = %id,
                        "header name repeats, later position wins"
                    );
                }
                self.registry.register(name, id);
                self.stats.header_entities += 1;
            }
        }
    }

    fn scan_body(&mut self, grid: &Grid) {
        for row in FIRST_DATA_INDEX..grid.rows() {
            let Some(entity1) = EntityId::from_position(row) else {
                continue;
            };
            for column in FIRST_DATA_INDEX..grid.columns() {
                self.stats.body_cells += 1;
                let CellValue::Text(result_name) = grid.get(row, column) else {
                    self.stats.blank_cells += 1;
                    continue;
                };
                let Some(entity2) = EntityId::from_position(column) else {
                    continue;
                };
                let result = self.resolve_result(result_name);
                if self.graph.insert(entity1, result, entity2) {
                    self.stats.edges += 1;
                }
            }
        }
    }

    fn resolve_result(&mut self, name: &str) -> EntityId {
        if let Some(id) = self.registry.id_of(name) {
            return id;
        }
        let id = self.registry.next_id();
        if self.registry.contains_id(id) {
            self.stats.id_collisions += 1;
            tracing::warn!(
                id = %id,
                previous = self.registry.name_of(id).unwrap_or_default(),
                result = %name,
                "result entity id collides with a positional header id"
            );
        }
        self.registry.register(name, id);
        self.stats.result_entities += 1;
        id
    }
}

/// Normalizes a combination table into an identifier registry and adjacency graph.
pub fn build_graph(grid: &Grid) -> GraphOutput {
    TableGraphBuilder::new().build(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: u32) -> EntityId {
        EntityId::new(value).unwrap()
    }

    fn fire_water() -> Grid {
        Grid::from_rows(vec![
            vec!["", "", "", ""],
            vec!["", "", "Fire", "Water"],
            vec!["", "Fire", "Fire", "Steam"],
            vec!["", "Water", "Steam", "Water"],
        ])
    }

    #[test]
    fn headers_get_positional_ids() {
        let out = build_graph(&fire_water());
        assert_eq!(out.registry.id_of("Fire"), Some(id(1)));
        assert_eq!(out.registry.id_of("Water"), Some(id(2)));
        assert_eq!(out.registry.name_of(id(1)), Some("Fire"));
        assert_eq!(out.registry.name_of(id(2)), Some("Water"));
    }

    #[test]
    fn new_result_entity_gets_size_plus_one() {
        let out = build_graph(&fire_water());
        assert_eq!(out.registry.id_of("Steam"), Some(id(3)));
        assert_eq!(out.registry.len(), 3);
        assert_eq!(out.stats.result_entities, 1);
    }

    #[test]
    fn adjacency_matches_table() {
        let out = build_graph(&fire_water());
        assert_eq!(out.graph.partners(id(1), id(1)), &[id(1)]);
        assert_eq!(out.graph.partners(id(1), id(3)), &[id(2)]);
        assert_eq!(out.graph.partners(id(2), id(3)), &[id(1)]);
        assert_eq!(out.graph.partners(id(2), id(2)), &[id(2)]);
        assert_eq!(out.graph.edge_count(), 4);
    }

    #[test]
    fn degenerate_grids_produce_empty_outputs() {
        for grid in [
            Grid::default(),
            Grid::new(2, 2),
            Grid::from_rows(vec![vec!["x", "y"], vec!["a", "b"]]),
        ] {
            let out = build_graph(&grid);
            assert!(out.registry.is_empty());
            assert!(out.graph.is_empty());
        }
    }

    #[test]
    fn missing_body_rows_still_register_column_headers() {
        let grid = Grid::from_rows(vec![vec!["", "", ""], vec!["", "", "Fire"]]);
        let out = build_graph(&grid);
        assert_eq!(out.registry.id_of("Fire"), Some(id(1)));
        assert!(out.graph.is_empty());
    }

    #[test]
    fn insert_keeps_partners_unique_and_ordered() {
        let mut graph = AdjacencyGraph::new();
        assert!(graph.insert(id(1), id(2), id(3)));
        assert!(graph.insert(id(1), id(2), id(1)));
        assert!(!graph.insert(id(1), id(2), id(3)));
        assert_eq!(graph.partners(id(1), id(2)), &[id(3), id(1)]);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn distinct_header_names_do_not_collide() {
        let grid = Grid::from_rows(vec![
            vec!["", "", "", "", ""],
            vec!["", "", "X", "Y", "Z"],
            vec!["", "R", "New", "", ""],
        ]);
        // "R" takes id 1 and is displaced in id -> name by column "X";
        // four names are known, so "New" gets id 5
        let out = build_graph(&grid);
        assert_eq!(out.registry.id_of("New"), Some(id(5)));
        assert_eq!(out.registry.id_of("R"), Some(id(1)));
        assert_eq!(out.registry.name_of(id(1)), Some("X"));
        assert_eq!(out.stats.id_collisions, 0);
    }

    #[test]
    fn collision_between_numbering_schemes_is_counted() {
        let grid = Grid::from_rows(vec![
            vec!["", "", "", ""],
            vec!["", "", "X", "X"],
            vec!["", "X", "New", ""],
        ]);
        // "X" ends up with id 2 (last write wins) and is the only name, so
        // "New" also gets id 2 and displaces "X" in the id -> name direction
        let out = build_graph(&grid);
        assert_eq!(out.registry.id_of("New"), Some(id(2)));
        assert_eq!(out.registry.id_of("X"), Some(id(2)));
        assert_eq!(out.registry.name_of(id(2)), Some("New"));
        assert_eq!(out.stats.id_collisions, 1);
        assert_eq!(out.graph.partners(id(1), id(2)), &[id(1)]);
    }

    #[test]
    fn blank_header_takes_a_registry_slot() {
        let grid = Grid::from_rows(vec![
            vec!["", "", ""],
            vec!["", "", "Col"],
            vec!["", "", "Out"],
        ]);
        let out = build_graph(&grid);
        assert_eq!(out.stats.blank_headers, 1);
        // the blank row header and "Col" both take id 1; the column write wins
        assert_eq!(out.registry.blank_id(), Some(id(1)));
        assert_eq!(out.registry.id_of("Col"), Some(id(1)));
        assert_eq!(out.registry.name_of(id(1)), Some("Col"));
        // two names are known, so "Out" gets id 3
        assert_eq!(out.registry.id_of("Out"), Some(id(3)));
        assert_eq!(out.graph.partners(id(1), id(3)), &[id(1)]);
    }

    #[test]
    fn blank_headers_share_one_key_and_shift_result_ids() {
        let grid = Grid::from_rows(vec![
            vec!["", "", ""],
            vec!["", "", "A"],
            vec!["", "", "X"],
            vec!["", "B", "Y"],
        ]);
        let out = build_graph(&grid);
        assert_eq!(out.registry.id_of("X"), Some(id(4)));
        assert_eq!(out.registry.id_of("Y"), Some(id(5)));
        let order: Vec<_> = out
            .registry
            .id_map()
            .iter()
            .map(|(id, name)| (id.get(), name.as_deref()))
            .collect();
        assert_eq!(
            order,
            vec![(1, Some("A")), (2, Some("B")), (4, Some("X")), (5, Some("Y"))]
        );

        let several_blanks = Grid::from_rows(vec![
            vec!["", "", "", ""],
            vec!["", "", "", ""],
            vec!["", "", "N", ""],
            vec!["", "", "", ""],
        ]);
        // four blank headers collapse into one key, so "N" gets id 2 and
        // overwrites the blank entry left at that id
        let out = build_graph(&several_blanks);
        assert_eq!(out.stats.blank_headers, 4);
        assert_eq!(out.registry.len(), 2);
        assert_eq!(out.registry.blank_id(), Some(id(2)));
        assert_eq!(out.registry.id_of("N"), Some(id(2)));
        assert_eq!(out.registry.id_map().get(&id(1)), Some(&None));
        assert_eq!(out.stats.id_collisions, 1);
    }

    #[test]
    fn registry_round_trips_through_id_map() {
        let out = build_graph(&fire_water());
        let rebuilt = IdentifierRegistry::from_id_map(out.registry.id_map().clone());
        assert_eq!(rebuilt.id_of("Steam"), Some(id(3)));
        assert_eq!(rebuilt.len(), out.registry.len());
    }
}
