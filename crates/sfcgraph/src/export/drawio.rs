//! draw.io document model.
//!
//! A [`DiagramDocument`] is the `mxGraphModel` of one sequence: the two
//! scaffold cells every draw.io model starts with, one rounded shape per
//! step and optionally one orthogonal edge per `(source, target)` pair.
//! Cell ids are handed out by the document, shapes as `"2"`, `"3"`, ... and
//! edges as `"e<n>"` from the same counter, so they never collide.
//!
//! A [`DrawioFile`] collects one named page per document and is what ends
//! up on disk.
//!
//! # Example
//!
//! ```
//! # use sfcgraph::export::drawio::DiagramDocument;
//! let mut document = DiagramDocument::new();
//! let open = document.add_shape("1", (100, 100), (80, 40));
//! let closed = document.add_shape("2", (300, 100), (80, 40));
//! document.add_edge("xClose", &open, &closed);
//!
//! let xml = document.to_xml().unwrap();
//! assert!(xml.starts_with("<mxGraphModel><root><mxCell id=\"0\"/>"));
//! assert!(xml.contains("source=\"2\" target=\"3\""));
//! ```

use std::{collections::HashMap, fs, path::Path};

use log::debug;
use quick_xml::escape::partial_escape;
use serde::Serialize;

use sfcgraph_core::{identifier::Id, model::Sequence};

use super::Error;
use crate::{
    config::{DiagramConfig, LabelStrategy},
    layout::Layout,
};

const SHAPE_STYLE: &str = "rounded=1;whiteSpace=wrap;html=1;";
const EDGE_STYLE: &str = "edgeStyle=orthogonalEdgeStyle;rounded=0;orthogonalLoop=1;";
const HOST: &str = "sfcgraph";

/// Id of a cell inside one [`DiagramDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellId(String);

impl CellId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Serialize)]
struct Cell {
    #[serde(rename = "@id")]
    id: String,

    #[serde(rename = "@value", skip_serializing_if = "Option::is_none")]
    value: Option<String>,

    #[serde(rename = "@style", skip_serializing_if = "Option::is_none")]
    style: Option<&'static str>,

    #[serde(rename = "@vertex", skip_serializing_if = "Option::is_none")]
    vertex: Option<&'static str>,

    #[serde(rename = "@edge", skip_serializing_if = "Option::is_none")]
    edge: Option<&'static str>,

    #[serde(rename = "@parent", skip_serializing_if = "Option::is_none")]
    parent: Option<&'static str>,

    #[serde(rename = "@source", skip_serializing_if = "Option::is_none")]
    source: Option<String>,

    #[serde(rename = "@target", skip_serializing_if = "Option::is_none")]
    target: Option<String>,

    #[serde(rename = "mxGeometry", skip_serializing_if = "Option::is_none")]
    geometry: Option<Geometry>,
}

impl Cell {
    fn scaffold(id: &str, parent: Option<&'static str>) -> Self {
        Self {
            id: id.to_string(),
            value: None,
            style: None,
            vertex: None,
            edge: None,
            parent,
            source: None,
            target: None,
            geometry: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct Geometry {
    #[serde(rename = "@x", skip_serializing_if = "Option::is_none")]
    x: Option<u64>,

    #[serde(rename = "@y", skip_serializing_if = "Option::is_none")]
    y: Option<u64>,

    #[serde(rename = "@width", skip_serializing_if = "Option::is_none")]
    width: Option<u32>,

    #[serde(rename = "@height", skip_serializing_if = "Option::is_none")]
    height: Option<u32>,

    #[serde(rename = "@relative", skip_serializing_if = "Option::is_none")]
    relative: Option<&'static str>,

    #[serde(rename = "@as")]
    role: &'static str,
}

#[derive(Serialize)]
#[serde(rename = "mxGraphModel")]
struct ModelXml<'a> {
    root: RootXml<'a>,
}

#[derive(Serialize)]
struct RootXml<'a> {
    #[serde(rename = "mxCell")]
    cells: &'a [Cell],
}

#[derive(Serialize)]
#[serde(rename = "mxfile")]
struct FileXml<'a> {
    #[serde(rename = "@host")]
    host: &'static str,

    #[serde(rename = "diagram")]
    pages: Vec<PageXml<'a>>,
}

#[derive(Serialize)]
struct PageXml<'a> {
    #[serde(rename = "@id")]
    id: String,

    #[serde(rename = "@name")]
    name: &'a str,

    #[serde(rename = "mxGraphModel")]
    model: ModelXml<'a>,
}

/// The `mxGraphModel` of one diagram page.
#[derive(Debug, Clone)]
pub struct DiagramDocument {
    cells: Vec<Cell>,
    next_id: usize,
    shapes: usize,
    edges: usize,
}

impl Default for DiagramDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagramDocument {
    /// Creates a document holding only the scaffold cells `0` and `1`.
    pub fn new() -> Self {
        Self {
            cells: vec![Cell::scaffold("0", None), Cell::scaffold("1", Some("0"))],
            next_id: 2,
            shapes: 0,
            edges: 0,
        }
    }

    /// Builds the document for a laid-out sequence.
    ///
    /// Shapes follow the layout's node order. A shape on `(layer, row)` is
    /// placed at `origin + (layer * spacing_x, row * spacing_y)`.
    pub fn from_layout(sequence: &Sequence, layout: &Layout, config: &DiagramConfig) -> Self {
        let (origin_x, origin_y) = config.origin();
        let (spacing_x, spacing_y) = config.spacing();
        let mut document = Self::new();
        let mut shape_ids: HashMap<Id, CellId> = HashMap::with_capacity(layout.nodes().len());

        for node in layout.nodes() {
            let Some(step) = sequence.step(node.step) else {
                continue;
            };
            let label = match config.label() {
                LabelStrategy::Number => step.number.to_string(),
                LabelStrategy::Name => step.name.to_string(),
                LabelStrategy::NameComment => format!("{} - {}", step.name, step.comment),
            };
            let x = u64::from(origin_x) + node.layer as u64 * u64::from(spacing_x);
            let y = u64::from(origin_y) + node.row as u64 * u64::from(spacing_y);
            let id = document.add_shape(html_label(&label), (x, y), config.size());
            shape_ids.insert(node.step, id);
        }

        if config.emit_edges() {
            for edge in layout.edges() {
                let (Some(source), Some(target)) =
                    (shape_ids.get(&edge.source), shape_ids.get(&edge.target))
                else {
                    continue;
                };
                let condition = sequence
                    .transitions
                    .get(edge.transition)
                    .map(|transition| html_label(&transition.condition))
                    .unwrap_or_default();
                document.add_edge(condition, source, target);
            }
        }

        debug!(
            sequence = sequence.qualified_name(),
            shapes = document.shape_count(),
            edges = document.edge_count();
            "Built diagram document"
        );
        document
    }

    fn allocate_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Adds a rounded step shape at `position` with the given `size`.
    pub fn add_shape(
        &mut self,
        label: impl Into<String>,
        position: (u64, u64),
        size: (u32, u32),
    ) -> CellId {
        let id = self.allocate_id().to_string();
        self.cells.push(Cell {
            id: id.clone(),
            value: Some(label.into()),
            style: Some(SHAPE_STYLE),
            vertex: Some("1"),
            edge: None,
            parent: Some("1"),
            source: None,
            target: None,
            geometry: Some(Geometry {
                x: Some(position.0),
                y: Some(position.1),
                width: Some(size.0),
                height: Some(size.1),
                relative: None,
                role: "geometry",
            }),
        });
        self.shapes += 1;
        CellId(id)
    }

    /// Adds an orthogonal edge between two shapes of this document.
    pub fn add_edge(&mut self, label: impl Into<String>, source: &CellId, target: &CellId) -> CellId {
        let id = format!("e{}", self.allocate_id());
        self.cells.push(Cell {
            id: id.clone(),
            value: Some(label.into()),
            style: Some(EDGE_STYLE),
            vertex: None,
            edge: Some("1"),
            parent: Some("1"),
            source: Some(source.0.clone()),
            target: Some(target.0.clone()),
            geometry: Some(Geometry {
                x: None,
                y: None,
                width: None,
                height: None,
                relative: Some("1"),
                role: "geometry",
            }),
        });
        self.edges += 1;
        CellId(id)
    }

    pub fn shape_count(&self) -> usize {
        self.shapes
    }

    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// Ids of every cell, scaffold included, in document order.
    pub fn cell_ids(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|cell| cell.id.as_str())
    }

    fn model(&self) -> ModelXml<'_> {
        ModelXml {
            root: RootXml { cells: &self.cells },
        }
    }

    /// Serializes the `mxGraphModel` element.
    pub fn to_xml(&self) -> Result<String, Error> {
        Ok(quick_xml::se::to_string(&self.model())?)
    }
}

/// A draw.io file with one page per diagram.
#[derive(Debug, Clone, Default)]
pub struct DrawioFile {
    pages: Vec<(String, DiagramDocument)>,
}

impl DrawioFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a page named `name`.
    pub fn add_page(&mut self, name: impl Into<String>, document: DiagramDocument) {
        self.pages.push((name.into(), document));
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serializes the `mxfile` element.
    pub fn to_xml(&self) -> Result<String, Error> {
        let file = FileXml {
            host: HOST,
            pages: self
                .pages
                .iter()
                .enumerate()
                .map(|(idx, (name, document))| PageXml {
                    id: format!("page-{}", idx + 1),
                    name,
                    model: document.model(),
                })
                .collect(),
        };
        Ok(quick_xml::se::to_string(&file)?)
    }

    /// Writes the file to `path`, creating missing parent directories.
    pub fn write(&self, path: &Path) -> Result<(), Error> {
        let xml = self.to_xml()?;
        let write_error = |source| Error::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(path, xml).map_err(write_error)?;
        debug!(path:? = path, pages = self.pages.len(); "Wrote draw.io file");
        Ok(())
    }
}

/// Label markup for a cell styled `html=1`.
///
/// draw.io renders such values as HTML, so markup characters are escaped
/// and source line breaks become `<br>`. Attribute normalization would
/// otherwise fold them into spaces.
fn html_label(text: &str) -> String {
    text.lines()
        .map(|line| partial_escape(line.trim()))
        .collect::<Vec<_>>()
        .join("<br>")
}
