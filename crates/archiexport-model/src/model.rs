//! Model and view types
//!
//! A [`Model`] owns the elements and views read from an `.archimate` file.
//! Views keep document order, and node bounds are absolute (a nested node's
//! coordinates already include its parents' offsets).

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{ModelError, Result};
use crate::layer::Layer;
use crate::parser;

/// Name given to views that have no `name` attribute
pub const UNTITLED_VIEW: &str = "Untitled";

/// Position and size of a diagram object
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    /// Width used by Archi when a diagram object omits it
    pub const DEFAULT_WIDTH: f32 = 120.0;
    /// Height used by Archi when a diagram object omits it
    pub const DEFAULT_HEIGHT: f32 = 55.0;

    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Center point
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Same size, shifted by an offset
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(0.0, 0.0, Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT)
    }
}

/// Kind of diagram model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    /// Regular ArchiMate view
    ArchimateDiagram,
    /// Sketch view
    Sketch,
    /// Canvas view
    Canvas,
}

impl ViewKind {
    /// Map an `xsi:type` local name to a view kind
    pub fn from_type(type_name: &str) -> Option<Self> {
        match type_name {
            "ArchimateDiagramModel" | "DiagramModel" => Some(Self::ArchimateDiagram),
            "SketchModel" => Some(Self::Sketch),
            "CanvasModel" => Some(Self::Canvas),
            _ => None,
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArchimateDiagram => f.write_str("archimate"),
            Self::Sketch => f.write_str("sketch"),
            Self::Canvas => f.write_str("canvas"),
        }
    }
}

/// A model element (concept or relationship) outside of any view
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: String,
    /// Type without namespace prefix, e.g. `BusinessActor`
    pub element_type: String,
    pub name: String,
}

impl Element {
    /// ArchiMate layer of this element
    pub fn layer(&self) -> Layer {
        Layer::of(&self.element_type)
    }
}

/// A diagram object placed on a view
#[derive(Debug, Clone, PartialEq)]
pub struct ViewNode {
    pub id: String,
    /// Referenced model element, if this object represents one
    pub element_ref: Option<String>,
    /// Own name, else the referenced element's name, else empty
    pub label: String,
    /// Referenced element's type, else the object's own type
    pub element_type: String,
    /// Absolute bounds within the view
    pub bounds: Bounds,
    pub children: Vec<ViewNode>,
}

impl ViewNode {
    /// ArchiMate layer of the represented element
    pub fn layer(&self) -> Layer {
        Layer::of(&self.element_type)
    }

    /// Label to display, falling back to the element type
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.element_type
        } else {
            &self.label
        }
    }
}

/// A connection between two diagram objects
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConnection {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Referenced relationship element, if any
    pub relationship_ref: Option<String>,
}

/// A single diagram within a model
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub id: String,
    pub name: String,
    pub kind: ViewKind,
    /// Top-level diagram objects in document order
    pub nodes: Vec<ViewNode>,
    pub connections: Vec<ViewConnection>,
}

impl View {
    /// True when the view has no diagram objects
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of diagram objects, including nested ones
    pub fn node_count(&self) -> usize {
        self.walk_nodes().len()
    }

    /// All diagram objects depth-first, parents before children
    pub fn walk_nodes(&self) -> Vec<&ViewNode> {
        fn walk<'a>(nodes: &'a [ViewNode], out: &mut Vec<&'a ViewNode>) {
            for node in nodes {
                out.push(node);
                walk(&node.children, out);
            }
        }

        let mut out = Vec::new();
        walk(&self.nodes, &mut out);
        out
    }

    /// Find a diagram object by id at any depth
    pub fn find_node(&self, id: &str) -> Option<&ViewNode> {
        self.walk_nodes().into_iter().find(|n| n.id == id)
    }
}

/// A loaded ArchiMate model
///
/// The handle is valid from a successful [`Model::load`] until
/// [`Model::close`], which consumes it.
#[derive(Debug, Clone)]
pub struct Model {
    /// File the model was loaded from
    pub path: PathBuf,
    pub id: Option<String>,
    pub name: String,
    pub(crate) elements: HashMap<String, Element>,
    pub(crate) views: Vec<View>,
}

impl Model {
    /// Load a model from an `.archimate` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ModelError::NotFound(path.display().to_string()));
        }

        let xml = fs::read(path)?;
        let model = Self::parse(&xml, path)?;
        log::debug!(
            "Loaded model '{}' from {} ({} elements, {} views)",
            model.name,
            path.display(),
            model.elements.len(),
            model.views.len()
        );
        Ok(model)
    }

    /// Parse a model from XML bytes; `path` is recorded for reference only
    pub fn parse(xml: &[u8], path: impl Into<PathBuf>) -> Result<Self> {
        parser::parse_model(xml, path.into())
    }

    /// All views in document order
    pub fn all_views(&self) -> &[View] {
        &self.views
    }

    /// First view with the given name
    pub fn view_by_name(&self, name: &str) -> Option<&View> {
        self.views.iter().find(|v| v.name == name)
    }

    /// Look up a model element by id
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Number of model elements (concepts and relationships)
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Release the model
    pub fn close(self) {
        log::debug!("Closed model {}", self.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, children: Vec<ViewNode>) -> ViewNode {
        ViewNode {
            id: id.to_string(),
            element_ref: None,
            label: String::new(),
            element_type: "Group".to_string(),
            bounds: Bounds::default(),
            children,
        }
    }

    #[test]
    fn test_bounds_edges() {
        let b = Bounds::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(b.right(), 110.0);
        assert_eq!(b.bottom(), 70.0);
        assert_eq!(b.center(), (60.0, 45.0));
        assert_eq!(b.offset(5.0, 5.0), Bounds::new(15.0, 25.0, 100.0, 50.0));
    }

    #[test]
    fn test_bounds_default_size() {
        let b = Bounds::default();
        assert_eq!(b.width, 120.0);
        assert_eq!(b.height, 55.0);
    }

    #[test]
    fn test_view_kind_from_type() {
        assert_eq!(
            ViewKind::from_type("ArchimateDiagramModel"),
            Some(ViewKind::ArchimateDiagram)
        );
        assert_eq!(ViewKind::from_type("SketchModel"), Some(ViewKind::Sketch));
        assert_eq!(ViewKind::from_type("CanvasModel"), Some(ViewKind::Canvas));
        assert_eq!(ViewKind::from_type("BusinessActor"), None);
    }

    #[test]
    fn test_walk_nodes_parents_first() {
        let view = View {
            id: "v".to_string(),
            name: "View".to_string(),
            kind: ViewKind::ArchimateDiagram,
            nodes: vec![node("a", vec![node("a1", vec![]), node("a2", vec![])]), node("b", vec![])],
            connections: vec![],
        };

        let ids: Vec<&str> = view.walk_nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "a1", "a2", "b"]);
        assert_eq!(view.node_count(), 4);
        assert!(view.find_node("a2").is_some());
        assert!(view.find_node("zz").is_none());
    }

    #[test]
    fn test_display_label_falls_back_to_type() {
        let mut n = node("a", vec![]);
        assert_eq!(n.display_label(), "Group");
        n.label = "Payments".to_string();
        assert_eq!(n.display_label(), "Payments");
    }
}
