//! `.archimate` XML parsing
//!
//! Archi stores concepts as `<element xsi:type="archimate:...">` entries in
//! folders. Views are elements whose type is a diagram model; their diagram
//! objects are nested `<child>` entries with a `<bounds>` relative to the
//! parent object, and connections are `<sourceConnection>` entries on the
//! source object.

use std::collections::HashMap;
use std::path::PathBuf;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ModelError, Result};
use crate::model::{Bounds, Element, Model, View, ViewConnection, ViewKind, ViewNode, UNTITLED_VIEW};

pub(crate) fn parse_model(xml: &[u8], path: PathBuf) -> Result<Model> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut state = ParseState::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => state.open(e)?,
            Ok(Event::Empty(ref e)) => {
                state.open(e)?;
                state.close();
            }
            Ok(Event::End(_)) => state.close(),
            Ok(Event::Eof) => break,
            Err(e) => return Err(ModelError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    state.finish(path)
}

#[derive(Default)]
struct ParseState {
    root_seen: bool,
    model_id: Option<String>,
    model_name: Option<String>,
    elements: HashMap<String, Element>,
    views: Vec<ViewBuilder>,
    stack: Vec<Frame>,
}

enum Frame {
    View(ViewBuilder),
    Node(NodeBuilder),
    Other,
}

struct ViewBuilder {
    id: String,
    name: String,
    kind: ViewKind,
    nodes: Vec<NodeBuilder>,
    connections: Vec<ViewConnection>,
}

struct NodeBuilder {
    id: String,
    element_ref: Option<String>,
    name: Option<String>,
    own_type: String,
    bounds: Option<Bounds>,
    children: Vec<NodeBuilder>,
}

impl ParseState {
    fn open(&mut self, e: &BytesStart) -> Result<()> {
        if !self.root_seen {
            if e.local_name().as_ref() != b"model" {
                return Err(ModelError::InvalidStructure(format!(
                    "expected <archimate:model> root element, found <{}>",
                    String::from_utf8_lossy(e.name().as_ref())
                )));
            }
            self.root_seen = true;
            self.model_id = get_attr(e, b"id");
            self.model_name = get_attr(e, b"name");
            self.stack.push(Frame::Other);
            return Ok(());
        }

        let frame = match e.local_name().as_ref() {
            b"element" => self.open_element(e),
            b"child" | b"node" if self.in_view() => Frame::Node(NodeBuilder::from_start(e)),
            b"bounds" => {
                if let Some(Frame::Node(node)) = self.stack.last_mut() {
                    node.bounds = Some(parse_bounds(e));
                }
                Frame::Other
            }
            b"sourceConnection" | b"connection" => {
                if let Some(connection) = parse_connection(e) {
                    if let Some(view) = self.current_view_mut() {
                        view.connections.push(connection);
                    }
                }
                Frame::Other
            }
            _ => Frame::Other,
        };

        self.stack.push(frame);
        Ok(())
    }

    fn open_element(&mut self, e: &BytesStart) -> Frame {
        let type_name = xsi_type(e).unwrap_or_default();
        let id = get_attr(e, b"id");

        if let Some(kind) = ViewKind::from_type(&type_name) {
            let name = get_attr(e, b"name")
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| UNTITLED_VIEW.to_string());
            return Frame::View(ViewBuilder {
                id: id.unwrap_or_default(),
                name,
                kind,
                nodes: Vec::new(),
                connections: Vec::new(),
            });
        }

        match id {
            Some(id) => {
                let element = Element {
                    id: id.clone(),
                    element_type: type_name,
                    name: get_attr(e, b"name").unwrap_or_default(),
                };
                self.elements.insert(id, element);
            }
            None => log::debug!("Skipping element without id (type '{}')", type_name),
        }
        Frame::Other
    }

    fn close(&mut self) {
        match self.stack.pop() {
            Some(Frame::Node(node)) => {
                let parent = self
                    .stack
                    .iter_mut()
                    .rev()
                    .find(|f| !matches!(f, Frame::Other));
                match parent {
                    Some(Frame::Node(parent)) => parent.children.push(node),
                    Some(Frame::View(view)) => view.nodes.push(node),
                    _ => log::debug!("Dropping diagram object '{}' outside of a view", node.id),
                }
            }
            Some(Frame::View(view)) => self.views.push(view),
            _ => {}
        }
    }

    fn in_view(&self) -> bool {
        self.stack.iter().any(|f| matches!(f, Frame::View(_)))
    }

    fn current_view_mut(&mut self) -> Option<&mut ViewBuilder> {
        self.stack.iter_mut().rev().find_map(|f| match f {
            Frame::View(view) => Some(view),
            _ => None,
        })
    }

    fn finish(self, path: PathBuf) -> Result<Model> {
        if !self.root_seen {
            return Err(ModelError::InvalidStructure(
                "document has no root element".to_string(),
            ));
        }

        let elements = self.elements;
        let views = self
            .views
            .into_iter()
            .map(|builder| View {
                id: builder.id,
                name: builder.name,
                kind: builder.kind,
                nodes: builder
                    .nodes
                    .into_iter()
                    .map(|n| n.resolve(&elements, 0.0, 0.0))
                    .collect(),
                connections: builder.connections,
            })
            .collect();

        let name = self.model_name.unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        Ok(Model {
            path,
            id: self.model_id,
            name,
            elements,
            views,
        })
    }
}

impl NodeBuilder {
    fn from_start(e: &BytesStart) -> Self {
        Self {
            id: get_attr(e, b"id").unwrap_or_default(),
            element_ref: get_attr(e, b"archimateElement"),
            name: get_attr(e, b"name"),
            own_type: xsi_type(e).unwrap_or_default(),
            bounds: None,
            children: Vec::new(),
        }
    }

    /// Resolve labels against the model and make bounds absolute
    fn resolve(self, elements: &HashMap<String, Element>, origin_x: f32, origin_y: f32) -> ViewNode {
        let element = self.element_ref.as_deref().and_then(|id| elements.get(id));
        let bounds = self.bounds.unwrap_or_default().offset(origin_x, origin_y);

        let label = self
            .name
            .filter(|n| !n.is_empty())
            .or_else(|| element.map(|el| el.name.clone()))
            .unwrap_or_default();
        let element_type = element
            .map(|el| el.element_type.clone())
            .unwrap_or(self.own_type);

        let children = self
            .children
            .into_iter()
            .map(|c| c.resolve(elements, bounds.x, bounds.y))
            .collect();

        ViewNode {
            id: self.id,
            element_ref: self.element_ref,
            label,
            element_type,
            bounds,
            children,
        }
    }
}

fn parse_bounds(e: &BytesStart) -> Bounds {
    let number = |key: &[u8]| get_attr(e, key).and_then(|v| v.trim().parse::<f32>().ok());

    // Archi writes -1 for "default size"
    let width = number(b"width")
        .filter(|w| *w > 0.0)
        .unwrap_or(Bounds::DEFAULT_WIDTH);
    let height = number(b"height")
        .filter(|h| *h > 0.0)
        .unwrap_or(Bounds::DEFAULT_HEIGHT);

    Bounds::new(
        number(b"x").unwrap_or(0.0),
        number(b"y").unwrap_or(0.0),
        width,
        height,
    )
}

fn parse_connection(e: &BytesStart) -> Option<ViewConnection> {
    Some(ViewConnection {
        id: get_attr(e, b"id").unwrap_or_default(),
        source: get_attr(e, b"source")?,
        target: get_attr(e, b"target")?,
        relationship_ref: get_attr(e, b"archimateRelationship"),
    })
}

/// `xsi:type` local name, e.g. `archimate:BusinessActor` -> `BusinessActor`
fn xsi_type(e: &BytesStart) -> Option<String> {
    get_attr(e, b"xsi:type").map(|t| match t.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => t,
    })
}

fn get_attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}
