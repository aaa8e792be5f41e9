//! Model tree: the hierarchy of named nodes an export session walks.
//!
//! The tree is loaded from YAML and is immutable for the lifetime of a
//! session. Nodes are addressed by their full dotted name.

use crate::contributors::Contributor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use webexport_types::NodeId;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to read model file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse model YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Node under {parent} has an empty name")]
    EmptyName { parent: NodeId },

    #[error("Invalid node name '{name}': names may not contain '.', ':' or path separators")]
    InvalidName { name: String },

    #[error("Duplicate node name '{name}' under {parent}")]
    DuplicateName { parent: NodeId, name: String },
}

/// A named parameter shown in the default mouse-over table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(default)]
    pub expression: String,

    /// Evaluated value; falls back to the expression when absent
    #[serde(default)]
    pub value: Option<String>,

    #[serde(default = "default_true")]
    pub visible: bool,
}

impl Parameter {
    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.expression)
    }
}

fn default_true() -> bool {
    true
}

/// Icon rectangle in image coordinates (`[left, top, right, bottom]`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct Area {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Area {
    /// Coordinates in image-map `coords` form
    pub fn coords(&self) -> String {
        format!("{},{},{},{}", self.left, self.top, self.right, self.bottom)
    }
}

impl From<[i32; 4]> for Area {
    fn from(c: [i32; 4]) -> Self {
        Area {
            left: c[0],
            top: c[1],
            right: c[2],
            bottom: c[3],
        }
    }
}

impl From<Area> for [i32; 4] {
    fn from(a: Area) -> Self {
        [a.left, a.top, a.right, a.bottom]
    }
}

/// A contributor entry as written in the model file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorSpec {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(flatten)]
    pub contributor: Contributor,
}

/// Node description as written in the model file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,

    #[serde(default)]
    pub title: Option<String>,

    /// Rendered image of this node's page
    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    #[serde(default)]
    pub area: Option<Area>,

    /// The node has an open nested view whose page should be exported
    #[serde(default)]
    pub open: bool,

    /// Class definition this node instantiates
    #[serde(default)]
    pub instance_of: Option<String>,

    /// Rendered figure (plot) for this node
    #[serde(default)]
    pub figure: Option<String>,

    #[serde(default)]
    pub contributors: Vec<ContributorSpec>,

    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

/// A contributor attached to a node with its registration id
#[derive(Debug, Clone)]
pub struct Attached {
    pub id: String,
    pub contributor: Contributor,
}

/// A node of the loaded tree
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub title: Option<String>,
    pub image: Option<String>,
    pub parameters: Vec<Parameter>,
    pub area: Option<Area>,
    pub open: bool,
    pub instance_of: Option<String>,
    pub figure: Option<String>,
    pub contributors: Vec<Attached>,
}

impl Node {
    /// Title shown for this node: the last attached title contributor wins
    /// over the `title` field, which wins over the name.
    pub fn display_title(&self) -> &str {
        self.contributors
            .iter()
            .rev()
            .find_map(|a| match &a.contributor {
                Contributor::Title(t) => Some(t.text.as_str()),
                _ => None,
            })
            .or(self.title.as_deref())
            .unwrap_or(&self.name)
    }

    pub fn is_composite(&self) -> bool {
        !self.children.is_empty()
    }

    /// Whether the node is exported as a page of its own when linked
    pub fn has_view(&self, open_composites: bool) -> bool {
        self.open || (open_composites && self.is_composite())
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn visible_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.visible)
    }
}

/// Immutable model tree
#[derive(Debug, Clone)]
pub struct ModelTree {
    root: NodeId,
    nodes: HashMap<NodeId, Node>,
}

impl ModelTree {
    /// Load a model tree from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ModelError> {
        let spec: NodeSpec = serde_yaml::from_str(yaml)?;
        Self::from_spec(spec)
    }

    /// Build the tree, assigning contributor ids and validating names
    pub fn from_spec(spec: NodeSpec) -> Result<Self, ModelError> {
        let root = NodeId::new(format!(".{}", spec.name));
        if spec.name.trim().is_empty() {
            return Err(ModelError::EmptyName {
                parent: NodeId::new(""),
            });
        }
        validate_name(&spec.name)?;

        let mut nodes = HashMap::new();
        let mut stack = vec![(spec, root.clone(), None::<NodeId>)];

        while let Some((spec, id, parent)) = stack.pop() {
            let mut children = Vec::with_capacity(spec.nodes.len());
            for child in &spec.nodes {
                if child.name.trim().is_empty() {
                    return Err(ModelError::EmptyName { parent: id.clone() });
                }
                validate_name(&child.name)?;
                let child_id = id.child(&child.name);
                if children.contains(&child_id) {
                    return Err(ModelError::DuplicateName {
                        parent: id.clone(),
                        name: child.name.clone(),
                    });
                }
                children.push(child_id);
            }

            let contributors = spec
                .contributors
                .into_iter()
                .enumerate()
                .map(|(index, entry)| Attached {
                    id: entry
                        .id
                        .unwrap_or_else(|| format!("{}-{}", entry.contributor.kind_name(), index)),
                    contributor: entry.contributor,
                })
                .collect();

            // Push in reverse so siblings are built in tree order
            for (child, child_id) in spec.nodes.into_iter().zip(children.iter()).rev() {
                stack.push((child, child_id.clone(), Some(id.clone())));
            }

            nodes.insert(
                id.clone(),
                Node {
                    id,
                    name: spec.name,
                    parent,
                    children,
                    title: spec.title,
                    image: spec.image,
                    parameters: spec.parameters,
                    area: spec.area,
                    open: spec.open,
                    instance_of: spec.instance_of,
                    figure: spec.figure,
                    contributors,
                },
            );
        }

        tracing::debug!("Loaded model {} with {} nodes", root, nodes.len());

        Ok(Self { root, nodes })
    }

    pub fn root_id(&self) -> &NodeId {
        &self.root
    }

    pub fn root(&self) -> &Node {
        // The root is inserted by construction
        &self.nodes[&self.root]
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve a cross-reference. Absolute references start with `.`;
    /// anything else is taken relative to the root.
    pub fn resolve(&self, reference: &str) -> Option<&Node> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }
        if reference.starts_with('.') {
            self.nodes.get(&NodeId::new(reference))
        } else {
            self.nodes
                .get(&NodeId::new(format!("{}.{}", self.root, reference)))
        }
    }

    /// Path segments of a node below the root
    fn segments<'a>(&self, id: &'a NodeId) -> Vec<&'a str> {
        id.as_str()
            .strip_prefix(self.root.as_str())
            .unwrap_or("")
            .split('.')
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Directory of a node's page relative to the output root (`""` or `A/B/`)
    pub fn page_dir(&self, id: &NodeId) -> String {
        self.segments(id)
            .iter()
            .map(|s| format!("{}/", s))
            .collect()
    }

    /// Page file of a node relative to the output root
    pub fn page_path(&self, id: &NodeId) -> String {
        format!("{}index.html", self.page_dir(id))
    }

    /// Prefix leading from a node's page back to the output root
    pub fn root_prefix(&self, id: &NodeId) -> String {
        "../".repeat(self.segments(id).len())
    }

    /// Relative href from one page to another
    pub fn relative_href(&self, from: &NodeId, to: &NodeId) -> String {
        let from_segments = self.segments(from);
        let to_segments = self.segments(to);
        let common = from_segments
            .iter()
            .zip(to_segments.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut href = "../".repeat(from_segments.len() - common);
        for segment in &to_segments[common..] {
            href.push_str(segment);
            href.push('/');
        }
        href.push_str("index.html");
        href
    }
}

// Names become directory names of exported pages
fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.contains(['.', '/', '\\', ':']) {
        return Err(ModelError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}
