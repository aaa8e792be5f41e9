//! Document assembly: turns one page's registry into an ordered document.
//!
//! Element buckets become section strings (each item's content followed by a
//! newline). Attributes are merged per owner node by their emitted name, in
//! the order the names were first registered.

use crate::driver::PageExport;
use crate::item::AttributeItem;
use crate::model::ModelTree;
use serde::Serialize;
use std::collections::BTreeMap;
use webexport_types::{NodeId, OverwritePolicy, Placement};

/// An attribute after merging, ready to emit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedAttribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionSection {
    pub name: String,
    pub content: String,
}

/// Image-map area of a visual node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaMap {
    pub node: NodeId,
    pub coords: String,
    pub attributes: Vec<MergedAttribute>,
}

impl AreaMap {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

/// A fully assembled page
#[derive(Debug, Clone, Serialize)]
pub struct AssembledDocument {
    pub node: NodeId,
    pub title: String,
    /// Page file relative to the output root
    pub page_path: String,
    /// File name of the page image, next to the page
    pub image: Option<String>,
    pub head: String,
    pub body_start: String,
    pub body_end: String,
    pub regions: Vec<RegionSection>,
    pub areas: Vec<AreaMap>,
    pub attributes: BTreeMap<NodeId, Vec<MergedAttribute>>,
    /// Model-relative files to copy next to the page
    pub resources: Vec<String>,
}

impl AssembledDocument {
    pub fn attribute(&self, node: &NodeId, name: &str) -> Option<&str> {
        self.attributes
            .get(node)?
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn region(&self, name: &str) -> Option<&str> {
        self.regions
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.content.as_str())
    }
}

pub struct DocumentAssembler<'m> {
    tree: &'m ModelTree,
}

impl<'m> DocumentAssembler<'m> {
    pub fn new(tree: &'m ModelTree) -> Self {
        Self { tree }
    }

    pub fn assemble(&self, page: &PageExport) -> AssembledDocument {
        let registry = &page.registry;

        let mut grouped: BTreeMap<NodeId, Vec<&AttributeItem>> = BTreeMap::new();
        for item in registry.attributes() {
            grouped.entry(item.key.owner.clone()).or_default().push(item);
        }
        let attributes: BTreeMap<NodeId, Vec<MergedAttribute>> = grouped
            .into_iter()
            .map(|(owner, items)| {
                let merged = merge_attributes(&owner, items);
                (owner, merged)
            })
            .collect();

        let regions = registry
            .region_names()
            .map(|name| RegionSection {
                name: name.to_string(),
                content: section(registry, &Placement::NamedRegion(name.to_string())),
            })
            .collect();

        let node = self.tree.get(&page.root);
        let areas = node
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(|id| self.tree.get(id))
            .filter_map(|child| {
                let area = child.area?;
                Some(AreaMap {
                    node: child.id.clone(),
                    coords: area.coords(),
                    attributes: attributes.get(&child.id).cloned().unwrap_or_default(),
                })
            })
            .collect();

        let title = attributes
            .get(&page.root)
            .and_then(|attrs| attrs.iter().find(|a| a.name == "title"))
            .map(|a| a.value.clone())
            .or_else(|| node.map(|n| n.display_title().to_string()))
            .unwrap_or_else(|| page.root.name().to_string());

        let image = node
            .and_then(|n| n.image.as_deref())
            .map(|image| image.rsplit('/').next().unwrap_or(image).to_string());

        AssembledDocument {
            node: page.root.clone(),
            title,
            page_path: self.tree.page_path(&page.root),
            image,
            head: section(registry, &Placement::Head),
            body_start: section(registry, &Placement::BodyStart),
            body_end: section(registry, &Placement::BodyEnd),
            regions,
            areas,
            attributes,
            resources: page.resources.clone(),
        }
    }
}

fn section(registry: &crate::registry::ExporterRegistry, placement: &Placement) -> String {
    registry
        .elements(placement)
        .iter()
        .map(|e| format!("{}\n", e.content))
        .collect()
}

/// Merge one owner's attributes by emitted name. Two token sets are joined;
/// any other clash keeps the later registration.
fn merge_attributes(owner: &NodeId, items: Vec<&AttributeItem>) -> Vec<MergedAttribute> {
    let mut merged: Vec<(MergedAttribute, OverwritePolicy)> = Vec::new();

    for item in items {
        match merged.iter_mut().find(|(m, _)| m.name == item.web_name) {
            None => merged.push((
                MergedAttribute {
                    name: item.web_name.clone(),
                    value: item.value.clone(),
                },
                item.policy,
            )),
            Some((existing, OverwritePolicy::AppendToken))
                if item.policy == OverwritePolicy::AppendToken =>
            {
                for token in item.tokens() {
                    if !existing.value.split_whitespace().any(|t| t == token) {
                        if !existing.value.is_empty() {
                            existing.value.push(' ');
                        }
                        existing.value.push_str(token);
                    }
                }
            }
            Some((existing, policy)) => {
                tracing::warn!(
                    "{}: attribute '{}' registered under several ids; keeping {}",
                    owner,
                    item.web_name,
                    item.key
                );
                existing.value = item.value.clone();
                *policy = item.policy;
            }
        }
    }

    merged.into_iter().map(|(m, _)| m).collect()
}
