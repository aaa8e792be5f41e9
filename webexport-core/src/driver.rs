//! Traversal driver: walks the model tree and runs contributors.
//!
//! A session exports one page per fully exported node. The root page is
//! exported first; contributors that reference other nodes request a
//! sub-export through [`ExportContext::sub_export`], which consults the
//! session's guard set. A node already `Visiting` or `FullyExported` is
//! never exported again and the caller receives a back reference instead,
//! so mutually referential models terminate. Requested pages are queued and
//! exported one after another; no contributor recurses into another page.
//!
//! A page collects the content of its node's whole subtree, except below
//! nodes that have a page of their own: those only contribute to their area.

use crate::assembler::{AssembledDocument, DocumentAssembler};
use crate::config::ExportOptions;
use crate::contributors::{ContributorKind, WebExportable, HTML_TEXT_ELEMENT};
use crate::defaults::{AreaDefaults, EndTextDefault, PageDefaults};
use crate::error::ExportError;
use crate::item::{AttributeItem, ElementItem};
use crate::model::{ModelTree, Node};
use crate::registry::ExporterRegistry;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use webexport_types::{ContributionKey, NodeId, OverwritePolicy, Placement};

/// Export status of a node within one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportState {
    NotVisited,
    /// Scheduled or in progress
    Visiting,
    FullyExported,
}

/// Outcome of a sub-export request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubExport {
    /// First request: the target's page will be exported in this session
    Scheduled { href: String },
    /// The target was already requested; only a link is produced
    BackReference { href: String },
}

impl SubExport {
    /// Relative link from the requesting page to the target's page
    pub fn href(&self) -> &str {
        match self {
            SubExport::Scheduled { href } | SubExport::BackReference { href } => href,
        }
    }
}

/// A cross-reference that was resolved to an existing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackReference {
    /// Page on which the reference appears
    pub from: NodeId,
    pub to: NodeId,
}

/// Guard set and worklist of full exports
#[derive(Debug, Default)]
pub struct ExportGuard {
    states: HashMap<NodeId, ExportState>,
    pending: VecDeque<NodeId>,
    back_references: Vec<BackReference>,
}

impl ExportGuard {
    pub fn state(&self, id: &NodeId) -> ExportState {
        self.states
            .get(id)
            .copied()
            .unwrap_or(ExportState::NotVisited)
    }

    /// Schedule a full export of `id`. Returns `false` if the node was
    /// already scheduled or exported.
    fn request(&mut self, id: &NodeId) -> bool {
        if self.state(id) != ExportState::NotVisited {
            return false;
        }
        self.states.insert(id.clone(), ExportState::Visiting);
        self.pending.push_back(id.clone());
        true
    }

    fn next_pending(&mut self) -> Option<NodeId> {
        self.pending.pop_front()
    }

    fn finish(&mut self, id: &NodeId) {
        self.states.insert(id.clone(), ExportState::FullyExported);
    }
}

/// What a contributor sees while providing content
pub struct ExportContext<'a> {
    tree: &'a ModelTree,
    options: &'a ExportOptions,
    node: &'a Node,
    page: &'a NodeId,
    contribution_id: &'a str,
    overwrite: bool,
    registry: &'a mut ExporterRegistry,
    guard: &'a mut ExportGuard,
    resources: &'a mut Vec<String>,
}

impl<'a> ExportContext<'a> {
    pub fn tree(&self) -> &'a ModelTree {
        self.tree
    }

    pub fn options(&self) -> &'a ExportOptions {
        self.options
    }

    /// Node owning the running contributor
    pub fn node(&self) -> &'a Node {
        self.node
    }

    /// Registration id of the running contributor
    pub fn contribution_id(&self) -> &'a str {
        self.contribution_id
    }

    /// The running contributor's overwrite hint
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Policy for singular attributes derived from the overwrite hint
    pub fn replace_policy(&self) -> OverwritePolicy {
        if self.overwrite() {
            OverwritePolicy::Replace
        } else {
            OverwritePolicy::KeepExisting
        }
    }

    /// Key of a slot owned by the current node
    pub fn key(&self, local_id: &str) -> ContributionKey {
        ContributionKey::new(self.node.id.clone(), local_id)
    }

    pub fn has_attribute(&self, local_id: &str) -> bool {
        self.registry.has_attribute(&self.key(local_id))
    }

    /// Register an attribute on the current node
    pub fn define_attribute(
        &mut self,
        local_id: &str,
        web_name: &str,
        value: impl Into<String>,
        policy: OverwritePolicy,
    ) -> bool {
        let item = AttributeItem::new(self.node.id.clone(), local_id, web_name, value)
            .with_policy(policy);
        self.registry.define(item)
    }

    /// Register an element owned by the current node
    pub fn define_element(
        &mut self,
        local_id: &str,
        web_name: &str,
        placement: Placement,
        content: impl Into<String>,
        once_only: bool,
    ) {
        let item = ElementItem::new(self.node.id.clone(), local_id, web_name, placement, content);
        self.registry.define_element(item, once_only);
    }

    /// Request the full export of `target` and return the link to it
    pub fn sub_export(&mut self, target: &NodeId) -> SubExport {
        let href = self.tree.relative_href(self.page, target);
        if self.guard.request(target) {
            tracing::debug!("Scheduled export of {} from {}", target, self.page);
            SubExport::Scheduled { href }
        } else {
            tracing::debug!("Back reference from {} to {}", self.page, target);
            self.guard.back_references.push(BackReference {
                from: self.page.clone(),
                to: target.clone(),
            });
            SubExport::BackReference { href }
        }
    }

    /// Relative prefix from the current page to the output root
    pub fn root_prefix(&self) -> String {
        self.tree.root_prefix(self.page)
    }

    /// Record a file (relative to the model) the page needs next to it
    pub fn add_resource(&mut self, path: impl Into<String>) {
        let path = path.into();
        if !self.resources.contains(&path) {
            self.resources.push(path);
        }
    }
}

/// Contributions gathered for one page
#[derive(Debug, Clone)]
pub struct PageExport {
    pub root: NodeId,
    pub registry: ExporterRegistry,
    /// Model-relative files the page references
    pub resources: Vec<String>,
}

/// Result of a completed session
#[derive(Debug, Clone, Serialize)]
pub struct ExportedSite {
    pub root: NodeId,
    /// Pages in export order, root first
    pub pages: Vec<AssembledDocument>,
    pub back_references: Vec<BackReference>,
}

impl ExportedSite {
    pub fn page(&self, id: &NodeId) -> Option<&AssembledDocument> {
        self.pages.iter().find(|p| &p.node == id)
    }

    pub fn root_page(&self) -> Option<&AssembledDocument> {
        self.page(&self.root)
    }
}

/// One export session: owns the guard set and every page registry
pub struct ExportSession<'m> {
    tree: &'m ModelTree,
    options: ExportOptions,
    guard: ExportGuard,
}

impl<'m> ExportSession<'m> {
    pub fn new(tree: &'m ModelTree, options: ExportOptions) -> Self {
        Self {
            tree,
            options,
            guard: ExportGuard::default(),
        }
    }

    /// Export `root` and every page it transitively requests, then assemble
    pub fn run(self, root: &NodeId) -> Result<ExportedSite, ExportError> {
        let tree = self.tree;
        let (pages, back_references) = self.export(root)?;
        let assembler = DocumentAssembler::new(tree);
        let pages = pages.iter().map(|page| assembler.assemble(page)).collect();

        Ok(ExportedSite {
            root: root.clone(),
            pages,
            back_references,
        })
    }

    /// Run the traversal only, returning the raw page registries
    pub fn export(
        mut self,
        root: &NodeId,
    ) -> Result<(Vec<PageExport>, Vec<BackReference>), ExportError> {
        if self.tree.get(root).is_none() {
            return Err(ExportError::UnknownRoot(root.clone()));
        }

        self.guard.request(root);
        let mut pages = Vec::new();
        while let Some(page) = self.guard.next_pending() {
            let export = self.export_page(&page)?;
            self.guard.finish(&page);
            pages.push(export);
        }

        tracing::info!(
            "Exported {} page(s), {} back reference(s)",
            pages.len(),
            self.guard.back_references.len()
        );

        Ok((pages, self.guard.back_references))
    }

    fn export_page(&mut self, page: &NodeId) -> Result<PageExport, ExportError> {
        let tree = self.tree;
        let page_node = tree
            .get(page)
            .ok_or_else(|| ExportError::UnknownRoot(page.clone()))?;

        tracing::debug!("Exporting page {}", tree.page_path(page));

        let mut builder = PageBuilder {
            tree,
            options: &self.options,
            guard: &mut self.guard,
            page: page.clone(),
            registry: ExporterRegistry::new(),
            resources: Vec::new(),
        };

        builder.invoke(&PageDefaults, "page-defaults", page_node)?;

        // Depth-first in tree order
        let mut stack = vec![page_node];
        while let Some(node) = stack.pop() {
            let nested_page = &node.id != page && node.has_view(self.options.open_composites);

            for attached in &node.contributors {
                if nested_page && attached.contributor.kind() == ContributorKind::Element {
                    continue;
                }
                builder.invoke(&attached.contributor, &attached.id, node)?;
            }
            if node.parent.as_ref() == Some(page) && node.area.is_some() {
                builder.invoke(&AreaDefaults, "area-defaults", node)?;
            }
            if nested_page {
                continue;
            }
            for child in node.children.iter().rev() {
                if let Some(child) = tree.get(child) {
                    stack.push(child);
                }
            }
        }

        if self.options.default_end_text && !has_end_text(&builder.registry) {
            builder.invoke(&EndTextDefault, "end-text", page_node)?;
        }

        tracing::debug!(
            "{}: {} element(s), {} attribute(s)",
            page,
            builder.registry.element_count(),
            builder.registry.attributes().len()
        );

        Ok(PageExport {
            root: builder.page,
            registry: builder.registry,
            resources: builder.resources,
        })
    }
}

/// Whether authored text already ends the page body. Engine items such as
/// light box containers don't count.
fn has_end_text(registry: &ExporterRegistry) -> bool {
    registry
        .elements(&Placement::BodyEnd)
        .iter()
        .any(|e| e.web_name == HTML_TEXT_ELEMENT)
}

/// Export the whole model starting at its root
pub fn export_model(tree: &ModelTree, options: &ExportOptions) -> Result<ExportedSite, ExportError> {
    ExportSession::new(tree, options.clone()).run(tree.root_id())
}

struct PageBuilder<'s> {
    tree: &'s ModelTree,
    options: &'s ExportOptions,
    guard: &'s mut ExportGuard,
    page: NodeId,
    registry: ExporterRegistry,
    resources: Vec<String>,
}

impl PageBuilder<'_> {
    fn invoke(
        &mut self,
        contributor: &dyn WebExportable,
        contribution_id: &str,
        node: &Node,
    ) -> Result<(), ExportError> {
        tracing::trace!(
            "{} {} ({})",
            node.id,
            contribution_id,
            contributor.mime_type()
        );

        let mut ctx = ExportContext {
            tree: self.tree,
            options: self.options,
            node,
            page: &self.page,
            contribution_id,
            overwrite: contributor.is_overwriteable(),
            registry: &mut self.registry,
            guard: &mut *self.guard,
            resources: &mut self.resources,
        };

        contributor
            .provide_content(&mut ctx)
            .map_err(|source| ExportError::Contributor {
                node: node.id.clone(),
                contributor: contribution_id.to_string(),
                source,
            })
    }
}
