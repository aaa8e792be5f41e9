//! Contributors: the closed set of objects a node can carry to add content
//! to its exported page.
//!
//! Each contributor implements [`WebExportable`] and registers attribute or
//! element items through the [`ExportContext`] it is handed. Contributors
//! never write files and never see other pages.

use crate::driver::ExportContext;
use crate::error::ContributorError;
use crate::escape::{anchor_id, html_for_js, substitute_parameters};
use serde::{Deserialize, Serialize};
use webexport_types::{OverwritePolicy, Placement};

/// Something that contributes content to an exported page
pub trait WebExportable {
    /// MIME type of the content this contributor produces
    fn mime_type(&self) -> &str;

    /// Whether the contributor's singular attributes replace existing ones
    fn is_overwriteable(&self) -> bool;

    /// Register this contributor's items for the current page
    fn provide_content(&self, ctx: &mut ExportContext<'_>) -> Result<(), ContributorError>;
}

/// Which kind of items a contributor registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContributorKind {
    Attribute,
    Element,
    Both,
}

/// Contributors that can be attached to a node in the model file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Contributor {
    HtmlText(HtmlText),
    Script(Script),
    Link(Link),
    LightBox(LightBox),
    MouseOverText(MouseOverText),
    MouseOverAction(MouseOverAction),
    Title(Title),
    LinkedPage(LinkedPage),
}

impl Contributor {
    pub fn kind(&self) -> ContributorKind {
        match self {
            Contributor::HtmlText(_) | Contributor::Script(_) => ContributorKind::Element,
            Contributor::LightBox(_) => ContributorKind::Both,
            Contributor::Link(_)
            | Contributor::MouseOverText(_)
            | Contributor::MouseOverAction(_)
            | Contributor::Title(_)
            | Contributor::LinkedPage(_) => ContributorKind::Attribute,
        }
    }

    /// The `kind` tag as written in the model file
    pub fn kind_name(&self) -> &'static str {
        match self {
            Contributor::HtmlText(_) => "html_text",
            Contributor::Script(_) => "script",
            Contributor::Link(_) => "link",
            Contributor::LightBox(_) => "light_box",
            Contributor::MouseOverText(_) => "mouse_over_text",
            Contributor::MouseOverAction(_) => "mouse_over_action",
            Contributor::Title(_) => "title",
            Contributor::LinkedPage(_) => "linked_page",
        }
    }

    fn inner(&self) -> &dyn WebExportable {
        match self {
            Contributor::HtmlText(c) => c,
            Contributor::Script(c) => c,
            Contributor::Link(c) => c,
            Contributor::LightBox(c) => c,
            Contributor::MouseOverText(c) => c,
            Contributor::MouseOverAction(c) => c,
            Contributor::Title(c) => c,
            Contributor::LinkedPage(c) => c,
        }
    }
}

impl WebExportable for Contributor {
    fn mime_type(&self) -> &str {
        self.inner().mime_type()
    }

    fn is_overwriteable(&self) -> bool {
        self.inner().is_overwriteable()
    }

    fn provide_content(&self, ctx: &mut ExportContext<'_>) -> Result<(), ContributorError> {
        self.inner().provide_content(ctx)
    }
}

/// Element name under which `html_text` registers its markup
pub(crate) const HTML_TEXT_ELEMENT: &str = "html";

fn default_head() -> Placement {
    Placement::Head
}

fn default_true() -> bool {
    true
}

fn default_script_type() -> String {
    String::from("text/javascript")
}

/// Literal markup placed at a position of the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HtmlText {
    /// `head`, `start`, `end`, or the name of a region
    pub position: Placement,
    pub content: String,
}

impl WebExportable for HtmlText {
    fn mime_type(&self) -> &str {
        "text/html"
    }

    fn is_overwriteable(&self) -> bool {
        false
    }

    fn provide_content(&self, ctx: &mut ExportContext<'_>) -> Result<(), ContributorError> {
        if self.content.trim().is_empty() {
            return Ok(());
        }
        let id = ctx.contribution_id();
        ctx.define_element(
            id,
            HTML_TEXT_ELEMENT,
            self.position.clone(),
            self.content.as_str(),
            false,
        );
        Ok(())
    }
}

/// A script block, inline or by reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub src: Option<String>,

    #[serde(default = "default_head")]
    pub position: Placement,

    #[serde(default = "default_true")]
    pub once_only: bool,

    #[serde(default = "default_script_type")]
    pub mime_type: String,
}

impl WebExportable for Script {
    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn is_overwriteable(&self) -> bool {
        true
    }

    fn provide_content(&self, ctx: &mut ExportContext<'_>) -> Result<(), ContributorError> {
        let markup = match &self.src {
            Some(src) if !src.trim().is_empty() => format!(
                "<script type=\"{}\" src=\"{}\"></script>",
                self.mime_type, src
            ),
            _ if !self.content.trim().is_empty() => format!(
                "<script type=\"{}\">\n{}\n</script>",
                self.mime_type,
                self.content.trim_end()
            ),
            _ => {
                return Err(ContributorError::InvalidContent(
                    "script has neither content nor src".into(),
                ))
            }
        };

        let id = ctx.contribution_id();
        ctx.define_element(id, "script", self.position.clone(), markup, self.once_only);
        Ok(())
    }
}

/// Hyperlink from the node's area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,

    #[serde(default)]
    pub target: Option<String>,
}

impl WebExportable for Link {
    fn mime_type(&self) -> &str {
        "text/html"
    }

    fn is_overwriteable(&self) -> bool {
        true
    }

    fn provide_content(&self, ctx: &mut ExportContext<'_>) -> Result<(), ContributorError> {
        if self.href.trim().is_empty() {
            return Err(ContributorError::EmptyHref);
        }
        let policy = ctx.replace_policy();
        ctx.define_attribute("href", "href", self.href.as_str(), policy);
        if let Some(target) = &self.target {
            ctx.define_attribute("target", "target", target.as_str(), policy);
        }
        Ok(())
    }
}

/// Content shown in a light box when the node's area is clicked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightBox {
    pub content: String,
}

impl WebExportable for LightBox {
    fn mime_type(&self) -> &str {
        "text/html"
    }

    fn is_overwriteable(&self) -> bool {
        true
    }

    fn provide_content(&self, ctx: &mut ExportContext<'_>) -> Result<(), ContributorError> {
        if self.content.trim().is_empty() {
            return Err(ContributorError::InvalidContent(
                "light box content is empty".into(),
            ));
        }

        let id = ctx.contribution_id();
        let anchor = anchor_id("lightbox", ctx.node(), id);
        let markup = format!(
            "<div id=\"{}\" class=\"lightbox-content\" style=\"display:none\">{}</div>",
            anchor, self.content
        );
        ctx.define_element(id, "div", Placement::BodyEnd, markup, true);

        let policy = ctx.replace_policy();
        ctx.define_attribute("href", "href", format!("#{}", anchor), policy);
        ctx.define_attribute("class", "class", "lightbox", OverwritePolicy::AppendToken);
        Ok(())
    }
}

/// Text shown in the page's text area when the mouse is over the node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MouseOverText {
    pub text: String,
}

impl WebExportable for MouseOverText {
    fn mime_type(&self) -> &str {
        "text/html"
    }

    fn is_overwriteable(&self) -> bool {
        true
    }

    fn provide_content(&self, ctx: &mut ExportContext<'_>) -> Result<(), ContributorError> {
        let text = substitute_parameters(&self.text, ctx.node())?;
        let action = format!("writeText('{}')", html_for_js(&text));
        // A mouse-over action on the same node takes precedence
        ctx.define_attribute(
            "onmouseover",
            "onmouseover",
            action,
            OverwritePolicy::KeepExisting,
        );
        Ok(())
    }
}

/// Raw JavaScript run when the mouse is over the node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MouseOverAction {
    pub action: String,
}

impl WebExportable for MouseOverAction {
    fn mime_type(&self) -> &str {
        "text/javascript"
    }

    fn is_overwriteable(&self) -> bool {
        true
    }

    fn provide_content(&self, ctx: &mut ExportContext<'_>) -> Result<(), ContributorError> {
        let policy = ctx.replace_policy();
        ctx.define_attribute("onmouseover", "onmouseover", self.action.as_str(), policy);
        Ok(())
    }
}

/// Tooltip of the node's area, and the page title on a page root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub text: String,
}

impl WebExportable for Title {
    fn mime_type(&self) -> &str {
        "text/plain"
    }

    fn is_overwriteable(&self) -> bool {
        true
    }

    fn provide_content(&self, ctx: &mut ExportContext<'_>) -> Result<(), ContributorError> {
        let policy = ctx.replace_policy();
        ctx.define_attribute("title", "title", self.text.as_str(), policy);
        Ok(())
    }
}

/// Link to the exported page of another node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedPage {
    /// Node name, relative to the model root unless it starts with `.`
    pub target: String,
}

impl WebExportable for LinkedPage {
    fn mime_type(&self) -> &str {
        "text/html"
    }

    fn is_overwriteable(&self) -> bool {
        true
    }

    fn provide_content(&self, ctx: &mut ExportContext<'_>) -> Result<(), ContributorError> {
        let Some(target) = ctx.tree().resolve(&self.target) else {
            tracing::warn!(
                "{}: linked page '{}' not found in model",
                ctx.node().id,
                self.target
            );
            return Ok(());
        };

        let link = ctx.sub_export(&target.id);
        let policy = ctx.replace_policy();
        ctx.define_attribute("href", "href", link.href(), policy);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportOptions;
    use crate::driver::ExportSession;
    use crate::model::ModelTree;
    use crate::registry::ExporterRegistry;
    use webexport_types::{ContributionKey, NodeId};

    fn export_root(yaml: &str) -> ExporterRegistry {
        let tree = ModelTree::from_yaml_str(yaml).unwrap();
        let (mut pages, _) = ExportSession::new(&tree, ExportOptions::default())
            .export(tree.root_id())
            .unwrap();
        pages.remove(0).registry
    }

    fn attr(registry: &ExporterRegistry, node: &str, local_id: &str) -> Option<String> {
        registry
            .attribute(&ContributionKey::new(NodeId::new(node), local_id))
            .map(|a| a.value.clone())
    }

    #[test]
    fn test_parse_tagged_contributors() {
        let parsed: Vec<Contributor> = serde_yaml::from_str(
            r#"
- kind: html_text
  position: sidebar
  content: "<p>x</p>"
- kind: script
  content: "var a = 1;"
- kind: link
  href: "http://example.org"
  target: _blank
"#,
        )
        .unwrap();

        assert_eq!(
            parsed[0],
            Contributor::HtmlText(HtmlText {
                position: Placement::NamedRegion("sidebar".into()),
                content: "<p>x</p>".into(),
            })
        );
        match &parsed[1] {
            Contributor::Script(s) => {
                assert_eq!(s.position, Placement::Head);
                assert!(s.once_only);
                assert_eq!(s.mime_type(), "text/javascript");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(parsed[2].kind(), ContributorKind::Attribute);
        assert_eq!(parsed[2].kind_name(), "link");
    }

    #[test]
    fn test_html_text_positions_and_blank_content() {
        let registry = export_root(
            r#"
name: m
contributors:
  - kind: html_text
    position: head
    content: "<meta name=\"x\">"
  - kind: html_text
    position: end
    content: "   "
  - kind: html_text
    position: footer
    content: "<p>bye</p>"
"#,
        );

        let head = registry.elements(&Placement::Head);
        assert_eq!(head.last().unwrap().content, "<meta name=\"x\">");
        assert_eq!(
            registry.elements(&Placement::NamedRegion("footer".into()))[0].content,
            "<p>bye</p>"
        );
        // Blank text is skipped, so the default end text fills the end
        assert_eq!(registry.elements(&Placement::BodyEnd).len(), 1);
        assert!(registry.elements(&Placement::BodyEnd)[0]
            .content
            .contains("afterImage"));
    }

    #[test]
    fn test_script_once_only_per_id() {
        let registry = export_root(
            r#"
name: m
contributors:
  - id: lib
    kind: script
    src: "lib.js"
nodes:
  - name: A
    contributors:
      - id: lib
        kind: script
        src: "lib.js"
"#,
        );

        // Keys differ by owner, so both are kept
        let scripts: Vec<_> = registry
            .elements(&Placement::Head)
            .iter()
            .filter(|e| e.content.contains("lib.js"))
            .collect();
        assert_eq!(scripts.len(), 2);
        assert_eq!(
            scripts[0].content,
            "<script type=\"text/javascript\" src=\"lib.js\"></script>"
        );
    }

    #[test]
    fn test_link_and_empty_href() {
        let registry = export_root(
            r#"
name: m
nodes:
  - name: P
    area: [0, 0, 5, 5]
    contributors:
      - kind: link
        href: "http://example.org"
        target: _top
"#,
        );
        assert_eq!(attr(&registry, ".m.P", "href").as_deref(), Some("http://example.org"));
        assert_eq!(attr(&registry, ".m.P", "target").as_deref(), Some("_top"));

        let tree = ModelTree::from_yaml_str(
            "name: m\ncontributors:\n  - kind: link\n    href: \"\"\n",
        )
        .unwrap();
        let err = ExportSession::new(&tree, ExportOptions::default())
            .run(tree.root_id())
            .unwrap_err();
        assert!(err.to_string().contains("Empty link target"));
    }

    #[test]
    fn test_light_box_registers_element_and_attributes() {
        let registry = export_root(
            r#"
name: m
nodes:
  - name: Plot
    area: [0, 0, 5, 5]
    figure: plot.png
    contributors:
      - kind: light_box
        content: "<img src=\"big.png\">"
"#,
        );

        // The hidden container is not authored end text, so the mouse-over
        // target paragraph is still added
        let end = registry.elements(&Placement::BodyEnd);
        assert_eq!(end.len(), 2);
        assert!(end[0]
            .content
            .starts_with("<div id=\"lightbox-m-Plot-light_box-0\""));
        assert!(end[1].content.contains("id=\"afterImage\""));
        assert_eq!(
            attr(&registry, ".m.Plot", "href").as_deref(),
            Some("#lightbox-m-Plot-light_box-0")
        );
        // The figure link is not applied once an href exists
        assert_eq!(attr(&registry, ".m.Plot", "class").as_deref(), Some("lightbox"));
    }

    #[test]
    fn test_mouse_over_action_dominates_text() {
        let text_first = export_root(
            r#"
name: m
nodes:
  - name: R
    contributors:
      - kind: mouse_over_text
        text: "hello"
      - kind: mouse_over_action
        action: "doIt()"
"#,
        );
        let action_first = export_root(
            r#"
name: m
nodes:
  - name: R
    contributors:
      - kind: mouse_over_action
        action: "doIt()"
      - kind: mouse_over_text
        text: "hello"
"#,
        );

        assert_eq!(attr(&text_first, ".m.R", "onmouseover").as_deref(), Some("doIt()"));
        assert_eq!(attr(&action_first, ".m.R", "onmouseover").as_deref(), Some("doIt()"));
    }

    #[test]
    fn test_mouse_over_text_substitutes_parameters() {
        let registry = export_root(
            r#"
name: m
nodes:
  - name: R
    parameters:
      - { name: step, expression: "1.0" }
    contributors:
      - kind: mouse_over_text
        text: "step is $(step)\nit's <b>"
"#,
        );
        assert_eq!(
            attr(&registry, ".m.R", "onmouseover").as_deref(),
            Some("writeText('step is 1.0\\nit&#39;s &lt;b&gt;')")
        );
    }

    #[test]
    fn test_title_and_dangling_linked_page() {
        let registry = export_root(
            r#"
name: m
nodes:
  - name: R
    area: [0, 0, 1, 1]
    contributors:
      - kind: title
        text: "Ramp source"
      - kind: linked_page
        target: Missing
"#,
        );
        assert_eq!(attr(&registry, ".m.R", "title").as_deref(), Some("Ramp source"));
        assert_eq!(attr(&registry, ".m.R", "href"), None);
    }
}
