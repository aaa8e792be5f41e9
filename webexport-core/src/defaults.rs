//! Built-in content every exported page gets: the script and stylesheet
//! links, the page heading, per-area tooltips and mouse-over tables, the
//! default links of areas, and the closing paragraph.
//!
//! Defaults run through the same context as attached contributors but keep
//! whatever a contributor already registered.

use crate::contributors::WebExportable;
use crate::driver::ExportContext;
use crate::error::ContributorError;
use crate::escape::{escape_for_xml, html_for_js};
use crate::model::Node;
use webexport_types::{OverwritePolicy, Placement};

/// Helper called by `onmouseover` handlers to fill the text area
pub const WRITE_TEXT_SCRIPT: &str = "<script type=\"text/javascript\">
function writeText(text) {
  document.getElementById(\"afterImage\").innerHTML = text;
}
</script>";

/// Closing paragraph used when nothing else ends the page body
pub const DEFAULT_END_TEXT: &str = "<p id=\"afterImage\">Mouse over the actors to see their parameters. Click on composites and plotters to reveal their contents (if provided).</p>";

/// Head links and page heading; runs before the page's contributors
pub(crate) struct PageDefaults;

impl WebExportable for PageDefaults {
    fn mime_type(&self) -> &str {
        "text/html"
    }

    fn is_overwriteable(&self) -> bool {
        false
    }

    fn provide_content(&self, ctx: &mut ExportContext<'_>) -> Result<(), ContributorError> {
        let root = ctx.options().script_root(&ctx.root_prefix());
        let node = ctx.node();

        ctx.define_element(
            "stylesheet",
            "link",
            Placement::Head,
            format!(
                "<link rel=\"stylesheet\" type=\"text/css\" href=\"{}javascript/webexport.css\"/>",
                root
            ),
            true,
        );
        ctx.define_element(
            "library",
            "script",
            Placement::Head,
            format!(
                "<script type=\"text/javascript\" src=\"{}javascript/webexport.js\"></script>",
                root
            ),
            true,
        );
        ctx.define_element("write-text", "script", Placement::Head, WRITE_TEXT_SCRIPT, true);
        ctx.define_element(
            "heading",
            "h1",
            Placement::BodyStart,
            format!("<h1>{}</h1>", escape_for_xml(node.display_title())),
            true,
        );

        if let Some(image) = &node.image {
            ctx.add_resource(image.as_str());
        }
        Ok(())
    }
}

/// Tooltip, mouse-over table and fallback link of a visual node
pub(crate) struct AreaDefaults;

impl WebExportable for AreaDefaults {
    fn mime_type(&self) -> &str {
        "text/html"
    }

    fn is_overwriteable(&self) -> bool {
        false
    }

    fn provide_content(&self, ctx: &mut ExportContext<'_>) -> Result<(), ContributorError> {
        let node = ctx.node();
        let keep = OverwritePolicy::KeepExisting;

        ctx.define_attribute("title", "title", node.display_title(), keep);
        ctx.define_attribute("onmouseover", "onmouseover", parameter_table(node), keep);

        if ctx.has_attribute("href") {
            return Ok(());
        }

        let open_composites = ctx.options().open_composites;

        if node.has_view(open_composites) {
            let link = ctx.sub_export(&node.id);
            ctx.define_attribute("href", "href", link.href(), keep);
            return Ok(());
        }

        if let Some(reference) = &node.instance_of {
            match ctx.tree().resolve(reference) {
                Some(class) if class.has_view(open_composites) => {
                    let link = ctx.sub_export(&class.id);
                    ctx.define_attribute("href", "href", link.href(), keep);
                    return Ok(());
                }
                Some(_) => {}
                None => tracing::warn!(
                    "{}: class definition '{}' not found in model",
                    node.id,
                    reference
                ),
            }
        }

        if let Some(figure) = &node.figure {
            let file_name = figure.rsplit('/').next().unwrap_or(figure);
            ctx.define_attribute("href", "href", file_name, keep);
            ctx.define_attribute("class", "class", "iframe", OverwritePolicy::AppendToken);
            ctx.add_resource(figure.as_str());
        }
        Ok(())
    }
}

/// Closing paragraph for pages whose body end is still empty
pub(crate) struct EndTextDefault;

impl WebExportable for EndTextDefault {
    fn mime_type(&self) -> &str {
        "text/html"
    }

    fn is_overwriteable(&self) -> bool {
        false
    }

    fn provide_content(&self, ctx: &mut ExportContext<'_>) -> Result<(), ContributorError> {
        ctx.define_element("after-image", "p", Placement::BodyEnd, DEFAULT_END_TEXT, true);
        Ok(())
    }
}

/// `writeText(...)` call showing the node name and its visible parameters
fn parameter_table(node: &Node) -> String {
    let mut html = format!("<h2>{}</h2>", html_for_js(&node.name));

    let mut parameters = node.visible_parameters().peekable();
    if parameters.peek().is_none() {
        html.push_str("Has no parameters.");
    } else {
        html.push_str(
            "<table border=\"1\"><tr><td><b>Parameter</b></td><td><b>Expression</b></td><td><b>Value</b></td></tr>",
        );
        for p in parameters {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                cell(&p.name),
                cell(&p.expression),
                cell(p.value())
            ));
        }
        html.push_str("</table>");
    }

    format!("writeText('{}')", html)
}

fn cell(text: &str) -> String {
    if text.trim().is_empty() {
        String::from("&nbsp;")
    } else {
        html_for_js(text)
    }
}
