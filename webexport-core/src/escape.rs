//! Text escaping and parameter substitution for generated markup.

use crate::error::ContributorError;
use crate::model::Node;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PARAMETER_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\((?:this\.)?([A-Za-z_][A-Za-z0-9_]*)\)").expect("valid parameter regex")
});

/// Escape text for inclusion in XML/HTML content or attribute values.
/// Newlines become numeric character references.
pub fn escape_for_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for a single-quoted JavaScript string literal
pub fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
}

/// Markup for the argument of a single-quoted `writeText('...')` call.
/// The text is escaped as XML and encoded newlines become `\n`.
pub fn html_for_js(text: &str) -> String {
    escape_js_string(&escape_for_xml(text)).replace("&#10;", "\\n")
}

/// Replace `$(name)` and `$(this.name)` with the value of the node's
/// parameter `name`.
pub fn substitute_parameters(text: &str, node: &Node) -> Result<String, ContributorError> {
    let mut missing = None;
    let result = PARAMETER_REF.replace_all(text, |caps: &Captures| {
        let name = &caps[1];
        match node.parameter(name) {
            Some(p) => p.value().to_string(),
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(ContributorError::UnknownParameter {
            name,
            context: format!("text of {}", node.id),
        }),
        None => Ok(result.into_owned()),
    }
}

/// Anchor-safe identifier derived from a dotted node name
pub fn anchor_id(prefix: &str, node: &Node, local_id: &str) -> String {
    let base: String = node
        .id
        .as_str()
        .trim_start_matches('.')
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("{}-{}-{}", prefix, base, local_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelTree;
    use webexport_types::NodeId;

    fn ramp() -> Node {
        let tree = ModelTree::from_yaml_str(
            r#"
name: m
nodes:
  - name: Ramp
    parameters:
      - { name: step, expression: "1.0" }
      - { name: init, expression: "0", value: "0.0" }
"#,
        )
        .unwrap();
        tree.get(&NodeId::new(".m.Ramp")).unwrap().clone()
    }

    #[test]
    fn test_escape_for_xml() {
        assert_eq!(
            escape_for_xml("a < b & \"c\"\n'd'"),
            "a &lt; b &amp; &quot;c&quot;&#10;&#39;d&#39;"
        );
        assert_eq!(escape_for_xml("plain"), "plain");
    }

    #[test]
    fn test_escape_js_string() {
        assert_eq!(escape_js_string("it's\n\\"), "it\\'s\\n\\\\");
    }

    #[test]
    fn test_html_for_js() {
        assert_eq!(html_for_js("a'b\nc"), "a&#39;b\\nc");
        assert_eq!(html_for_js("x\\y <z>"), "x\\\\y &lt;z&gt;");
    }

    #[test]
    fn test_substitute_parameters() {
        let node = ramp();
        assert_eq!(
            substitute_parameters("step $(step), init $(this.init)", &node).unwrap(),
            "step 1.0, init 0.0"
        );
        assert_eq!(substitute_parameters("no refs", &node).unwrap(), "no refs");
    }

    #[test]
    fn test_substitute_unknown_parameter() {
        let node = ramp();
        let err = substitute_parameters("$(gain)", &node).unwrap_err();
        assert!(matches!(
            err,
            ContributorError::UnknownParameter { ref name, .. } if name == "gain"
        ));
    }

    #[test]
    fn test_anchor_id() {
        assert_eq!(anchor_id("lightbox", &ramp(), "light_box-0"), "lightbox-m-Ramp-light_box-0");
    }
}
