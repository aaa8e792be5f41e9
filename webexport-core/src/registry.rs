//! Exporter registry: the per-page store of registered contributions.
//!
//! Three merge rules live here:
//! - attributes replace or keep per the caller's `overwrite` flag,
//! - multi-valued attributes merge as a de-duplicated token set,
//! - elements accumulate per placement in call order, optionally once per key.
//!
//! The registry does no I/O and is owned by exactly one export session.

use crate::item::{AttributeItem, ElementItem};
use std::collections::HashMap;
use webexport_types::{ContributionKey, OverwritePolicy, Placement};

#[derive(Debug, Clone, Default)]
pub struct ExporterRegistry {
    attributes: Vec<AttributeItem>,
    attribute_index: HashMap<ContributionKey, usize>,
    head: Vec<ElementItem>,
    body_start: Vec<ElementItem>,
    body_end: Vec<ElementItem>,
    /// Named regions in order of first registration
    regions: Vec<(String, Vec<ElementItem>)>,
}

impl ExporterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an attribute. Returns `true` if the registry now holds
    /// `item`'s value under its key.
    pub fn define_attribute(&mut self, item: AttributeItem, overwrite: bool) -> bool {
        match self.attribute_index.get(&item.key) {
            None => {
                self.insert_attribute(item);
                true
            }
            Some(&index) if overwrite => {
                self.attributes[index] = item;
                true
            }
            Some(_) => {
                tracing::debug!("Keeping existing attribute {}", item.key);
                false
            }
        }
    }

    /// Merge the tokens of `item.value` into the attribute's token set.
    /// Returns `false` if every token was already present.
    pub fn append_attribute_token(&mut self, item: AttributeItem) -> bool {
        let Some(&index) = self.attribute_index.get(&item.key) else {
            let mut seen: Vec<&str> = Vec::new();
            for token in item.tokens() {
                if !seen.contains(&token) {
                    seen.push(token);
                }
            }
            let value = seen.join(" ");
            self.insert_attribute(AttributeItem {
                value,
                policy: OverwritePolicy::AppendToken,
                ..item
            });
            return true;
        };

        let existing = &mut self.attributes[index];
        let mut added = false;
        for token in item.value.split_whitespace() {
            if existing.tokens().any(|t| t == token) {
                continue;
            }
            if !existing.value.trim().is_empty() {
                existing.value.push(' ');
            }
            existing.value.push_str(token);
            added = true;
        }
        existing.policy = OverwritePolicy::AppendToken;
        if !added {
            tracing::debug!("Tokens already present in {}", item.key);
        }
        added
    }

    /// Register an attribute according to its own overwrite policy
    pub fn define(&mut self, item: AttributeItem) -> bool {
        match item.policy {
            OverwritePolicy::Replace => self.define_attribute(item, true),
            OverwritePolicy::KeepExisting => self.define_attribute(item, false),
            OverwritePolicy::AppendToken => self.append_attribute_token(item),
        }
    }

    /// Append an element to its placement bucket. With `once_only`, an
    /// element whose key is already in that bucket is skipped.
    pub fn define_element(&mut self, mut item: ElementItem, once_only: bool) {
        item.once_only = once_only;
        let bucket = self.bucket_mut(&item.placement);
        if once_only && bucket.iter().any(|existing| existing.key == item.key) {
            tracing::debug!("Skipping once-only element {}", item.key);
            return;
        }
        bucket.push(item);
    }

    pub fn attribute(&self, key: &ContributionKey) -> Option<&AttributeItem> {
        self.attribute_index.get(key).map(|&i| &self.attributes[i])
    }

    pub fn has_attribute(&self, key: &ContributionKey) -> bool {
        self.attribute_index.contains_key(key)
    }

    /// All attributes in registration order
    pub fn attributes(&self) -> &[AttributeItem] {
        &self.attributes
    }

    /// Elements of one placement bucket, in registration order
    pub fn elements(&self, placement: &Placement) -> &[ElementItem] {
        match placement {
            Placement::Head => &self.head,
            Placement::BodyStart => &self.body_start,
            Placement::BodyEnd => &self.body_end,
            Placement::NamedRegion(name) => self
                .regions
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, items)| items.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// Region names in order of first registration
    pub fn region_names(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(|(name, _)| name.as_str())
    }

    pub fn element_count(&self) -> usize {
        self.head.len()
            + self.body_start.len()
            + self.body_end.len()
            + self.regions.iter().map(|(_, i)| i.len()).sum::<usize>()
    }

    fn insert_attribute(&mut self, item: AttributeItem) {
        self.attribute_index
            .insert(item.key.clone(), self.attributes.len());
        self.attributes.push(item);
    }

    fn bucket_mut(&mut self, placement: &Placement) -> &mut Vec<ElementItem> {
        match placement {
            Placement::Head => &mut self.head,
            Placement::BodyStart => &mut self.body_start,
            Placement::BodyEnd => &mut self.body_end,
            Placement::NamedRegion(name) => {
                let index = match self.regions.iter().position(|(n, _)| n == name) {
                    Some(index) => index,
                    None => {
                        self.regions.push((name.clone(), Vec::new()));
                        self.regions.len() - 1
                    }
                };
                &mut self.regions[index].1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use webexport_types::NodeId;

    fn node() -> NodeId {
        NodeId::new(".m")
    }

    fn href(value: &str) -> AttributeItem {
        AttributeItem::new(node(), "href", "href", value)
    }

    fn class(token: &str) -> AttributeItem {
        AttributeItem::new(node(), "class", "class", token).with_policy(OverwritePolicy::AppendToken)
    }

    fn element(id: &str, placement: Placement, content: &str) -> ElementItem {
        ElementItem::new(node(), id, "html", placement, content)
    }

    #[test]
    fn test_define_attribute_insert_and_replace() {
        let mut registry = ExporterRegistry::new();
        assert!(registry.define_attribute(href("a.html"), true));
        assert!(registry.define_attribute(href("b.html"), true));

        let key = ContributionKey::new(node(), "href");
        assert_eq!(registry.attribute(&key).unwrap().value, "b.html");
        assert_eq!(registry.attributes().len(), 1);
    }

    #[test]
    fn test_keep_existing() {
        let mut registry = ExporterRegistry::new();
        assert!(registry.define_attribute(href("a"), true));
        assert!(!registry.define_attribute(href("b"), false));

        let key = ContributionKey::new(node(), "href");
        assert_eq!(registry.attribute(&key).unwrap().value, "a");
    }

    #[test]
    fn test_first_define_without_overwrite_inserts() {
        let mut registry = ExporterRegistry::new();
        assert!(registry.define_attribute(href("a"), false));
        assert!(registry.has_attribute(&ContributionKey::new(node(), "href")));
    }

    #[test]
    fn test_append_token_dedup() {
        let mut registry = ExporterRegistry::new();
        assert!(registry.append_attribute_token(class("iframe")));
        assert!(!registry.append_attribute_token(class("iframe")));
        assert!(registry.append_attribute_token(class("lightbox")));

        let key = ContributionKey::new(node(), "class");
        let item = registry.attribute(&key).unwrap();
        assert_eq!(item.value, "iframe lightbox");
        assert_eq!(item.policy, OverwritePolicy::AppendToken);
    }

    #[test]
    fn test_append_onto_replaced_value() {
        let mut registry = ExporterRegistry::new();
        registry.define_attribute(
            AttributeItem::new(node(), "class", "class", "  plot  "),
            true,
        );
        assert!(registry.append_attribute_token(class("plot iframe")));

        let key = ContributionKey::new(node(), "class");
        assert_eq!(registry.attribute(&key).unwrap().value, "  plot   iframe");
        assert_eq!(
            registry.attribute(&key).unwrap().tokens().collect::<Vec<_>>(),
            vec!["plot", "iframe"]
        );
    }

    #[test]
    fn test_define_dispatches_on_policy() {
        let mut registry = ExporterRegistry::new();
        assert!(registry.define(href("a")));
        assert!(!registry.define(href("b").with_policy(OverwritePolicy::KeepExisting)));
        assert!(registry.define(href("c")));
        assert!(registry.define(class("x")));
        assert!(!registry.define(class("x")));

        let key = ContributionKey::new(node(), "href");
        assert_eq!(registry.attribute(&key).unwrap().value, "c");
    }

    #[test]
    fn test_once_only_element() {
        let mut registry = ExporterRegistry::new();
        registry.define_element(element("s1", Placement::Head, "<script>a</script>"), true);
        registry.define_element(element("s1", Placement::Head, "<script>b</script>"), true);

        let head = registry.elements(&Placement::Head);
        assert_eq!(head.len(), 1);
        assert_eq!(head[0].content, "<script>a</script>");
        assert!(head[0].once_only);
    }

    #[test]
    fn test_repeated_element_without_once_only() {
        let mut registry = ExporterRegistry::new();
        registry.define_element(element("e", Placement::BodyEnd, "x"), false);
        registry.define_element(element("e", Placement::BodyEnd, "x"), false);
        assert_eq!(registry.elements(&Placement::BodyEnd).len(), 2);
    }

    #[test]
    fn test_once_only_is_per_bucket() {
        let mut registry = ExporterRegistry::new();
        registry.define_element(element("s", Placement::Head, "a"), true);
        registry.define_element(element("s", Placement::BodyEnd, "a"), true);
        assert_eq!(registry.elements(&Placement::Head).len(), 1);
        assert_eq!(registry.elements(&Placement::BodyEnd).len(), 1);
    }

    #[test]
    fn test_named_regions_keep_first_seen_order() {
        let mut registry = ExporterRegistry::new();
        let sidebar = Placement::NamedRegion("sidebar".into());
        let footer = Placement::NamedRegion("footer".into());
        registry.define_element(element("a", sidebar.clone(), "1"), false);
        registry.define_element(element("b", footer.clone(), "2"), false);
        registry.define_element(element("c", sidebar.clone(), "3"), false);

        assert_eq!(registry.region_names().collect::<Vec<_>>(), vec!["sidebar", "footer"]);
        assert_eq!(registry.elements(&sidebar).len(), 2);
        assert!(registry
            .elements(&Placement::NamedRegion("missing".into()))
            .is_empty());
        assert_eq!(registry.element_count(), 3);
    }

    proptest! {
        #[test]
        fn prop_replace_is_last_writer_wins(first in "[a-z]{0,8}", second in "[a-z]{0,8}") {
            let mut twice = ExporterRegistry::new();
            twice.define_attribute(href(&first), true);
            twice.define_attribute(href(&second), true);

            let mut once = ExporterRegistry::new();
            once.define_attribute(href(&second), true);

            prop_assert_eq!(twice.attributes(), once.attributes());
        }

        #[test]
        fn prop_append_never_duplicates(tokens in proptest::collection::vec("[a-c]{1,2}", 0..12)) {
            let mut registry = ExporterRegistry::new();
            for token in &tokens {
                registry.append_attribute_token(class(token));
            }
            if let Some(item) = registry.attribute(&ContributionKey::new(node(), "class")) {
                let mut seen: Vec<&str> = item.tokens().collect();
                let total = seen.len();
                seen.sort();
                seen.dedup();
                prop_assert_eq!(seen.len(), total);
            }
        }

        #[test]
        fn prop_elements_keep_insertion_order(count in 0usize..20) {
            let mut registry = ExporterRegistry::new();
            for i in 0..count {
                registry.define_element(element(&format!("e{}", i), Placement::BodyStart, &i.to_string()), true);
            }
            let contents: Vec<String> = registry
                .elements(&Placement::BodyStart)
                .iter()
                .map(|e| e.content.clone())
                .collect();
            let expected: Vec<String> = (0..count).map(|i| i.to_string()).collect();
            prop_assert_eq!(contents, expected);
        }
    }
}
