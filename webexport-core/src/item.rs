//! Contribution items: attribute and element fragments keyed by
//! `(owner node, local id)`.

use serde::Serialize;
use webexport_types::{ContributionKey, NodeId, OverwritePolicy, Placement};

/// An attribute to be emitted on the owner's markup (e.g. an image-map area)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeItem {
    pub key: ContributionKey,

    /// Attribute name in the emitted markup
    pub web_name: String,

    pub value: String,

    pub policy: OverwritePolicy,
}

impl AttributeItem {
    pub fn new(
        owner: NodeId,
        local_id: impl Into<String>,
        web_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            key: ContributionKey::new(owner, local_id),
            web_name: web_name.into(),
            value: value.into(),
            policy: OverwritePolicy::Replace,
        }
    }

    pub fn with_policy(mut self, policy: OverwritePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whitespace-separated tokens of the value
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.value.split_whitespace()
    }
}

/// A block of content appended to one placement bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementItem {
    pub key: ContributionKey,
    pub web_name: String,
    pub content: String,
    pub placement: Placement,
    pub once_only: bool,
}

impl ElementItem {
    pub fn new(
        owner: NodeId,
        local_id: impl Into<String>,
        web_name: impl Into<String>,
        placement: Placement,
        content: impl Into<String>,
    ) -> Self {
        Self {
            key: ContributionKey::new(owner, local_id),
            web_name: web_name.into(),
            content: content.into(),
            placement,
            once_only: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_defaults_to_replace() {
        let item = AttributeItem::new(NodeId::new(".m"), "href", "href", "http://x");
        assert_eq!(item.policy, OverwritePolicy::Replace);
        assert_eq!(item.key.local_id, "href");

        let classes = AttributeItem::new(NodeId::new(".m"), "class", "class", " iframe  lightbox ")
            .with_policy(OverwritePolicy::AppendToken);
        assert_eq!(classes.tokens().collect::<Vec<_>>(), vec!["iframe", "lightbox"]);
    }

    #[test]
    fn test_blank_content_is_kept() {
        let item = ElementItem::new(NodeId::new(".m"), "e", "html", Placement::BodyEnd, "");
        assert!(item.content.is_empty());
        assert!(!item.once_only);
    }
}
