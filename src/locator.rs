use super::*;

pub(crate) const DEFAULT_CLIP_LENGTH: usize = 50;

const ATTRIBUTE_PRIORITY: [&str; 5] = ["name", "data-testid", "data-test", "aria-label", "role"];

impl Document {
    /// An XPath that identifies `node_id` in this document. Elements with a
    /// non-empty `id` get a short id-based path; everything else gets an
    /// absolute positional path. Non-element handles yield `""`.
    ///
    /// Duplicate ids elsewhere in the document are not defended against.
    pub fn element_xpath(&self, node_id: NodeId) -> String {
        if self.element(node_id).is_none() {
            return String::new();
        }

        if let Some(id) = self.attr(node_id, "id") {
            if !id.is_empty() {
                return format!("//*[@id=\"{}\"]", escape_attr_value(id));
            }
        }

        let document_element = self.document_element();
        let mut segments = Vec::new();
        let mut current = Some(node_id);
        while let Some(node) = current {
            if self.element(node).is_none() || Some(node) == document_element {
                break;
            }
            let tag = self.tag_name(node).unwrap_or("").to_string();
            let mut index = 1usize;
            let mut sibling = self.previous_element_sibling(node);
            while let Some(prev) = sibling {
                if self
                    .tag_name(prev)
                    .is_some_and(|prev_tag| prev_tag.eq_ignore_ascii_case(&tag))
                {
                    index += 1;
                }
                sibling = self.previous_element_sibling(prev);
            }
            segments.push(format!("{tag}[{index}]"));
            current = self.parent_element(node);
        }

        segments.reverse();
        format!("/{}", segments.join("/"))
    }

    /// A CSS selector that identifies `node_id` in this document. Prefers a
    /// non-empty `id`, then the first non-empty semantic attribute (`name`,
    /// `data-testid`, `data-test`, `aria-label`, `role`), then a per-level
    /// tag/class path disambiguated with `:nth-child()` where siblings
    /// collide. Non-element handles yield `""`.
    ///
    /// Uniqueness is probed per level against the immediate parent only,
    /// and class lists are truncated to their first 3 entries.
    pub fn element_css_selector(&self, node_id: NodeId) -> String {
        if self.element(node_id).is_none() {
            return String::new();
        }

        if let Some(id) = self.attr(node_id, "id") {
            if !id.is_empty() {
                return format!("#{}", escape_identifier(id));
            }
        }

        for attr in ATTRIBUTE_PRIORITY {
            if let Some(value) = self.attr(node_id, attr) {
                if !value.is_empty() {
                    let tag = self.tag_name(node_id).unwrap_or("");
                    return format!("{tag}[{attr}=\"{}\"]", escape_attr_value(value));
                }
            }
        }

        let document_element = self.document_element();
        let mut path = Vec::new();
        let mut current = Some(node_id);
        while let Some(node) = current {
            if self.element(node).is_none() || Some(node) == document_element {
                break;
            }
            let tag = self.tag_name(node).unwrap_or("").to_string();
            let classes = class_tokens(self.attr(node, "class"))
                .into_iter()
                .filter(|class| !class.is_empty())
                .take(3)
                .collect::<Vec<_>>();

            let mut selector = tag.clone();
            for class in &classes {
                selector.push('.');
                selector.push_str(&escape_identifier(class));
            }

            if let Some(parent) = self.parent_element(node) {
                let mut local = selector.clone();
                let mut matches = self
                    .query_selector_all_from(parent, &local)
                    .unwrap_or_default();
                if matches.is_empty() {
                    // Escaping edge cases can leave the class form unmatchable;
                    // the bare tag always matches at least the element itself.
                    local = tag.clone();
                    matches = self
                        .query_selector_all_from(parent, &local)
                        .unwrap_or_default();
                }
                if matches.len() > 1 {
                    let index = self.element_index(node).unwrap_or(1);
                    selector = format!("{local}:nth-child({index})");
                } else {
                    selector = local;
                }
            }

            path.push(selector);
            current = self.parent_element(node);
        }

        path.reverse();
        let joined = path.join(" > ");
        if joined.is_empty() {
            let tag = self.tag_name(node_id).unwrap_or("");
            if tag.is_empty() {
                "div".to_string()
            } else {
                tag.to_ascii_lowercase()
            }
        } else {
            joined
        }
    }
}

/// Collapses whitespace runs to single spaces, trims, and truncates to
/// `max_length` characters with a trailing ellipsis. Total on any input.
pub fn clip_text(text: &str, max_length: usize) -> String {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.chars().count() > max_length {
        let mut clipped = normalized.chars().take(max_length).collect::<String>();
        clipped.push('…');
        clipped
    } else {
        normalized
    }
}

// Not a full CSS.escape, but adequate for ids and class names.
pub(crate) fn escape_identifier(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
            out.push(ch);
        } else {
            out.push('\\');
            out.push(ch);
        }
    }
    out
}

pub(crate) fn escape_attr_value(value: &str) -> String {
    value.replace('"', "\\\"")
}
