use super::*;

impl Document {
    /// Evaluates the two path shapes produced by [`Document::element_xpath`]:
    /// `//*[@id="..."]` lookups and absolute `/tag[n]/tag[n]` paths. Absolute
    /// paths step from the document element; paths that resolve nothing there
    /// re-step from the tree root, covering elements whose ancestor chain
    /// never reaches the document element. Other XPath syntax is rejected.
    pub fn evaluate_xpath(&self, xpath: &str) -> Result<Vec<NodeId>> {
        let xpath = xpath.trim();
        if xpath.is_empty() {
            return Err(Error::UnsupportedXPath(xpath.into()));
        }

        if let Some(rest) = xpath.strip_prefix("//*[@id=\"") {
            let inner = rest
                .strip_suffix("\"]")
                .ok_or_else(|| Error::UnsupportedXPath(xpath.into()))?;
            let id = inner.replace("\\\"", "\"");
            return Ok(self.by_id(&id).into_iter().collect());
        }

        if xpath == "/" {
            return Ok(self.document_element().into_iter().collect());
        }

        let path = xpath
            .strip_prefix('/')
            .ok_or_else(|| Error::UnsupportedXPath(xpath.into()))?;
        if path.starts_with('/') {
            return Err(Error::UnsupportedXPath(xpath.into()));
        }

        let mut segments = Vec::new();
        for segment in path.split('/') {
            let parsed = parse_positional_segment(segment)
                .ok_or_else(|| Error::UnsupportedXPath(xpath.into()))?;
            segments.push(parsed);
        }

        match self.document_element() {
            Some(document_element) => {
                let matched = self.step_positional_path(document_element, &segments);
                if matched.is_empty() {
                    // Content parsed after </html> sits beside the document
                    // element, and its generated paths start at the document
                    // node instead.
                    Ok(self.step_positional_path(self.root, &segments))
                } else {
                    Ok(matched)
                }
            }
            None => Ok(self.step_positional_path(self.root, &segments)),
        }
    }

    fn step_positional_path(&self, start: NodeId, segments: &[(&str, usize)]) -> Vec<NodeId> {
        let mut context = vec![start];
        for (tag, index) in segments {
            let mut next = Vec::new();
            for node in context {
                let mut seen = 0usize;
                for child in self.element_children(node) {
                    if self
                        .tag_name(child)
                        .is_some_and(|child_tag| child_tag.eq_ignore_ascii_case(tag))
                    {
                        seen += 1;
                        if seen == *index {
                            next.push(child);
                            break;
                        }
                    }
                }
            }
            context = next;
        }
        context
    }
}

fn parse_positional_segment(segment: &str) -> Option<(&str, usize)> {
    let open = segment.find('[')?;
    let body = segment.get(open + 1..)?.strip_suffix(']')?;
    let tag = segment.get(..open)?;
    if tag.is_empty() {
        return None;
    }
    let index = body.parse::<usize>().ok()?;
    if index == 0 {
        return None;
    }
    Some((tag, index))
}
