// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! [`ElementPath`]: a hashable value type identifying an element by the
//! sequence of `(localName, 1-based ordinal)` pairs from the document root,
//! used as a map key directly rather than through a string-XPath
//! intermediary.

use std::collections::HashMap;
use std::fmt;

use xmltree::Element;

/// One step of an [`ElementPath`]: the local element name and its 1-based
/// ordinal among same-named siblings under its parent.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct PathStep {
    pub local_name: String,
    pub ordinal: u32,
}

/// A sequence of [`PathStep`]s from the document root to a single element.
/// Hashable, so it can be used directly as a `HashMap` key.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Default)]
pub struct ElementPath(Vec<PathStep>);

impl ElementPath {
    pub fn root() -> Self {
        ElementPath(Vec::new())
    }

    pub fn push(&mut self, local_name: impl Into<String>, ordinal: u32) {
        self.0.push(PathStep { local_name: local_name.into(), ordinal });
    }

    pub fn child(&self, local_name: impl Into<String>, ordinal: u32) -> Self {
        let mut path = self.clone();
        path.push(local_name, ordinal);
        path
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|s| s.ordinal >= 1)
    }

    /// Walks `root` following this path's steps, re-deriving each step's
    /// sibling ordinal the same way [`crate::metadata::extract_metadata`]
    /// assigned it. Returns `None` if the document has since changed shape
    /// (a prior pass removed or reordered the referenced element) rather
    /// than panicking — callers log and skip the affected child instead of
    /// aborting the whole render.
    pub fn resolve_mut<'a>(&self, root: &'a mut Element) -> Option<&'a mut Element> {
        let mut current = root;
        for step in &self.0 {
            let mut ordinals: HashMap<String, u32> = HashMap::new();
            let mut found_index = None;
            for (i, child) in current.children.iter().enumerate() {
                if let xmltree::XMLNode::Element(el) = child {
                    let ordinal = ordinals.entry(el.name.clone()).or_insert(0);
                    *ordinal += 1;
                    if el.name == step.local_name && *ordinal == step.ordinal {
                        found_index = Some(i);
                        break;
                    }
                }
            }

            let index = found_index?;
            current = match &mut current.children[index] {
                xmltree::XMLNode::Element(el) => el,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}[{}]", step.local_name, step.ordinal)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_extends_path() {
        let root = ElementPath::root();
        let a = root.child("g", 1);
        let b = a.child("path", 2);
        assert_eq!(b.to_string(), "g[1]/path[2]");
        assert!(b.is_well_formed());
    }

    #[test]
    fn root_alone_is_not_well_formed() {
        assert!(!ElementPath::root().is_well_formed());
    }

    #[test]
    fn equal_paths_hash_equal() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ElementPath::root().child("g", 1), 42);
        assert_eq!(map.get(&ElementPath::root().child("g", 1)), Some(&42));
    }

    #[test]
    fn resolve_mut_finds_nth_same_named_sibling() {
        let mut root = Element::parse(
            br#"<svg><g/><g><path id="target"/></g></svg>"#.as_slice(),
        )
        .unwrap();
        let path = ElementPath::root().child("g", 2).child("path", 1);
        let el = path.resolve_mut(&mut root).unwrap();
        assert_eq!(el.attributes.get("id").map(String::as_str), Some("target"));
    }

    #[test]
    fn resolve_mut_returns_none_when_shape_changed() {
        let mut root = Element::parse(br#"<svg><g/></svg>"#.as_slice()).unwrap();
        let path = ElementPath::root().child("g", 2);
        assert!(path.resolve_mut(&mut root).is_none());
    }
}
