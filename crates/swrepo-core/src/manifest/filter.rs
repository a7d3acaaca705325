use crate::error::{RepoError, Result};
use std::collections::HashSet;
use swrepo_schema::compatibility::{PN_ATTR, SOFTWARE};
use swrepo_schema::{Document, Element, Node};

/// Copy of `consolidated` keeping only the `SOFTWARE` entries whose `PN` is
/// in `allowed`.
///
/// Kept entries are cloned whole, `LRU` children included. Root children
/// that are not `SOFTWARE` elements are carried over untouched, as are the
/// declaration and top-level comments. Part numbers are compared exactly.
///
/// # Errors
///
/// - [`RepoError::EmptySelection`] if `allowed` is empty.
/// - [`RepoError::MalformedManifest`] if the manifest has no `SOFTWARE`
///   entries or any of them lacks a `PN`.
pub fn filter<S: AsRef<str>>(consolidated: &Document, allowed: &[S]) -> Result<Document> {
    if allowed.is_empty() {
        return Err(RepoError::EmptySelection);
    }
    let allowed: HashSet<&str> = allowed.iter().map(|pn| pn.as_ref()).collect();

    let mut kept: Vec<&Node> = Vec::with_capacity(consolidated.root.children.len());
    let mut software_seen = 0usize;
    for node in &consolidated.root.children {
        match node {
            Node::Element(el) if el.name == SOFTWARE => {
                software_seen += 1;
                let pn = el.attribute(PN_ATTR).ok_or_else(|| {
                    RepoError::malformed("SOFTWARE element has no PN attribute")
                })?;
                if allowed.contains(pn) {
                    kept.push(node);
                }
            }
            other => kept.push(other),
        }
    }

    if software_seen == 0 {
        return Err(RepoError::malformed(format!(
            "manifest <{}> has no {SOFTWARE} elements",
            consolidated.root.name
        )));
    }

    let root = Element {
        name: consolidated.root.name.clone(),
        attributes: consolidated.root.attributes.clone(),
        children: kept.into_iter().cloned().collect(),
    };

    Ok(Document {
        declaration: consolidated.declaration.clone(),
        prolog: consolidated.prolog.clone(),
        root,
        epilog: consolidated.epilog.clone(),
    })
}
