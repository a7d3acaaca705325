use crate::error::{RepoError, Result};
use swrepo_schema::compatibility::{PN_ATTR, SOFTWARE};
use swrepo_schema::{Document, Element, Node};

/// What a merge changed, in incoming document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Part numbers that were not in the consolidated manifest before.
    pub added: Vec<String>,
    /// Part numbers whose existing entry was replaced.
    pub replaced: Vec<String>,
}

impl MergeOutcome {
    /// Total number of `SOFTWARE` entries written.
    pub fn len(&self) -> usize {
        self.added.len() + self.replaced.len()
    }

    /// Whether nothing was merged.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Merge the `SOFTWARE` entries of `incoming` into a copy of `consolidated`.
///
/// Each incoming entry removes the first consolidated entry with the same
/// `PN` and is appended as the last child of the root, so replaced entries
/// move to the end while untouched entries keep their relative order.
/// `consolidated` is never modified; on error nothing is returned.
///
/// # Errors
///
/// [`RepoError::MalformedManifest`] if `incoming` has no `SOFTWARE` entries,
/// an incoming entry has no `PN`, or a consolidated entry examined while
/// searching for a match has no `PN`.
pub fn merge(consolidated: &Document, incoming: &Document) -> Result<(Document, MergeOutcome)> {
    let mut merged = consolidated.clone();
    let mut outcome = MergeOutcome::default();
    let mut seen_any = false;

    for software in incoming.root.children_named(SOFTWARE) {
        seen_any = true;
        let pn = software
            .attribute(PN_ATTR)
            .ok_or_else(|| RepoError::malformed("incoming SOFTWARE element has no PN attribute"))?;

        if remove_software(&mut merged.root, pn)? {
            outcome.replaced.push(pn.to_string());
        } else {
            outcome.added.push(pn.to_string());
        }
        merged.root.children.push(Node::Element(software.clone()));
    }

    if !seen_any {
        return Err(RepoError::malformed(format!(
            "incoming manifest <{}> has no {SOFTWARE} elements",
            incoming.root.name
        )));
    }

    Ok((merged, outcome))
}

/// Remove the first `SOFTWARE` child of `root` whose `PN` is `pn`.
///
/// Entries are checked in order up to the match; one without a `PN` before
/// the match is an error.
fn remove_software(root: &mut Element, pn: &str) -> Result<bool> {
    let mut found = None;
    for (i, node) in root.children.iter().enumerate() {
        let Node::Element(el) = node else { continue };
        if el.name != SOFTWARE {
            continue;
        }
        let existing = el.attribute(PN_ATTR).ok_or_else(|| {
            RepoError::malformed("consolidated SOFTWARE element has no PN attribute")
        })?;
        if existing == pn {
            found = Some(i);
            break;
        }
    }

    match found {
        Some(i) => {
            root.children.remove(i);
            Ok(true)
        }
        None => Ok(false),
    }
}
