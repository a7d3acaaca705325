//! Compatibility manifest vocabulary.
//!
//! ```xml
//! <COMPATIBILITY>
//!     <SOFTWARE PN="00000001">
//!         <LRU name="LRU_LEFT" PN="A1B2C3D4"/>
//!     </SOFTWARE>
//! </COMPATIBILITY>
//! ```
//!
//! Only structural presence is checked; the values of `PN` attributes are not
//! required to be valid [`crate::PartNumber`]s.

use crate::xml::{Document, Element};
use serde::Serialize;

/// Root element name.
pub const ROOT: &str = "COMPATIBILITY";
/// Element describing one software load.
pub const SOFTWARE: &str = "SOFTWARE";
/// Element describing one compatible hardware module.
pub const LRU: &str = "LRU";
/// Part number attribute, on both `SOFTWARE` and `LRU`.
pub const PN_ATTR: &str = "PN";
/// Module name attribute on `LRU`.
pub const NAME_ATTR: &str = "name";

/// A `SOFTWARE` entry and the modules it is compatible with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Compatibility {
    /// `PN` attribute of the `SOFTWARE` element.
    pub part_number: String,
    /// `LRU` children in document order.
    pub lrus: Vec<LruRef>,
}

/// One `LRU` child of a `SOFTWARE` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LruRef {
    /// `name` attribute, if present.
    pub name: Option<String>,
    /// `PN` attribute, if present.
    pub part_number: Option<String>,
}

impl Compatibility {
    /// Read a `SOFTWARE` element. Returns `None` if it has no `PN`.
    pub fn from_element(el: &Element) -> Option<Self> {
        let part_number = el.attribute(PN_ATTR)?.to_string();
        let lrus = el
            .children_named(LRU)
            .map(|lru| LruRef {
                name: lru.attribute(NAME_ATTR).map(str::to_string),
                part_number: lru.attribute(PN_ATTR).map(str::to_string),
            })
            .collect();
        Some(Self { part_number, lrus })
    }

    /// All `SOFTWARE` entries of `doc` in document order. Entries without a
    /// `PN` attribute are skipped.
    pub fn collect(doc: &Document) -> Vec<Self> {
        doc.root
            .children_named(SOFTWARE)
            .filter_map(Self::from_element)
            .collect()
    }
}

/// Build a `SOFTWARE` element with `LRU` children from `(name, pn)` pairs.
pub fn software_element(part_number: &str, lrus: &[(&str, &str)]) -> Element {
    lrus.iter().fold(
        Element::new(SOFTWARE).with_attribute(PN_ATTR, part_number),
        |el, (name, pn)| {
            el.with_child(
                Element::new(LRU)
                    .with_attribute(NAME_ATTR, *name)
                    .with_attribute(PN_ATTR, *pn),
            )
        },
    )
}
