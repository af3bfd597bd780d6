//! Descriptor normalizer.
//!
//! Transforms one raw descriptor into a canonical [`Template`] through
//! XML tree construction, root selection, field extraction and
//! dialect-specific resource extraction.

pub mod dialect;
pub mod tree;

use stencil_common::constants::DEFAULT_NETWORK_MODE;
use stencil_common::error::{Result, StencilError};
use stencil_common::types::{Catalog, Template};

use self::dialect::{Dialect, Extraction};
use self::tree::Element;

/// Root tags accepted as the template body.
pub const ROOT_TAGS: [&str; 2] = ["Container", "Containers"];

/// A descriptor that yielded a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// The canonical template.
    pub template: Template,
    /// Whether the descriptor used the `Config`-list dialect.
    pub current_dialect: bool,
    /// Resource entries stored, skipped or of unknown kind.
    pub extraction: Extraction,
}

impl Normalized {
    /// Wraps the template into a single-entry catalog `{name: {author: template}}`.
    #[must_use]
    pub fn into_fragment(self, author: &str) -> Catalog {
        let mut fragment = Catalog::new();
        let name = self.template.name.clone();
        let _ = fragment.insert(name, author, self.template);
        fragment
    }
}

/// Selects the template body among the accepted root tags.
///
/// # Errors
///
/// Returns an error if the root is neither `Container` nor `Containers`.
pub fn template_body(root: &Element) -> Result<&Element> {
    if ROOT_TAGS.contains(&root.name.as_str()) {
        Ok(root)
    } else {
        Err(StencilError::malformed(format!(
            "unexpected root <{}>, expected <Container> or <Containers>",
            root.name
        )))
    }
}

/// Normalizes a parsed descriptor tree.
///
/// Returns `Ok(None)` when `Name` or `Repository` is missing; such
/// descriptors are discarded without being an error.
///
/// # Errors
///
/// Returns an error if the root is unknown or a legacy entry is structurally
/// incomplete.
pub fn normalize_tree(root: &Element) -> Result<Option<Normalized>> {
    let body = template_body(root)?;

    let (Some(name), Some(image)) = (body.child_text("Name"), body.child_text("Repository"))
    else {
        return Ok(None);
    };

    let mut template = Template::new(name, image);
    template.description = body.child_text("Overview").map(str::to_owned);
    template.network_mode = body
        .child_text("Network")
        .or_else(|| {
            body.child("Networking")
                .and_then(|networking| networking.child_text("Mode"))
        })
        .unwrap_or(DEFAULT_NETWORK_MODE)
        .to_owned();
    template.extra_parameters = body.child_text("ExtraParams").map(str::to_owned);
    template.post_arguments = body.child_text("PostArgs").map(str::to_owned);

    let dialect = Dialect::detect(body);
    let extraction = dialect.extract(&mut template)?;

    Ok(Some(Normalized {
        template,
        current_dialect: dialect.is_current(),
        extraction,
    }))
}

/// Parses and normalizes a raw descriptor.
///
/// # Errors
///
/// Returns an error if the XML is malformed or [`normalize_tree`] fails.
pub fn normalize_str(input: &str) -> Result<Option<Normalized>> {
    let root = tree::parse_document(input)?;
    normalize_tree(&root)
}
