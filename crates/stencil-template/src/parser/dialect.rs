//! Resource extraction for the two descriptor dialects.
//!
//! The current dialect lists every resource as a typed `Config` element;
//! the legacy dialect spreads ports, volumes and variables over separate
//! nested blocks. Detection only looks at which elements are present.

use stencil_common::error::{Result, StencilError};
use stencil_common::types::{ResourceEntry, ResourceKind, Template};

use super::tree::Element;

/// Which schema a template body follows.
#[derive(Debug, Clone, Copy)]
pub enum Dialect<'a> {
    /// Typed `Config` entries.
    Current(CurrentDialect<'a>),
    /// `Networking/Publish/Port`, `Data/Volume` and `Environment/Variable` blocks.
    Legacy(LegacyDialect<'a>),
}

/// Template body in the `Config`-list dialect.
#[derive(Debug, Clone, Copy)]
pub struct CurrentDialect<'a> {
    body: &'a Element,
}

/// Template body in the legacy block dialect.
#[derive(Debug, Clone, Copy)]
pub struct LegacyDialect<'a> {
    body: &'a Element,
}

/// What happened to one `Config` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOutcome {
    /// Stored in the map of this kind.
    Stored(ResourceKind),
    /// The type tag names no known resource kind.
    UnknownKind(String),
    /// Neither `Name` nor `Target` was given.
    MissingKey,
    /// A port, volume or device without `Target`.
    MissingTarget(ResourceKind),
    /// The element carried nothing at all.
    Empty,
}

/// Tally of the resource entries seen while extracting one template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Entries written into a resource map.
    pub stored: usize,
    /// Type tags that matched no resource kind, in document order.
    pub unknown_kinds: Vec<String>,
    /// Entries dropped for a missing key or target.
    pub skipped: usize,
}

impl Extraction {
    fn record(&mut self, outcome: ConfigOutcome) {
        match outcome {
            ConfigOutcome::Stored(_) => self.stored += 1,
            ConfigOutcome::UnknownKind(tag) => self.unknown_kinds.push(tag),
            ConfigOutcome::MissingKey | ConfigOutcome::MissingTarget(_) => self.skipped += 1,
            ConfigOutcome::Empty => {}
        }
    }
}

impl<'a> Dialect<'a> {
    /// Picks the dialect of a template body: current when it holds at least
    /// one non-empty `Config` element, legacy otherwise.
    #[must_use]
    pub fn detect(body: &'a Element) -> Self {
        if body.children_named("Config").any(|c| !c.is_empty()) {
            Self::Current(CurrentDialect { body })
        } else {
            Self::Legacy(LegacyDialect { body })
        }
    }

    /// Fills the template's resource maps from the body.
    ///
    /// # Errors
    ///
    /// Returns an error when a legacy entry lacks its key element.
    pub fn extract(&self, template: &mut Template) -> Result<Extraction> {
        match self {
            Self::Current(current) => Ok(current.extract(template)),
            Self::Legacy(legacy) => legacy.extract(template),
        }
    }

    /// Whether this is the `Config`-list dialect.
    #[must_use]
    pub const fn is_current(&self) -> bool {
        matches!(self, Self::Current(_))
    }
}

impl CurrentDialect<'_> {
    fn extract(&self, template: &mut Template) -> Extraction {
        let mut extraction = Extraction::default();
        for config in self.body.children_named("Config") {
            extraction.record(apply_config(config, template));
        }
        extraction
    }
}

/// Dispatches one `Config` element into the matching resource map.
pub fn apply_config(config: &Element, template: &mut Template) -> ConfigOutcome {
    if config.is_empty() {
        return ConfigOutcome::Empty;
    }

    let tag = config.attr("Type").unwrap_or_default();
    let Some(kind) = ResourceKind::from_type_tag(tag) else {
        tracing::warn!(
            template = %template.name,
            kind = tag,
            name = config.attr("Name").unwrap_or_default(),
            "unknown config type"
        );
        return ConfigOutcome::UnknownKind(tag.to_string());
    };

    let target = config.attr_non_empty("Target");
    let Some(key) = config.attr_non_empty("Name").or(target) else {
        tracing::warn!(template = %template.name, %kind, "config entry without name or target");
        return ConfigOutcome::MissingKey;
    };
    let target = match target {
        Some(target) => target,
        None if kind.target_defaults_to_key() => key,
        None => {
            tracing::warn!(template = %template.name, %kind, key, "config entry without target");
            return ConfigOutcome::MissingTarget(kind);
        }
    };

    let entry = ResourceEntry {
        default: config.attr("Default").map(str::to_owned),
        description: config.attr("Description").map(str::to_owned),
        mode: match kind {
            ResourceKind::Volume => config.attr("Mode").map(str::to_owned),
            _ => None,
        },
        target: target.to_owned(),
    };
    tracing::debug!(template = %template.name, %kind, key, "config entry");
    if template.insert_resource(kind, key, entry).is_some() {
        tracing::debug!(template = %template.name, %kind, key, "duplicate key, earlier entry replaced");
    }
    ConfigOutcome::Stored(kind)
}

fn required_text<'e>(entry: &'e Element, field: &str) -> Result<&'e str> {
    entry.child_text(field).ok_or_else(|| {
        StencilError::malformed(format!("<{}> entry without <{field}>", entry.name))
    })
}

impl LegacyDialect<'_> {
    fn extract(&self, template: &mut Template) -> Result<Extraction> {
        let mut extraction = Extraction::default();

        let publish = self
            .body
            .child("Networking")
            .and_then(|networking| networking.child("Publish"));
        for port in publish.into_iter().flat_map(|p| p.children_named("Port")) {
            let target = required_text(port, "ContainerPort")?;
            let entry = ResourceEntry {
                default: port.child_text("HostPort").map(str::to_owned),
                description: Some(String::new()),
                mode: None,
                target: target.to_owned(),
            };
            let _ = template.insert_resource(ResourceKind::Port, target, entry);
            extraction.stored += 1;
        }

        let data = self.body.child("Data");
        for volume in data.into_iter().flat_map(|d| d.children_named("Volume")) {
            let target = required_text(volume, "ContainerDir")?;
            let entry = ResourceEntry {
                default: volume.child_text("HostDir").map(str::to_owned),
                description: Some(String::new()),
                mode: volume.child_text("Mode").map(str::to_owned),
                target: target.to_owned(),
            };
            let _ = template.insert_resource(ResourceKind::Volume, target, entry);
            extraction.stored += 1;
        }

        let environment = self.body.child("Environment");
        for variable in environment
            .into_iter()
            .flat_map(|e| e.children_named("Variable"))
        {
            let target = required_text(variable, "Name")?;
            let entry = ResourceEntry {
                default: variable.child_text("Value").map(str::to_owned),
                description: Some(String::new()),
                mode: None,
                target: target.to_owned(),
            };
            let _ = template.insert_resource(ResourceKind::Environment, target, entry);
            extraction.stored += 1;
        }

        Ok(extraction)
    }
}
