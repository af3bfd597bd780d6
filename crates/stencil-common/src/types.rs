//! Canonical template model shared by the normalizer and the renderer.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::DEFAULT_NETWORK_MODE;

/// One of the five configurable resource kinds of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Published network port.
    Port,
    /// Bind-mounted volume.
    Volume,
    /// Environment variable.
    Environment,
    /// Container label.
    Label,
    /// Passed-through host device.
    Device,
}

impl ResourceKind {
    /// Every kind, in the order sections appear in a rendered service.
    pub const RENDER_ORDER: [Self; 5] = [
        Self::Port,
        Self::Environment,
        Self::Volume,
        Self::Label,
        Self::Device,
    ];

    /// Maps a `Config` type tag (`Port`, `Path`, `Variable`, `Device`,
    /// `Label`) to its kind. Tags are case-sensitive.
    #[must_use]
    pub fn from_type_tag(tag: &str) -> Option<Self> {
        match tag {
            "Port" => Some(Self::Port),
            "Path" => Some(Self::Volume),
            "Variable" => Some(Self::Environment),
            "Device" => Some(Self::Device),
            "Label" => Some(Self::Label),
            _ => None,
        }
    }

    /// Key of this kind's section in a compose service.
    #[must_use]
    pub const fn section_name(self) -> &'static str {
        match self {
            Self::Port => "ports",
            Self::Volume => "volumes",
            Self::Environment => "environment",
            Self::Label => "labels",
            Self::Device => "devices",
        }
    }

    /// Whether an entry of this kind may borrow its key as target.
    #[must_use]
    pub const fn target_defaults_to_key(self) -> bool {
        matches!(self, Self::Environment | Self::Label)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section_name())
    }
}

/// One configurable unit of a container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    /// Host-side or default value.
    #[serde(rename = "Default", default)]
    pub default: Option<String>,
    /// Free text, possibly multi-line.
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    /// Access mode; only volumes carry one.
    #[serde(rename = "Mode", default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// In-container identifier: port, mount path, variable name, label key or device path.
    ///
    /// Stored catalogs may carry `null` here; [`Catalog::backfill`] then
    /// falls back to the entry key.
    #[serde(rename = "Target", default, deserialize_with = "null_as_default")]
    pub target: String,
}

impl ResourceEntry {
    /// Creates an entry with only a target set.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the access mode.
    #[must_use]
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }
}

/// Resources of one kind, keyed by declared name or target.
pub type ResourceMap = BTreeMap<String, ResourceEntry>;

/// Normalized descriptor of one (app, author) pair.
///
/// Fields are declared alphabetically so the persisted JSON has sorted keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Template-level free text.
    #[serde(default)]
    pub description: Option<String>,
    /// Devices keyed by declared name or device path.
    #[serde(default, deserialize_with = "null_as_default")]
    pub devices: ResourceMap,
    /// Environment variables keyed by declared name or variable name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub environment: ResourceMap,
    /// Extra `docker run` parameters, verbatim.
    #[serde(default)]
    pub extra_parameters: Option<String>,
    /// Image repository reference.
    pub image: String,
    /// Labels keyed by declared name or label key.
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: ResourceMap,
    /// App name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Docker network mode.
    #[serde(default = "default_network_mode", deserialize_with = "network_mode_or_default")]
    pub network_mode: String,
    /// Ports keyed by declared name or container port.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ports: ResourceMap,
    /// Arguments appended after the image, verbatim.
    #[serde(default)]
    pub post_arguments: Option<String>,
    /// Volumes keyed by declared name or container path.
    #[serde(default, deserialize_with = "null_as_default")]
    pub volumes: ResourceMap,
}

fn default_network_mode() -> String {
    DEFAULT_NETWORK_MODE.to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn network_mode_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|mode| !mode.trim().is_empty())
        .unwrap_or_else(default_network_mode))
}

impl Template {
    /// Creates a template with bridge networking and no resources.
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            description: None,
            devices: ResourceMap::new(),
            environment: ResourceMap::new(),
            extra_parameters: None,
            image: image.into(),
            labels: ResourceMap::new(),
            name: name.into(),
            network_mode: default_network_mode(),
            ports: ResourceMap::new(),
            post_arguments: None,
            volumes: ResourceMap::new(),
        }
    }

    /// Returns the resources of one kind.
    #[must_use]
    pub const fn resources(&self, kind: ResourceKind) -> &ResourceMap {
        match kind {
            ResourceKind::Port => &self.ports,
            ResourceKind::Volume => &self.volumes,
            ResourceKind::Environment => &self.environment,
            ResourceKind::Label => &self.labels,
            ResourceKind::Device => &self.devices,
        }
    }

    /// Returns the resources of one kind for modification.
    pub const fn resources_mut(&mut self, kind: ResourceKind) -> &mut ResourceMap {
        match kind {
            ResourceKind::Port => &mut self.ports,
            ResourceKind::Volume => &mut self.volumes,
            ResourceKind::Environment => &mut self.environment,
            ResourceKind::Label => &mut self.labels,
            ResourceKind::Device => &mut self.devices,
        }
    }

    /// Inserts a resource, replacing and returning any entry with the same key.
    pub fn insert_resource(
        &mut self,
        kind: ResourceKind,
        key: impl Into<String>,
        entry: ResourceEntry,
    ) -> Option<ResourceEntry> {
        self.resources_mut(kind).insert(key.into(), entry)
    }

    /// Total number of resources across all kinds.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        ResourceKind::RENDER_ORDER
            .iter()
            .map(|&kind| self.resources(kind).len())
            .sum()
    }
}

/// Every template, keyed by app name then author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog(BTreeMap<String, BTreeMap<String, Template>>);

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Stores a template, replacing any previous one for the same (app, author).
    pub fn insert(
        &mut self,
        app: impl Into<String>,
        author: impl Into<String>,
        template: Template,
    ) -> Option<Template> {
        self.0
            .entry(app.into())
            .or_default()
            .insert(author.into(), template)
    }

    /// Merges another catalog into this one; its templates win on conflict.
    ///
    /// Returns how many (app, author) pairs were replaced.
    pub fn merge(&mut self, other: Self) -> usize {
        let mut replaced = 0;
        for (app, authors) in other.0 {
            let slot = self.0.entry(app).or_default();
            for (author, template) in authors {
                if slot.insert(author, template).is_some() {
                    replaced += 1;
                }
            }
        }
        replaced
    }

    /// Looks up the template for one (app, author) pair.
    #[must_use]
    pub fn get(&self, app: &str, author: &str) -> Option<&Template> {
        self.0.get(app).and_then(|authors| authors.get(author))
    }

    /// Iterates every (app, author, template) triple in sorted order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, &Template)> {
        self.0.iter().flat_map(|(app, authors)| {
            authors
                .iter()
                .map(move |(author, template)| (app.as_str(), author.as_str(), template))
        })
    }

    /// Fills values that catalogs written by older tools leave out.
    ///
    /// An empty template name takes its app key and an empty entry target
    /// takes its entry key.
    pub fn backfill(&mut self) {
        for (app, authors) in &mut self.0 {
            for template in authors.values_mut() {
                if template.name.is_empty() {
                    template.name.clone_from(app);
                }
                for kind in ResourceKind::RENDER_ORDER {
                    for (key, entry) in template.resources_mut(kind) {
                        if entry.target.is_empty() {
                            entry.target.clone_from(key);
                        }
                    }
                }
            }
        }
    }

    /// Number of distinct apps.
    #[must_use]
    pub fn app_count(&self) -> usize {
        self.0.len()
    }

    /// Number of (app, author) templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    /// Whether the catalog holds no template.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
