//! Command tree and lookup tables for the mcfunction toolchain.
//!
//! Defines the data structures the command parser walks: the Brigadier-style
//! [`CommandNode`] tree addressed by [`TreePath`]s, registry tables from the
//! game data, and [`LocalData`] collected from datapacks. [`CommandData`]
//! bundles them into the single read-only handle injected into every parse.
//!
//! The serialized shape mirrors the game's `commands.json` report, so the
//! [`persist`] module can store and reload it byte-for-byte.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

/// Persisted mirror of [`GlobalData`], one JSON file per category.
pub mod persist;

// ─── Node kind ──────────────────────────────────────────────────────────────

/// The three kinds of node in a command tree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// The tree root. Never a parse target itself.
    Root,
    /// A keyword that must appear verbatim.
    Literal,
    /// A typed argument handled by the parser named in [`CommandNode::parser`].
    Argument,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Root => write!(f, "root"),
            NodeKind::Literal => write!(f, "literal"),
            NodeKind::Argument => write!(f, "argument"),
        }
    }
}

// ─── Ordered children ───────────────────────────────────────────────────────
// JSON objects carry the children of a node. Declaration order is part of the
// grammar (tree paths are child indices, and literals are tried in order), so
// the map is kept as an ordered vector instead of a hash map.

/// Named children of a [`CommandNode`], in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Children(Vec<(String, CommandNode)>);

impl Children {
    /// Create an empty child list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the node has no children.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a child. Replaces an existing child with the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, node: CommandNode) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = node,
            None => self.0.push((name, node)),
        }
    }

    /// Child at declaration index `idx`.
    pub fn get_index(&self, idx: usize) -> Option<(&str, &CommandNode)> {
        self.0.get(idx).map(|(n, c)| (n.as_str(), c))
    }

    /// Child named `name`, with its declaration index.
    pub fn get(&self, name: &str) -> Option<(usize, &CommandNode)> {
        self.0
            .iter()
            .enumerate()
            .find(|(_, (n, _))| n == name)
            .map(|(i, (_, c))| (i, c))
    }

    /// Iterate `(index, name, node)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, &CommandNode)> {
        self.0
            .iter()
            .enumerate()
            .map(|(i, (n, c))| (i, n.as_str(), c))
    }
}

impl Serialize for Children {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, node) in &self.0 {
            map.serialize_entry(name, node)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Children {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ChildrenVisitor;

        impl<'de> Visitor<'de> for ChildrenVisitor {
            type Value = Children;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of child name to command node")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Children, A::Error> {
                let mut out = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, node)) = access.next_entry::<String, CommandNode>()? {
                    if out.iter().any(|(n, _): &(String, CommandNode)| *n == name) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate child node {name:?}"
                        )));
                    }
                    out.push((name, node));
                }
                Ok(Children(out))
            }
        }

        deserializer.deserialize_map(ChildrenVisitor)
    }
}

// ─── Command node ───────────────────────────────────────────────────────────

/// A node of the command tree.
///
/// Optional fields that are absent in the source JSON stay `None` and are not
/// written back, so a tree survives a serialize/deserialize cycle unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandNode {
    /// Root, literal, or argument.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Child nodes in declaration order.
    #[serde(default, skip_serializing_if = "Children::is_empty")]
    pub children: Children,
    /// Whether the command may end after this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<bool>,
    /// Argument parser id (e.g., `"brigadier:integer"`). Arguments only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parser: Option<String>,
    /// Parser-specific properties (e.g., `{"min": 0}`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
    /// Names from the root of the node parsing continues at. `[]` is the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<Vec<String>>,
}

impl CommandNode {
    fn bare(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Children::new(),
            executable: None,
            parser: None,
            properties: None,
            redirect: None,
        }
    }

    /// An empty root node.
    pub fn root() -> Self {
        Self::bare(NodeKind::Root)
    }

    /// A literal node with no children.
    pub fn literal() -> Self {
        Self::bare(NodeKind::Literal)
    }

    /// An argument node handled by `parser`.
    pub fn argument(parser: impl Into<String>) -> Self {
        Self {
            parser: Some(parser.into()),
            ..Self::bare(NodeKind::Argument)
        }
    }

    /// Add a child (builder pattern).
    pub fn with_child(mut self, name: impl Into<String>, node: CommandNode) -> Self {
        self.children.insert(name, node);
        self
    }

    /// Set a parser property (builder pattern).
    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties
            .get_or_insert_with(serde_json::Map::new)
            .insert(key.into(), value);
        self
    }

    /// Mark the node executable or not (builder pattern).
    pub fn with_executable(mut self, executable: bool) -> Self {
        self.executable = Some(executable);
        self
    }

    /// Redirect parsing to the node at `target` (builder pattern).
    pub fn with_redirect<S: Into<String>>(mut self, target: impl IntoIterator<Item = S>) -> Self {
        self.redirect = Some(target.into_iter().map(Into::into).collect());
        self
    }

    /// Whether a command may end after this node.
    ///
    /// An explicit `executable` flag wins; otherwise leaves without a redirect
    /// are executable.
    pub fn is_executable(&self) -> bool {
        self.executable
            .unwrap_or(self.children.is_empty() && self.redirect.is_none())
    }

    /// The node at `path`, walking child indices from `self`.
    pub fn node_at(&self, path: &TreePath) -> Option<&CommandNode> {
        path.indices()
            .iter()
            .try_fold(self, |node, &i| node.children.get_index(i).map(|(_, c)| c))
    }

    /// Resolve a sequence of child names from `self` into a [`TreePath`].
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Option<TreePath> {
        let mut node = self;
        let mut path = TreePath::root();
        for name in names {
            let (idx, child) = node.children.get(name.as_ref())?;
            path = path.child(idx);
            node = child;
        }
        Some(path)
    }

    /// The child names along `path`, or `None` if the path leaves the tree.
    pub fn names(&self, path: &TreePath) -> Option<Vec<&str>> {
        let mut node = self;
        let mut out = Vec::with_capacity(path.depth());
        for &i in path.indices() {
            let (name, child) = node.children.get_index(i)?;
            out.push(name);
            node = child;
        }
        Some(out)
    }
}

// ─── Tree path ──────────────────────────────────────────────────────────────

/// Child-index path from the root to a node.
///
/// The empty path is the root, which is never itself a parse target; every
/// parse-tree span carries a path of depth ≥ 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TreePath(Vec<usize>);

impl TreePath {
    /// The path of the root node.
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from raw child indices.
    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// This path extended by child `idx`.
    pub fn child(&self, idx: usize) -> Self {
        let mut v = Vec::with_capacity(self.0.len() + 1);
        v.extend_from_slice(&self.0);
        v.push(idx);
        Self(v)
    }

    /// Raw child indices.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Number of steps from the root.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/")?;
        for (i, idx) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{idx}")?;
        }
        Ok(())
    }
}

// ─── Global & local data ────────────────────────────────────────────────────

/// Game-version information recorded alongside cached data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetaInfo {
    /// Game version the data was generated from (e.g., `"1.20.4"`).
    pub version: String,
}

/// Data generated from the game itself, shared by every workspace.
///
/// Each field is one persisted category (see [`persist`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalData {
    /// The command tree.
    pub commands: CommandNode,
    /// Registry name (e.g., `"minecraft:entity_type"`) to registered ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registries: Option<BTreeMap<String, Vec<String>>>,
    /// Version information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_info: Option<MetaInfo>,
}

impl GlobalData {
    /// Global data containing only a command tree.
    pub fn with_commands(commands: CommandNode) -> Self {
        Self {
            commands,
            registries: None,
            meta_info: None,
        }
    }
}

/// Data collected from the datapacks of a workspace.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalData {
    /// Ids of every function defined (e.g., `"pack:setup/init"`).
    #[serde(default)]
    pub functions: Vec<String>,
    /// Function tag id (without `#`) to member function ids.
    #[serde(default)]
    pub function_tags: BTreeMap<String, Vec<String>>,
}

/// The read-only handle passed to every parse.
///
/// Lookup sets are built lazily on first access and reused thereafter, so a
/// `CommandData` should be constructed once per workspace load and shared by
/// reference (or `Arc`) across all lines and threads.
#[derive(Debug)]
pub struct CommandData {
    /// Game data.
    pub global: GlobalData,
    /// Datapack data, when a workspace has been scanned.
    pub local: Option<LocalData>,

    registry_sets: OnceLock<HashMap<String, HashSet<String>>>,
    function_set: OnceLock<HashSet<String>>,
}

impl CommandData {
    /// Bundle global and local data. Caches are initialized lazily.
    pub fn new(global: GlobalData, local: Option<LocalData>) -> Self {
        Self {
            global,
            local,
            registry_sets: OnceLock::new(),
            function_set: OnceLock::new(),
        }
    }

    /// The command tree root.
    pub fn root(&self) -> &CommandNode {
        &self.global.commands
    }

    fn registry_sets(&self) -> &HashMap<String, HashSet<String>> {
        self.registry_sets.get_or_init(|| {
            self.global
                .registries
                .iter()
                .flatten()
                .map(|(name, ids)| (name.clone(), ids.iter().cloned().collect()))
                .collect()
        })
    }

    /// Registered ids of `registry`, if the registry is known.
    pub fn registry(&self, registry: &str) -> Option<&[String]> {
        self.global
            .registries
            .as_ref()
            .and_then(|r| r.get(registry))
            .map(Vec::as_slice)
    }

    /// `Some(true|false)` when `registry` is known, `None` when it is not.
    pub fn registry_contains(&self, registry: &str, id: &str) -> Option<bool> {
        self.registry_sets().get(registry).map(|s| s.contains(id))
    }

    fn function_set(&self) -> &HashSet<String> {
        self.function_set.get_or_init(|| {
            self.local
                .iter()
                .flat_map(|l| l.functions.iter().cloned())
                .collect()
        })
    }

    /// Whether datapack data has been loaded at all.
    pub fn has_local(&self) -> bool {
        self.local.is_some()
    }

    /// Whether a function with this id is defined.
    pub fn has_function(&self, id: &str) -> bool {
        self.function_set().contains(id)
    }

    /// Whether a function tag with this id (without `#`) is defined.
    pub fn has_function_tag(&self, id: &str) -> bool {
        self.local
            .as_ref()
            .is_some_and(|l| l.function_tags.contains_key(id))
    }

    /// All function ids followed by all tag ids (prefixed with `#`).
    pub fn function_candidates(&self) -> Vec<String> {
        let Some(local) = self.local.as_ref() else {
            return Vec::new();
        };
        local
            .functions
            .iter()
            .cloned()
            .chain(local.function_tags.keys().map(|t| format!("#{t}")))
            .collect()
    }
}
