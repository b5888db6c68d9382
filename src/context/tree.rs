//! Project tree built from the filtered file list

use std::collections::BTreeMap;

/// A node in the project tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An included file; `path` is relative to the project root
    File { path: String },
    /// A directory ("module"); the root directory has an empty path
    Directory {
        path: String,
        children: BTreeMap<String, Node>,
    },
}

impl Node {
    fn directory(path: String) -> Self {
        Self::Directory {
            path,
            children: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::File { path } | Self::Directory { path, .. } => path,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }

    pub fn children(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Self::File { .. } => None,
            Self::Directory { children, .. } => Some(children),
        }
    }

    /// Nested name -> subtree mapping; files map to an empty object
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            Self::File { .. } => serde_json::Value::Object(serde_json::Map::new()),
            Self::Directory { children, .. } => serde_json::Value::Object(
                children
                    .iter()
                    .map(|(name, child)| (name.clone(), child.to_value()))
                    .collect(),
            ),
        }
    }

    fn collect_files<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::File { path } => out.push(path),
            Self::Directory { children, .. } => children.values().for_each(|child| child.collect_files(out)),
        }
    }
}

/// The project's directory structure restricted to included files.
///
/// Built once per run; a refresh builds a new tree from a fresh listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTree {
    root: Node,
}

impl Default for ProjectTree {
    fn default() -> Self {
        Self {
            root: Node::directory(String::new()),
        }
    }
}

impl ProjectTree {
    /// Build a tree from `/`-separated relative paths.
    ///
    /// The result does not depend on input order. When a path is both a file and
    /// a prefix of another path, the directory wins.
    pub fn build<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::default();
        for path in paths {
            tree.insert(path.as_ref());
        }
        tree
    }

    fn insert(&mut self, path: &str) {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some(last) = segments.len().checked_sub(1) else {
            return;
        };

        let mut current = &mut self.root;
        for index in 0..last {
            let node_path = segments[..=index].join("/");
            current = as_directory(current)
                .entry(segments[index].to_string())
                .or_insert_with(|| Node::directory(node_path));
        }

        as_directory(current)
            .entry(segments[last].to_string())
            .or_insert_with(|| Node::File {
                path: segments.join("/"),
            });
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.children().map_or(true, BTreeMap::is_empty)
    }

    /// Relative paths of every file leaf, in tree order
    pub fn file_paths(&self) -> Vec<&str> {
        let mut files = Vec::new();
        self.root.collect_files(&mut files);
        files
    }

    /// Declarative nested-mapping form used for display and persistence
    pub fn to_value(&self) -> serde_json::Value {
        self.root.to_value()
    }

    pub fn to_json_pretty(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }
}

fn as_directory(node: &mut Node) -> &mut BTreeMap<String, Node> {
    if let Node::File { path } = node {
        tracing::warn!("'{}' is both a file and a directory; keeping the directory", path);
        let path = std::mem::take(path);
        *node = Node::directory(path);
    }
    match node {
        Node::Directory { children, .. } => children,
        Node::File { .. } => unreachable!("file nodes are converted to directories above"),
    }
}
