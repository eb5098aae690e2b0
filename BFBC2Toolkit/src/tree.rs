//! Data explorer tree for an extracted archive folder

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;

/// What a tree node points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    File {
        /// Lowercase extension without the dot, empty if none
        extension: String,
    },
}

/// A file or directory in the data tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub name: String,
    pub path: PathBuf,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// Lowercase extension of a file node
    pub fn extension(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::File { extension } => Some(extension),
            NodeKind::Directory => None,
        }
    }
}

/// Tree of an extracted data folder, rooted at the folder itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataTree {
    pub root: TreeNode,
}

impl DataTree {
    /// Scan `root` recursively.
    ///
    /// Directories come before files, both sorted case-insensitively.
    ///
    /// # Errors
    /// Returns an error if a directory cannot be read.
    pub fn populate<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        tracing::debug!("Populating data tree from {}", root.display());

        let name = root
            .file_name()
            .map_or_else(|| root.display().to_string(), |n| n.to_string_lossy().into_owned());

        Ok(Self {
            root: TreeNode {
                name,
                path: root.to_path_buf(),
                kind: NodeKind::Directory,
                children: scan_directory(root)?,
            },
        })
    }

    /// Number of files below the root
    pub fn file_count(&self) -> usize {
        count(&self.root, false)
    }

    /// Number of directories below the root (the root itself excluded)
    pub fn dir_count(&self) -> usize {
        count(&self.root, true) - 1
    }

    /// Find a node by its path relative to the root (`/`-separated)
    pub fn find(&self, relative: &str) -> Option<&TreeNode> {
        let mut node = &self.root;
        for part in relative.split('/').filter(|p| !p.is_empty()) {
            node = node.children.iter().find(|c| c.name == part)?;
        }
        Some(node)
    }

    /// Render as an indented text tree, directories marked with a trailing `/`.
    pub fn render(&self) -> String {
        let mut out = format!("{}/\n", self.root.name);
        render_children(&self.root, "", &mut out);
        out
    }

    /// Serialise as pretty JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn scan_directory(dir: &Path) -> Result<Vec<TreeNode>> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)?.filter_map(std::result::Result::ok).collect();

    // Sort: directories first, then case-insensitively
    entries.sort_by_cached_key(|e| {
        let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
        (!is_dir, e.file_name().to_string_lossy().to_lowercase())
    });

    let mut nodes = Vec::with_capacity(entries.len());
    for entry in entries {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            nodes.push(TreeNode {
                name,
                children: scan_directory(&path)?,
                path,
                kind: NodeKind::Directory,
            });
        } else {
            let extension = path
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            nodes.push(TreeNode {
                name,
                path,
                kind: NodeKind::File { extension },
                children: Vec::new(),
            });
        }
    }
    Ok(nodes)
}

fn count(node: &TreeNode, dirs: bool) -> usize {
    let own = usize::from(node.is_dir() == dirs);
    own + node.children.iter().map(|c| count(c, dirs)).sum::<usize>()
}

fn render_children(node: &TreeNode, prefix: &str, out: &mut String) {
    let last = node.children.len().saturating_sub(1);
    for (i, child) in node.children.iter().enumerate() {
        let (branch, indent) = if i == last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        let marker = if child.is_dir() { "/" } else { "" };
        let _ = writeln!(out, "{prefix}{branch}{}{marker}", child.name);
        render_children(child, &format!("{prefix}{indent}"), out);
    }
}
