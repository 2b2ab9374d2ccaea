//! Annotation tree with atomic discard semantics
//!
//! Every keyword evaluation produces an [`OutputUnit`]: successful
//! evaluations may attach an annotation to the tree, failures append an
//! error to the flat error list. The tree mirrors the evaluation-path
//! hierarchy so that a failing schema can discard the annotations produced
//! underneath it as one unit, while sibling keywords can look up what
//! cousins produced without calling each other.
//!
//! Copyright (c) 2025 Jsonvet Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One evaluation outcome: an annotation (`valid == true`) or an error.
///
/// `keyword` is `None` only for boolean-literal schemas. `detail` carries
/// the annotation value for annotations and the failure message for errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputUnit {
    pub evaluation_path: String,
    pub schema_location: String,
    pub instance_location: String,
    pub keyword: Option<String>,
    pub detail: Value,
    pub valid: bool,
}

impl OutputUnit {
    /// The failure message, for error units
    pub fn message(&self) -> &str {
        self.detail.as_str().unwrap_or("")
    }
}

/// Handle to a node inside an [`AnnotationTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Debug)]
struct TreeNode {
    annotations: Vec<OutputUnit>,
    children: Vec<NodeId>,
}

/// Marks taken before evaluating a schema, used to truncate on failure
#[derive(Debug, Clone, Copy)]
pub struct TreeMarks {
    children: usize,
    annotations: usize,
}

/// Arena-backed tree of annotations keyed by schema evaluation path.
///
/// Truncation detaches subtrees from their parent; detached arena slots are
/// simply never visited again (the tree lives for one `validate` call).
#[derive(Debug)]
pub struct AnnotationTree {
    nodes: Vec<TreeNode>,
}

impl AnnotationTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![TreeNode {
                annotations: Vec::new(),
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Create a child node under `parent`
    pub fn add_child(&mut self, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode {
            annotations: Vec::new(),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Attach an annotation directly to `node`
    pub fn annotate(&mut self, node: NodeId, unit: OutputUnit) {
        self.nodes[node.0].annotations.push(unit);
    }

    /// Snapshot of a node's child and annotation counts
    pub fn marks(&self, node: NodeId) -> TreeMarks {
        let n = &self.nodes[node.0];
        TreeMarks {
            children: n.children.len(),
            annotations: n.annotations.len(),
        }
    }

    /// Discard everything attached to `node` past the given marks
    pub fn truncate(&mut self, node: NodeId, marks: TreeMarks) {
        let n = &mut self.nodes[node.0];
        n.children.truncate(marks.children);
        n.annotations.truncate(marks.annotations);
    }

    /// Find an annotation attached directly to `node` for a sibling keyword
    /// at the given instance location
    pub fn direct_annotation(
        &self,
        node: NodeId,
        keyword: &str,
        instance_location: &str,
    ) -> Option<&OutputUnit> {
        self.nodes[node.0].annotations.iter().find(|a| {
            a.keyword.as_deref() == Some(keyword) && a.instance_location == instance_location
        })
    }

    /// Collect all annotations in the subtree rooted at `node` whose keyword
    /// is one of `keywords` and whose instance location matches
    pub fn subtree_annotations(
        &self,
        node: NodeId,
        keywords: &[&str],
        instance_location: &str,
    ) -> Vec<&OutputUnit> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let n = &self.nodes[id.0];
            for a in &n.annotations {
                if a.instance_location == instance_location
                    && a.keyword
                        .as_deref()
                        .map(|k| keywords.contains(&k))
                        .unwrap_or(false)
                {
                    out.push(a);
                }
            }
            stack.extend(n.children.iter().rev());
        }
        out
    }

    /// Depth-first flattening of every retained annotation
    pub fn flatten(&self) -> Vec<OutputUnit> {
        let mut out = Vec::new();
        self.flatten_into(self.root(), &mut out);
        out
    }

    fn flatten_into(&self, node: NodeId, out: &mut Vec<OutputUnit>) {
        let n = &self.nodes[node.0];
        out.extend(n.annotations.iter().cloned());
        for child in &n.children {
            self.flatten_into(*child, out);
        }
    }
}

impl Default for AnnotationTree {
    fn default() -> Self {
        Self::new()
    }
}
