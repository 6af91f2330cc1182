//! Thread tree types

use crate::comment::Comment;
use crate::types::CommentId;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// One comment in a thread with its replies
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadNode {
    #[serde(flatten)]
    comment: Comment,
    /// Replies, `None` when there are none
    children: Option<Thread>,
}

impl ThreadNode {
    /// Wrap a comment with no replies
    pub fn new(comment: Comment) -> Self {
        Self {
            comment,
            children: None,
        }
    }

    pub fn comment(&self) -> &Comment {
        &self.comment
    }

    pub fn id(&self) -> Option<CommentId> {
        self.comment.id()
    }

    pub fn children(&self) -> Option<&Thread> {
        self.children.as_ref()
    }

    /// Direct reply with the given id
    pub fn child(&self, id: CommentId) -> Option<&ThreadNode> {
        self.children.as_ref().and_then(|children| children.get(id))
    }

    /// Attach replies; an empty thread leaves the slot empty
    pub fn set_children(&mut self, children: Thread) {
        self.children = if children.is_empty() {
            None
        } else {
            Some(children)
        };
    }

    /// Number of nodes in this subtree, itself included
    pub fn total(&self) -> usize {
        1 + self.children.as_ref().map_or(0, Thread::total)
    }

    /// Levels in this subtree, itself included
    pub fn depth(&self) -> usize {
        1 + self.children.as_ref().map_or(0, Thread::depth)
    }

    pub fn into_comment(self) -> Comment {
        self.comment
    }
}

/// Ordered mapping from comment id to node.
///
/// Order is the order of the list the thread was built from. Serializes
/// as an object keyed by comment id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Thread {
    nodes: Vec<ThreadNode>,
}

impl Thread {
    /// Create an empty thread
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, node: ThreadNode) {
        self.nodes.push(node);
    }

    /// Number of top-level entries
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level entries in order
    pub fn iter(&self) -> std::slice::Iter<'_, ThreadNode> {
        self.nodes.iter()
    }

    /// Ids of the top-level entries in order
    pub fn ids(&self) -> Vec<CommentId> {
        self.nodes.iter().filter_map(ThreadNode::id).collect()
    }

    /// Top-level entry with the given id
    pub fn get(&self, id: CommentId) -> Option<&ThreadNode> {
        self.nodes.iter().find(|node| node.id() == Some(id))
    }

    /// Entry with the given id at any level
    pub fn find(&self, id: CommentId) -> Option<&ThreadNode> {
        self.nodes.iter().find_map(|node| {
            if node.id() == Some(id) {
                Some(node)
            } else {
                node.children().and_then(|children| children.find(id))
            }
        })
    }

    /// Number of nodes at all levels
    pub fn total(&self) -> usize {
        self.nodes.iter().map(ThreadNode::total).sum()
    }

    /// Number of levels, 0 for an empty thread
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(ThreadNode::depth).max().unwrap_or(0)
    }

    /// Copy without hidden comments.
    ///
    /// Replies to a hidden comment are dropped with it.
    pub fn visible(&self) -> Thread {
        let nodes = self
            .nodes
            .iter()
            .filter(|node| !node.comment.is_hidden())
            .map(|node| {
                let mut visible = ThreadNode::new(node.comment.clone());
                if let Some(children) = &node.children {
                    visible.set_children(children.visible());
                }
                visible
            })
            .collect();
        Thread { nodes }
    }
}

impl<'a> IntoIterator for &'a Thread {
    type Item = &'a ThreadNode;
    type IntoIter = std::slice::Iter<'a, ThreadNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for Thread {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.nodes.len()))?;
        for node in &self.nodes {
            map.serialize_entry(&node.id().unwrap_or_default(), node)?;
        }
        map.end()
    }
}
