//! Parent to children index over a flat comment list

use crate::comment::Comment;
use crate::types::CommentId;
use std::collections::{HashMap, HashSet};

/// Adjacency index: parent id to the positions of its replies.
///
/// Positions refer to the slice the index was built from and keep that
/// slice's order.
#[derive(Debug, Clone, Default)]
pub struct ChildIndex {
    /// Index by parent id
    by_parent: HashMap<CommentId, Vec<usize>>,
    /// Ids present in the list
    ids: HashSet<CommentId>,
}

impl ChildIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a list of comments in one pass
    pub fn build(comments: &[Comment]) -> Self {
        let mut index = Self::new();
        index.rebuild(comments);
        index
    }

    /// Add the comment found at `position`.
    ///
    /// Unpersisted comments have no id to hang replies on and are not
    /// indexed.
    pub fn add(&mut self, position: usize, comment: &Comment) {
        let Some(id) = comment.id() else {
            return;
        };

        self.ids.insert(id);
        self.by_parent
            .entry(comment.parent_id())
            .or_default()
            .push(position);
    }

    /// Positions of the replies to `parent`, in list order
    pub fn children_of(&self, parent: CommentId) -> &[usize] {
        self.by_parent
            .get(&parent)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Check if a comment has any replies
    pub fn has_children(&self, parent: CommentId) -> bool {
        !self.children_of(parent).is_empty()
    }

    /// Check if a comment id is part of the list
    pub fn contains(&self, id: CommentId) -> bool {
        self.ids.contains(&id)
    }

    /// Check if `parent` is neither the root nor a listed comment
    pub fn is_missing_parent(&self, parent: CommentId) -> bool {
        !parent.is_root() && !self.contains(parent)
    }

    /// Number of indexed comments
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if nothing was indexed
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Clear the entire index
    pub fn clear(&mut self) {
        self.by_parent.clear();
        self.ids.clear();
    }

    /// Rebuild index from a list of comments
    pub fn rebuild(&mut self, comments: &[Comment]) {
        self.clear();
        for (position, comment) in comments.iter().enumerate() {
            self.add(position, comment);
        }
    }
}
