//! Thread builder
//!
//! Builds the reply tree of a post from its flat comment list. The list
//! is indexed once by parent id and then walked from the root, so the
//! cost is linear in the number of comments. Every comment is attached
//! at most once: a visited set and a depth bound keep malformed data
//! (self-parents, cycles, duplicate ids) from looping or duplicating
//! nodes.

use super::index::ChildIndex;
use super::tree::{Thread, ThreadNode};
use crate::comment::Comment;
use crate::config::ThreadConfig;
use crate::types::CommentId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Handling of comments whose parent is not in the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// Leave them out of the thread
    #[default]
    Drop,
    /// Show them as top-level comments
    Promote,
}

/// Builder for reply trees
#[derive(Debug, Clone)]
pub struct ThreadBuilder {
    orphans: OrphanPolicy,
    max_depth: usize,
}

impl ThreadBuilder {
    /// Create a builder with default settings
    pub fn new() -> Self {
        Self::from_config(&ThreadConfig::default())
    }

    /// Create a builder from configuration
    pub fn from_config(config: &ThreadConfig) -> Self {
        Self {
            orphans: config.orphans,
            max_depth: config.max_depth.max(1),
        }
    }

    /// Set the orphan policy
    pub fn orphans(mut self, policy: OrphanPolicy) -> Self {
        self.orphans = policy;
        self
    }

    /// Set the deepest level at which comments are still attached
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Arrange `comments` into a reply tree.
    ///
    /// The input is expected sorted by timestamp, then parent id; sibling
    /// order in the result follows the input order.
    pub fn build(&self, comments: &[Comment]) -> Thread {
        let index = ChildIndex::build(comments);
        let roots = self.top_level(comments, &index);

        let mut visited = HashSet::new();
        let thread = self.build_level(comments, &index, &roots, 1, &mut visited);

        let skipped = index.len() - visited.len();
        if skipped > 0 {
            warn!(
                "{} of {} comments could not be attached to the thread",
                skipped,
                index.len()
            );
        }
        debug!(
            "Built thread with {} top-level comments ({} total)",
            thread.len(),
            visited.len()
        );

        thread
    }

    /// Positions of the comments shown at the top level
    fn top_level(&self, comments: &[Comment], index: &ChildIndex) -> Vec<usize> {
        match self.orphans {
            OrphanPolicy::Drop => index.children_of(CommentId::ROOT).to_vec(),
            OrphanPolicy::Promote => comments
                .iter()
                .enumerate()
                .filter(|(_, c)| c.id().is_some())
                .filter(|(_, c)| c.is_root() || index.is_missing_parent(c.parent_id()))
                .map(|(position, _)| position)
                .collect(),
        }
    }

    fn build_level(
        &self,
        comments: &[Comment],
        index: &ChildIndex,
        positions: &[usize],
        depth: usize,
        visited: &mut HashSet<CommentId>,
    ) -> Thread {
        let mut thread = Thread::new();

        for &position in positions {
            let comment = &comments[position];
            let Some(id) = comment.id() else {
                continue;
            };

            if !visited.insert(id) {
                warn!("Comment {} already placed in thread, skipping duplicate", id);
                continue;
            }

            let mut node = ThreadNode::new(comment.clone());
            let replies = index.children_of(id);
            if !replies.is_empty() {
                if depth >= self.max_depth {
                    warn!(
                        "Thread depth limit {} reached at comment {}, dropping {} replies",
                        self.max_depth,
                        id,
                        replies.len()
                    );
                } else {
                    node.set_children(self.build_level(
                        comments,
                        index,
                        replies,
                        depth + 1,
                        visited,
                    ));
                }
            }

            thread.push(node);
        }

        thread
    }
}

impl Default for ThreadBuilder {
    fn default() -> Self {
        Self::new()
    }
}
