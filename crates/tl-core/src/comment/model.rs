//! Comment data model

use super::sanitize::escape_html;
use crate::thread::ThreadNode;
use crate::types::{CommentId, PostId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Format used when a timestamp is shown as text
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Names accepted by [`Comment::field`], in display order
pub const FIELD_NAMES: [&str; 9] = [
    "id",
    "parent_id",
    "post_id",
    "username",
    "message",
    "timestamp",
    "ip",
    "is_deleted",
    "is_hidden",
];

/// A comment attached to a post, possibly replying to another comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Store-assigned identifier, `None` until persisted
    id: Option<CommentId>,
    /// Comment this one replies to, `0` for top-level comments
    #[serde(default)]
    parent_id: CommentId,
    /// Post the comment belongs to
    post_id: PostId,
    /// Name of the commenter
    #[serde(default)]
    username: Option<String>,
    /// Body, HTML-encoded once prepared
    message: String,
    /// Store-assigned creation time
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    /// Originating address
    #[serde(default)]
    ip: Option<String>,
    /// Deleted, kept to preserve the thread
    #[serde(default)]
    is_deleted: bool,
    /// Hidden from normal display
    #[serde(default)]
    is_hidden: bool,
    #[serde(skip)]
    prepared: bool,
}

impl Comment {
    /// Create an empty, unpersisted top-level comment for a post
    pub fn new(post_id: PostId) -> Self {
        Self {
            id: None,
            parent_id: CommentId::ROOT,
            post_id,
            username: None,
            message: String::new(),
            timestamp: None,
            ip: None,
            is_deleted: false,
            is_hidden: false,
            prepared: false,
        }
    }

    /// Attach the identity assigned by a store when the comment was added.
    ///
    /// The prepared state is kept as it was.
    pub fn persisted(mut self, id: CommentId, timestamp: DateTime<Utc>) -> Self {
        self.id = Some(id);
        self.timestamp = Some(timestamp);
        self
    }

    /// Rebuild the identity of a comment read back from a store.
    ///
    /// Stored text counts as prepared. Rows without a timestamp stay
    /// unstamped.
    pub fn restored(mut self, id: CommentId, timestamp: Option<DateTime<Utc>>) -> Self {
        self.id = Some(id);
        self.timestamp = timestamp;
        self.prepared = true;
        self
    }

    pub fn id(&self) -> Option<CommentId> {
        self.id
    }

    pub fn parent_id(&self) -> CommentId {
        self.parent_id
    }

    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn is_hidden(&self) -> bool {
        self.is_hidden
    }

    /// Whether `prepare` has run since the text was last changed
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Whether this comment has been stored
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Whether this comment is a top-level comment
    pub fn is_root(&self) -> bool {
        self.parent_id.is_root()
    }

    pub fn set_parent_id(&mut self, parent_id: CommentId) {
        self.parent_id = parent_id;
    }

    pub fn set_post_id(&mut self, post_id: PostId) {
        self.post_id = post_id;
    }

    /// Set the commenter name (trimmed, blank clears it)
    pub fn set_username(&mut self, username: impl AsRef<str>) {
        self.username = non_blank(username.as_ref());
        self.prepared = false;
    }

    /// Set the body (trimmed)
    pub fn set_message(&mut self, message: impl AsRef<str>) {
        self.message = message.as_ref().trim().to_string();
        self.prepared = false;
    }

    /// Set the originating address (trimmed, blank clears it)
    pub fn set_ip(&mut self, ip: impl AsRef<str>) {
        self.ip = non_blank(ip.as_ref());
    }

    pub fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.is_hidden = hidden;
    }

    /// Read a field by name, rendered as text.
    ///
    /// Unknown names yield `None`.
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.map(|id| id.to_string()),
            "parent_id" => Some(self.parent_id.to_string()),
            "post_id" => Some(self.post_id.to_string()),
            "username" => self.username.clone(),
            "message" => Some(self.message.clone()),
            "timestamp" => self
                .timestamp
                .map(|ts| ts.format(DISPLAY_TIMESTAMP_FORMAT).to_string()),
            "ip" => self.ip.clone(),
            "is_deleted" => Some(flag(self.is_deleted).to_string()),
            "is_hidden" => Some(flag(self.is_hidden).to_string()),
            _ => None,
        }
    }

    /// Assign a field by name from text.
    ///
    /// Returns `false` without touching the comment when the name is
    /// unknown, refers to a store-assigned field, or the value does not
    /// parse.
    pub fn set_field(&mut self, name: &str, value: &str) -> bool {
        let value = value.trim();
        match name {
            "parent_id" => value.parse().map(|id| self.set_parent_id(id)).is_ok(),
            "post_id" => value.parse().map(|id| self.set_post_id(id)).is_ok(),
            "username" => {
                self.set_username(value);
                true
            }
            "message" => {
                self.set_message(value);
                true
            }
            "ip" => {
                self.set_ip(value);
                true
            }
            "is_deleted" => parse_flag(value).map(|v| self.set_deleted(v)).is_some(),
            "is_hidden" => parse_flag(value).map(|v| self.set_hidden(v)).is_some(),
            _ => {
                debug!("Ignoring assignment to field '{}'", name);
                false
            }
        }
    }

    /// Encode HTML special characters in the username and message.
    ///
    /// Safe to call repeatedly: already encoded text is left alone.
    pub fn prepare(&mut self) {
        if let Some(username) = &self.username {
            self.username = Some(escape_html(username));
        }
        self.message = escape_html(&self.message);
        self.prepared = true;
    }

    /// Projection used for thread assembly, with an empty `children` slot
    pub fn to_node(&self) -> ThreadNode {
        ThreadNode::new(self.clone())
    }
}

/// Equality over the stored fields; the prepared flag is bookkeeping.
impl PartialEq for Comment {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.parent_id == other.parent_id
            && self.post_id == other.post_id
            && self.username == other.username
            && self.message == other.message
            && self.timestamp == other.timestamp
            && self.ip == other.ip
            && self.is_deleted == other.is_deleted
            && self.is_hidden == other.is_hidden
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = FIELD_NAMES
            .iter()
            .map(|name| self.field(name).unwrap_or_default())
            .collect();
        write!(f, "{{ {} }}", values.join(", "))
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn create_test_comment() -> Comment {
        let mut comment = Comment::new(PostId(2));
        comment.set_username("  Ipsum of Lorem ");
        comment.set_message("First message");
        comment.set_ip("127.0.0.1");
        comment
    }

    #[test]
    fn test_comment_creation() {
        let comment = create_test_comment();
        assert_eq!(comment.id(), None);
        assert!(comment.is_root());
        assert_eq!(comment.username(), Some("Ipsum of Lorem"));
        assert_eq!(comment.message(), "First message");
        assert!(!comment.is_prepared());
        assert!(!comment.is_persisted());
    }

    #[test]
    fn test_blank_username_clears() {
        let mut comment = create_test_comment();
        comment.set_username("   ");
        assert_eq!(comment.username(), None);
    }

    #[test]
    fn test_prepare_encodes_text() {
        let mut comment = create_test_comment();
        comment.set_username("<b>eve</b>");
        comment.set_message("<script>alert(\"hi\")</script>");
        comment.prepare();

        assert!(comment.is_prepared());
        assert_eq!(comment.username(), Some("&lt;b&gt;eve&lt;/b&gt;"));
        assert_eq!(
            comment.message(),
            "&lt;script&gt;alert(&quot;hi&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_prepare_twice_is_stable() {
        let mut once = create_test_comment();
        once.set_message("Tom & Jerry's <show>");
        let mut twice = once.clone();

        once.prepare();
        twice.prepare();
        twice.prepare();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_editing_text_clears_prepared() {
        let mut comment = create_test_comment();
        comment.prepare();
        comment.set_message("edited");
        assert!(!comment.is_prepared());
    }

    #[test]
    fn test_field_access() {
        let comment = create_test_comment();
        assert_eq!(comment.field("post_id"), Some("2".to_string()));
        assert_eq!(comment.field("parent_id"), Some("0".to_string()));
        assert_eq!(comment.field("is_hidden"), Some("0".to_string()));
        assert_eq!(comment.field("id"), None);
        assert_eq!(comment.field("no_such_field"), None);
    }

    #[test]
    fn test_set_field() {
        let mut comment = create_test_comment();

        assert!(comment.set_field("parent_id", " 12 "));
        assert_eq!(comment.parent_id(), CommentId(12));

        assert!(comment.set_field("message", "  Reply "));
        assert_eq!(comment.message(), "Reply");

        assert!(comment.set_field("is_deleted", "1"));
        assert!(comment.is_deleted());
    }

    #[test]
    fn test_set_field_ignores_unknown_and_assigned() {
        let mut comment = create_test_comment();
        let before = comment.clone();

        assert!(!comment.set_field("karma", "9000"));
        assert!(!comment.set_field("id", "5"));
        assert!(!comment.set_field("timestamp", "2024-01-01 00:00:00"));
        assert!(!comment.set_field("post_id", "not a number"));
        assert!(!comment.set_field("is_hidden", "maybe"));

        assert_eq!(comment, before);
    }

    #[test]
    fn test_display() {
        let ts = Utc.with_ymd_and_hms(2020, 3, 7, 15, 8, 0).unwrap();
        let comment = create_test_comment().persisted(CommentId(1), ts);

        assert_eq!(
            comment.to_string(),
            "{ 1, 0, 2, Ipsum of Lorem, First message, 2020-03-07 15:08:00, 127.0.0.1, 0, 0 }"
        );
    }

    #[test]
    fn test_display_unpersisted() {
        let comment = Comment::new(PostId(4));
        assert_eq!(comment.to_string(), "{ , 0, 4, , , , , 0, 0 }");
    }

    #[test]
    fn test_persisted_keeps_prepared_state() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let raw = create_test_comment().persisted(CommentId(3), ts);
        assert!(!raw.is_prepared());
        assert_eq!(raw.id(), Some(CommentId(3)));
        assert_eq!(raw.timestamp(), Some(ts));

        let mut prepared = create_test_comment();
        prepared.prepare();
        assert!(prepared.persisted(CommentId(4), ts).is_prepared());
    }

    #[test]
    fn test_restored_counts_as_prepared() {
        let comment = create_test_comment().restored(CommentId(3), None);
        assert!(comment.is_prepared());
        assert!(comment.is_persisted());
        assert_eq!(comment.timestamp(), None);
    }

    #[test]
    fn test_equality_ignores_prepared_flag() {
        let raw = create_test_comment();
        let mut prepared = create_test_comment();
        prepared.prepare();

        assert!(prepared.is_prepared());
        assert!(!raw.is_prepared());
        assert_eq!(raw, prepared);

        prepared.set_hidden(true);
        assert_ne!(raw, prepared);
    }

    #[test]
    fn test_to_node_has_empty_children() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let comment = create_test_comment().persisted(CommentId(3), ts);
        let node = comment.to_node();

        assert!(node.children().is_none());
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["message"], "First message");
        assert!(json["children"].is_null());
    }

    #[test]
    fn test_comment_serialization() {
        let comment = create_test_comment();
        let json = serde_json::to_string(&comment).unwrap();
        let comment2: Comment = serde_json::from_str(&json).unwrap();
        assert_eq!(comment.message(), comment2.message());
        assert_eq!(comment.post_id(), comment2.post_id());
    }
}
