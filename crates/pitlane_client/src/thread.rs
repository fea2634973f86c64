use pitlane_types::{Comment, ListItem};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// One row of the rendered thread
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleComment<'a> {
    pub comment: &'a Comment,
    pub depth: usize,
    pub reply_count: usize,
    pub expanded: bool,
}

/// Reply tree of a post's comments with per-comment expand state.
///
/// Replies start collapsed. Comments whose parent is not in the thread, or
/// whose parent chain loops, are shown at the top level.
#[derive(Debug, Clone, Default)]
pub struct CommentThread {
    roots: Vec<String>,
    comments: HashMap<String, Comment>,
    children: HashMap<String, Vec<String>>,
    expanded: HashSet<String>,
}

/// Lifts nested `replies` into a flat list, filling in missing parent ids
fn flatten(comments: Vec<Comment>, out: &mut Vec<Comment>) {
    for mut comment in comments {
        let replies = std::mem::take(&mut comment.replies);
        let parent = comment.id.clone();
        out.push(comment);

        let replies = replies
            .into_iter()
            .map(|mut reply| {
                reply.parent_id.get_or_insert_with(|| parent.clone());
                reply
            })
            .collect();
        flatten(replies, out);
    }
}

impl CommentThread {
    /// Builds the tree from either a flat list with `parent_id` links or a
    /// list already nested through `replies`
    pub fn from_comments(comments: Vec<Comment>) -> Self {
        let mut flat = Vec::with_capacity(comments.len());
        flatten(comments, &mut flat);

        let mut thread = CommentThread::default();
        for comment in &flat {
            thread.comments.insert(comment.id.clone(), comment.clone());
        }

        let order: Vec<String> = flat.iter().map(|comment| comment.id.clone()).collect();
        for comment in flat {
            thread.link(&comment);
        }
        thread.break_cycles(&order);
        thread
    }

    /// Lifts comments whose parent chain loops back on itself to the top
    /// level, so every comment is reachable from a root
    fn break_cycles(&mut self, order: &[String]) {
        let mut reachable = HashSet::new();
        for root in self.roots.clone() {
            self.mark_reachable(root, &mut reachable);
        }

        for id in order {
            if reachable.contains(id) {
                continue;
            }
            debug!("Comment {} is part of a reply cycle", id);
            if let Some(parent) = self.comments.get(id).and_then(|c| c.parent_id.clone()) {
                if let Some(siblings) = self.children.get_mut(&parent) {
                    siblings.retain(|sibling| sibling != id);
                }
            }
            self.roots.push(id.clone());
            self.mark_reachable(id.clone(), &mut reachable);
        }
    }

    fn mark_reachable(&self, id: String, reachable: &mut HashSet<String>) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if !reachable.insert(next.clone()) {
                continue;
            }
            if let Some(replies) = self.children.get(&next) {
                stack.extend(replies.iter().cloned());
            }
        }
    }

    fn link(&mut self, comment: &Comment) {
        match comment.parent_id.as_deref() {
            Some(parent) if parent != comment.id && self.comments.contains_key(parent) => self
                .children
                .entry(parent.to_string())
                .or_default()
                .push(comment.id.clone()),
            _ => self.roots.push(comment.id.clone()),
        }
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Comment> {
        self.comments.get(id)
    }

    pub fn reply_count(&self, id: &str) -> usize {
        self.children.get(id).map(Vec::len).unwrap_or(0)
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// Shows or hides the replies of `id`; returns the new state
    pub fn toggle_replies(&mut self, id: &str) -> bool {
        if !self.comments.contains_key(id) {
            return false;
        }
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Rows in display order: each comment followed by its replies when
    /// expanded
    pub fn visible(&self) -> Vec<VisibleComment<'_>> {
        let mut rows = Vec::new();
        let mut seen = HashSet::new();
        let mut stack: Vec<(&String, usize)> = self.roots.iter().rev().map(|id| (id, 0)).collect();

        while let Some((id, depth)) = stack.pop() {
            let Some(comment) = self.comments.get(id) else {
                continue;
            };
            if !seen.insert(id) {
                continue;
            }

            let expanded = self.is_expanded(id);
            let replies = self.children.get(id);
            rows.push(VisibleComment {
                comment,
                depth,
                reply_count: replies.map(Vec::len).unwrap_or(0),
                expanded,
            });

            if expanded {
                if let Some(replies) = replies {
                    stack.extend(replies.iter().rev().map(|reply| (reply, depth + 1)));
                }
            }
        }
        rows
    }

    /// Adds a freshly posted comment. A reply expands its parent so the new
    /// comment is on screen.
    pub fn insert(&mut self, mut comment: Comment) {
        if self.comments.contains_key(comment.id()) {
            debug!("Comment {} already in thread", comment.id);
            return;
        }

        let replies = std::mem::take(&mut comment.replies);
        self.comments.insert(comment.id.clone(), comment.clone());
        self.link(&comment);

        if let Some(parent) = comment.parent_id.as_deref() {
            if self.comments.contains_key(parent) && parent != comment.id {
                self.expanded.insert(parent.to_string());
            }
        }

        for mut reply in replies {
            reply.parent_id.get_or_insert_with(|| comment.id.clone());
            self.insert(reply);
        }
    }

    /// Removes a comment together with its replies; returns how many were
    /// removed
    pub fn remove(&mut self, id: &str) -> usize {
        let Some(comment) = self.comments.get(id) else {
            return 0;
        };

        match comment.parent_id.as_deref().and_then(|p| self.children.get_mut(p)) {
            Some(siblings) if siblings.iter().any(|s| s == id) => siblings.retain(|s| s != id),
            _ => self.roots.retain(|r| r != id),
        }

        let mut removed = 0;
        let mut pending = vec![id.to_string()];
        while let Some(next) = pending.pop() {
            if self.comments.remove(&next).is_some() {
                removed += 1;
            }
            self.expanded.remove(&next);
            if let Some(replies) = self.children.remove(&next) {
                pending.extend(replies);
            }
        }
        removed
    }
}
