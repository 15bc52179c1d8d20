use std::collections::VecDeque;

use barrage_protocol::Comment;

/// FIFO of comments waiting for a free lane.
///
/// Claiming is a single `pop_front`, so a comment leaves the queue in the same
/// step that hands it to exactly one lane.
#[derive(Debug, Clone, Default)]
pub struct CommentQueue {
    items: VecDeque<Comment>,
}

impl CommentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append comments preserving their order.
    pub fn push_all<I>(&mut self, comments: I)
    where
        I: IntoIterator,
        I::Item: Into<Comment>,
    {
        self.items.extend(comments.into_iter().map(Into::into));
    }

    /// Remove and return the head.
    pub fn claim(&mut self) -> Option<Comment> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Comment> {
        self.items.iter()
    }
}
