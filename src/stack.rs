use std::fmt;

use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    #[error("Stack is empty")]
    Empty,
}

type Link<T> = Option<Box<Node<T>>>;

struct Node<T> {
    value: T,
    next: Link<T>,
}

impl<T> Node<T> {
    fn new(value: T) -> Self {
        Node { value, next: None }
    }
}

/// A LIFO stack built from a chain of singly-linked, heap-allocated nodes.
///
/// `top` is `None` exactly when the stack holds no elements. Following the
/// `next` links from `top` visits the values from most to least recently
/// pushed.
pub struct Stack<T> {
    top: Link<T>,
    len: usize,
}

impl<T> Stack<T> {
    /// Creates a new, empty stack.
    pub fn new() -> Self {
        Stack { top: None, len: 0 }
    }

    /// Returns `true` if the stack holds no elements.
    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    /// Returns the number of elements in the stack.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Places `value` on top of the stack.
    pub fn push(&mut self, value: T) {
        let mut node = Box::new(Node::new(value));
        node.next = self.top.take();
        self.top = Some(node);
        self.len += 1;
        trace!("push, len is now {}", self.len);
    }

    /// Removes the top element and returns it.
    ///
    /// Fails with [`StackError::Empty`] when there is nothing to remove.
    pub fn pop(&mut self) -> Result<T, StackError> {
        let node = self.top.take().ok_or(StackError::Empty)?;
        let Node { value, next } = *node;
        self.top = next;
        self.len -= 1;
        trace!("pop, len is now {}", self.len);
        Ok(value)
    }

    /// Returns a reference to the top element without removing it.
    pub fn peek(&self) -> Result<&T, StackError> {
        self.top
            .as_deref()
            .map(|node| &node.value)
            .ok_or(StackError::Empty)
    }

    // Top to bottom.
    fn values(&self) -> impl Iterator<Item = &T> {
        std::iter::successors(self.top.as_deref(), |node| node.next.as_deref())
            .map(|node| &node.value)
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Stack<T> {
    // The default drop would recurse once per node.
    fn drop(&mut self) {
        let mut link = self.top.take();
        while let Some(mut node) = link {
            link = node.next.take();
        }
    }
}

/// Renders the stack as `Top -> v1 -> ... -> vn -> null`, most recent first.
impl<T: fmt::Display> fmt::Display for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Top -> ")?;
        for value in self.values() {
            write!(f, "{} -> ", value)?;
        }
        write!(f, "null")
    }
}

impl<T: fmt::Debug> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values()).finish()
    }
}
