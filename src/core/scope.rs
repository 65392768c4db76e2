//! Open-element scope frames
//!
//! Each opening tag gets a frame with a unique [`ScopeId`]. Close tags are
//! paired with frames by handle, never by tag text, so `<a><a></a></a>` and
//! mislabelled closes resolve purely by nesting. Handles come from a counter
//! and frames live on a stack, so memory stays proportional to depth.

/// Stable identity of one open element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

/// Record pushed for every element the tokenizer opens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeFrame<'a> {
    pub id: ScopeId,
    pub tag_name: &'a str,
}

/// Stack of currently open scope frames
#[derive(Debug, Default)]
pub struct ScopeStack<'a> {
    frames: Vec<ScopeFrame<'a>>,
    next_id: u32,
}

impl<'a> ScopeStack<'a> {
    pub fn new() -> Self {
        ScopeStack {
            frames: Vec::with_capacity(32),
            next_id: 0,
        }
    }

    /// Open a frame for `tag_name` and return its handle
    pub fn push(&mut self, tag_name: &'a str) -> ScopeId {
        let id = ScopeId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.frames.push(ScopeFrame { id, tag_name });
        id
    }

    /// Close the innermost frame
    pub fn pop(&mut self) -> Option<ScopeFrame<'a>> {
        self.frames.pop()
    }

    /// Innermost open frame
    pub fn current(&self) -> Option<&ScopeFrame<'a>> {
        self.frames.last()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
