//! Arena-backed doubly linked list addressed by generational handles.
//!
//! Nodes live in a `Vec` of slots and link to each other by slot index, so the
//! list never holds a pointer into itself. A [`Handle`] pairs a slot index with
//! the slot's generation at allocation time; freeing a node bumps the
//! generation, which turns every outstanding handle to it into an
//! [`ListError::InvalidHandle`] instead of an alias for whatever is stored in
//! the slot next. Handles also carry the issuing list's id, so one list never
//! accepts another's handles.
//!
//! The front of the list is the most recently used end and the back is the
//! eviction end. Every structural operation below runs off the node's own
//! `prev`/`next` links and never walks the chain.

use crate::error::ListError;
use alloc::vec::Vec;
use core::fmt;
use core::iter::FusedIterator;
use core::sync::atomic::{AtomicU32, Ordering};

/// Source of per-list ids, so a handle from one list never resolves in another.
/// Ids wrap after 2^32 lists have been created.
static NEXT_LIST_ID: AtomicU32 = AtomicU32::new(0);

/// Opaque reference to a node in a [`List`].
///
/// Handles are cheap to copy and stay valid until the node they name is
/// removed, popped, or the list is cleared. A handle carries the id of the
/// list that issued it and is rejected by every other list.
///
/// Generations are 64-bit, so a stale handle could only alias a live node
/// after 2^64 reuses of its slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    list_id: u32,
    index: usize,
    generation: u64,
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}:{}v{})", self.list_id, self.index, self.generation)
    }
}

/// A live node: the payload plus its links.
///
/// `prev` points toward the front (more recent), `next` toward the back
/// (next to evict).
struct Node<T> {
    val: T,
    prev: Option<usize>,
    next: Option<usize>,
}

struct Slot<T> {
    generation: u64,
    node: Option<Node<T>>,
}

/// A doubly linked list with O(1) splice operations driven by [`Handle`]s.
pub struct List<T> {
    id: u32,
    slots: Vec<Slot<T>>,
    /// Indices of vacant slots, reused before the arena grows.
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> List<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with room for `capacity` nodes before the arena
    /// has to reallocate.
    pub fn with_capacity(capacity: usize) -> Self {
        List {
            id: NEXT_LIST_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Returns the number of live nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list holds no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Links `val` in as the new front node and returns its handle.
    pub fn push_front(&mut self, val: T) -> Handle {
        let node = Node {
            val,
            prev: None,
            next: self.head,
        };

        let (index, generation) = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                debug_assert!(slot.node.is_none(), "free list names an occupied slot");
                slot.node = Some(node);
                (index, slot.generation)
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                (self.slots.len() - 1, 0)
            }
        };

        match self.head {
            Some(old_head) => self.node_mut(old_head).prev = Some(index),
            None => self.tail = Some(index),
        }
        self.head = Some(index);
        self.len += 1;

        Handle {
            list_id: self.id,
            index,
            generation,
        }
    }

    /// Moves the node behind `handle` to the front.
    ///
    /// Calling this on the current front node leaves the list unchanged.
    pub fn move_to_front(&mut self, handle: Handle) -> Result<(), ListError> {
        let index = self.resolve(handle)?;
        if self.head == Some(index) {
            return Ok(());
        }

        self.unlink(index);

        let old_head = self.head;
        {
            let node = self.node_mut(index);
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(h) => self.node_mut(h).prev = Some(index),
            None => self.tail = Some(index),
        }
        self.head = Some(index);
        Ok(())
    }

    /// Removes the back node and returns its payload.
    pub fn pop_back(&mut self) -> Result<T, ListError> {
        let tail = self.tail.ok_or(ListError::EmptyCollection)?;
        Ok(self.release(tail))
    }

    /// Removes the node behind `handle` from wherever it sits and returns its
    /// payload.
    pub fn remove(&mut self, handle: Handle) -> Result<T, ListError> {
        let index = self.resolve(handle)?;
        Ok(self.release(index))
    }

    /// Returns the back payload, the next one [`pop_back`](Self::pop_back)
    /// would return.
    pub fn peek_back(&self) -> Result<&T, ListError> {
        let tail = self.tail.ok_or(ListError::EmptyCollection)?;
        Ok(&self.node(tail).val)
    }

    /// Returns the front payload.
    pub fn peek_front(&self) -> Result<&T, ListError> {
        let head = self.head.ok_or(ListError::EmptyCollection)?;
        Ok(&self.node(head).val)
    }

    /// Returns the payload behind `handle` without moving it.
    pub fn get(&self, handle: Handle) -> Result<&T, ListError> {
        let index = self.resolve(handle)?;
        Ok(&self.node(index).val)
    }

    /// Returns the payload behind `handle` mutably without moving it.
    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut T, ListError> {
        let index = self.resolve(handle)?;
        Ok(&mut self.node_mut(index).val)
    }

    /// Drops every node. All handles issued so far become invalid.
    pub fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(index);
        }
        // Hand out low indices first after a clear.
        self.free.reverse();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Iterates payloads from front to back. Reverse it to walk back to front.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    fn resolve(&self, handle: Handle) -> Result<usize, ListError> {
        match self.slots.get(handle.index) {
            Some(slot)
                if handle.list_id == self.id
                    && slot.generation == handle.generation
                    && slot.node.is_some() =>
            {
                Ok(handle.index)
            }
            _ => Err(ListError::InvalidHandle),
        }
    }

    /// Detaches a live node from its neighbours and fixes up head/tail. The
    /// node's own links are left stale; callers overwrite or discard them.
    fn unlink(&mut self, index: usize) {
        let (prev, next) = {
            let node = self.node(index);
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }
    }

    /// Unlinks a live node, vacates its slot and returns the payload.
    fn release(&mut self, index: usize) -> T {
        self.unlink(index);
        let slot = &mut self.slots[index];
        let node = match slot.node.take() {
            Some(node) => node,
            None => unreachable!("release called on vacant slot {index}"),
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.len -= 1;
        node.val
    }

    // Internal accessors for indices already known to be live. Reaching a
    // vacant slot through one of these means the links are corrupt.

    fn node(&self, index: usize) -> &Node<T> {
        match self.slots[index].node.as_ref() {
            Some(node) => node,
            None => unreachable!("link points at vacant slot {index}"),
        }
    }

    fn node_mut(&mut self, index: usize) -> &mut Node<T> {
        match self.slots[index].node.as_mut() {
            Some(node) => node,
            None => unreachable!("link points at vacant slot {index}"),
        }
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("length", &self.len)
            .field("slots", &self.slots.len())
            .field("free", &self.free.len())
            .finish()
    }
}

/// Borrowing iterator over a [`List`], front to back.
pub struct Iter<'a, T> {
    list: &'a List<T>,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.front?;
        let node = self.list.node(index);
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.val)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.back?;
        let node = self.list.node(index);
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.val)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.remaining)
            .finish()
    }
}
