//! Arena allocation for parsed scripts.
//!
//! Every AST node of a script is bump-allocated. Closures created while the
//! script runs borrow their parameter lists and bodies straight out of this
//! arena, so the arena must outlive the evaluation that uses it.

use bumpalo::Bump;

/// Owns the bump allocator backing one or more parsed scripts.
pub struct ScriptArena {
    bump: Bump,
}

impl ScriptArena {
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    /// Create an arena with the given initial capacity in bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bump: Bump::with_capacity(capacity),
        }
    }

    /// The underlying allocator, handed to the parser.
    #[inline]
    pub fn bump(&self) -> &Bump {
        &self.bump
    }

    #[inline]
    pub fn alloc<T>(&self, val: T) -> &T {
        self.bump.alloc(val)
    }

    #[inline]
    pub fn alloc_str(&self, s: &str) -> &str {
        self.bump.alloc_str(s)
    }

    /// Total bytes handed out so far.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }

    /// Drop every allocation but keep the memory for reuse.
    ///
    /// Requires `&mut self`, so nothing parsed from this arena can still be
    /// alive.
    pub fn reset(&mut self) {
        self.bump.reset();
    }
}

impl Default for ScriptArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_and_reset() {
        let mut arena = ScriptArena::with_capacity(64);
        let n = arena.alloc(41u32);
        assert_eq!(*n + 1, 42);
        assert_eq!(arena.alloc_str("count"), "count");
        assert!(arena.allocated_bytes() > 0);
        arena.reset();
    }
}
