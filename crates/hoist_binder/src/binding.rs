//! Bindings and binding tables.

use crate::error::ScopeError;
use hoist_ast::node::Identifier;
use hoist_core::intern::InternedString;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

/// A name as the scope chain sees it: the interned key, plus the text used
/// in error messages.
#[derive(Debug, Clone, Copy)]
pub struct Name<'n> {
    pub key: InternedString,
    pub text: &'n str,
}

impl<'n> Name<'n> {
    pub fn new(key: InternedString, text: &'n str) -> Self {
        Self { key, text }
    }
}

impl<'n> From<&'n Identifier> for Name<'n> {
    fn from(id: &'n Identifier) -> Self {
        Self {
            key: id.text,
            text: &id.text_name,
        }
    }
}

/// How a binding was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    /// `var`, parameters and function-level function declarations.
    Rebindable,
    /// `let`, catch parameters and block-level function declarations.
    BlockMutable,
    /// `const`.
    BlockImmutable,
}

impl DeclarationKind {
    pub fn is_block_scoped(self) -> bool {
        !matches!(self, DeclarationKind::Rebindable)
    }

    /// Two declarations of one name may share a table only if both are
    /// rebindable.
    pub fn may_coexist(self, other: DeclarationKind) -> bool {
        self == DeclarationKind::Rebindable && other == DeclarationKind::Rebindable
    }
}

/// Lifecycle of a binding. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
}

#[derive(Debug, Clone)]
pub struct Binding<V> {
    pub name: InternedString,
    pub name_text: String,
    pub kind: DeclarationKind,
    pub state: LifecycleState,
    value: V,
}

impl<V: Clone> Binding<V> {
    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn is_initialized(&self) -> bool {
        self.state == LifecycleState::Initialized
    }
}

/// The bindings of one scope, in declaration order.
#[derive(Debug, Clone)]
pub struct BindingTable<V> {
    bindings: IndexMap<InternedString, Binding<V>, FxBuildHasher>,
}

impl<V> Default for BindingTable<V> {
    fn default() -> Self {
        Self {
            bindings: IndexMap::default(),
        }
    }
}

impl<V: Clone + Default> BindingTable<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an uninitialized binding. Redeclaring a name is accepted when
    /// both declarations are rebindable, in which case the existing binding
    /// and its value are kept. Returns whether a new binding was created.
    pub fn declare(&mut self, name: Name<'_>, kind: DeclarationKind) -> Result<bool, ScopeError> {
        if let Some(existing) = self.bindings.get(&name.key) {
            if existing.kind.may_coexist(kind) {
                return Ok(false);
            }
            return Err(ScopeError::DuplicateDeclaration(name.text.to_string()));
        }
        self.bindings.insert(
            name.key,
            Binding {
                name: name.key,
                name_text: name.text.to_string(),
                kind,
                state: LifecycleState::Uninitialized,
                value: V::default(),
            },
        );
        Ok(true)
    }

    /// Run a declaration's initializer. A `const` binding accepts exactly one.
    pub fn initialize(&mut self, name: Name<'_>, value: V) -> Result<(), ScopeError> {
        let binding = self
            .bindings
            .get_mut(&name.key)
            .ok_or_else(|| ScopeError::UnresolvedIdentifier(name.text.to_string()))?;
        if binding.kind == DeclarationKind::BlockImmutable && binding.is_initialized() {
            return Err(ScopeError::AlreadyInitialized(name.text.to_string()));
        }
        binding.value = value;
        binding.state = LifecycleState::Initialized;
        Ok(())
    }

    /// Write through an assignment expression.
    pub fn assign(&mut self, name: Name<'_>, value: V) -> Result<(), ScopeError> {
        let binding = self
            .bindings
            .get_mut(&name.key)
            .ok_or_else(|| ScopeError::UnresolvedIdentifier(name.text.to_string()))?;
        if !binding.is_initialized() {
            return Err(ScopeError::UninitializedAccess(name.text.to_string()));
        }
        if binding.kind == DeclarationKind::BlockImmutable {
            return Err(ScopeError::AlreadyInitialized(name.text.to_string()));
        }
        binding.value = value;
        Ok(())
    }

    /// Read a binding's value.
    pub fn get(&self, name: Name<'_>) -> Result<V, ScopeError> {
        let binding = self
            .bindings
            .get(&name.key)
            .ok_or_else(|| ScopeError::UnresolvedIdentifier(name.text.to_string()))?;
        if !binding.is_initialized() {
            return Err(ScopeError::UninitializedAccess(name.text.to_string()));
        }
        Ok(binding.value.clone())
    }

    pub fn lookup(&self, key: InternedString) -> Option<&Binding<V>> {
        self.bindings.get(&key)
    }

    pub fn contains(&self, key: InternedString) -> bool {
        self.bindings.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding<V>> {
        self.bindings.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoist_core::intern::StringInterner;

    fn name<'n>(interner: &StringInterner, text: &'n str) -> Name<'n> {
        Name::new(interner.intern(text), text)
    }

    #[test]
    fn test_declare_then_initialize() {
        let interner = StringInterner::new();
        let mut table: BindingTable<i32> = BindingTable::new();
        let x = name(&interner, "x");
        assert_eq!(table.declare(x, DeclarationKind::BlockMutable), Ok(true));
        assert_eq!(table.get(x), Err(ScopeError::UninitializedAccess("x".into())));
        table.initialize(x, 5).unwrap();
        assert_eq!(table.get(x), Ok(5));
        table.assign(x, 6).unwrap();
        assert_eq!(table.get(x), Ok(6));
    }

    #[test]
    fn test_rebindable_redeclaration_keeps_value() {
        let interner = StringInterner::new();
        let mut table: BindingTable<i32> = BindingTable::new();
        let v = name(&interner, "v");
        table.declare(v, DeclarationKind::Rebindable).unwrap();
        table.initialize(v, 1).unwrap();
        assert_eq!(table.declare(v, DeclarationKind::Rebindable), Ok(false));
        assert_eq!(table.get(v), Ok(1));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_block_scoped_redeclaration_fails() {
        let interner = StringInterner::new();
        let mut table: BindingTable<i32> = BindingTable::new();
        let a = name(&interner, "a");
        table.declare(a, DeclarationKind::BlockMutable).unwrap();
        assert_eq!(
            table.declare(a, DeclarationKind::Rebindable),
            Err(ScopeError::DuplicateDeclaration("a".into()))
        );
        let b = name(&interner, "b");
        table.declare(b, DeclarationKind::Rebindable).unwrap();
        assert_eq!(
            table.declare(b, DeclarationKind::BlockImmutable),
            Err(ScopeError::DuplicateDeclaration("b".into()))
        );
    }

    #[test]
    fn test_const_rejects_second_write() {
        let interner = StringInterner::new();
        let mut table: BindingTable<i32> = BindingTable::new();
        let c = name(&interner, "c");
        table.declare(c, DeclarationKind::BlockImmutable).unwrap();
        table.initialize(c, 1).unwrap();
        assert_eq!(table.initialize(c, 2), Err(ScopeError::AlreadyInitialized("c".into())));
        assert_eq!(table.assign(c, 2), Err(ScopeError::AlreadyInitialized("c".into())));
        assert_eq!(table.get(c), Ok(1));
    }

    #[test]
    fn test_absent_name() {
        let interner = StringInterner::new();
        let table: BindingTable<i32> = BindingTable::new();
        let y = name(&interner, "y");
        assert_eq!(table.get(y), Err(ScopeError::UnresolvedIdentifier("y".into())));
        assert!(!table.contains(y.key));
        assert!(table.is_empty());
    }

    #[test]
    fn test_iteration_follows_declaration_order() {
        let interner = StringInterner::new();
        let mut table: BindingTable<i32> = BindingTable::new();
        for text in ["c", "a", "b"] {
            table.declare(name(&interner, text), DeclarationKind::Rebindable).unwrap();
        }
        let order: Vec<&str> = table.iter().map(|b| b.name_text.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }
}
