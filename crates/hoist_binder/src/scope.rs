//! Scopes and the scope chain.

use crate::binding::{BindingTable, DeclarationKind, Name};
use crate::error::ScopeError;
use crate::hoist::HoistedDeclarations;
use hoist_ast::node::FunctionDeclaration;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// Shared handle to a scope. Closures hold one to keep their defining chain
/// alive after the chain has moved on.
pub type ScopeRef<V> = Rc<RefCell<Scope<V>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Builtins such as `console` and `undefined`. Parent of the global scope,
    /// so script declarations may shadow them.
    Realm,
    Global,
    Function,
    Block,
    /// The scope of a `catch (e) { ... }` clause and its body.
    Catch,
}

impl ScopeKind {
    /// Whether `var` declarations attach here.
    pub fn is_var_target(self) -> bool {
        matches!(self, ScopeKind::Global | ScopeKind::Function)
    }
}

#[derive(Debug)]
pub struct Scope<V> {
    pub kind: ScopeKind,
    pub table: BindingTable<V>,
    pub parent: Option<ScopeRef<V>>,
    depth: u32,
}

impl<V: Clone + Default> Scope<V> {
    pub fn new(kind: ScopeKind, parent: Option<ScopeRef<V>>) -> Self {
        let depth = parent.as_ref().map_or(0, |p| p.borrow().depth + 1);
        Self {
            kind,
            table: BindingTable::new(),
            parent,
            depth,
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }
}

/// The chain of scopes visible from the code being evaluated.
///
/// `current` is the innermost scope. Entering a block pushes a child of
/// `current`; calling a function swaps `current` for a child of the callee's
/// captured scope and hands back the caller's scope for `restore`.
pub struct ScopeChain<V> {
    realm: ScopeRef<V>,
    global: ScopeRef<V>,
    current: ScopeRef<V>,
}

impl<V: Clone + Default> Default for ScopeChain<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Default> ScopeChain<V> {
    pub fn new() -> Self {
        let realm = Rc::new(RefCell::new(Scope::new(ScopeKind::Realm, None)));
        let global = Rc::new(RefCell::new(Scope::new(ScopeKind::Global, Some(realm.clone()))));
        Self {
            realm,
            current: global.clone(),
            global,
        }
    }

    pub fn current(&self) -> ScopeRef<V> {
        self.current.clone()
    }

    pub fn global(&self) -> ScopeRef<V> {
        self.global.clone()
    }

    pub fn current_kind(&self) -> ScopeKind {
        self.current.borrow().kind
    }

    pub fn depth(&self) -> u32 {
        self.current.borrow().depth
    }

    /// Bind a builtin in the realm scope, already initialized.
    pub fn declare_builtin(&self, name: Name<'_>, kind: DeclarationKind, value: V) -> Result<(), ScopeError> {
        let mut realm = self.realm.borrow_mut();
        realm.table.declare(name, kind)?;
        realm.table.initialize(name, value)
    }

    /// The innermost scope that binds `name`.
    pub fn resolve(&self, name: Name<'_>) -> Result<ScopeRef<V>, ScopeError> {
        trace!(name = name.text, "resolve");
        let mut scope = self.current.clone();
        loop {
            if scope.borrow().table.contains(name.key) {
                return Ok(scope);
            }
            let parent = scope.borrow().parent.clone();
            match parent {
                Some(parent) => scope = parent,
                None => return Err(ScopeError::UnresolvedIdentifier(name.text.to_string())),
            }
        }
    }

    /// Read the value `name` resolves to.
    pub fn lookup(&self, name: Name<'_>) -> Result<V, ScopeError> {
        let scope = self.resolve(name)?;
        let value = scope.borrow().table.get(name);
        value
    }

    pub fn assign(&self, name: Name<'_>, value: V) -> Result<(), ScopeError> {
        let scope = self.resolve(name)?;
        let result = scope.borrow_mut().table.assign(name, value);
        result
    }

    /// Run a declaration's initializer against the innermost binding of
    /// `name`, which hoisting has already created.
    pub fn initialize(&self, name: Name<'_>, value: V) -> Result<(), ScopeError> {
        let scope = self.resolve(name)?;
        let result = scope.borrow_mut().table.initialize(name, value);
        result
    }

    /// Declare `name`. Rebindable declarations go to the nearest function or
    /// global scope and start out initialized to the default value; the
    /// block-scoped kinds go to the current scope, uninitialized.
    pub fn declare(&self, name: Name<'_>, kind: DeclarationKind) -> Result<(), ScopeError> {
        if kind.is_block_scoped() {
            self.current.borrow_mut().table.declare(name, kind)?;
            return Ok(());
        }
        let target = self.var_scope();
        let mut target = target.borrow_mut();
        if target.table.declare(name, kind)? {
            target.table.initialize(name, V::default())?;
        }
        Ok(())
    }

    /// Create or overwrite a rebindable global, as an assignment to an
    /// undeclared name does outside strict mode.
    pub fn declare_global(&self, name: Name<'_>, value: V) -> Result<(), ScopeError> {
        let mut global = self.global.borrow_mut();
        global.table.declare(name, DeclarationKind::Rebindable)?;
        global.table.initialize(name, value)
    }

    fn var_scope(&self) -> ScopeRef<V> {
        let mut scope = self.current.clone();
        loop {
            if scope.borrow().kind.is_var_target() {
                return scope;
            }
            let parent = scope.borrow().parent.clone();
            match parent {
                Some(parent) => scope = parent,
                None => return self.global.clone(),
            }
        }
    }

    pub fn enter_block(&mut self) {
        self.enter_scope(ScopeKind::Block);
    }

    pub fn enter_scope(&mut self, kind: ScopeKind) {
        let scope = Scope::new(kind, Some(self.current.clone()));
        debug!(kind = ?kind, depth = scope.depth, "enter scope");
        self.current = Rc::new(RefCell::new(scope));
    }

    /// Pop the current block scope. Its bindings stay alive for as long as a
    /// closure still holds the scope.
    pub fn exit_block(&mut self) {
        let parent = {
            let current = self.current.borrow();
            debug!(kind = ?current.kind, depth = current.depth, "exit scope");
            if matches!(current.kind, ScopeKind::Global | ScopeKind::Realm) {
                warn!("attempted to pop the global scope");
                return;
            }
            current.parent.clone()
        };
        if let Some(parent) = parent {
            self.current = parent;
        }
    }

    /// Push a function scope parented to `captured`, seeded with initialized
    /// parameter bindings. Returns the caller's scope, to be handed back to
    /// `restore` once the call completes.
    pub fn enter_function<'n>(
        &mut self,
        captured: ScopeRef<V>,
        parameters: impl IntoIterator<Item = (Name<'n>, V)>,
    ) -> Result<ScopeRef<V>, ScopeError> {
        let mut scope = Scope::new(ScopeKind::Function, Some(captured));
        for (name, value) in parameters {
            scope.table.declare(name, DeclarationKind::Rebindable)?;
            scope.table.initialize(name, value)?;
        }
        debug!(depth = scope.depth, params = scope.table.len(), "enter function scope");
        Ok(std::mem::replace(&mut self.current, Rc::new(RefCell::new(scope))))
    }

    /// Make `saved` the current scope again.
    pub fn restore(&mut self, saved: ScopeRef<V>) {
        self.current = saved;
    }

    /// Replace the current scope with a sibling holding a copy of its
    /// bindings. Closures created in the previous iteration keep the old one.
    pub fn fork_iteration(&mut self) {
        let fresh = {
            let current = self.current.borrow();
            Scope {
                kind: current.kind,
                table: current.table.clone(),
                parent: current.parent.clone(),
                depth: current.depth,
            }
        };
        debug!(bindings = fresh.table.len(), "fork iteration scope");
        self.current = Rc::new(RefCell::new(fresh));
    }

    /// Install a pre-scanned statement list's declarations in the current
    /// scope. Function declarations are bound to the closures `make_function`
    /// builds, so they are callable before their textual position.
    pub fn hoist<'a, F>(&self, hoisted: &HoistedDeclarations<'a>, mut make_function: F) -> Result<(), ScopeError>
    where
        F: FnMut(&'a FunctionDeclaration<'a>, ScopeRef<V>) -> V,
    {
        let scope = self.current.clone();
        let kind = scope.borrow().kind;

        if kind.is_var_target() {
            for id in hoisted.var_names.iter() {
                self.declare(Name::from(*id), DeclarationKind::Rebindable)?;
            }
        }

        let function_kind = if kind.is_var_target() {
            DeclarationKind::Rebindable
        } else {
            DeclarationKind::BlockMutable
        };
        for &decl in hoisted.functions.iter() {
            let name = Name::from(&decl.name);
            scope.borrow_mut().table.declare(name, function_kind)?;
            let closure = make_function(decl, scope.clone());
            scope.borrow_mut().table.initialize(name, closure)?;
        }

        for lexical in hoisted.lexical.iter() {
            scope.borrow_mut().table.declare(Name::from(lexical.name), lexical.kind)?;
        }

        // A `var` inside a block may not pass over a lexical declaration of
        // the same name in that block.
        if !kind.is_var_target() {
            for id in hoisted.var_names.iter() {
                if hoisted.declares_lexically(id.text) {
                    return Err(ScopeError::DuplicateDeclaration(id.text_name.clone()));
                }
            }
        }

        debug!(
            kind = ?kind,
            vars = hoisted.var_names.len(),
            functions = hoisted.functions.len(),
            lexical = hoisted.lexical.len(),
            "hoisted declarations"
        );
        Ok(())
    }
}
