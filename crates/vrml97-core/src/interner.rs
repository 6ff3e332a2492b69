//! Interning for node type names.
//!
//! Every node element stores a `Symbol` instead of its type name. Built-in
//! names are seeded from the node table up front and borrowed from it;
//! only PROTO and unknown names allocate.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::SpecTable;

/// Handle to an interned name. Comparing two symbols is an integer compare.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Symbol(u32);

#[derive(Debug, Clone, Default)]
pub struct Interner {
    index: HashMap<Cow<'static, str>, Symbol>,
    names: Vec<Cow<'static, str>>,
    /// Symbols below this are built-in node names.
    builtins: u32,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// An interner that already holds every node name of `table`,
    /// extension nodes included.
    pub fn with_builtins(table: &'static SpecTable) -> Self {
        let mut interner = Self::default();
        for spec in table.iter() {
            if !interner.index.contains_key(spec.name.as_str()) {
                interner.insert(Cow::Borrowed(spec.name.as_str()));
            }
        }
        interner.builtins = interner.names.len() as u32;
        interner
    }

    /// Intern a name, returning the existing symbol when already present.
    pub fn intern(&mut self, name: &str) -> Symbol {
        match self.index.get(name) {
            Some(&symbol) => symbol,
            None => self.insert(Cow::Owned(name.to_owned())),
        }
    }

    fn insert(&mut self, name: Cow<'static, str>) -> Symbol {
        let symbol = Symbol(self.names.len() as u32);
        self.names.push(name.clone());
        self.index.insert(name, symbol);
        symbol
    }

    /// Resolve a symbol back to its name.
    ///
    /// # Panics
    /// Panics if the symbol was not created by this interner.
    #[inline]
    pub fn resolve(&self, symbol: Symbol) -> &str {
        &self.names[symbol.0 as usize]
    }

    /// Whether `symbol` was seeded by [`with_builtins`](Self::with_builtins).
    #[inline]
    pub fn is_builtin(&self, symbol: Symbol) -> bool {
        symbol.0 < self.builtins
    }
}
