use std::collections::HashMap;

use crate::{types::Type, util::intern::Interned, wasm::instr::LocalSlot};

/// A variable bound to a local slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Local {
    pub slot: LocalSlot,
    pub ty: Type,
}

/// Lexical scopes of the function being generated.
///
/// Slots are allocated from a single counter and never reused, even after
/// the scope that declared them is popped, so every declaration owns a
/// distinct local.
#[derive(Debug)]
pub struct ScopeStack {
    frames: Vec<HashMap<Interned, Local>>,
    slots: Vec<Type>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    /// Returns a stack with the global scope already pushed.
    pub fn new() -> ScopeStack {
        ScopeStack {
            frames: vec![HashMap::new()],
            slots: Vec::new(),
        }
    }

    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        assert!(self.frames.len() > 1, "can't pop the global scope");
        self.frames.pop();
    }

    /// Binds `name` in the innermost scope to a fresh slot. A previous binding
    /// of the same name in that scope becomes unreachable.
    pub fn declare(&mut self, name: Interned, ty: Type) -> Local {
        let slot = LocalSlot(u32::try_from(self.slots.len()).expect("too many locals"));
        self.slots.push(ty);
        let local = Local { slot, ty };
        self.frames
            .last_mut()
            .expect("the global scope is never popped")
            .insert(name, local);
        local
    }

    /// Finds the binding of `name`, searching from the innermost scope out.
    pub fn lookup(&self, name: Interned) -> Option<Local> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(&name))
            .copied()
    }

    /// The type of every slot allocated so far, indexed by slot.
    pub fn slot_types(&self) -> &[Type] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::intern::Interner;

    #[test]
    fn test_lookup_prefers_innermost() {
        let mut idents = Interner::default();
        let x = idents.intern("x");
        let mut scopes = ScopeStack::new();

        let outer = scopes.declare(x, Type::Int);
        scopes.push();
        assert_eq!(scopes.lookup(x), Some(outer));
        let inner = scopes.declare(x, Type::Float);
        assert_eq!(scopes.lookup(x), Some(inner));
        scopes.pop();
        assert_eq!(scopes.lookup(x), Some(outer));
    }

    #[test]
    fn test_slots_are_never_reused() {
        let mut idents = Interner::default();
        let x = idents.intern("x");
        let y = idents.intern("y");
        let mut scopes = ScopeStack::new();

        scopes.push();
        let a = scopes.declare(x, Type::Float);
        scopes.pop();
        scopes.push();
        let b = scopes.declare(y, Type::Int);
        scopes.pop();
        let c = scopes.declare(x, Type::Int);
        let d = scopes.declare(x, Type::Float);

        assert_eq!(a.slot, LocalSlot(0));
        assert_eq!(b.slot, LocalSlot(1));
        assert_eq!(c.slot, LocalSlot(2));
        assert_eq!(d.slot, LocalSlot(3));
        assert_eq!(scopes.lookup(x), Some(d));
        assert_eq!(scopes.lookup(y), None);
        assert_eq!(
            scopes.slot_types(),
            [Type::Float, Type::Int, Type::Int, Type::Float]
        );
    }
}
