use std::{collections::HashMap, fmt, num::NonZeroU32, rc::Rc};

/// A handle to an interned identifier. To retrieve the name, use
/// [`Interner::get`].
///
/// Handles are only meaningful for the interner which produced them.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interned(NonZeroU32);

impl fmt::Debug for Interned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Interned({})", self.0)
    }
}

/// Deduplicates identifier names so the rest of the pipeline can compare and
/// hash them as integers.
#[derive(Default)]
pub struct Interner {
    map: HashMap<Rc<str>, Interned>,
    names: Vec<Rc<str>>,
}

impl fmt::Debug for Interner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (i, name) in self.names.iter().enumerate() {
            map.entry(&(i + 1), name);
        }
        map.finish()
    }
}

impl Interner {
    pub fn with_capacity(capacity: usize) -> Interner {
        Interner {
            map: HashMap::with_capacity(capacity),
            names: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Interns the provided name, returning a handle which can be used to
    /// retrieve it later. Interning the same name twice yields the same
    /// handle.
    pub fn intern(&mut self, name: &str) -> Interned {
        if let Some(&handle) = self.map.get(name) {
            return handle;
        }
        let next = u32::try_from(self.names.len() + 1).expect("interned out of capacity");
        let handle = Interned(NonZeroU32::new(next).expect("never zero due to the +1"));
        let key: Rc<str> = Rc::from(name);
        self.names.push(Rc::clone(&key));
        self.map.insert(key, handle);
        handle
    }

    /// Returns the name of the provided handle.
    ///
    /// Panics if the handle was not produced by this interner.
    pub fn get(&self, handle: impl Into<Interned>) -> &str {
        let Interned(index) = handle.into();
        &self.names[index.get() as usize - 1]
    }
}
