//! Creation-order record used to release resources in reverse.

/// Identity of one created resource.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ResourceId {
    Mesh(usize),
    Sampler(usize),
    Texture(usize),
    Buffer(usize),
    Program(usize),
    BindingSet(usize),
}

#[derive(Debug, Default)]
pub struct CreationLedger {
    order: Vec<ResourceId>,
}

impl CreationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: ResourceId) {
        self.order.push(id);
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Empties the ledger, newest first.
    pub fn drain_reverse(&mut self) -> impl Iterator<Item = ResourceId> + '_ {
        self.order.drain(..).rev()
    }
}
