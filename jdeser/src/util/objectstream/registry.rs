/*!
 Class descriptors read from a stream, indexed by handle.
*/

use std::{collections::HashMap, sync::Arc};

use crate::util::objectstream::models::{ClassChain, ClassDescriptor, Handle};

/// Stores completed class descriptors so back-references can rebuild their inheritance chains
#[derive(Debug, Default)]
pub struct ClassRegistry {
    descriptors: HashMap<Handle, Arc<ClassDescriptor>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a descriptor once its superclass chain has been read
    pub fn register(&mut self, descriptor: ClassDescriptor) -> Arc<ClassDescriptor> {
        let descriptor = Arc::new(descriptor);
        self.descriptors
            .insert(descriptor.handle, Arc::clone(&descriptor));
        descriptor
    }

    pub fn get(&self, handle: Handle) -> Option<&Arc<ClassDescriptor>> {
        self.descriptors.get(&handle)
    }

    /// Rebuild the chain that starts at `handle`, most derived class first
    ///
    /// Returns `None` if `handle` or any superclass it names was never registered.
    pub fn chain_from(&self, handle: Handle) -> Option<ClassChain> {
        let mut chain = vec![];
        let mut next = Some(handle);
        while let Some(current) = next {
            // A superclass is registered before its subclass, so a chain can never revisit a class
            if chain.len() > self.descriptors.len() {
                return None;
            }
            let descriptor = self.get(current)?;
            next = descriptor.super_class;
            chain.push(Arc::clone(descriptor));
        }
        Some(ClassChain(chain))
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
