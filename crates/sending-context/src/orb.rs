//! In-process object registry used to resolve stringified references.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use orb_cdr::Ior;

use crate::delegate::{Delegate, ObjectResolver};
use crate::error::{CodeBaseError, Result};
use crate::stub::CodeBaseStub;

/// Maps canonical `IOR:` strings to the delegates that serve them.
#[derive(Default)]
pub struct LocalOrb {
    objects: RwLock<HashMap<String, Arc<dyn Delegate>>>,
}

impl LocalOrb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `delegate` under its object reference and return the
    /// stringified form.
    pub fn register(&self, delegate: Arc<dyn Delegate>) -> String {
        let key = delegate.object_reference().to_string();
        tracing::debug!("Registering local object {}", delegate.object_reference().type_id);
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), delegate);
        key
    }

    /// Stringify the reference a stub is bound to.
    pub fn object_to_string(&self, stub: &CodeBaseStub) -> Result<String> {
        Ok(stub.delegate()?.object_reference().to_string())
    }

    /// Resolve a stringified reference into a bound stub.
    pub fn string_to_object(&self, reference: &str) -> Result<CodeBaseStub> {
        Ok(CodeBaseStub::with_delegate(self.string_to_delegate(reference)?))
    }
}

impl ObjectResolver for LocalOrb {
    fn string_to_delegate(&self, reference: &str) -> Result<Arc<dyn Delegate>> {
        // Parse first so any spelling of the same reference finds the entry.
        let canonical = reference.parse::<Ior>()?.to_string();
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&canonical)
            .cloned()
            .ok_or_else(|| CodeBaseError::Unresolvable(canonical))
    }
}
