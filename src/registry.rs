//! Process-wide identity registry.
//!
//! Maps the exact encoded identity bytes of a class or singleton to its live
//! in-process handle, so the decoding side can re-resolve identities that
//! arrive on the wire. Entries live for the process lifetime.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::codec::encode::identity_bytes;
use crate::error::PackError;
use crate::types::{Handle, SingletonDef, Value};

struct Registry {
    entries: RwLock<HashMap<Vec<u8>, Handle>>,
    not_implemented: Arc<SingletonDef>,
    ellipsis: Arc<SingletonDef>,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn global() -> &'static Registry {
    REGISTRY.get_or_init(Registry::bootstrap)
}

impl Registry {
    fn bootstrap() -> Self {
        let not_implemented = Arc::new(SingletonDef::new("NotImplemented"));
        let ellipsis = Arc::new(SingletonDef::new("Ellipsis"));
        let mut entries = HashMap::new();
        for singleton in [&not_implemented, &ellipsis] {
            let handle = Handle::Singleton(Arc::clone(singleton));
            entries.insert(identity_bytes(&handle).to_vec(), handle);
        }
        Self {
            entries: RwLock::new(entries),
            not_implemented,
            ellipsis,
        }
    }

    fn register(&self, handle: Handle) -> Result<(), PackError> {
        let key = identity_bytes(&handle).to_vec();
        let mut entries = self.entries.write().unwrap();
        match entries.get(&key) {
            Some(existing) if existing.same_as(&handle) => Ok(()),
            Some(_) => Err(PackError::Conflict(handle.describe())),
            None => {
                entries.insert(key, handle);
                Ok(())
            }
        }
    }

    fn lookup(&self, key: &[u8]) -> Option<Handle> {
        self.entries.read().unwrap().get(key).cloned()
    }
}

/// Adds a class or singleton handle to the registry.
///
/// Registration is write-once per identity: re-registering the same handle
/// is idempotent, a different handle under an existing identity is rejected.
pub fn register(handle: impl Into<Handle>) -> Result<(), PackError> {
    global().register(handle.into())
}

pub(crate) fn lookup(key: &[u8]) -> Option<Handle> {
    global().lookup(key)
}

/// The canonical `NotImplemented` singleton, registered at bootstrap.
pub fn not_implemented() -> Value {
    Value::Singleton(Arc::clone(&global().not_implemented))
}

/// The canonical `Ellipsis` singleton, registered at bootstrap.
pub fn ellipsis() -> Value {
    Value::Singleton(Arc::clone(&global().ellipsis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{pack, unpack};
    use crate::types::ClassDef;

    #[test]
    fn builtin_singletons_are_preregistered() {
        for value in [not_implemented(), ellipsis()] {
            let decoded = unpack(&pack(&value).unwrap()).unwrap();
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn registration_is_idempotent() {
        let class = Arc::new(ClassDef::new("registry_tests", "Widget", |_| {
            Ok(Value::Null)
        }));
        register(Arc::clone(&class)).unwrap();
        register(Arc::clone(&class)).unwrap();

        let value = Value::Class(class);
        assert_eq!(unpack(&pack(&value).unwrap()).unwrap(), value);
    }

    #[test]
    fn conflicting_registration_is_rejected() {
        let first = Arc::new(ClassDef::new("registry_tests", "Gadget", |_| {
            Ok(Value::Null)
        }));
        let second = Arc::new(ClassDef::new("registry_tests", "Gadget", |_| {
            Ok(Value::Null)
        }));
        register(first).unwrap();
        assert!(matches!(
            register(second),
            Err(PackError::Conflict(_))
        ));
    }

    #[test]
    fn singleton_registration_round_trips() {
        let marker = Arc::new(SingletonDef::new("registry_tests.Marker"));
        register(Arc::clone(&marker)).unwrap();
        let value = Value::Singleton(marker);
        assert_eq!(unpack(&pack(&value).unwrap()).unwrap(), value);
    }

    #[test]
    fn unregistered_class_reports_identity() {
        let ghost = Arc::new(ClassDef::new("registry_tests", "Ghost", |_| {
            Ok(Value::Null)
        }));
        let err = unpack(&pack(&Value::Class(ghost)).unwrap()).unwrap_err();
        let PackError::NotRegistered(msg) = err else {
            panic!("expected NotRegistered");
        };
        assert_eq!(msg, "cannot unpack <class 'registry_tests.Ghost'>");
    }

    #[test]
    fn unregistered_builtin_class_omits_module() {
        let ghost = Arc::new(ClassDef::new("builtins", "range", |_| Ok(Value::Null)));
        let err = unpack(&pack(&Value::Class(ghost)).unwrap()).unwrap_err();
        let PackError::NotRegistered(msg) = err else {
            panic!("expected NotRegistered");
        };
        assert_eq!(msg, "cannot unpack <class 'range'>");
    }

    #[test]
    fn unregistered_singleton_reports_name() {
        let ghost = Arc::new(SingletonDef::new("registry_tests.Ghostly"));
        let err = unpack(&pack(&Value::Singleton(ghost)).unwrap()).unwrap_err();
        let PackError::NotRegistered(msg) = err else {
            panic!("expected NotRegistered");
        };
        assert_eq!(msg, "cannot unpack 'registry_tests.Ghostly'");
    }
}
