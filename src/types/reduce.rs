//! Identity and reduction descriptors: classes, singletons, instances.

use std::fmt;
use std::sync::Arc;

use crate::error::PackError;

use super::value::Value;

type ConstructFn = dyn Fn(Vec<Value>) -> Result<Value, PackError> + Send + Sync;
type StageFn = dyn Fn(&mut Value, Value) -> Result<(), PackError> + Send + Sync;

/// A registered class: its wire identity (module, qualname) plus the
/// constructor and optional stage hooks used to rebuild instances.
///
/// The stage hooks are consulted during instance reconstruction; when a hook
/// is absent the builtin-container fallback applies (dict merge, in-place
/// concatenation, pair assignment).
pub struct ClassDef {
    module: String,
    qualname: String,
    construct: Box<ConstructFn>,
    set_state: Option<Box<StageFn>>,
    extend: Option<Box<StageFn>>,
    update: Option<Box<StageFn>>,
}

impl ClassDef {
    pub fn new(
        module: impl Into<String>,
        qualname: impl Into<String>,
        construct: impl Fn(Vec<Value>) -> Result<Value, PackError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            module: module.into(),
            qualname: qualname.into(),
            construct: Box::new(construct),
            set_state: None,
            extend: None,
            update: None,
        }
    }

    /// Installs the hook applied for the state slot of a reduction.
    pub fn with_set_state(
        mut self,
        hook: impl Fn(&mut Value, Value) -> Result<(), PackError> + Send + Sync + 'static,
    ) -> Self {
        self.set_state = Some(Box::new(hook));
        self
    }

    /// Installs the hook applied for the extend slot of a reduction.
    pub fn with_extend(
        mut self,
        hook: impl Fn(&mut Value, Value) -> Result<(), PackError> + Send + Sync + 'static,
    ) -> Self {
        self.extend = Some(Box::new(hook));
        self
    }

    /// Installs the hook applied for the update slot of a reduction.
    pub fn with_update(
        mut self,
        hook: impl Fn(&mut Value, Value) -> Result<(), PackError> + Send + Sync + 'static,
    ) -> Self {
        self.update = Some(Box::new(hook));
        self
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn qualname(&self) -> &str {
        &self.qualname
    }

    pub(crate) fn construct(&self, args: Vec<Value>) -> Result<Value, PackError> {
        (self.construct)(args)
    }

    pub(crate) fn set_state_hook(&self) -> Option<&StageFn> {
        self.set_state.as_deref()
    }

    pub(crate) fn extend_hook(&self) -> Option<&StageFn> {
        self.extend.as_deref()
    }

    pub(crate) fn update_hook(&self) -> Option<&StageFn> {
        self.update.as_deref()
    }
}

impl fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDef")
            .field("module", &self.module)
            .field("qualname", &self.qualname)
            .finish_non_exhaustive()
    }
}

/// A registered singleton, identified by one canonical name.
///
/// Unpacking a singleton returns the registered `Arc` itself, so decoded
/// handles are pointer-identical to the registered one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingletonDef {
    name: String,
}

impl SingletonDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A live handle that can be registered for decode-side resolution.
#[derive(Debug, Clone)]
pub enum Handle {
    Class(Arc<ClassDef>),
    Singleton(Arc<SingletonDef>),
}

impl Handle {
    pub(crate) fn into_value(self) -> Value {
        match self {
            Self::Class(c) => Value::Class(c),
            Self::Singleton(s) => Value::Singleton(s),
        }
    }

    /// Two handles are the same only if they are the same allocation.
    pub(crate) fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Class(a), Self::Class(b)) => Arc::ptr_eq(a, b),
            (Self::Singleton(a), Self::Singleton(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Class(c) => format!("<class '{}.{}'>", c.module(), c.qualname()),
            Self::Singleton(s) => format!("'{}'", s.name()),
        }
    }
}

impl From<Arc<ClassDef>> for Handle {
    fn from(c: Arc<ClassDef>) -> Self {
        Self::Class(c)
    }
}

impl From<Arc<SingletonDef>> for Handle {
    fn from(s: Arc<SingletonDef>) -> Self {
        Self::Singleton(s)
    }
}

/// A constructor descriptor: callable, positional arguments, and up to three
/// independently optional reconstruction slots.
///
/// A slot holding `Some(Value::Null)` travels on the wire as null and is
/// skipped at reconstruction, exactly like an absent slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    callable: Value,
    args: Vec<Value>,
    state: Option<Value>,
    extend: Option<Value>,
    update: Option<Value>,
}

impl Reduction {
    pub fn new(callable: impl Into<Value>, args: Vec<Value>) -> Self {
        Self {
            callable: callable.into(),
            args,
            state: None,
            extend: None,
            update: None,
        }
    }

    pub fn with_state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_extend(mut self, arg: Value) -> Self {
        self.extend = Some(arg);
        self
    }

    pub fn with_update(mut self, arg: Value) -> Self {
        self.update = Some(arg);
        self
    }

    pub fn callable(&self) -> &Value {
        &self.callable
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn state(&self) -> Option<&Value> {
        self.state.as_ref()
    }

    pub fn extend_arg(&self) -> Option<&Value> {
        self.extend.as_ref()
    }

    pub fn update_arg(&self) -> Option<&Value> {
        self.update.as_ref()
    }

    /// Number of fields in the wire descriptor tuple: 2 mandatory plus the
    /// trailing slots up to the last present one.
    pub(crate) fn arity(&self) -> usize {
        if self.update.is_some() {
            5
        } else if self.extend.is_some() {
            4
        } else if self.state.is_some() {
            3
        } else {
            2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduction_arity_tracks_last_present_slot() {
        let class = Arc::new(ClassDef::new("demos", "Thing", |_| Ok(Value::Null)));
        let base = Reduction::new(Arc::clone(&class), vec![]);
        assert_eq!(base.arity(), 2);
        assert_eq!(base.clone().with_state(Value::Int(1)).arity(), 3);
        assert_eq!(base.clone().with_extend(Value::Int(1)).arity(), 4);
        // A present update slot forces the earlier slots onto the wire.
        assert_eq!(base.with_update(Value::Int(1)).arity(), 5);
    }

    #[test]
    fn handles_compare_by_allocation() {
        let a = Arc::new(SingletonDef::new("Marker"));
        let b = Arc::new(SingletonDef::new("Marker"));
        assert!(Handle::from(Arc::clone(&a)).same_as(&Handle::from(Arc::clone(&a))));
        assert!(!Handle::from(a).same_as(&Handle::from(b)));
    }
}
