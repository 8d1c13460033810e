//! Instance reconstruction: descriptor tuple → live value.
//!
//! The descriptor carries a callable, its arguments, and up to three
//! optional stage arguments applied in order: state, extend, update. Each
//! stage prefers the class hook and falls back to the builtin-container
//! behavior (dict merge, in-place concatenation, pair assignment).

use std::sync::Arc;

use crate::error::PackError;
use crate::types::value::dict_insert;
use crate::types::{ClassDef, Value};

pub(crate) fn reconstruct(descriptor: Value) -> Result<Value, PackError> {
    let items = match descriptor {
        Value::Tuple(items) => items,
        other => {
            return Err(PackError::BadReduce(format!(
                "expected a tuple, got '{}'",
                other.kind()
            )));
        }
    };
    if items.len() > 5 {
        return Err(PackError::BadReduce(format!(
            "expected at most 5 fields, got {}",
            items.len()
        )));
    }

    let mut fields = items.into_iter();
    let callable = fields
        .next()
        .ok_or_else(|| PackError::BadReduce("missing callable".into()))?;
    let args = fields
        .next()
        .ok_or_else(|| PackError::BadReduce("missing arguments".into()))?;
    let state = fields.next();
    let extend = fields.next();
    let update = fields.next();

    let class = match &callable {
        Value::Class(class) => Arc::clone(class),
        other => {
            return Err(PackError::BadReduce(format!(
                "argument 1 must be a callable, not '{}'",
                other.kind()
            )));
        }
    };
    let args = match args {
        Value::Tuple(args) => args,
        other => {
            return Err(PackError::BadReduce(format!(
                "argument 2 must be a tuple, not '{}'",
                other.kind()
            )));
        }
    };

    let mut value = class.construct(args)?;
    if let Some(state) = present(state) {
        set_state(&mut value, &class, state)?;
    }
    if let Some(arg) = present(extend) {
        extend_value(&mut value, &class, arg)?;
    }
    if let Some(arg) = present(update) {
        update_value(&mut value, &class, arg)?;
    }
    Ok(value)
}

/// A slot is skipped when it is absent or travelled as null.
fn present(slot: Option<Value>) -> Option<Value> {
    match slot {
        Some(Value::Null) | None => None,
        some => some,
    }
}

fn set_state(value: &mut Value, class: &ClassDef, state: Value) -> Result<(), PackError> {
    if let Some(hook) = class.set_state_hook() {
        return hook(value, state);
    }
    let state_pairs = match state {
        Value::Dict(pairs) => pairs,
        other => {
            return Err(PackError::BadState(format!(
                "cannot set state from '{}' values",
                other.kind()
            )));
        }
    };
    let Value::Dict(pairs) = &mut *value else {
        return Err(PackError::BadState(format!(
            "cannot set state on '{}' values",
            value.kind()
        )));
    };
    for (key, item) in state_pairs {
        if !matches!(key, Value::Str(_)) {
            return Err(PackError::BadState(format!(
                "expected state key to be a str, not '{}'",
                key.kind()
            )));
        }
        dict_insert(pairs, key, item);
    }
    Ok(())
}

fn extend_value(value: &mut Value, class: &ClassDef, arg: Value) -> Result<(), PackError> {
    if let Some(hook) = class.extend_hook() {
        return hook(value, arg);
    }
    match (&mut *value, arg) {
        (
            Value::List(items),
            Value::List(more) | Value::Tuple(more) | Value::Set(more) | Value::FrozenSet(more),
        ) => {
            items.extend(more);
            Ok(())
        }
        (Value::Str(s), Value::Str(more)) => {
            s.push_str(&more);
            Ok(())
        }
        (
            Value::Bytes(b) | Value::ByteArray(b),
            Value::Bytes(more) | Value::ByteArray(more),
        ) => {
            b.extend(more);
            Ok(())
        }
        (other, _) => Err(PackError::BadState(format!(
            "cannot extend '{}' values",
            other.kind()
        ))),
    }
}

fn update_value(value: &mut Value, class: &ClassDef, arg: Value) -> Result<(), PackError> {
    if let Some(hook) = class.update_hook() {
        return hook(value, arg);
    }
    let Value::Dict(pairs) = &mut *value else {
        return Err(PackError::BadState(format!(
            "cannot update '{}' values",
            value.kind()
        )));
    };
    match arg {
        Value::Dict(more) => {
            for (key, item) in more {
                dict_insert(pairs, key, item);
            }
            Ok(())
        }
        Value::List(items) | Value::Tuple(items) | Value::Set(items) | Value::FrozenSet(items) => {
            for item in items {
                let kv = match item {
                    Value::Tuple(kv) | Value::List(kv) => kv,
                    other => {
                        return Err(PackError::BadState(format!(
                            "expected a key-value pair, got '{}'",
                            other.kind()
                        )));
                    }
                };
                match <[Value; 2]>::try_from(kv) {
                    Ok([key, item]) => dict_insert(pairs, key, item),
                    Err(kv) => {
                        return Err(PackError::BadState(format!(
                            "expected a sequence of len 2, got {}",
                            kv.len()
                        )));
                    }
                }
            }
            Ok(())
        }
        other => Err(PackError::BadState(format!(
            "cannot update from '{}' values",
            other.kind()
        ))),
    }
}
