//! Per-thread recursion guard for container packing and unpacking.

use std::cell::Cell;

use crate::error::PackError;

/// Maximum container nesting depth for a single pack or unpack call.
pub const MAX_DEPTH: usize = 256;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Increments the per-thread depth counter on entry, decrements on drop.
pub(crate) struct DepthGuard;

impl DepthGuard {
    pub(crate) fn enter(what: &'static str) -> Result<Self, PackError> {
        let exceeded = DEPTH.with(|depth| {
            if depth.get() >= MAX_DEPTH {
                true
            } else {
                depth.set(depth.get() + 1);
                false
            }
        });
        if exceeded {
            Err(PackError::Recursion(what))
        } else {
            Ok(DepthGuard)
        }
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get() - 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_releases_depth_on_drop() {
        {
            let _a = DepthGuard::enter("packing a tuple").unwrap();
            let _b = DepthGuard::enter("packing a tuple").unwrap();
        }
        // All slots are free again.
        let guards: Vec<_> = (0..MAX_DEPTH)
            .map(|_| DepthGuard::enter("packing a list").unwrap())
            .collect();
        assert!(matches!(
            DepthGuard::enter("packing a list"),
            Err(PackError::Recursion(_))
        ));
        drop(guards);
        assert!(DepthGuard::enter("packing a list").is_ok());
    }
}
