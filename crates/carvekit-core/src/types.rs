//! Type aliases for commonly used shared and callback types.
//!
//! The engine is single-threaded and synchronous; shared, non-owned records
//! (the offset transform cell in particular) use `Rc<RefCell<T>>`.

use std::cell::RefCell;
use std::rc::Rc;

/// A reference-counted, interior-mutable wrapper for single-threaded sharing.
///
/// The offset-transform record is the canonical user: it is owned by whichever
/// construct computed it and referenced, never copied, by child primitives.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wraps a value in a [`Shared`] cell.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// A cooperative progress callback receiving (current, total) step counts.
///
/// Invoked at coarse intervals during long operations (pocket build,
/// multi-pass milling). There is no cancellation, only observation.
pub type ProgressCallback<'a> = &'a mut dyn FnMut(u64, u64);
