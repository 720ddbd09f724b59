//! `Debug` helpers for buffers with thousands of elements.
//!
//! Used through `custom_debug`, e.g. `#[debug(with = trimmed_collection_fmt)]`.
//! Build with the `debug-print-all` feature to print everything.

use std::{cmp, fmt, sync};

const FIRST_N_ELEMENTS: usize = 3;

pub trait HasLength {
    type Item: fmt::Debug;

    fn len2(&self) -> usize;
    fn get_first_n(&self, elements: usize) -> &[Self::Item];
}

impl<T: fmt::Debug> HasLength for &[T] {
    type Item = T;
    fn len2(&self) -> usize {
        self.len()
    }
    fn get_first_n(&self, elements: usize) -> &[Self::Item] {
        let end = cmp::min(elements, self.len());
        &self[..end]
    }
}

impl<T: fmt::Debug> HasLength for Vec<T> {
    type Item = T;
    fn len2(&self) -> usize {
        self.len()
    }
    fn get_first_n(&self, elements: usize) -> &[Self::Item] {
        let end = cmp::min(elements, self.len());
        &self[..end]
    }
}

impl<T: ?Sized + HasLength> HasLength for sync::Arc<T> {
    type Item = T::Item;
    fn len2(&self) -> usize {
        self.as_ref().len2()
    }
    fn get_first_n(&self, elements: usize) -> &[Self::Item] {
        self.as_ref().get_first_n(elements)
    }
}

#[cfg(not(feature = "debug-print-all"))]
pub fn trimmed_collection_fmt<T: HasLength + fmt::Debug>(
    n: &T,
    f: &mut fmt::Formatter,
) -> fmt::Result {
    let first = n.get_first_n(FIRST_N_ELEMENTS);
    let remaining = n.len2().saturating_sub(first.len());

    if remaining == 0 {
        write!(f, "{:?}", first)
    } else {
        write!(f, "{:?} + {} elements", first, remaining)
    }
}

#[cfg(feature = "debug-print-all")]
pub fn trimmed_collection_fmt<T: HasLength + fmt::Debug>(
    n: &T,
    f: &mut fmt::Formatter,
) -> fmt::Result {
    write!(f, "{:?}", n)
}
