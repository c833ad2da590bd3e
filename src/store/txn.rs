//! All-or-nothing loading of a fixed number of items.

/// First failure reported by [`load_all`].
#[derive(Clone, Debug, PartialEq)]
pub struct LoadFailure<E> {
    /// Index of the item that failed.
    pub index: usize,
    /// Number of items that had been produced and were released.
    pub released: usize,
    /// The loader's error.
    pub error: E,
}

/// Runs `load` for items `0..count` and returns all of them, or none.
///
/// Loading stops at the first error. Items produced before the failure are
/// dropped before this function returns, so no partial state escapes.
pub fn load_all<T, E, F>(count: usize, mut load: F) -> Result<Vec<T>, LoadFailure<E>>
where
    F: FnMut(usize) -> Result<T, E>,
{
    let mut items = Vec::with_capacity(count);
    for index in 0..count {
        match load(index) {
            Ok(item) => items.push(item),
            Err(error) => {
                let released = items.len();
                drop(items);
                return Err(LoadFailure {
                    index,
                    released,
                    error,
                });
            }
        }
    }
    Ok(items)
}
