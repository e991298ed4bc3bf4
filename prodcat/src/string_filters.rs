//! Filters applied to raw title strings.

mod alphanumeric;
mod memory_unit;
mod whitespace;

pub use alphanumeric::AlphanumericFilter;
pub use memory_unit::MemoryUnitFilter;
pub use whitespace::WhitespaceFilter;

/// Filter that maps a string to a new string.
pub trait StringFilter<S>
where
    S: AsRef<str>,
{
    /// Filters the specified string.
    ///
    /// # Arguments:
    ///
    /// * `string` - Input string.
    ///
    /// # Returns
    ///
    /// A processed string.
    fn filter(&self, string: S) -> String;
}
