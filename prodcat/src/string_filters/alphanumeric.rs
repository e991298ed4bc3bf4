use crate::string_filters::StringFilter;

/// Replaces every character outside `[a-z0-9 ]` with a space.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlphanumericFilter;

impl AlphanumericFilter {
    /// Creates a new AlphanumericFilter.
    pub const fn new() -> Self {
        Self
    }
}

impl<S> StringFilter<S> for AlphanumericFilter
where
    S: AsRef<str>,
{
    fn filter(&self, string: S) -> String {
        string
            .as_ref()
            .chars()
            .map(|c| match c {
                'a'..='z' | '0'..='9' | ' ' => c,
                _ => ' ',
            })
            .collect()
    }
}
