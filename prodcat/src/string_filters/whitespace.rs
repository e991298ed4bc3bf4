use crate::string_filters::StringFilter;

/// Collapses every run of whitespace into a single space and trims both ends.
#[derive(Clone, Copy, Debug, Default)]
pub struct WhitespaceFilter;

impl WhitespaceFilter {
    /// Creates a new WhitespaceFilter.
    pub const fn new() -> Self {
        Self
    }
}

impl<S> StringFilter<S> for WhitespaceFilter
where
    S: AsRef<str>,
{
    fn filter(&self, string: S) -> String {
        let mut result = String::with_capacity(string.as_ref().len());
        for token in string.as_ref().split_whitespace() {
            if !result.is_empty() {
                result.push(' ');
            }
            result.push_str(token);
        }
        result
    }
}
