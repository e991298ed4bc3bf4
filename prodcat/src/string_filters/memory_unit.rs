use std::sync::OnceLock;

use regex::Regex;

use crate::string_filters::StringFilter;

/// Joins a memory size to its unit, so that `16 gb` and `16gb` become the same token.
///
/// A run of decimal digits, optional whitespace and `gb` becomes the digits followed by `gb`.
/// Only the `gb` unit is handled and the input is expected to be lowercased already.
#[derive(Clone, Copy, Debug, Default)]
pub struct MemoryUnitFilter;

impl MemoryUnitFilter {
    /// Creates a new MemoryUnitFilter.
    pub const fn new() -> Self {
        Self
    }
}

fn gb_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(\d+)\s*gb").ok())
        .as_ref()
}

impl<S> StringFilter<S> for MemoryUnitFilter
where
    S: AsRef<str>,
{
    fn filter(&self, string: S) -> String {
        let string = string.as_ref();
        gb_pattern().map_or_else(
            || string.to_string(),
            |re| re.replace_all(string, "${1}gb").into_owned(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_unit_filter_joins() {
        let filter = MemoryUnitFilter::new();

        assert_eq!("galaxy s9 64gb black", filter.filter("galaxy s9 64 gb black"));
        assert_eq!("ipad 128gb", filter.filter("ipad 128   gb"));
    }

    #[test]
    fn test_memory_unit_filter_keeps_other_units() {
        let filter = MemoryUnitFilter::new();

        assert_eq!("bosch 8 kg 1400 rpm", filter.filter("bosch 8 kg 1400 rpm"));
    }

    #[test]
    fn test_memory_unit_filter_later_number() {
        let filter = MemoryUnitFilter::new();

        assert_eq!("model 7 2gb", filter.filter("model 7 2 gb"));
    }

    #[test]
    fn test_memory_unit_filter_decimal_digits_only() {
        let filter = MemoryUnitFilter::new();

        assert_eq!("phone ٣gb", filter.filter("phone ٣ gb"));
        assert_eq!("card ½ gb", filter.filter("card ½ gb"));
        assert_eq!("clock Ⅻ gb", filter.filter("clock Ⅻ gb"));
        assert_eq!("ssd 16gb 16gb", filter.filter("ssd 16gb 16 gb"));
    }
}
