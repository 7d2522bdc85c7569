use std::fmt;

/// One axis of site-provided query refinement
///
/// The tokens of a dimension are mutually exclusive and, as far as the portal
/// is concerned, jointly cover the unfiltered result set. The crawler relies on
/// that without checking it: overlapping bands would show up as duplicate
/// upserts, missing bands as silently absent listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDimension {
    /// Human-readable name used in logs (e.g. "price")
    pub name: String,

    /// Filter tokens in the order they are explored
    pub tokens: Vec<String>,
}

impl FilterDimension {
    /// Creates a dimension from explicit tokens
    pub fn new<S: Into<String>>(name: &str, tokens: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.to_string(),
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a numbered band dimension: `prefix1..=prefix{count}`
    ///
    /// # Examples
    ///
    /// ```
    /// use listing_sweep::listing::FilterDimension;
    ///
    /// let rooms = FilterDimension::banded("rooms", "l", 3);
    /// assert_eq!(rooms.tokens, vec!["l1", "l2", "l3"]);
    /// ```
    pub fn banded(name: &str, prefix: &str, count: u32) -> Self {
        Self::new(name, (1..=count).map(|i| format!("{}{}", prefix, i)))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// The filter tokens applied to a query so far, one per dimension level
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterPath(Vec<String>);

impl FilterPath {
    /// The unfiltered query
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path refined by one more token
    pub fn with(&self, token: &str) -> Self {
        let mut tokens = self.0.clone();
        tokens.push(token.to_string());
        Self(tokens)
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// Number of applied filters, which is also the dimension level of the path
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for FilterPath {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for FilterPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.0.join("+"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banded_dimension() {
        let price = FilterDimension::banded("price", "p", 7);
        assert_eq!(price.len(), 7);
        assert_eq!(price.tokens.first().map(String::as_str), Some("p1"));
        assert_eq!(price.tokens.last().map(String::as_str), Some("p7"));
    }

    #[test]
    fn test_path_refinement_leaves_parent_untouched() {
        let root = FilterPath::root();
        let child = root.with("p1");
        let grandchild = child.with("l2");

        assert!(root.is_root());
        assert_eq!(child.tokens(), ["p1"]);
        assert_eq!(grandchild.tokens(), ["p1", "l2"]);
        assert_eq!(grandchild.depth(), 2);
    }

    #[test]
    fn test_path_display() {
        assert_eq!(FilterPath::root().to_string(), "<root>");
        let path: FilterPath = ["p1", "l2"].into_iter().collect();
        assert_eq!(path.to_string(), "p1+l2");
    }
}
