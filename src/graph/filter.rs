use crate::proto::ast::{OptionDecl, OptionName};

/// Selects RPCs by the names of their method options
///
/// An empty filter accepts any option. Extension options are compared by the
/// parenthesized name, so `(acme.expose).level` matches `acme.expose`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionFilter {
    names: Vec<String>,
}

impl OptionFilter {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(Into::into)
                .map(|n: String| n.trim_start_matches('.').to_string())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// Filter that accepts every option
    pub fn any() -> Self {
        Self::default()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn matches(&self, name: &OptionName) -> bool {
        self.is_empty() || self.names.contains(&name.extension_name())
    }

    /// True when at least one option matches; an RPC without options never does
    pub fn matches_any(&self, options: &[OptionDecl]) -> bool {
        options.iter().any(|option| self.matches(&option.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::ast::{OptionNamePart, OptionValue, Scalar};

    fn option(parts: Vec<OptionNamePart>) -> OptionDecl {
        OptionDecl {
            name: OptionName { parts },
            value: OptionValue::Scalar(Scalar::Ident("true".into())),
        }
    }

    #[test]
    fn test_empty_filter_matches_any_option() {
        let filter = OptionFilter::any();
        let opts = vec![option(vec![OptionNamePart::Simple("deprecated".into())])];
        assert!(filter.matches_any(&opts));
    }

    #[test]
    fn test_no_options_never_match() {
        assert!(!OptionFilter::any().matches_any(&[]));
        assert!(!OptionFilter::new(["acme.expose"]).matches_any(&[]));
    }

    #[test]
    fn test_extension_name_match() {
        let filter = OptionFilter::new(["acme.expose"]);
        let opts = vec![option(vec![
            OptionNamePart::Extension("acme.expose".into()),
            OptionNamePart::Simple("level".into()),
        ])];
        assert!(filter.matches_any(&opts));

        let other = vec![option(vec![OptionNamePart::Extension(
            "google.api.http".into(),
        )])];
        assert!(!filter.matches_any(&other));
    }

    #[test]
    fn test_leading_dots_and_blanks_are_normalized() {
        let filter = OptionFilter::new([".acme.expose", ""]);
        assert_eq!(filter.names(), &["acme.expose".to_string()]);
        let opts = vec![option(vec![OptionNamePart::Extension(".acme.expose".into())])];
        assert!(filter.matches_any(&opts));
    }
}
