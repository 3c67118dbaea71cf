use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PaperError;

/// A document identifier resolvable at the mirror (a DOI-like handle).
///
/// No syntax validation beyond non-emptiness: the mirror itself is the
/// authority on whether an identifier is known.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Doi(String);

impl Doi {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Doi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Doi {
    type Err = PaperError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_string();
        if normalized.is_empty() {
            return Err(PaperError::InvalidDoi(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_doi_trims() {
        let doi: Doi = " 10.1000/182 ".parse().unwrap();
        assert_eq!(doi.as_str(), "10.1000/182");
    }

    #[test]
    fn parse_doi_rejects_empty() {
        let err = "   ".parse::<Doi>().unwrap_err();
        assert_matches!(err, PaperError::InvalidDoi(_));
    }
}
