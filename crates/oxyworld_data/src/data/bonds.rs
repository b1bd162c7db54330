use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseBondsError {
    #[error("invalid agent id {token:?} in bond specification")]
    InvalidId { token: String },
    #[error("malformed bond specification: {0}")]
    Malformed(String),
}

/// Initial bond specification: every agent in a group is bonded to every other member.
///
/// Textual forms accepted by [`FromStr`]:
/// - `""` or `"[]"`: no bonds
/// - `"[1,2,3]"`: a single group
/// - `"[1,2];[3,4]"`: several groups separated by `;`
/// - `"[[1,2],[3,4]]"`: a JSON array of groups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BondGroups(pub Vec<Vec<u32>>);

impl BondGroups {
    #[must_use]
    pub fn none() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn single(ids: Vec<u32>) -> Self {
        if ids.is_empty() {
            Self::none()
        } else {
            Self(vec![ids])
        }
    }

    #[must_use]
    pub fn groups(&self) -> &[Vec<u32>] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Vec::is_empty)
    }

    /// Partners of `id`: the other members of the group containing it.
    #[must_use]
    pub fn partners_of(&self, id: u32) -> Vec<u32> {
        self.0
            .iter()
            .find(|group| group.contains(&id))
            .map(|group| group.iter().copied().filter(|&p| p != id).collect())
            .unwrap_or_default()
    }
}

impl FromStr for BondGroups {
    type Err = ParseBondsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with("[[") {
            let groups: Vec<Vec<u32>> = serde_json::from_str(s)
                .map_err(|e| ParseBondsError::Malformed(e.to_string()))?;
            return Ok(Self(groups.into_iter().filter(|g| !g.is_empty()).collect()));
        }

        let mut groups = Vec::new();
        for part in s.split(';') {
            let inner = part.trim().trim_start_matches('[').trim_end_matches(']');
            if inner.trim().is_empty() {
                continue;
            }
            let group = inner
                .split(',')
                .map(|token| {
                    token.trim().parse::<u32>().map_err(|_| ParseBondsError::InvalidId {
                        token: token.trim().to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            groups.push(group);
        }
        Ok(Self(groups))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        assert!("".parse::<BondGroups>().unwrap().is_empty());
        assert!("[]".parse::<BondGroups>().unwrap().is_empty());
    }

    #[test]
    fn test_parse_single_group() {
        let bonds: BondGroups = "[1, 2,3]".parse().unwrap();
        assert_eq!(bonds.groups(), &[vec![1, 2, 3]]);
        assert_eq!(bonds.partners_of(2), vec![1, 3]);
        assert!(bonds.partners_of(4).is_empty());
    }

    #[test]
    fn test_parse_multiple_groups() {
        let a: BondGroups = "[1,2];[3,4]".parse().unwrap();
        let b: BondGroups = "[[1,2],[3,4]]".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.partners_of(4), vec![3]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = "[1,x]".parse::<BondGroups>().unwrap_err();
        assert_eq!(err, ParseBondsError::InvalidId { token: "x".into() });
        assert!("[-1]".parse::<BondGroups>().is_err());
    }
}
