//! Ordered, deduplicated host collections.
//!
//! A `HostSet` is parsed from a comma-separated spec where each element is a
//! plain hostname or a bracketed numeric range (`node[1-4]`, `cli[01-03]`,
//! `node[1,3,5-7]x`). Ranges are expanded at parse time; duplicates keep
//! their first position.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostSetError {
    #[error("empty host spec")]
    Empty,

    #[error("invalid host spec: '{0}'")]
    InvalidSpec(String),

    #[error("invalid range '{0}': start greater than end")]
    InvalidRange(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSet {
    hosts: Vec<String>,
}

impl HostSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a host unless it is already present.
    pub fn push(&mut self, host: impl Into<String>) {
        let host = host.into();
        if !self.hosts.iter().any(|h| *h == host) {
            self.hosts.push(host);
        }
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn contains(&self, host: &str) -> bool {
        self.hosts.iter().any(|h| h == host)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(String::as_str)
    }
}

impl FromIterator<String> for HostSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = HostSet::new();
        for host in iter {
            set.push(host);
        }
        set
    }
}

impl<'a> FromIterator<&'a str> for HostSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}

impl Extend<String> for HostSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for host in iter {
            self.push(host);
        }
    }
}

impl fmt::Display for HostSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hosts.join(","))
    }
}

impl FromStr for HostSet {
    type Err = HostSetError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        if spec.trim().is_empty() {
            return Err(HostSetError::Empty);
        }

        let mut set = HostSet::new();
        for part in split_outside_brackets(spec)? {
            let part = part.trim();
            if part.is_empty() {
                return Err(HostSetError::InvalidSpec(spec.to_string()));
            }
            expand_part(part, &mut set)?;
        }

        if set.is_empty() {
            return Err(HostSetError::Empty);
        }
        Ok(set)
    }
}

/// Split on commas that are not inside a bracket pair.
fn split_outside_brackets(spec: &str) -> Result<Vec<&str>, HostSetError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, c) in spec.char_indices() {
        match c {
            '[' => {
                if depth > 0 {
                    return Err(HostSetError::InvalidSpec(spec.to_string()));
                }
                depth += 1;
            }
            ']' => {
                if depth == 0 {
                    return Err(HostSetError::InvalidSpec(spec.to_string()));
                }
                depth -= 1;
            }
            ',' if depth == 0 => {
                parts.push(&spec[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(HostSetError::InvalidSpec(spec.to_string()));
    }
    parts.push(&spec[start..]);
    Ok(parts)
}

fn expand_part(part: &str, set: &mut HostSet) -> Result<(), HostSetError> {
    let Some(open) = part.find('[') else {
        if part.contains(']') || part.contains(char::is_whitespace) {
            return Err(HostSetError::InvalidSpec(part.to_string()));
        }
        set.push(part);
        return Ok(());
    };

    let Some(close) = part.rfind(']') else {
        return Err(HostSetError::InvalidSpec(part.to_string()));
    };
    if close < open {
        return Err(HostSetError::InvalidSpec(part.to_string()));
    }

    let prefix = &part[..open];
    let body = &part[open + 1..close];
    let suffix = &part[close + 1..];
    if body.is_empty() || suffix.contains('[') {
        return Err(HostSetError::InvalidSpec(part.to_string()));
    }

    for item in body.split(',') {
        match item.split_once('-') {
            Some((lo, hi)) => {
                let start: u64 = lo
                    .parse()
                    .map_err(|_| HostSetError::InvalidSpec(part.to_string()))?;
                let end: u64 = hi
                    .parse()
                    .map_err(|_| HostSetError::InvalidSpec(part.to_string()))?;
                if start > end {
                    return Err(HostSetError::InvalidRange(item.to_string()));
                }
                // `cli[01-03]` keeps the zero padding of the bounds.
                let width = if lo.len() == hi.len() { lo.len() } else { 0 };
                for n in start..=end {
                    set.push(format!("{prefix}{n:0width$}{suffix}"));
                }
            }
            None => {
                let n: u64 = item
                    .parse()
                    .map_err(|_| HostSetError::InvalidSpec(part.to_string()))?;
                let width = item.len();
                set.push(format!("{prefix}{n:0width$}{suffix}"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hosts(set: &HostSet) -> Vec<&str> {
        set.iter().collect()
    }

    #[test]
    fn parses_plain_list() {
        let set: HostSet = "alpha,beta,gamma".parse().unwrap();
        assert_eq!(hosts(&set), vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn expands_ranges_with_padding() {
        let set: HostSet = "node[1-3],cli[01-03]x".parse().unwrap();
        assert_eq!(
            hosts(&set),
            vec!["node1", "node2", "node3", "cli01x", "cli02x", "cli03x"]
        );
    }

    #[test]
    fn expands_comma_list_inside_brackets() {
        let set: HostSet = "node[1,3,5-6]".parse().unwrap();
        assert_eq!(hosts(&set), vec!["node1", "node3", "node5", "node6"]);
    }

    #[test]
    fn dedup_keeps_first_position() {
        let set: HostSet = "b,a,b,node[1-2],node2".parse().unwrap();
        assert_eq!(hosts(&set), vec!["b", "a", "node1", "node2"]);
    }

    #[test]
    fn rejects_empty_and_malformed_specs() {
        assert_eq!("".parse::<HostSet>(), Err(HostSetError::Empty));
        assert_eq!("  ".parse::<HostSet>(), Err(HostSetError::Empty));
        assert!(matches!(
            "node[1-".parse::<HostSet>(),
            Err(HostSetError::InvalidSpec(_))
        ));
        assert!(matches!(
            "node[a-b]".parse::<HostSet>(),
            Err(HostSetError::InvalidSpec(_))
        ));
        assert_eq!(
            "node[3-1]".parse::<HostSet>(),
            Err(HostSetError::InvalidRange("3-1".to_string()))
        );
    }

    #[test]
    fn display_joins_with_commas() {
        let set: HostSet = "node[1-2]".parse().unwrap();
        assert_eq!(set.to_string(), "node1,node2");
    }
}
