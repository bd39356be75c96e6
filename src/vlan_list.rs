use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const MIN_VLAN: u16 = 1;
pub const MAX_VLAN: u16 = 4094;

/// VLANs permitted on a trunk.
///
/// `All` is the Catalyst default and is kept as a sentinel instead of being
/// expanded to 1-4094.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AllowedVlans {
    #[default]
    All,
    Only(BTreeSet<u16>),
}

/// Parse a single VLAN id in the 1-4094 range.
pub fn parse_vlan_id(value: &str) -> Option<u16> {
    value
        .trim()
        .parse::<u16>()
        .ok()
        .filter(|id| (MIN_VLAN..=MAX_VLAN).contains(id))
}

/// Parse a Catalyst VLAN list such as `10,20,30-40`.
pub fn parse_vlan_list(value: &str) -> Option<BTreeSet<u16>> {
    let mut vlans = BTreeSet::new();
    for item in value.split(',').map(str::trim) {
        if item.is_empty() {
            return None;
        }
        match item.split_once('-') {
            Some((start, end)) => {
                let start = parse_vlan_id(start)?;
                let end = parse_vlan_id(end)?;
                if start > end {
                    return None;
                }
                vlans.extend(start..=end);
            }
            None => {
                vlans.insert(parse_vlan_id(item)?);
            }
        }
    }
    Some(vlans)
}

fn every_vlan() -> BTreeSet<u16> {
    (MIN_VLAN..=MAX_VLAN).collect()
}

impl AllowedVlans {
    /// Apply the argument of one `switchport trunk allowed vlan` line.
    ///
    /// Lines are cumulative: IOS splits long lists into a first line followed
    /// by `add` continuation lines.
    pub fn apply(&mut self, directive: &str) -> Option<()> {
        let directive = directive.trim();
        let (verb, rest) = directive
            .split_once(char::is_whitespace)
            .map(|(verb, rest)| (verb, rest.trim()))
            .unwrap_or((directive, ""));

        match verb.to_ascii_lowercase().as_str() {
            "all" if rest.is_empty() => *self = AllowedVlans::All,
            "none" if rest.is_empty() => *self = AllowedVlans::Only(BTreeSet::new()),
            "add" => {
                let added = parse_vlan_list(rest)?;
                if let AllowedVlans::Only(current) = self {
                    current.extend(added);
                }
            }
            "remove" => {
                let removed = parse_vlan_list(rest)?;
                let current = match self {
                    AllowedVlans::All => every_vlan(),
                    AllowedVlans::Only(current) => std::mem::take(current),
                };
                *self = AllowedVlans::Only(current.difference(&removed).copied().collect());
            }
            "except" => {
                let excluded = parse_vlan_list(rest)?;
                *self = AllowedVlans::Only(every_vlan().difference(&excluded).copied().collect());
            }
            _ => *self = AllowedVlans::Only(parse_vlan_list(directive)?),
        }
        Some(())
    }

    pub fn is_all(&self) -> bool {
        match self {
            AllowedVlans::All => true,
            AllowedVlans::Only(vlans) => {
                vlans.len() == usize::from(MAX_VLAN - MIN_VLAN + 1)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, AllowedVlans::Only(vlans) if vlans.is_empty())
    }
}

impl fmt::Display for AllowedVlans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all() {
            return write!(f, "all");
        }
        let AllowedVlans::Only(vlans) = self else {
            return write!(f, "all");
        };

        let mut ranges: Vec<String> = Vec::new();
        let mut iter = vlans.iter().copied().peekable();
        while let Some(start) = iter.next() {
            let mut end = start;
            while iter.peek() == Some(&(end + 1)) {
                end += 1;
                iter.next();
            }
            if start == end {
                ranges.push(start.to_string());
            } else {
                ranges.push(format!("{start}-{end}"));
            }
        }
        write!(f, "{}", ranges.join(","))
    }
}

impl FromStr for AllowedVlans {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut allowed = AllowedVlans::All;
        allowed
            .apply(s)
            .ok_or_else(|| format!("invalid VLAN list: {s}"))?;
        Ok(allowed)
    }
}
