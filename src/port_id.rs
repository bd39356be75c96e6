use std::fmt;
use std::str::FromStr;

use crate::MigrationError;

/// Ethernet interface families found on Catalyst access switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PortKind {
    FastEthernet,
    GigabitEthernet,
    TwoGigabitEthernet,
    FiveGigabitEthernet,
    TenGigabitEthernet,
    TwentyFiveGigE,
    FortyGigabitEthernet,
    HundredGigE,
    AppGigabitEthernet,
}

// Longer abbreviations first so `Twe` wins over `Tw`.
const KINDS: &[(PortKind, &str, &str)] = &[
    (PortKind::TwentyFiveGigE, "TwentyFiveGigE", "Twe"),
    (PortKind::TwoGigabitEthernet, "TwoGigabitEthernet", "Tw"),
    (PortKind::FiveGigabitEthernet, "FiveGigabitEthernet", "Fi"),
    (PortKind::FortyGigabitEthernet, "FortyGigabitEthernet", "Fo"),
    (PortKind::FastEthernet, "FastEthernet", "Fa"),
    (PortKind::GigabitEthernet, "GigabitEthernet", "Gi"),
    (PortKind::TenGigabitEthernet, "TenGigabitEthernet", "Te"),
    (PortKind::HundredGigE, "HundredGigE", "Hu"),
    (PortKind::AppGigabitEthernet, "AppGigabitEthernet", "Ap"),
];

impl PortKind {
    pub fn full_name(self) -> &'static str {
        KINDS
            .iter()
            .find(|(kind, _, _)| *kind == self)
            .map(|(_, full, _)| *full)
            .unwrap_or("Ethernet")
    }

    /// Resolve a full or abbreviated interface type (`Gi`, `Gig`, `GigabitEthernet`).
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.is_empty() {
            return None;
        }
        KINDS
            .iter()
            .find(|(_, full, abbrev)| {
                let full = full.to_ascii_lowercase();
                let abbrev = abbrev.to_ascii_lowercase();
                lower.starts_with(&abbrev) && full.starts_with(&lower)
            })
            .map(|(kind, _, _)| *kind)
    }

    /// Front-panel switch ports, as opposed to internal application ports.
    pub fn is_physical(self) -> bool {
        self != PortKind::AppGigabitEthernet
    }
}

/// A Catalyst port identifier in `<type><member>/<slot>/<port>` form.
///
/// Ordering is by stack member, then slot, then port, which matches the order
/// ports appear in a running configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortId {
    pub member: u8,
    pub slot: u8,
    pub port: u16,
    pub kind: PortKind,
}

impl PortId {
    pub fn new(kind: PortKind, member: u8, slot: u8, port: u16) -> Self {
        Self {
            member,
            slot,
            port,
            kind,
        }
    }
}

impl FromStr for PortId {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MigrationError::InvalidPortId(s.to_string());
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (name, numbers) = trimmed.split_at(split);
        let kind = PortKind::from_name(name.trim()).ok_or_else(invalid)?;

        let parts: Vec<&str> = numbers.split('/').collect();
        let [member, slot, port] = parts.as_slice() else {
            return Err(invalid());
        };

        Ok(PortId {
            member: member.parse().map_err(|_| invalid())?,
            slot: slot.parse().map_err(|_| invalid())?,
            port: port.parse().map_err(|_| invalid())?,
            kind,
        })
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}/{}/{}",
            self.kind.full_name(),
            self.member,
            self.slot,
            self.port
        )
    }
}
