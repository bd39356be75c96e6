use std::fmt;
use thiserror::Error;

/// Broad classification of a fatal [`MigrationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The Catalyst configuration text could not be understood.
    Parse,
    /// The run cannot proceed safely with the given inputs.
    Precondition,
    /// The configuration source or the Meraki API could not be reached.
    Transport,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Parse => write!(f, "parse error"),
            ErrorKind::Precondition => write!(f, "precondition error"),
            ErrorKind::Transport => write!(f, "transport error"),
        }
    }
}

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Invalid port identifier: {0}")]
    InvalidPortId(String),

    #[error("line {line}: interface {block}: malformed `ip address` ({detail})")]
    MalformedAddress {
        block: String,
        line: usize,
        detail: String,
    },

    #[error("line {line}: interface {block}: invalid VLAN id `{value}`")]
    InvalidVlanId {
        block: String,
        line: usize,
        value: String,
    },

    #[error("line {line}: interface {block}: invalid VLAN list `{value}`")]
    InvalidVlanList {
        block: String,
        line: usize,
        value: String,
    },

    #[error("line {line}: VLAN {vlan_id} is defined twice (first at line {first_line})")]
    DuplicateVlan {
        vlan_id: u16,
        first_line: usize,
        line: usize,
    },

    #[error("line {line}: interface {port} is defined twice (first at line {first_line})")]
    DuplicatePort {
        port: String,
        first_line: usize,
        line: usize,
    },

    #[error("No Meraki switch serials were supplied")]
    NoTargetSerials,

    #[error(
        "{serials} Meraki serial(s) supplied but the Catalyst configuration has {members} \
         stack member(s); supply exactly one serial per stack member"
    )]
    StackMismatch { serials: usize, members: usize },

    #[error(
        "Stack member {member} has {source_ports} ports but Meraki switch {serial} has \
         {target_ports}"
    )]
    PortCountMismatch {
        serial: String,
        member: u8,
        source_ports: usize,
        target_ports: usize,
    },

    #[error(
        "Default gateway {gateway} falls inside more than one imported SVI (VLANs {}). \
         Please ensure the default gateway exists on exactly one imported SVI.",
        join_vlans(.vlans)
    )]
    AmbiguousGateway { gateway: String, vlans: Vec<u16> },

    #[error(
        "Default gateway {gateway} does not exist on any imported SVI and is not reachable \
         on the target switches. Please ensure the default gateway exists on exactly one \
         imported SVI."
    )]
    GatewayUnreachable { gateway: String },

    #[error("Failed to retrieve configuration from {source_name}: {message}")]
    SourceUnavailable {
        source_name: String,
        message: String,
    },

    #[error("{source_name} rejected `{command}`: {message}")]
    SourceRejectedCommand {
        source_name: String,
        command: String,
        message: String,
    },

    #[error("Meraki API {method} {path} failed: {message}")]
    TargetTransport {
        method: String,
        path: String,
        message: String,
    },

    #[error("Meraki API {method} {path} returned HTTP {status}: {message}")]
    TargetRequest {
        method: String,
        path: String,
        status: u16,
        message: String,
    },
}

impl MigrationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MigrationError::InvalidPortId(_)
            | MigrationError::MalformedAddress { .. }
            | MigrationError::InvalidVlanId { .. }
            | MigrationError::InvalidVlanList { .. }
            | MigrationError::DuplicateVlan { .. }
            | MigrationError::DuplicatePort { .. } => ErrorKind::Parse,
            MigrationError::NoTargetSerials
            | MigrationError::StackMismatch { .. }
            | MigrationError::PortCountMismatch { .. }
            | MigrationError::AmbiguousGateway { .. }
            | MigrationError::GatewayUnreachable { .. } => ErrorKind::Precondition,
            MigrationError::SourceUnavailable { .. }
            | MigrationError::SourceRejectedCommand { .. }
            | MigrationError::TargetTransport { .. }
            | MigrationError::TargetRequest { .. } => ErrorKind::Transport,
        }
    }
}

/// Something odd in the source configuration that does not stop the migration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    #[error(
        "{port} carries both access and trunk switchport directives; migrating it as {resolved}"
    )]
    ConflictingSwitchportDirectives { port: String, resolved: String },

    #[error("{port} uses `switchport mode {mode}`; migrating it as access")]
    UnsupportedSwitchportMode { port: String, mode: String },

    #[error("{port} uses `switchport voice vlan {value}`; no voice VLAN will be set")]
    UnsupportedVoiceVlan { port: String, value: String },

    #[error("VLAN {vlan_id} uses `ip address {value}`; only static addresses are migrated")]
    DynamicSviAddress { vlan_id: u16, value: String },

    #[error("Uplink {port} does not appear in the Catalyst configuration")]
    UnknownUplink { port: String },

    #[error(
        "Stack member {member} has {source_ports} ports but Meraki switch {serial} has \
         {target_ports}; ports may not line up"
    )]
    PortCountMismatch {
        serial: String,
        member: u8,
        source_ports: usize,
        target_ports: usize,
    },

    #[error("Could not read the port inventory of {serial}: {message}")]
    InventoryUnavailable { serial: String, message: String },
}

fn join_vlans(vlans: &[u16]) -> String {
    vlans
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let parse = MigrationError::DuplicateVlan {
            vlan_id: 10,
            first_line: 3,
            line: 9,
        };
        assert_eq!(parse.kind(), ErrorKind::Parse);

        let precondition = MigrationError::StackMismatch {
            serials: 1,
            members: 2,
        };
        assert_eq!(precondition.kind(), ErrorKind::Precondition);

        let transport = MigrationError::TargetRequest {
            method: "PUT".into(),
            path: "/devices/Q2XX/switch/ports/1".into(),
            status: 400,
            message: "bad vlan".into(),
        };
        assert_eq!(transport.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_ambiguous_gateway_lists_vlans() {
        let err = MigrationError::AmbiguousGateway {
            gateway: "10.0.0.1".into(),
            vlans: vec![10, 20],
        };
        assert!(err.to_string().contains("VLANs 10, 20"));
    }
}
