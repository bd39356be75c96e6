use anyhow::Result;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::str::FromStr;

use super::blocks::{interface_blocks, InterfaceBlock};
use crate::subnet::netmask_to_prefix;
use crate::vlan_list::parse_vlan_id;
use crate::{ConfigWarning, MigrationError, SviAddress, SviRecord};

#[derive(Debug, Default)]
pub struct SviExtraction {
    pub svis: Vec<SviRecord>,
    pub warnings: Vec<ConfigWarning>,
}

/// Extract every `interface Vlan<N>` block, in order of appearance.
///
/// SVIs without an `ip address` are kept with no address. A VLAN defined
/// twice, or an address without a usable mask, is an error.
pub fn extract_svis(text: &str) -> Result<SviExtraction> {
    let mut extraction = SviExtraction::default();
    let mut seen: HashMap<u16, usize> = HashMap::new();

    for block in interface_blocks(text) {
        let Some(id) = vlan_suffix(block.name) else {
            continue;
        };
        let vlan_id = parse_vlan_id(id).ok_or_else(|| MigrationError::InvalidVlanId {
            block: block.name.to_string(),
            line: block.line,
            value: id.to_string(),
        })?;

        if let Some(first_line) = seen.insert(vlan_id, block.line) {
            return Err(MigrationError::DuplicateVlan {
                vlan_id,
                first_line,
                line: block.line,
            }
            .into());
        }

        let name = block
            .directives("description")
            .last()
            .map(|(_, text)| text.to_string())
            .unwrap_or_default();

        let address = match block
            .directives("ip address")
            .filter(|(_, args)| !args.ends_with("secondary"))
            .last()
        {
            Some((line, args)) => parse_address(&block, line, args, &mut extraction.warnings)?,
            None => None,
        };

        extraction.svis.push(SviRecord {
            vlan_id,
            name,
            address,
            line: block.line,
        });
    }

    Ok(extraction)
}

fn vlan_suffix(name: &str) -> Option<&str> {
    let prefix = name.get(..4)?;
    prefix
        .eq_ignore_ascii_case("vlan")
        .then(|| name[4..].trim())
}

fn parse_address(
    block: &InterfaceBlock<'_>,
    line: usize,
    args: &str,
    warnings: &mut Vec<ConfigWarning>,
) -> Result<Option<SviAddress>> {
    let malformed = |detail: &str| MigrationError::MalformedAddress {
        block: block.name.to_string(),
        line,
        detail: detail.to_string(),
    };

    let tokens: Vec<&str> = args.split_whitespace().collect();
    match tokens.as_slice() {
        [keyword, ..] if matches!(keyword.to_ascii_lowercase().as_str(), "dhcp" | "negotiated" | "pool") =>
        {
            let vlan_id = vlan_suffix(block.name)
                .and_then(parse_vlan_id)
                .unwrap_or_default();
            warnings.push(ConfigWarning::DynamicSviAddress {
                vlan_id,
                value: args.to_string(),
            });
            Ok(None)
        }
        [ip, mask] => {
            let ip = Ipv4Addr::from_str(ip)
                .map_err(|_| malformed(&format!("`{ip}` is not an IPv4 address")))?;
            let mask = Ipv4Addr::from_str(mask)
                .map_err(|_| malformed(&format!("`{mask}` is not a subnet mask")))?;
            let prefix_len = netmask_to_prefix(mask)
                .ok_or_else(|| malformed(&format!("`{mask}` is not a contiguous subnet mask")))?;
            Ok(Some(SviAddress {
                ip,
                mask,
                prefix_len,
            }))
        }
        [] => Err(malformed("missing address and mask").into()),
        [_] => Err(malformed("address without a subnet mask").into()),
        _ => Err(malformed(&format!("unexpected arguments `{args}`")).into()),
    }
}
