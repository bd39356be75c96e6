use std::net::Ipv4Addr;

use crate::SviRecord;

/// Convert a dotted-quad subnet mask to a prefix length (e.g. 255.255.255.0 -> 24).
/// Returns `None` for non-contiguous masks.
pub fn netmask_to_prefix(mask: Ipv4Addr) -> Option<u8> {
    ipnet::ipv4_mask_to_prefix(mask).ok()
}

/// VLAN ids of every SVI whose subnet contains `ip`, in SVI order.
///
/// The whole range counts, including the network and broadcast addresses:
/// the gateway is usually the SVI's own address.
pub fn svis_containing(ip: Ipv4Addr, svis: &[SviRecord]) -> Vec<u16> {
    svis.iter()
        .filter(|svi| {
            svi.address
                .map(|address| address.network().contains(&ip))
                .unwrap_or(false)
        })
        .map(|svi| svi.vlan_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SviAddress;
    use ipnet::Ipv4Net;

    fn svi(vlan_id: u16, ip: &str, prefix_len: u8) -> SviRecord {
        SviRecord {
            vlan_id,
            name: String::new(),
            address: Some(SviAddress {
                ip: ip.parse().unwrap(),
                mask: Ipv4Net::new(Ipv4Addr::UNSPECIFIED, prefix_len)
                    .unwrap()
                    .netmask(),
                prefix_len,
            }),
            line: 1,
        }
    }

    #[test]
    fn test_netmask_prefix_conversion() {
        assert_eq!(netmask_to_prefix("255.255.255.0".parse().unwrap()), Some(24));
        assert_eq!(netmask_to_prefix("255.255.252.0".parse().unwrap()), Some(22));
        assert_eq!(netmask_to_prefix("255.255.255.255".parse().unwrap()), Some(32));
        assert_eq!(netmask_to_prefix("255.0.255.0".parse().unwrap()), None);
    }

    #[test]
    fn test_svis_containing_includes_edges() {
        let svis = vec![svi(10, "10.0.1.1", 24), svi(20, "10.0.2.1", 24)];

        assert_eq!(svis_containing("10.0.1.1".parse().unwrap(), &svis), vec![10]);
        assert_eq!(svis_containing("10.0.1.0".parse().unwrap(), &svis), vec![10]);
        assert_eq!(svis_containing("10.0.2.255".parse().unwrap(), &svis), vec![20]);
        assert!(svis_containing("10.0.5.1".parse().unwrap(), &svis).is_empty());
    }

    #[test]
    fn test_svis_containing_overlapping() {
        let svis = vec![svi(10, "10.0.0.1", 16), svi(20, "10.0.1.1", 24)];
        assert_eq!(
            svis_containing("10.0.1.1".parse().unwrap(), &svis),
            vec![10, 20]
        );
    }

    #[test]
    fn test_svis_without_address_never_match() {
        let svis = vec![SviRecord {
            vlan_id: 99,
            name: "Parking".to_string(),
            address: None,
            line: 1,
        }];
        assert!(svis_containing("10.0.0.1".parse().unwrap(), &svis).is_empty());
    }
}
