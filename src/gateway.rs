use anyhow::Result;
use std::net::Ipv4Addr;
use tracing::{debug, info};

use crate::subnet::svis_containing;
use crate::target::TargetPlatform;
use crate::{GatewayPlacement, MigrationError, SviRecord};

/// Decide which imported SVI carries the default gateway.
///
/// Exactly one SVI whose subnet contains `gateway` owns it. With no match
/// the gateway must already be reachable on the target, either asserted by
/// the caller (`assume_reachable`) or confirmed by asking the target. More
/// than one match is ambiguous and fatal.
pub fn resolve_gateway(
    gateway: Ipv4Addr,
    svis: &[SviRecord],
    serials: &[String],
    target: &mut dyn TargetPlatform,
    assume_reachable: bool,
) -> Result<GatewayPlacement> {
    let owners = svis_containing(gateway, svis);
    debug!(%gateway, owners = ?owners, "matching default gateway against SVIs");

    match owners.as_slice() {
        [vlan_id] => {
            info!(%gateway, vlan = vlan_id, "default gateway belongs to imported SVI");
            Ok(GatewayPlacement {
                gateway_ip: gateway,
                owning_vlan_id: Some(*vlan_id),
            })
        }
        [] if assume_reachable => {
            info!(%gateway, "default gateway assumed reachable on target");
            Ok(GatewayPlacement {
                gateway_ip: gateway,
                owning_vlan_id: None,
            })
        }
        [] => {
            if target.check_gateway_reachable(serials, gateway)? {
                info!(%gateway, "default gateway already reachable on target");
                Ok(GatewayPlacement {
                    gateway_ip: gateway,
                    owning_vlan_id: None,
                })
            } else {
                Err(MigrationError::GatewayUnreachable {
                    gateway: gateway.to_string(),
                }
                .into())
            }
        }
        _ => Err(MigrationError::AmbiguousGateway {
            gateway: gateway.to_string(),
            vlans: owners.clone(),
        }
        .into()),
    }
}
