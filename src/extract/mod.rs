mod blocks;
mod interfaces;
mod svi;

pub use blocks::{interface_blocks, InterfaceBlock};
pub use interfaces::{extract_interfaces, extract_shut_ports, InterfaceExtraction};
pub use svi::{extract_svis, SviExtraction};
