//! Protocol core: parameter sets, canonical serialization, signatures and the
//! trade vocabulary, plus the ports the application layer talks through.

pub mod canonical;
pub mod params;
pub mod ports;
pub mod signature;
pub mod trade;
