//! Wire formats spoken by the gateway.

pub mod form;
pub mod xml;
