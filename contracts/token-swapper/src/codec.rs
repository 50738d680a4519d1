//! Route Wire Encoding
//!
//! Routes computed off-path are submitted as CBOR. Decoding rejects broken
//! hop chains; endpoint and pool checks happen at execution time.

use vaultzap_common::{
    errors::{VaultZapError, VaultZapResult},
    types::Route,
    Vec,
};

/// Encode a route as CBOR
pub fn encode_route(route: &Route) -> VaultZapResult<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(route, &mut buf).map_err(|_| VaultZapError::EncodingFailed)?;
    Ok(buf)
}

/// Decode a CBOR route
pub fn decode_route(bytes: &[u8]) -> VaultZapResult<Route> {
    let route: Route = ciborium::from_reader(bytes).map_err(|_| VaultZapError::EncodingFailed)?;
    if !route.is_continuous() {
        return Err(VaultZapError::InvalidRoute {
            reason: "hops are not continuous",
        });
    }
    Ok(route)
}
