//! JWK and JWK Set rendering for the embedded keypair.
//!
//! Consumers of issued tokens fetch the JWKS document out-of-band and select
//! the verification key by `kid`; this module produces that document. Only
//! RSA signing keys appear here.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::{Result, VerificationKey};

pub trait PublicKeyToJwk: VerificationKey {
    fn to_jwk(&self) -> Result<Jwk>;
}

/// JWK Representation.
#[skip_serializing_none]
#[non_exhaustive]
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Jwk {
    pub kty: String,
    #[serde(rename = "use")]
    pub use_: Option<String>,
    pub alg: Option<String>,
    pub kid: Option<String>,

    pub n: Option<String>,
    pub e: Option<String>,
}

/// JWK Set Representation.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}
