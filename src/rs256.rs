use openssl::{
    hash::MessageDigest,
    pkey::{PKey, Private, Public},
    rsa::Rsa,
    sign::{Signer, Verifier},
};
use smallvec::SmallVec;

use crate::{
    jwk::{Jwk, PublicKeyToJwk},
    url_safe_trailing_bits, Error, Result, SigningKey, VerificationKey,
};

/// RSA private key used to sign tokens with RS256.
#[derive(Debug)]
pub struct Rs256PrivateKey {
    key: PKey<Private>,
    kid: Option<String>,
}

impl Rs256PrivateKey {
    /// Recommended bits >= 2048.
    pub fn generate(bits: u32) -> Result<Self> {
        Ok(Self {
            key: PKey::from_rsa(Rsa::generate(bits)?)?,
            kid: None,
        })
    }

    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let key = PKey::private_key_from_pem(pem)?;
        if !key.rsa()?.check_key()? {
            return Err(Error::UnsupportedOrInvalidKey);
        }
        Ok(Self { key, kid: None })
    }

    /// Attach a key id. Signing stamps it into the token header.
    pub fn with_kid(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    /// BEGIN PUBLIC KEY
    pub fn public_key_pem(&self) -> Result<Vec<u8>> {
        Ok(self.key.public_key_to_pem()?)
    }
}

/// RSA public key used to verify RS256 signatures.
#[derive(Debug)]
pub struct Rs256PublicKey(PKey<Public>);

impl Rs256PublicKey {
    /// BEGIN PUBLIC KEY
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        Ok(Self(PKey::from_rsa(Rsa::public_key_from_pem(pem)?)?))
    }

    /// Modulus, big-endian.
    pub fn n(&self) -> Result<Vec<u8>> {
        Ok(self.0.rsa()?.n().to_vec())
    }

    /// Public exponent, big-endian.
    pub fn e(&self) -> Result<Vec<u8>> {
        Ok(self.0.rsa()?.e().to_vec())
    }
}

impl SigningKey for Rs256PrivateKey {
    fn alg(&self) -> &'static str {
        "RS256"
    }

    fn kid(&self) -> Option<&str> {
        self.kid.as_deref()
    }

    fn sign(&self, v: &[u8]) -> Result<SmallVec<[u8; 64]>> {
        let mut signer = Signer::new(MessageDigest::sha256(), self.key.as_ref())?;

        signer.update(v)?;
        Ok(signer.sign_to_vec()?.into())
    }
}

impl VerificationKey for Rs256PublicKey {
    fn verify(&self, v: &[u8], sig: &[u8], alg: &str) -> Result<()> {
        if alg != "RS256" {
            return Err(Error::AlgMismatch);
        }

        let mut verifier = Verifier::new(MessageDigest::sha256(), self.0.as_ref())?;
        if verifier.verify_oneshot(sig, v)? {
            Ok(())
        } else {
            Err(Error::VerificationError)
        }
    }
}

impl PublicKeyToJwk for Rs256PublicKey {
    fn to_jwk(&self) -> Result<Jwk> {
        Ok(Jwk {
            kty: "RSA".into(),
            use_: Some("sig".into()),
            alg: Some("RS256".into()),
            n: Some(base64::encode_config(self.n()?, url_safe_trailing_bits())),
            e: Some(base64::encode_config(self.e()?, url_safe_trailing_bits())),
            ..Jwk::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pem_round_trip() -> Result<()> {
        let k = Rs256PrivateKey::generate(2048)?;
        let pk = Rs256PublicKey::from_pem(&k.public_key_pem()?)?;

        let sig = k.sign(b"payload")?;
        assert!(pk.verify(b"payload", &sig, "RS256").is_ok());
        assert!(matches!(
            pk.verify(b"payload!", &sig, "RS256"),
            Err(Error::VerificationError)
        ));
        Ok(())
    }

    #[test]
    fn rejects_garbage_pem() {
        assert!(Rs256PrivateKey::from_pem(b"not a pem").is_err());
        assert!(Rs256PublicKey::from_pem(b"not a pem").is_err());
    }

    #[test]
    fn verification_is_gated_on_alg() -> Result<()> {
        let k = Rs256PrivateKey::generate(2048)?;
        let pk = Rs256PublicKey::from_pem(&k.public_key_pem()?)?;

        let sig = k.sign(b"payload")?;
        assert!(matches!(
            pk.verify(b"payload", &sig, "RS384"),
            Err(Error::AlgMismatch)
        ));
        Ok(())
    }

    #[test]
    fn kid_travels_with_the_key() -> Result<()> {
        let k = Rs256PrivateKey::generate(2048)?;
        assert_eq!(k.kid(), None);
        let k = k.with_kid("my key");
        assert_eq!(k.kid(), Some("my key"));
        assert_eq!(SigningKey::alg(&k), "RS256");
        Ok(())
    }

    #[test]
    fn public_jwk_carries_rsa_components() -> Result<()> {
        let k = Rs256PrivateKey::generate(2048)?;
        let pk = Rs256PublicKey::from_pem(&k.public_key_pem()?)?;

        let jwk = pk.to_jwk()?;
        assert_eq!(jwk.kty, "RSA");
        assert_eq!(jwk.alg.as_deref(), Some("RS256"));
        assert!(jwk.n.is_some());
        assert!(jwk.e.is_some());
        Ok(())
    }
}
