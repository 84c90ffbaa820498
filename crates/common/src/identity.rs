//! Voter identity and rate-limit key derivation.
//!
//! The intake path never stores raw identifiers; every source is hashed
//! before it becomes a rate-limit key. Device id is preferred over source
//! IP, which is preferred over the user-agent string.

use sha2::{Digest, Sha256};

/// Identity hints extracted from a request.
#[derive(Debug, Clone, Default)]
pub struct VoterIdentity {
    /// Client-generated device identifier, if the client sent one.
    pub device_id: Option<String>,
    /// Source IP (first X-Forwarded-For entry or X-Real-IP).
    pub ip: Option<String>,
    /// User-agent header.
    pub user_agent: Option<String>,
}

impl VoterIdentity {
    /// Derive the stable rate-limit key for this identity.
    ///
    /// Keys are prefixed with their source so a device id can never
    /// collide with an IP-derived key.
    #[must_use]
    pub fn voter_key(&self) -> String {
        if let Some(device_id) = &self.device_id {
            format!("device:{}", sha256_hex(device_id))
        } else if let Some(ip) = &self.ip {
            format!("ip:{}", sha256_hex(ip))
        } else if let Some(user_agent) = &self.user_agent {
            format!("ua:{}", sha256_hex(user_agent))
        } else {
            // No identity signal at all; all such callers share one bucket
            "anon".to_string()
        }
    }
}

/// Hex-encoded SHA-256 of the input.
#[must_use]
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_device_id_preferred_over_ip() {
        let identity = VoterIdentity {
            device_id: Some("device-1234".into()),
            ip: Some("203.0.113.7".into()),
            user_agent: Some("Mozilla/5.0".into()),
        };
        assert!(identity.voter_key().starts_with("device:"));
    }

    #[test]
    fn test_ip_preferred_over_user_agent() {
        let identity = VoterIdentity {
            device_id: None,
            ip: Some("203.0.113.7".into()),
            user_agent: Some("Mozilla/5.0".into()),
        };
        assert!(identity.voter_key().starts_with("ip:"));
    }

    #[test]
    fn test_user_agent_fallback() {
        let identity = VoterIdentity {
            device_id: None,
            ip: None,
            user_agent: Some("Mozilla/5.0".into()),
        };
        assert!(identity.voter_key().starts_with("ua:"));
    }

    #[test]
    fn test_sources_never_collide() {
        let value = "203.0.113.7";
        let as_device = VoterIdentity {
            device_id: Some(value.into()),
            ..VoterIdentity::default()
        };
        let as_ip = VoterIdentity {
            ip: Some(value.into()),
            ..VoterIdentity::default()
        };
        assert_ne!(as_device.voter_key(), as_ip.voter_key());
    }

    #[test]
    fn test_key_is_stable() {
        let identity = VoterIdentity {
            device_id: Some("device-1234".into()),
            ..VoterIdentity::default()
        };
        assert_eq!(identity.voter_key(), identity.voter_key());
    }

    #[test]
    fn test_sha256_hex() {
        // Known vector for the empty string
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
