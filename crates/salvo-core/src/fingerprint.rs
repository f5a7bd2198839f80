//! Countdown fingerprints: stable cache identities for timing configurations.
//!
//! The digest covers a normalized projection of the request. Each participant
//! is reduced to `(name, attack_start_time)` and the list is sorted by offset,
//! then by name (byte order), so input ordering never matters. The synthesis
//! algorithm version and the voice parameters are mixed in so that a change
//! of voice, rate or assembly format never reuses a stale artifact.
//!
//! Every field is length-prefixed before hashing; the encoding is identical
//! on every platform and across restarts.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::domain::{CountdownRequest, VoiceParams};

/// Version tag of the artifact assembly algorithm.
///
/// Bump whenever the intro wording, segment order or output format changes.
pub const ALGORITHM_VERSION: &str = "sync-v3";

/// Hex-encoded SHA-256 digest identifying one countdown configuration.
///
/// Deserialization goes through [`Fingerprint::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

/// A string that is not a rendered fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid fingerprint {0:?}: expected 64 lowercase hex characters")]
pub struct InvalidFingerprint(pub String);

impl Fingerprint {
    /// Length of the hex digest in characters.
    pub const LEN: usize = 64;

    /// Compute the fingerprint of `request` as narrated with `voice`.
    #[must_use]
    pub fn compute(request: &CountdownRequest, voice: &VoiceParams) -> Self {
        Self::compute_versioned(request, voice, ALGORITHM_VERSION)
    }

    /// Compute with an explicit algorithm version tag.
    #[must_use]
    pub fn compute_versioned(request: &CountdownRequest, voice: &VoiceParams, version: &str) -> Self {
        let mut normalized: Vec<(u32, &str)> = request
            .participants
            .iter()
            .map(|p| (p.attack_start_time, p.name.as_str()))
            .collect();
        normalized.sort_unstable();

        let mut hasher = Sha256::new();
        update_field(&mut hasher, version.as_bytes());
        update_field(&mut hasher, voice.voice.as_bytes());
        update_field(&mut hasher, &voice.rate.to_le_bytes());
        hasher.update((normalized.len() as u64).to_le_bytes());
        for (offset, name) in normalized {
            update_field(&mut hasher, name.as_bytes());
            update_field(&mut hasher, &offset.to_le_bytes());
        }

        Self(format!("{:x}", hasher.finalize()))
    }

    /// Parse a previously rendered fingerprint (64 lowercase hex chars).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let valid = s.len() == Self::LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the cached artifact for this fingerprint.
    #[must_use]
    pub fn artifact_file_name(&self) -> String {
        format!("{}.wav", self.0)
    }

    /// Short prefix for log lines.
    #[must_use]
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = InvalidFingerprint;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(InvalidFingerprint(value))
    }
}

impl From<Fingerprint> for String {
    fn from(fingerprint: Fingerprint) -> Self {
        fingerprint.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParticipantTiming;

    fn timing(name: &str, offset: u32) -> ParticipantTiming {
        ParticipantTiming {
            name: name.to_string(),
            attack_group: 1,
            attack_order: 1,
            time_to_destination: 10 - offset,
            attack_start_time: offset,
        }
    }

    fn voice() -> VoiceParams {
        VoiceParams::new("Samantha", 170)
    }

    fn abc() -> CountdownRequest {
        CountdownRequest::new(vec![timing("A", 0), timing("B", 3), timing("C", 3)], 5)
    }

    #[test]
    fn fingerprint_is_hex_of_fixed_length() {
        let fp = Fingerprint::compute(&abc(), &voice());
        assert_eq!(fp.as_str().len(), Fingerprint::LEN);
        assert!(Fingerprint::parse(fp.as_str()).is_some());
        assert_eq!(fp.artifact_file_name(), format!("{fp}.wav"));
    }

    #[test]
    fn input_order_does_not_matter() {
        let reordered =
            CountdownRequest::new(vec![timing("C", 3), timing("B", 3), timing("A", 0)], 5);
        assert_eq!(
            Fingerprint::compute(&abc(), &voice()),
            Fingerprint::compute(&reordered, &voice())
        );
    }

    #[test]
    fn only_name_and_offset_contribute() {
        let mut other = abc();
        other.total_duration = 9;
        other.group_filter = Some(2);
        other.participants[1].attack_order = 7;
        other.participants[1].attack_group = 3;
        assert_eq!(
            Fingerprint::compute(&abc(), &voice()),
            Fingerprint::compute(&other, &voice())
        );
    }

    #[test]
    fn changing_offset_or_name_changes_fingerprint() {
        let base = Fingerprint::compute(&abc(), &voice());

        let mut moved = abc();
        moved.participants[2].attack_start_time = 2;
        assert_ne!(base, Fingerprint::compute(&moved, &voice()));

        let mut renamed = abc();
        renamed.participants[0].name = "Z".to_string();
        assert_ne!(base, Fingerprint::compute(&renamed, &voice()));
    }

    #[test]
    fn voice_rate_and_version_change_fingerprint() {
        let base = Fingerprint::compute(&abc(), &voice());
        assert_ne!(base, Fingerprint::compute(&abc(), &VoiceParams::new("Alex", 170)));
        assert_ne!(base, Fingerprint::compute(&abc(), &VoiceParams::new("Samantha", 171)));
        assert_ne!(
            base,
            Fingerprint::compute_versioned(&abc(), &voice(), "sync-v4")
        );
    }

    #[test]
    fn field_boundaries_are_unambiguous() {
        let joined = CountdownRequest::new(vec![timing("AB", 0)], 5);
        let split = CountdownRequest::new(vec![timing("A", 0), timing("B", 0)], 5);
        assert_ne!(
            Fingerprint::compute(&joined, &voice()),
            Fingerprint::compute(&split, &voice())
        );
    }

    #[test]
    fn deserialization_validates_the_digest() {
        let fp = Fingerprint::compute(&abc(), &voice());
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{fp}\""));
        assert_eq!(serde_json::from_str::<Fingerprint>(&json).unwrap(), fp);

        let err = serde_json::from_str::<Fingerprint>("\"abc\"").unwrap_err();
        assert!(err.to_string().contains("Invalid fingerprint"));
        assert!(serde_json::from_str::<Fingerprint>(&format!("\"{}\"", "F".repeat(64))).is_err());
    }

    #[test]
    fn short_prefix_is_twelve_characters() {
        let fp = Fingerprint::compute(&abc(), &voice());
        assert_eq!(fp.short(), &fp.as_str()[..12]);
    }

    #[test]
    fn parse_rejects_malformed_digests() {
        assert!(Fingerprint::parse("abc").is_none());
        assert!(Fingerprint::parse(&"G".repeat(64)).is_none());
        assert!(Fingerprint::parse(&"A".repeat(64)).is_none());
    }
}
