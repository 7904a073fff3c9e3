//! Category rating ("vote") configuration codes.
//!
//! A code is three or four letters drawn from a fixed alphabet: an optional
//! leading `e`/`d` toggle, `r`/`m` for who may vote, `v` when votes are
//! visible, and `S`/`M`/`P` for the rating kind. Flags are found by
//! substring, not position.

use serde::{Serialize, Serializer};
use tracing::warn;

use crate::types::{BackupError, BackupResult};

/// Whether rating is on for a category, or inherited from the site default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteToggle {
    Enabled,
    Disabled,
    Default,
}

impl Serialize for VoteToggle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            VoteToggle::Enabled => serializer.serialize_bool(true),
            VoteToggle::Disabled => serializer.serialize_bool(false),
            VoteToggle::Default => serializer.serialize_str("default"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Eligibility {
    Registered,
    Members,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    FiveStar,
    PlusMinus,
    PlusOnly,
}

/// Decoded rating configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteSpec {
    pub enabled: VoteToggle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<Eligibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<VoteKind>,
}

impl VoteSpec {
    /// Inherit the site-wide rating policy.
    pub fn inherit() -> Self {
        Self {
            enabled: VoteToggle::Default,
            eligibility: None,
            visible: None,
            kind: None,
        }
    }
}

/// Decode a rating code. An absent or empty code inherits the site default.
///
/// An unknown eligibility letter is a fault, while an unknown kind falls back
/// to `plusonly` with a warning. The two cases differ.
pub fn decode_vote_spec(code: Option<&str>) -> BackupResult<VoteSpec> {
    let code = match code {
        Some(c) if !c.is_empty() => c,
        _ => return Ok(VoteSpec::inherit()),
    };

    let enabled = match code.chars().next() {
        Some('e') => VoteToggle::Enabled,
        Some('d') => VoteToggle::Disabled,
        _ => VoteToggle::Default,
    };

    let eligibility = if code.contains('r') {
        Eligibility::Registered
    } else if code.contains('m') {
        Eligibility::Members
    } else {
        return Err(BackupError::InvalidEligibility(code.to_string()));
    };

    let kind = if code.contains('S') {
        VoteKind::FiveStar
    } else if code.contains('M') {
        VoteKind::PlusMinus
    } else if code.contains('P') {
        VoteKind::PlusOnly
    } else {
        warn!("unknown vote kind in code '{code}', assuming plusonly");
        VoteKind::PlusOnly
    };

    Ok(VoteSpec {
        enabled,
        eligibility: Some(eligibility),
        visible: Some(code.contains('v')),
        kind: Some(kind),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_code_inherits() {
        assert_eq!(decode_vote_spec(None).unwrap(), VoteSpec::inherit());
        assert_eq!(decode_vote_spec(Some("")).unwrap(), VoteSpec::inherit());
        assert_eq!(
            serde_json::to_value(VoteSpec::inherit()).unwrap(),
            json!({"enabled": "default"})
        );
    }

    #[test]
    fn test_registered_visible_fivestar() {
        let spec = decode_vote_spec(Some("ervS")).unwrap();
        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            json!({"enabled": true, "eligibility": "registered", "visible": true, "kind": "fivestar"})
        );
    }

    #[test]
    fn test_members_hidden_plusonly() {
        let spec = decode_vote_spec(Some("emaP")).unwrap();
        assert_eq!(spec.enabled, VoteToggle::Enabled);
        assert_eq!(spec.eligibility, Some(Eligibility::Members));
        assert_eq!(spec.visible, Some(false));
        assert_eq!(spec.kind, Some(VoteKind::PlusOnly));
    }

    #[test]
    fn test_enabled_follows_prefix() {
        for (code, expected) in [
            ("drM", VoteToggle::Disabled),
            ("erM", VoteToggle::Enabled),
            ("rvM", VoteToggle::Default),
            ("xmP", VoteToggle::Default),
        ] {
            assert_eq!(decode_vote_spec(Some(code)).unwrap().enabled, expected, "{code}");
        }
        assert_eq!(
            serde_json::to_value(decode_vote_spec(Some("dmP")).unwrap().enabled).unwrap(),
            json!(false)
        );
    }

    #[test]
    fn test_plusminus() {
        let spec = decode_vote_spec(Some("ervM")).unwrap();
        assert_eq!(spec.kind, Some(VoteKind::PlusMinus));
    }

    #[test]
    fn test_unknown_eligibility_faults() {
        assert!(matches!(
            decode_vote_spec(Some("evS")),
            Err(BackupError::InvalidEligibility(_))
        ));
    }

    #[test]
    fn test_unknown_kind_defaults() {
        let spec = decode_vote_spec(Some("erv")).unwrap();
        assert_eq!(spec.kind, Some(VoteKind::PlusOnly));
    }
}
