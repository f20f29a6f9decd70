//! Wire shapes exchanged with gateway callers.
//!
//! Field names are camelCase on the wire. Request fields also accept the
//! short names clients historically sent (`wallet`, `hash`, `cid`).

use serde::{Deserialize, Serialize};

use attest_ledger::{DocumentRecord, RegistrationReceipt, RevocationReceipt, VerificationResult};
use attest_types::{Fingerprint, OwnerId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(alias = "wallet")]
    pub caller: String,
    #[serde(alias = "hash")]
    pub fingerprint: String,
    pub name: String,
    #[serde(default, alias = "cid", skip_serializing_if = "Option::is_none")]
    pub external_pointer: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    /// Commit hash, `0x`-prefixed.
    pub commit_ref: String,
    pub commit_index: u64,
    pub fingerprint: String,
    pub owner: String,
    pub name: String,
    pub external_pointer: Option<String>,
    pub registered_at: u64,
}

impl RegisterResponse {
    /// Whether the stored values are the ones `request` asked for, with
    /// the fingerprint and caller compared in the store's canonical form.
    pub fn confirms(&self, request: &RegisterRequest) -> bool {
        same_parsed(&self.fingerprint, &request.fingerprint, Fingerprint::parse)
            && same_parsed(&self.owner, &request.caller, OwnerId::parse)
            && self.name == request.name.trim()
            && self.external_pointer.as_deref().map(str::trim)
                == request
                    .external_pointer
                    .as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
    }
}

/// Both parse and parse to the same value.
fn same_parsed<T: PartialEq, E>(
    a: &str,
    b: &str,
    parse: impl Fn(&str) -> Result<T, E>,
) -> bool {
    matches!((parse(a), parse(b)), (Ok(a), Ok(b)) if a == b)
}

impl From<RegistrationReceipt> for RegisterResponse {
    fn from(receipt: RegistrationReceipt) -> Self {
        Self {
            commit_ref: receipt.commit.to_hex(),
            commit_index: receipt.commit.index,
            fingerprint: receipt.fingerprint.to_string(),
            owner: receipt.owner.to_canonical(),
            name: receipt.name,
            external_pointer: receipt.external_pointer,
            registered_at: receipt.registered_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeRequest {
    #[serde(alias = "wallet")]
    pub caller: String,
    #[serde(alias = "hash")]
    pub fingerprint: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeResponse {
    pub commit_ref: String,
    pub commit_index: u64,
    pub fingerprint: String,
    pub revoked_at: u64,
}

impl From<RevocationReceipt> for RevokeResponse {
    fn from(receipt: RevocationReceipt) -> Self {
        Self {
            commit_ref: receipt.commit.to_hex(),
            commit_index: receipt.commit.index,
            fingerprint: receipt.fingerprint.to_string(),
            revoked_at: receipt.revoked_at,
        }
    }
}

/// Null-filled unless `exists` is true.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub exists: bool,
    pub owner: Option<String>,
    pub registered_at: Option<u64>,
    pub name: Option<String>,
    pub external_pointer: Option<String>,
    pub revoked: bool,
}

impl From<VerificationResult> for VerifyResponse {
    fn from(result: VerificationResult) -> Self {
        Self {
            exists: result.exists,
            owner: result.owner.map(|o| o.to_canonical()),
            registered_at: result.registered_at,
            name: result.name,
            external_pointer: result.external_pointer,
            revoked: result.revoked,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEntry {
    pub fingerprint: String,
    pub name: String,
    pub registered_at: u64,
    pub external_pointer: Option<String>,
    pub revoked: bool,
}

impl From<DocumentRecord> for DocumentEntry {
    fn from(record: DocumentRecord) -> Self {
        Self {
            fingerprint: record.fingerprint.to_string(),
            name: record.name,
            registered_at: record.registered_at,
            external_pointer: record.external_pointer,
            revoked: record.revoked,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub owner: String,
    pub documents: Vec<DocumentEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_request_accepts_short_names() {
        let req: RegisterRequest = serde_json::from_value(json!({
            "wallet": "0xAbC0000000000000000000000000000000000001",
            "hash": "abc123",
            "name": "doc.pdf",
            "cid": "bafy123",
        }))
        .unwrap();
        assert_eq!(req.fingerprint, "abc123");
        assert_eq!(req.external_pointer.as_deref(), Some("bafy123"));

        let camel: RegisterRequest = serde_json::from_value(json!({
            "caller": "0x01",
            "fingerprint": "abc123",
            "name": "doc.pdf",
        }))
        .unwrap();
        assert!(camel.external_pointer.is_none());
    }

    #[test]
    fn missing_verify_serialises_nulls() {
        let json = serde_json::to_value(VerifyResponse::default()).unwrap();
        assert_eq!(
            json,
            json!({
                "exists": false,
                "owner": null,
                "registeredAt": null,
                "name": null,
                "externalPointer": null,
                "revoked": false,
            })
        );
    }

    #[test]
    fn confirms_compares_normalised_fields() {
        let req = RegisterRequest {
            caller: "0xABC0000000000000000000000000000000000001".into(),
            fingerprint: "ABC123".into(),
            name: " doc.pdf ".into(),
            external_pointer: Some("".into()),
        };
        let mut resp = RegisterResponse {
            commit_ref: "0x00".into(),
            commit_index: 1,
            fingerprint: "abc123".into(),
            owner: "0xabc0000000000000000000000000000000000001".into(),
            name: "doc.pdf".into(),
            external_pointer: None,
            registered_at: 1,
        };
        assert!(resp.confirms(&req));

        resp.owner = "0XABC0000000000000000000000000000000000001".into();
        assert!(resp.confirms(&req));

        resp.name = "other.pdf".into();
        assert!(!resp.confirms(&req));
    }

    #[test]
    fn confirms_keeps_case_of_non_hex_keys() {
        let req = RegisterRequest {
            caller: "0xabc0000000000000000000000000000000000001".into(),
            fingerprint: "Doc-1".into(),
            name: "doc.pdf".into(),
            external_pointer: None,
        };
        let mut resp = RegisterResponse {
            commit_ref: "0x00".into(),
            commit_index: 1,
            fingerprint: "DOC-1".into(),
            owner: "0xabc0000000000000000000000000000000000001".into(),
            name: "doc.pdf".into(),
            external_pointer: None,
            registered_at: 1,
        };
        assert!(!resp.confirms(&req));

        resp.fingerprint = "Doc-1".into();
        assert!(resp.confirms(&req));

        resp.owner = "not-an-address".into();
        assert!(!resp.confirms(&req));
    }
}
