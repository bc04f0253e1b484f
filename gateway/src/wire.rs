//! Request and response shapes of the gateway.

use factfund_types::{deserialize_optional, FundError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Body of every gateway request.
#[derive(Debug, Serialize)]
pub struct CallRequest<'a, A: ?Sized> {
    pub method: &'a str,
    pub args: &'a A,
}

/// `{base_url}/call`, tolerating a trailing slash on the base.
pub fn call_url(base_url: &str) -> String {
    format!("{}/call", base_url.trim_end_matches('/'))
}

/// Decode a response body, reporting failures as transport errors.
pub fn decode<T: DeserializeOwned>(method: &str, body: &str) -> Result<T, FundError> {
    serde_json::from_str(body)
        .map_err(|e| FundError::Transport(format!("undecodable {method} response: {e}")))
}

/// One chunk as returned by `getProposalFileChunk`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChunkPayload {
    pub chunk: Vec<u8>,
}

/// The optional chunk, in any of the encodings the gateway uses.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct MaybeChunk(
    #[serde(deserialize_with = "deserialize_optional")] pub Option<ChunkPayload>,
);

impl MaybeChunk {
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        self.0.map(|payload| payload.chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factfund_types::TaggedResult;

    #[test]
    fn request_body_shape() {
        #[derive(Serialize)]
        struct Args {
            id: u64,
        }
        let body = serde_json::to_value(CallRequest {
            method: "getProposal",
            args: &Args { id: 4 },
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "method": "getProposal", "args": { "id": 4 } })
        );
    }

    #[test]
    fn call_url_joins_cleanly() {
        assert_eq!(
            call_url("http://localhost:4943/backend/"),
            "http://localhost:4943/backend/call"
        );
        assert_eq!(call_url("http://gw"), "http://gw/call");
    }

    #[test]
    fn tagged_results_decode_in_both_casings() {
        let lower: TaggedResult<u64> = decode("createProposal", r#"{"ok": 3}"#).unwrap();
        let upper: TaggedResult<u64> = decode("createProposal", r#"{"Ok": 3}"#).unwrap();
        assert_eq!(lower.into_result(), Ok(3));
        assert_eq!(upper.into_result(), Ok(3));

        let err: TaggedResult<()> =
            decode("claimProposal", r#"{"Err": "Only the creator can claim"}"#).unwrap();
        assert_eq!(
            err.into_result(),
            Err(FundError::Authorization("Only the creator can claim".into()))
        );
    }

    #[test]
    fn chunk_optional_decodes_every_form() {
        let none: MaybeChunk = decode("getProposalFileChunk", "null").unwrap();
        assert_eq!(none.into_bytes(), None);
        let empty: MaybeChunk = decode("getProposalFileChunk", "[]").unwrap();
        assert_eq!(empty.into_bytes(), None);
        let wrapped: MaybeChunk =
            decode("getProposalFileChunk", r#"[{"chunk": [1, 2, 3]}]"#).unwrap();
        assert_eq!(wrapped.into_bytes(), Some(vec![1, 2, 3]));
        let plain: MaybeChunk = decode("getProposalFileChunk", r#"{"chunk": [4]}"#).unwrap();
        assert_eq!(plain.into_bytes(), Some(vec![4]));
    }

    #[test]
    fn undecodable_body_is_a_transport_error() {
        let err = decode::<u64>("getProposalFileTotalChunks", "<html>").unwrap_err();
        assert!(
            matches!(err, FundError::Transport(msg) if msg.contains("getProposalFileTotalChunks"))
        );
    }
}
