//! Server error taxonomy

use hyper::StatusCode;
use vigil_common::ProtocolError;

/// Fatal startup errors. The only error kind that crosses the start boundary;
/// everything else is contained within the owning request.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// Faults raised while handling a single request. Each maps to a response
/// status at the dispatch boundary; the accept loop is never affected.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("handler failure: {0}")]
    Handler(String),
}

impl DispatchError {
    /// Response status this fault maps to
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::Protocol(ProtocolError::Parse(_))
            | DispatchError::Protocol(ProtocolError::Schema(_)) => StatusCode::BAD_REQUEST,
            DispatchError::Protocol(ProtocolError::Encode(_)) | DispatchError::Handler(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_schema_map_to_bad_request() {
        let parse = DispatchError::from(ProtocolError::Parse("eof".into()));
        assert_eq!(parse.status(), StatusCode::BAD_REQUEST);

        let schema = DispatchError::from(ProtocolError::Schema("missing field".into()));
        assert_eq!(schema.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn encode_and_handler_map_to_internal_error() {
        let encode = DispatchError::from(ProtocolError::Encode("oops".into()));
        assert_eq!(encode.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let handler = DispatchError::Handler("boom".into());
        assert_eq!(handler.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
