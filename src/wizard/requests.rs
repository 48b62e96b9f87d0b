//! Request tokens for AI calls.
//!
//! Each stage remembers the token of its most recent request. A reply is only
//! applied when it carries that token, so a reply that arrives after a newer
//! request, or after a reset, is dropped instead of overwriting fresher state.

use crate::gateway::{CompletionRequest, RequestKind};

/// Identifies one issued AI request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken {
    kind: RequestKind,
    seq: u64,
}

impl RequestToken {
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// A prompt issued by a `begin_*` call, waiting for its reply.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub token: RequestToken,
    pub request: CompletionRequest,
}

/// What happened to a reply handed to an `apply_*` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// A newer request or a reset superseded this one; nothing changed.
    Stale,
}

/// Latest outstanding token per stage.
///
/// The counter is never rewound, so tokens issued before a reset can never
/// match tokens issued after it.
#[derive(Debug, Clone, Default)]
pub(crate) struct RequestTokens {
    counter: u64,
    latest: [Option<u64>; 3],
}

impl RequestTokens {
    pub(crate) fn issue(&mut self, kind: RequestKind) -> RequestToken {
        self.counter += 1;
        self.latest[kind.index()] = Some(self.counter);
        RequestToken {
            kind,
            seq: self.counter,
        }
    }

    pub(crate) fn is_current(&self, token: RequestToken) -> bool {
        self.latest[token.kind.index()] == Some(token.seq)
    }

    /// Mark the token's stage as answered.
    pub(crate) fn settle(&mut self, token: RequestToken) {
        if self.is_current(token) {
            self.latest[token.kind.index()] = None;
        }
    }

    pub(crate) fn any_pending(&self) -> bool {
        self.latest.iter().any(Option::is_some)
    }

    pub(crate) fn invalidate_all(&mut self) {
        self.latest = [None; 3];
    }
}
