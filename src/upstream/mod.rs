//! Outbound HTTP exchange shared by every proxy route.
//!
//! An exchange is: send under a hard deadline, read the body as text, then
//! classify it. Classification order is fixed: non-JSON, then non-2xx, then a
//! 2xx body carrying `ok: false`.

mod client;

pub use client::{classify, path_segment, snippet, RawReply, UpstreamClient, SNIPPET_MAX_CHARS};
