//! IPROTO request templates.
//!
//! Every request of a benchmark run shares the same leading bytes: the size
//! field, the header map and the body map up to the key or tuple. Only the
//! trailing tuple differs between requests, so each kind is encoded once
//! into a template and the size field is patched per request.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::codec::{self, SIZE_FIELD_LEN};
use crate::error::{WireError, WireResult};
use crate::frame::FrameBuilder;

// IPROTO header keys.
const IPROTO_REQUEST_TYPE: u8 = 0x00;
const IPROTO_SYNC: u8 = 0x01;

// IPROTO body keys.
const IPROTO_SPACE_ID: u8 = 0x10;
const IPROTO_INDEX_ID: u8 = 0x11;
const IPROTO_LIMIT: u8 = 0x12;
const IPROTO_OFFSET: u8 = 0x13;
const IPROTO_ITERATOR: u8 = 0x14;
const IPROTO_KEY: u8 = 0x20;
const IPROTO_TUPLE: u8 = 0x21;

// IPROTO request type codes.
const IPROTO_SELECT: u8 = 0x01;
const IPROTO_INSERT: u8 = 0x02;
const IPROTO_REPLACE: u8 = 0x03;
const IPROTO_DELETE: u8 = 0x05;
const IPROTO_PING: u8 = 0x40;

/// Size of the `{REQUEST_TYPE: type, SYNC: 0}` header map.
const HEADER_LEN: usize = 5;

/// A supported request kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Ping,
    Insert,
    Replace,
    Delete,
    Select,
}

impl RequestKind {
    /// All request kinds.
    pub const ALL: [RequestKind; 5] = [
        RequestKind::Ping,
        RequestKind::Insert,
        RequestKind::Replace,
        RequestKind::Delete,
        RequestKind::Select,
    ];

    /// Name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            RequestKind::Ping => "ping",
            RequestKind::Insert => "insert",
            RequestKind::Replace => "replace",
            RequestKind::Delete => "delete",
            RequestKind::Select => "select",
        }
    }

    /// IPROTO request type code.
    pub fn type_code(self) -> u8 {
        match self {
            RequestKind::Ping => IPROTO_PING,
            RequestKind::Insert => IPROTO_INSERT,
            RequestKind::Replace => IPROTO_REPLACE,
            RequestKind::Delete => IPROTO_DELETE,
            RequestKind::Select => IPROTO_SELECT,
        }
    }

    /// Whether a generated tuple or key follows the template.
    pub fn appends_tuple(self) -> bool {
        !matches!(self, RequestKind::Ping)
    }
}

impl Display for RequestKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RequestKind {
    type Err = WireError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        RequestKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| WireError::UnknownRequest(name.to_string()))
    }
}

/// Numeric request parameters shared by all requests of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestParams {
    /// Target space.
    pub space_id: u32,
    /// Target index (delete and select).
    pub index_id: u32,
    /// Maximum number of tuples to return (select).
    pub limit: u32,
    /// Number of tuples to skip (select).
    pub offset: u32,
    /// Iterator type (select).
    pub iterator: u32,
}

impl Default for RequestParams {
    fn default() -> Self {
        Self {
            space_id: 512,
            index_id: 0,
            limit: u32::MAX,
            offset: 0,
            iterator: 0,
        }
    }
}

/// Encodes the leading bytes shared by every request of `kind`.
///
/// The returned template carries a size field that describes exactly the
/// template's own header and body; callers appending a tuple must add its
/// length to that field.
pub fn encode_template(kind: RequestKind, params: &RequestParams) -> WireResult<Vec<u8>> {
    let size = template_size(kind, params);
    let header_and_body = u32::try_from(size - SIZE_FIELD_LEN).map_err(|_| {
        WireError::FrameTooLarge {
            size,
            max: u32::MAX,
        }
    })?;

    let mut builder = FrameBuilder::new(size);
    builder.append_uint32(header_and_body, "header and body size");
    append_header(&mut builder, kind);

    match kind {
        RequestKind::Ping => {
            builder.append_raw(0x80, "body");
        }
        RequestKind::Insert | RequestKind::Replace => {
            builder.append_raw(0x82, "body");
            builder.append_raw(IPROTO_SPACE_ID, "IPROTO_SPACE_ID");
            builder.append_uint(params.space_id.into(), "space ID");
            builder.append_raw(IPROTO_TUPLE, "IPROTO_TUPLE");
        }
        RequestKind::Delete => {
            builder.append_raw(0x83, "body");
            builder.append_raw(IPROTO_SPACE_ID, "IPROTO_SPACE_ID");
            builder.append_uint(params.space_id.into(), "space ID");
            builder.append_raw(IPROTO_INDEX_ID, "IPROTO_INDEX_ID");
            builder.append_uint(params.index_id.into(), "index ID");
            builder.append_raw(IPROTO_KEY, "IPROTO_KEY");
        }
        RequestKind::Select => {
            builder.append_raw(0x86, "body");
            builder.append_raw(IPROTO_SPACE_ID, "IPROTO_SPACE_ID");
            builder.append_uint(params.space_id.into(), "space ID");
            builder.append_raw(IPROTO_INDEX_ID, "IPROTO_INDEX_ID");
            builder.append_uint(params.index_id.into(), "index ID");
            builder.append_raw(IPROTO_LIMIT, "IPROTO_LIMIT");
            builder.append_uint(params.limit.into(), "limit");
            builder.append_raw(IPROTO_OFFSET, "IPROTO_OFFSET");
            builder.append_uint(params.offset.into(), "offset");
            builder.append_raw(IPROTO_ITERATOR, "IPROTO_ITERATOR");
            builder.append_uint(params.iterator.into(), "iterator type");
            builder.append_raw(IPROTO_KEY, "IPROTO_KEY");
        }
    }

    let template = builder.finish()?;
    tracing::debug!(request = %kind, size = template.len(), "encoded request template");
    Ok(template)
}

/// Exact template size for `kind`, including the size field.
pub fn template_size(kind: RequestKind, params: &RequestParams) -> usize {
    let uint = |value: u32| codec::sizeof_uint(value.into());
    let body = match kind {
        RequestKind::Ping => 1,
        // map, space key + value, tuple key
        RequestKind::Insert | RequestKind::Replace => 1 + 1 + uint(params.space_id) + 1,
        // map, space, index, key
        RequestKind::Delete => {
            1 + 1 + uint(params.space_id) + 1 + uint(params.index_id) + 1
        }
        // map, five keyed numbers, key
        RequestKind::Select => {
            1 + 5
                + uint(params.space_id)
                + uint(params.index_id)
                + uint(params.limit)
                + uint(params.offset)
                + uint(params.iterator)
                + 1
        }
    };
    SIZE_FIELD_LEN + HEADER_LEN + body
}

fn append_header(builder: &mut FrameBuilder, kind: RequestKind) {
    builder.append_raw(0x82, "header");
    builder.append_raw(IPROTO_REQUEST_TYPE, "IPROTO_REQUEST_TYPE");
    builder.append_raw(kind.type_code(), "request type");
    builder.append_raw(IPROTO_SYNC, "IPROTO_SYNC");
    builder.append_raw(0x00, "sync value");
}

/// Adds `added` bytes to the size field of the request starting at `start`.
///
/// Returns the new header+body size.
pub fn patch_size_field(buf: &mut [u8], start: usize, added: usize) -> WireResult<u32> {
    let field = &mut buf[start + 1..start + SIZE_FIELD_LEN];
    let size = codec::get_u32_be(field);
    let patched = u32::try_from(added)
        .ok()
        .and_then(|added| size.checked_add(added))
        .ok_or(WireError::SizeFieldOverflow { size, added })?;
    codec::put_u32_be(field, patched);
    Ok(patched)
}
