//! Batched request transfers.
//!
//! A [`TransferBuilder`] first performs a discovery exchange: it sends one
//! request and reads its response to learn how large a response is once
//! the request's tuple is subtracted. Every later request is expected to
//! produce a response of that raw size plus its own tuple length.

use tracing::{debug, info};
use ttbench_payload::Payload;
use ttbench_wire::codec::{self, MP_UINT32, SIZE_FIELD_LEN};
use ttbench_wire::{RequestKind, RequestParams, encode_template, patch_size_field};

use crate::connection::Connection;
use crate::error::{ClientError, ClientResult};
use crate::tuple::TupleEncoder;

/// One batch of requests together with the buffer its responses land in.
///
/// Borrows its storage from the [`TransferBuilder`] that produced it.
#[derive(Debug)]
pub struct Transfer<'a> {
    requests: &'a [u8],
    request_offsets: &'a [usize],
    response_sizes: &'a [usize],
    response_buffer: &'a mut [u8],
}

impl Transfer<'_> {
    /// Number of requests in the batch.
    pub fn request_count(&self) -> usize {
        self.request_offsets.len()
    }

    /// The encoded requests, back to back.
    pub fn requests(&self) -> &[u8] {
        self.requests
    }

    /// Start offset of each request within [`Transfer::requests`].
    pub fn request_offsets(&self) -> &[usize] {
        self.request_offsets
    }

    /// Expected full size of each response, size field included.
    pub fn response_sizes(&self) -> &[usize] {
        self.response_sizes
    }

    pub fn response_buffer(&self) -> &[u8] {
        self.response_buffer
    }

    pub fn response_buffer_mut(&mut self) -> &mut [u8] {
        self.response_buffer
    }

    /// Checks that every response declares its expected size.
    pub fn check(&self) -> ClientResult<()> {
        ttbench_wire::validate_responses(self.response_buffer, self.response_sizes)?;
        Ok(())
    }
}

/// Produces transfers of a fixed request kind and batch size.
#[derive(Debug)]
pub struct TransferBuilder {
    kind: RequestKind,
    template: Vec<u8>,
    encoder: TupleEncoder,
    payload: Payload,
    per_transfer: usize,
    raw_response_size: usize,
    requests: Vec<u8>,
    request_offsets: Vec<usize>,
    response_sizes: Vec<usize>,
    response_buffer: Vec<u8>,
}

impl TransferBuilder {
    /// Creates a builder for `kind`, performing the discovery exchange over
    /// `conn`.
    ///
    /// The discovery request consumes one tuple from `payload`.
    pub fn new<C: Connection + ?Sized>(
        conn: &mut C,
        payload: Payload,
        kind: RequestKind,
        params: &RequestParams,
        per_transfer: usize,
    ) -> ClientResult<Self> {
        if per_transfer == 0 {
            return Err(ClientError::EmptyTransfer);
        }

        let template = encode_template(kind, params)?;
        let mut builder = Self {
            kind,
            template,
            encoder: TupleEncoder::new(),
            payload,
            per_transfer,
            raw_response_size: 0,
            requests: Vec::new(),
            request_offsets: Vec::with_capacity(per_transfer),
            response_sizes: Vec::with_capacity(per_transfer),
            response_buffer: Vec::new(),
        };
        builder.raw_response_size = builder.discover(conn)?;

        info!(
            request = %kind,
            per_transfer,
            raw_response_size = builder.raw_response_size,
            "prepared transfer builder"
        );
        Ok(builder)
    }

    /// Like [`TransferBuilder::new`], resolving the request kind by name.
    ///
    /// An unknown name fails before anything is sent.
    pub fn from_name<C: Connection + ?Sized>(
        conn: &mut C,
        payload: Payload,
        name: &str,
        params: &RequestParams,
        per_transfer: usize,
    ) -> ClientResult<Self> {
        let kind: RequestKind = name.parse()?;
        Self::new(conn, payload, kind, params, per_transfer)
    }

    /// Builds the next batch of requests.
    pub fn next(&mut self) -> ClientResult<Transfer<'_>> {
        self.requests.clear();
        self.request_offsets.clear();
        self.response_sizes.clear();

        for _ in 0..self.per_transfer {
            let start = self.requests.len();
            let tuple_len = self.push_request()?;
            self.request_offsets.push(start);
            self.response_sizes.push(self.raw_response_size + tuple_len);
        }

        let total: usize = self.response_sizes.iter().sum();
        self.response_buffer.resize(total, 0);
        debug!(
            requests = self.per_transfer,
            request_bytes = self.requests.len(),
            response_bytes = total,
            "built transfer"
        );

        Ok(Transfer {
            requests: &self.requests,
            request_offsets: &self.request_offsets,
            response_sizes: &self.response_sizes,
            response_buffer: &mut self.response_buffer,
        })
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn per_transfer(&self) -> usize {
        self.per_transfer
    }

    /// Response size for a request of this kind with an empty tuple.
    pub fn raw_response_size(&self) -> usize {
        self.raw_response_size
    }

    pub fn template(&self) -> &[u8] {
        &self.template
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Appends the template plus the next tuple to the request buffer and
    /// patches the new request's size field. Returns the tuple length.
    fn push_request(&mut self) -> ClientResult<usize> {
        let start = self.requests.len();
        self.requests.extend_from_slice(&self.template);
        let tuple_len = if self.kind.appends_tuple() {
            self.encoder
                .encode_next(&mut self.payload, &mut self.requests)?
        } else {
            0
        };
        patch_size_field(&mut self.requests, start, tuple_len)?;
        Ok(tuple_len)
    }

    fn discover<C: Connection + ?Sized>(&mut self, conn: &mut C) -> ClientResult<usize> {
        self.requests.clear();
        let tuple_len = self.push_request()?;

        let sent = conn.send(&self.requests)?;
        if sent != self.requests.len() {
            return Err(ClientError::ShortWrite {
                sent,
                expected: self.requests.len(),
            });
        }

        let mut size_field = [0u8; SIZE_FIELD_LEN];
        conn.recv_exact(&mut size_field)?;
        if size_field[0] != MP_UINT32 {
            return Err(ClientError::UnexpectedSizeMarker(size_field[0]));
        }
        let body_len = codec::get_u32_be(&size_field[1..]) as usize;

        self.response_buffer.clear();
        self.response_buffer.resize(body_len, 0);
        conn.recv_exact(&mut self.response_buffer)?;

        let response = SIZE_FIELD_LEN + body_len;
        debug!(response, tuple = tuple_len, "discovery response received");
        response
            .checked_sub(tuple_len)
            .ok_or(ClientError::ResponseTooSmall {
                response,
                tuple: tuple_len,
            })
    }
}
