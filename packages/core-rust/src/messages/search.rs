//! Distributed search response message: an ordered result set plus
//! aggregate (name/value) results, correlated to the originating query by an
//! opaque request identifier.
//!
//! Body layout (tags may arrive in any order):
//!
//! ```text
//! [0: requestId i64] [1: resultsCount i32][result]*count [2: aggCount i32][nvPair]*count
//! ```
//!
//! Result records and name/value pairs are nested [`WireRecord`]s — the
//! message never interprets their internals.

use bytes::{BufMut, Bytes, BytesMut};

use crate::wire::{
    self, FieldReader, FieldWriter, WireError, WireRecord,
};

const TAG_REQUEST_ID: u8 = 0;
const TAG_RESULTS_SIZE: u8 = 1;
const TAG_AGGREGATOR_RESULTS_SIZE: u8 = 2;

const MESSAGE_NAME: &str = "SearchQueryResponse";

// ---------------------------------------------------------------------------
// SearchRequestId
// ---------------------------------------------------------------------------

/// Opaque identifier correlating a response to a single in-flight query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchRequestId(pub i64);

// ---------------------------------------------------------------------------
// NvValue / NvPair
// ---------------------------------------------------------------------------

/// Typed scalar carried by an [`NvPair`].
///
/// Each variant is marked on the wire by a one-byte kind marker so pairs of
/// mixed types can share one sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum NvValue {
    /// Boolean, one byte (0 or 1).
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// 64-bit IEEE 754 float, transported as raw bits.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Raw byte run.
    Bytes(Vec<u8>),
}

const KIND_BOOL: u8 = 0;
const KIND_INT: u8 = 1;
const KIND_DOUBLE: u8 = 2;
const KIND_STRING: u8 = 3;
const KIND_BYTES: u8 = 4;

/// A named scalar, e.g. an aggregate computed over a whole result set
/// (`("count", 3)`) or a stored attribute attached to a search result.
#[derive(Debug, Clone, PartialEq)]
pub struct NvPair {
    /// Attribute or aggregator name.
    pub name: String,
    /// The typed value.
    pub value: NvValue,
}

impl NvPair {
    /// Convenience constructor.
    #[must_use]
    pub fn new(name: impl Into<String>, value: NvValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl WireRecord for NvPair {
    fn serialize_to(&self, out: &mut BytesMut) -> Result<(), WireError> {
        wire::put_str(out, &self.name)?;
        match &self.value {
            NvValue::Bool(v) => {
                out.put_u8(KIND_BOOL);
                out.put_u8(u8::from(*v));
            }
            NvValue::Int(v) => {
                out.put_u8(KIND_INT);
                out.put_i64(*v);
            }
            NvValue::Double(v) => {
                out.put_u8(KIND_DOUBLE);
                out.put_u64(v.to_bits());
            }
            NvValue::String(v) => {
                out.put_u8(KIND_STRING);
                wire::put_str(out, v)?;
            }
            NvValue::Bytes(v) => {
                out.put_u8(KIND_BYTES);
                wire::put_raw(out, v)?;
            }
        }
        Ok(())
    }

    fn deserialize_from(buf: &mut Bytes) -> Result<Self, WireError> {
        let name = wire::get_str(buf)?;
        let marker = wire::get_u8(buf)?;
        let value = match marker {
            KIND_BOOL => NvValue::Bool(wire::get_u8(buf)? != 0),
            KIND_INT => NvValue::Int(wire::get_i64(buf)?),
            KIND_DOUBLE => NvValue::Double(f64::from_bits(wire::get_u64(buf)?)),
            KIND_STRING => NvValue::String(wire::get_str(buf)?),
            KIND_BYTES => NvValue::Bytes(wire::get_raw(buf)?.to_vec()),
            other => return Err(WireError::UnknownValueKind { marker: other }),
        };
        Ok(Self { name, value })
    }
}

// ---------------------------------------------------------------------------
// IndexQueryResult
// ---------------------------------------------------------------------------

/// One entry of a search result set: the matching record's key and the
/// attribute values the index returned alongside it.
///
/// Sequence order within a response is the relevance/storage order assigned
/// by the cluster and is preserved end to end.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexQueryResult {
    /// Key of the matching record.
    pub key: String,
    /// Attributes returned with the match, in index order.
    pub attributes: Vec<NvPair>,
}

impl WireRecord for IndexQueryResult {
    fn serialize_to(&self, out: &mut BytesMut) -> Result<(), WireError> {
        wire::put_str(out, &self.key)?;
        let count = i32::try_from(self.attributes.len()).map_err(|_| WireError::InvalidLength {
            length: i64::try_from(self.attributes.len()).unwrap_or(i64::MAX),
        })?;
        out.put_i32(count);
        for attribute in &self.attributes {
            attribute.serialize_to(out)?;
        }
        Ok(())
    }

    fn deserialize_from(buf: &mut Bytes) -> Result<Self, WireError> {
        let key = wire::get_str(buf)?;
        let count = wire::get_count(buf)?;
        let mut attributes = Vec::with_capacity(count);
        for _ in 0..count {
            attributes.push(NvPair::deserialize_from(buf)?);
        }
        Ok(Self { key, attributes })
    }
}

// ---------------------------------------------------------------------------
// SearchQueryResponse
// ---------------------------------------------------------------------------

/// Response to a distributed index query.
///
/// `results` and `aggregator_results` are always materialized sequences:
/// an empty result set round-trips as empty, never as absence.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQueryResponse {
    /// Correlates this response to the in-flight query it answers.
    pub request_id: SearchRequestId,
    /// Matching results in server-assigned order.
    pub results: Vec<IndexQueryResult>,
    /// Aggregates computed over the whole result set, in server order.
    pub aggregator_results: Vec<NvPair>,
}

impl SearchQueryResponse {
    /// Encodes this message into a wire body.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::CountMismatch`] if a sequence's iteration
    /// disagrees with its declared size (a programming defect; nothing is
    /// handed to the transport), or a length error for oversized payloads.
    pub fn dehydrate(&self) -> Result<Bytes, WireError> {
        let mut writer = FieldWriter::new();
        writer.put_i64(TAG_REQUEST_ID, self.request_id.0);
        writer.put_record_sequence(TAG_RESULTS_SIZE, self.results.len(), &self.results)?;
        writer.put_record_sequence(
            TAG_AGGREGATOR_RESULTS_SIZE,
            self.aggregator_results.len(),
            &self.aggregator_results,
        )?;
        Ok(writer.finish())
    }

    /// Decodes a wire body into a message.
    ///
    /// Tag-driven: fields may arrive in any order. The message is
    /// constructed only after the whole body decodes; a failure never
    /// yields a partially populated value.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnrecognizedTag`] for any tag outside the known
    /// set, [`WireError::Truncated`] for a short stream,
    /// [`WireError::MissingField`] when the body ends before all three
    /// fields were seen, or a nested record's decode error.
    pub fn hydrate(body: Bytes) -> Result<Self, WireError> {
        let mut reader = FieldReader::new(body);
        let mut request_id = None;
        let mut results = None;
        let mut aggregator_results = None;

        while let Some(tag) = reader.next_tag() {
            match tag {
                TAG_REQUEST_ID => {
                    request_id = Some(SearchRequestId(reader.read_i64()?));
                }
                TAG_RESULTS_SIZE => {
                    let count = reader.read_count()?;
                    let mut decoded = Vec::with_capacity(count);
                    for _ in 0..count {
                        decoded.push(reader.read_record::<IndexQueryResult>()?);
                    }
                    results = Some(decoded);
                }
                TAG_AGGREGATOR_RESULTS_SIZE => {
                    let count = reader.read_count()?;
                    let mut decoded = Vec::with_capacity(count);
                    for _ in 0..count {
                        decoded.push(reader.read_record::<NvPair>()?);
                    }
                    aggregator_results = Some(decoded);
                }
                other => {
                    tracing::warn!(tag = other, message = MESSAGE_NAME, "unrecognized tag");
                    return Err(WireError::UnrecognizedTag {
                        tag: other,
                        message: MESSAGE_NAME,
                    });
                }
            }
        }

        let missing = |field| WireError::MissingField {
            field,
            message: MESSAGE_NAME,
        };
        Ok(Self {
            request_id: request_id.ok_or_else(|| missing("requestId"))?,
            results: results.ok_or_else(|| missing("results"))?,
            aggregator_results: aggregator_results.ok_or_else(|| missing("aggregatorResults"))?,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn result(key: &str, score: f64) -> IndexQueryResult {
        IndexQueryResult {
            key: key.to_string(),
            attributes: vec![
                NvPair::new("score", NvValue::Double(score)),
                NvPair::new("active", NvValue::Bool(true)),
            ],
        }
    }

    #[test]
    fn roundtrip_preserves_content_and_order() {
        let original = SearchQueryResponse {
            request_id: SearchRequestId(42),
            results: vec![result("r1", 0.9), result("r2", 0.5), result("r3", 0.1)],
            aggregator_results: vec![NvPair::new("count", NvValue::Int(3))],
        };

        let body = original.dehydrate().unwrap();
        let decoded = SearchQueryResponse::hydrate(body).unwrap();

        assert_eq!(decoded, original);
        assert_eq!(decoded.results[0].key, "r1");
        assert_eq!(decoded.results[2].key, "r3");
    }

    #[test]
    fn empty_sequences_roundtrip_as_empty() {
        let original = SearchQueryResponse {
            request_id: SearchRequestId(7),
            results: vec![],
            aggregator_results: vec![],
        };

        let decoded = SearchQueryResponse::hydrate(original.dehydrate().unwrap()).unwrap();
        assert_eq!(decoded.request_id, SearchRequestId(7));
        assert!(decoded.results.is_empty());
        assert!(decoded.aggregator_results.is_empty());
    }

    #[test]
    fn unrecognized_tag_is_a_decode_error() {
        let mut writer = FieldWriter::new();
        writer.put_i64(0, 42);
        writer.put_i32(7, 0); // tag 7 is not in {0, 1, 2}
        let err = SearchQueryResponse::hydrate(writer.finish()).unwrap_err();
        assert!(matches!(
            err,
            WireError::UnrecognizedTag { tag: 7, message: "SearchQueryResponse" }
        ));
    }

    #[test]
    fn fields_decode_in_any_order() {
        // Aggregators first, then results, then the request id.
        let original = SearchQueryResponse {
            request_id: SearchRequestId(9),
            results: vec![result("k", 1.0)],
            aggregator_results: vec![NvPair::new("sum", NvValue::Double(4.5))],
        };
        let mut writer = FieldWriter::new();
        writer
            .put_record_sequence(2, 1, &original.aggregator_results)
            .unwrap();
        writer
            .put_record_sequence(1, 1, &original.results)
            .unwrap();
        writer.put_i64(0, 9);

        let decoded = SearchQueryResponse::hydrate(writer.finish()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn truncated_body_fails_without_partial_message() {
        let original = SearchQueryResponse {
            request_id: SearchRequestId(1),
            results: vec![result("a", 0.2)],
            aggregator_results: vec![],
        };
        let body = original.dehydrate().unwrap();
        let cut = body.slice(0..body.len() - 3);
        assert!(SearchQueryResponse::hydrate(cut).is_err());
    }

    #[test]
    fn missing_fields_fail_decode() {
        let mut writer = FieldWriter::new();
        writer.put_i64(0, 42); // request id only, no sequences
        assert!(matches!(
            SearchQueryResponse::hydrate(writer.finish()).unwrap_err(),
            WireError::MissingField { field: "results", .. }
        ));
    }

    #[test]
    fn nv_value_kinds_roundtrip() {
        let pairs = vec![
            NvPair::new("b", NvValue::Bool(false)),
            NvPair::new("i", NvValue::Int(-3)),
            NvPair::new("d", NvValue::Double(2.5)),
            NvPair::new("s", NvValue::String("x".into())),
            NvPair::new("raw", NvValue::Bytes(vec![1, 2, 3])),
        ];
        let mut out = BytesMut::new();
        for pair in &pairs {
            pair.serialize_to(&mut out).unwrap();
        }
        let mut buf = out.freeze();
        let decoded: Vec<NvPair> = (0..pairs.len())
            .map(|_| NvPair::deserialize_from(&mut buf).unwrap())
            .collect();
        assert_eq!(decoded, pairs);
    }

    #[test]
    fn unknown_value_kind_rejected() {
        let mut out = BytesMut::new();
        wire::put_str(&mut out, "name").unwrap();
        out.put_u8(99);
        let mut buf = out.freeze();
        assert!(matches!(
            NvPair::deserialize_from(&mut buf).unwrap_err(),
            WireError::UnknownValueKind { marker: 99 }
        ));
    }
}
