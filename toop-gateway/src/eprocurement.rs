//! Sample answers for eProcurement document requests.
//!
//! Document requests run in two steps: a `REFERENCE` request for a legal
//! person returns metadata naming the document, and an `INLINE` request for
//! that document id returns the document itself. Only one sample legal
//! person and one sample document are served.

use chrono::{NaiveDate, NaiveDateTime};
use toop_core::CorrelationId;

use crate::message::{Attachment, Dataset, DocumentResponse, QueryRequest, ResponseOption};

pub const SAMPLE_LEGAL_PERSON_ID: &str = "974760673";
pub const SAMPLE_DOCUMENT_ID: &str = "00000000-0000-0000-0000-000000000001";

const SAMPLE_DOCUMENT: &[u8] = include_bytes!("../assets/eprocurement-sample.pdf");
const SAMPLE_MIME_TYPE: &str = "application/pdf";
const EVIDENCE_CREATOR: &str = "Bergen kemnerkontor";

/// What to send back for one document request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleAnswer {
    Document(DocumentResponse),
    /// The request asked for something other than the sample data.
    Unavailable(String),
    /// The request cannot be answered at all.
    Invalid(String),
}

/// Error text for requests outside the sample data.
pub fn unavailable_message() -> String {
    format!(
        "Sample data available for LegalPersonId={} DocumentId={} only.",
        SAMPLE_LEGAL_PERSON_ID, SAMPLE_DOCUMENT_ID
    )
}

pub fn answer(request: &QueryRequest) -> SampleAnswer {
    let legal_id = request
        .data_subject
        .is_legal_person()
        .then(|| request.data_subject.local_identifier());
    let is_sample_person =
        legal_id.is_some_and(|id| id.eq_ignore_ascii_case(SAMPLE_LEGAL_PERSON_ID));
    let is_sample_document = request
        .document_id
        .as_deref()
        .is_some_and(|id| id.eq_ignore_ascii_case(SAMPLE_DOCUMENT_ID));

    match request.response_option {
        Some(ResponseOption::Reference) if is_sample_person => {
            SampleAnswer::Document(sample_response(&request.request_id, None))
        }
        Some(ResponseOption::Inline) if is_sample_document || is_sample_person => {
            let attachment = Attachment {
                content_id: SAMPLE_DOCUMENT_ID.to_string(),
                mime_type: SAMPLE_MIME_TYPE.to_string(),
                data: SAMPLE_DOCUMENT.to_vec(),
            };
            SampleAnswer::Document(sample_response(&request.request_id, Some(attachment)))
        }
        Some(_) => SampleAnswer::Unavailable(unavailable_message()),
        None => SampleAnswer::Invalid(format!(
            "Unexpected ResponseOption for request {}. Got: none",
            request.request_id
        )),
    }
}

fn sample_response(request_id: &CorrelationId, attachment: Option<Attachment>) -> DocumentResponse {
    DocumentResponse {
        response_id: CorrelationId::generate(),
        request_id: request_id.clone(),
        issued_at: toop_core::now(),
        registry_object_id: SAMPLE_DOCUMENT_ID.to_string(),
        dataset: sample_dataset(),
        attachment,
    }
}

fn sample_dataset() -> Dataset {
    let valid_from = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap_or_default();
    let valid_to = NaiveDate::from_ymd_opt(2021, 12, 31).unwrap_or_default();
    Dataset {
        id: SAMPLE_DOCUMENT_ID.to_string(),
        title: "Title".to_string(),
        description: "Description".to_string(),
        issued: NaiveDateTime::from(valid_from),
        valid_from,
        valid_to,
        language: "nob".to_string(),
        creator: EVIDENCE_CREATOR.to_string(),
        mime_type: SAMPLE_MIME_TYPE.to_string(),
    }
}
