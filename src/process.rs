// Submission and retrieval of document processes. Status progression is
// observed by calling `retrieve` again; nothing here polls.

use crate::api::ApiClient;
use crate::error::{MintError, Result};
use crate::files::{encode_file, process_multiple_files};
use crate::models::{
    AbortResponse, DocumentType, ImagePayload, ProcessPoolRequest, ProcessPoolResponse,
    ProcessedDocument, VehicleCategory,
};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

/// Longest submission name the service stores; longer names are cut.
pub const MAX_NAME_LEN: usize = 100;

/// Optional knobs of a submission.
#[derive(Clone, Debug, Default)]
pub struct SubmitOptions {
    pub name: Option<String>,
    pub extract_accuracy: bool,
    /// Used by the file-based wrappers; a fresh v4 id is generated when unset.
    pub process_id: Option<Uuid>,
}

impl ProcessPoolRequest {
    /// Assemble a submission body. The name is truncated to
    /// [`MAX_NAME_LEN`] characters and `extractAccuracy` is only present when
    /// requested.
    pub fn build(
        id: Uuid,
        document_type: DocumentType,
        category: VehicleCategory,
        images: Vec<ImagePayload>,
        options: &SubmitOptions,
    ) -> Result<Self> {
        if images.is_empty() {
            return Err(MintError::validation(
                "a submission needs at least one image",
            ));
        }
        let name = options
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .map(|n| n.chars().take(MAX_NAME_LEN).collect());

        Ok(ProcessPoolRequest {
            id,
            document_type,
            category,
            images,
            name,
            extract_accuracy: options.extract_accuracy.then_some(true),
        })
    }
}

#[derive(Clone, Debug)]
pub struct ProcessService {
    client: ApiClient,
}

impl ProcessService {
    pub fn new(client: ApiClient) -> Self {
        ProcessService { client }
    }

    /// Submit already-encoded images under `process_id`.
    pub fn submit_pool(
        &self,
        token: &str,
        process_id: Uuid,
        document_type: DocumentType,
        category: VehicleCategory,
        images: Vec<ImagePayload>,
        options: &SubmitOptions,
    ) -> Result<ProcessPoolResponse> {
        let request =
            ProcessPoolRequest::build(process_id, document_type, category, images, options)?;
        info!(
            id = %request.id,
            doc_type = %request.document_type,
            category = %request.category,
            images = request.images.len(),
            "submitting process"
        );
        self.client.post("/process/pool", &request, Some(token))
    }

    /// Encode one file and submit it.
    pub fn submit_single(
        &self,
        token: &str,
        path: &Path,
        document_type: DocumentType,
        category: VehicleCategory,
        options: &SubmitOptions,
    ) -> Result<ProcessPoolResponse> {
        let image = encode_file(path, None)?;
        let id = options.process_id.unwrap_or_else(Uuid::new_v4);
        self.submit_pool(token, id, document_type, category, vec![image], options)
    }

    /// Encode every file that can be encoded and submit them together as one
    /// process.
    pub fn submit_multiple<P: AsRef<Path>>(
        &self,
        token: &str,
        paths: &[P],
        document_type: DocumentType,
        category: VehicleCategory,
        options: &SubmitOptions,
    ) -> Result<ProcessPoolResponse> {
        let images = process_multiple_files(paths)?;
        let id = options.process_id.unwrap_or_else(Uuid::new_v4);
        self.submit_pool(token, id, document_type, category, images, options)
    }

    pub fn retrieve(&self, token: &str, process_id: Uuid) -> Result<ProcessedDocument> {
        debug!(id = %process_id, "retrieving process");
        self.client
            .get(&format!("/process/{}", process_id), Some(token))
    }

    pub fn abort(&self, token: &str, process_id: Uuid) -> Result<AbortResponse> {
        info!(id = %process_id, "aborting process");
        self.client
            .post_empty(&format!("/process/pool/abort/{}", process_id), Some(token))
    }
}
