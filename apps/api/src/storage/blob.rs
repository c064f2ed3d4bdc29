use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::storage::BlobStore;

/// S3 / MinIO backed document store. The object key is the blob id.
#[derive(Clone)]
pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3BlobStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn store(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<String, AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Stored document at s3://{}/{}", self.bucket, key);
        Ok(key.to_string())
    }

    async fn retrieve(&self, id: &str) -> Result<Bytes, AppError> {
        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(id)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 download failed: {e}")))?;

        let data = object
            .body
            .collect()
            .await
            .map_err(|e| AppError::Storage(format!("S3 body read failed: {e}")))?;
        Ok(data.into_bytes())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(id)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 delete failed: {e}")))?;

        info!("Deleted document s3://{}/{}", self.bucket, id);
        Ok(())
    }
}

/// Object key for a retained application document.
pub fn document_key(application_id: uuid::Uuid, file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let safe = if safe.trim_matches('_').is_empty() {
        "document".to_string()
    } else {
        safe
    };
    format!("applications/{application_id}/{safe}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_document_key_sanitises_file_name() {
        let id = Uuid::nil();
        assert_eq!(
            document_key(id, "My CV (final).pdf"),
            "applications/00000000-0000-0000-0000-000000000000/My_CV__final_.pdf"
        );
    }

    #[test]
    fn test_document_key_falls_back_for_empty_name() {
        let key = document_key(Uuid::nil(), "///");
        assert!(key.ends_with("/document"));
    }
}
