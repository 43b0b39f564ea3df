// Object Storage Port (presigned uploads)

use crate::domain::{DatasetFile, UploadTicket};
use crate::error::Result;
use async_trait::async_trait;

/// Direct upload to a presigned object-storage URL
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload the file using the ticket's URL and form fields
    async fn put(&self, ticket: &UploadTicket, file: &DatasetFile) -> Result<()>;
}

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::{Arc, Mutex};

    /// Records uploads; optionally rejects them
    #[derive(Default)]
    pub struct RecordingStorage {
        uploads: Arc<Mutex<Vec<(String, String)>>>,
        reject_with: Option<u16>,
    }

    impl RecordingStorage {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn rejecting(status: u16) -> Self {
            Self {
                reject_with: Some(status),
                ..Self::default()
            }
        }

        /// (ticket url, filename) pairs
        pub fn uploads(&self) -> Vec<(String, String)> {
            self.uploads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ObjectStorage for RecordingStorage {
        async fn put(&self, ticket: &UploadTicket, file: &DatasetFile) -> Result<()> {
            if let Some(status) = self.reject_with {
                return Err(AppError::Api {
                    status,
                    message: "upload rejected by storage".to_string(),
                });
            }
            self.uploads
                .lock()
                .unwrap()
                .push((ticket.url.clone(), file.filename.clone()));
            Ok(())
        }
    }
}
