//! Invoice draft repository
//!
//! Keeps the in-progress invoice in `draft.json` so it survives between
//! separate CLI invocations.

use std::path::PathBuf;

use crate::error::GstBillResult;
use crate::models::InvoiceDraft;

use super::file_io::{read_json, remove_if_exists, write_json_atomic};

/// Repository for the invoice draft
pub struct DraftRepository {
    path: PathBuf,
}

impl DraftRepository {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the saved draft
    ///
    /// A missing file yields `None`; an unreadable one is logged and also
    /// yields `None` so that a corrupt draft never blocks a new invoice.
    pub fn load(&self) -> GstBillResult<Option<InvoiceDraft>> {
        match read_json(&self.path) {
            Ok(draft) => Ok(draft),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable draft");
                Ok(None)
            }
        }
    }

    /// Persist the draft
    pub fn save(&self, draft: &InvoiceDraft) -> GstBillResult<()> {
        write_json_atomic(&self.path, draft)
    }

    /// Throw the saved draft away
    pub fn discard(&self) -> GstBillResult<()> {
        remove_if_exists(&self.path)
    }

    /// Check whether a draft has been saved
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InvoiceItem, Money};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, DraftRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = DraftRepository::new(temp_dir.path().join("draft.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        assert!(repo.load().unwrap().is_none());
        assert!(!repo.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let (_temp_dir, repo) = create_test_repo();

        let mut draft = InvoiceDraft::default();
        draft.invoice.number = "INV-42".into();
        draft
            .items
            .push(InvoiceItem::new("Masala Tea", Money::from_rupees(120.0), 2.0));
        repo.save(&draft).unwrap();

        assert_eq!(repo.load().unwrap(), Some(draft));
    }

    #[test]
    fn test_corrupt_draft_is_ignored() {
        let (temp_dir, repo) = create_test_repo();
        std::fs::write(temp_dir.path().join("draft.json"), "{{{").unwrap();

        assert!(repo.load().unwrap().is_none());
    }

    #[test]
    fn test_discard() {
        let (_temp_dir, repo) = create_test_repo();
        repo.save(&InvoiceDraft::default()).unwrap();
        assert!(repo.exists());

        repo.discard().unwrap();
        assert!(!repo.exists());
        repo.discard().unwrap();
    }
}
