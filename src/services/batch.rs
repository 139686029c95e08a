use crate::models::{BatchResult, EditRequest};
use crate::services::archive::{self, ArchiveEntry, ArchiveError};
use crate::services::files::decode_text;
use crate::services::rewrite::RewriteService;
use indexmap::IndexMap;

/// Applies one instruction to many files, one completion request at a time.
///
/// A member that cannot be decoded or whose rewrite fails is recorded in the
/// result's outcomes and left out of the edited mapping; the batch always
/// moves on to the next member.
#[derive(Clone)]
pub struct BatchProcessor {
    rewriter: RewriteService,
}

impl BatchProcessor {
    pub fn new(rewriter: RewriteService) -> Self {
        Self { rewriter }
    }

    pub fn rewriter(&self) -> &RewriteService {
        &self.rewriter
    }

    /// Rewrite every text member of a zip archive.
    ///
    /// Members are never extracted past the byte size that the rewriter's
    /// character limit allows. Only fails when the archive itself cannot be
    /// opened.
    pub async fn process_archive(
        &self,
        archive_bytes: &[u8],
        instruction: &str,
    ) -> Result<BatchResult, ArchiveError> {
        let byte_limit = archive::member_byte_limit(self.rewriter.max_chars());
        let contents = archive::read_members_with_limit(archive_bytes, byte_limit)?;
        let mut result = BatchResult::new();

        tracing::info!(
            "Processing archive: {} members, model={}",
            contents.entries.len(),
            self.rewriter.model()
        );

        for entry in contents.entries {
            let member = match entry {
                ArchiveEntry::Member(member) => member,
                ArchiveEntry::Unreadable(unreadable) => {
                    result.record_skipped(&unreadable.name, unreadable.reason);
                    continue;
                }
            };

            let Some(text) = decode_text(&member.raw_bytes) else {
                tracing::warn!("Skipping {}: no usable text", member.name);
                result.record_skipped(&member.name, "no usable text");
                continue;
            };

            self.rewrite_member(&mut result, &member.name, text, instruction)
                .await;
        }

        let summary = result.summary();
        tracing::info!("Archive batch finished: {}", summary.summary());
        Ok(result)
    }

    /// Rewrite a set of loose files given as an ordered `name -> text` mapping.
    ///
    /// Whitespace-only files are skipped.
    pub async fn process_files(
        &self,
        files: &IndexMap<String, String>,
        instruction: &str,
    ) -> BatchResult {
        let mut result = BatchResult::new();

        tracing::info!(
            "Processing {} files, model={}",
            files.len(),
            self.rewriter.model()
        );

        for (name, text) in files {
            if text.trim().is_empty() {
                tracing::warn!("Skipping {}: empty file", name);
                result.record_skipped(name, "empty file");
                continue;
            }

            self.rewrite_member(&mut result, name, text.clone(), instruction)
                .await;
        }

        let summary = result.summary();
        tracing::info!("File batch finished: {}", summary.summary());
        result
    }

    async fn rewrite_member(
        &self,
        result: &mut BatchResult,
        name: &str,
        text: String,
        instruction: &str,
    ) {
        tracing::debug!("Rewriting {}", name);

        let request = EditRequest::new(text, instruction);
        match self.rewriter.rewrite(&request).await.into_non_empty() {
            Ok(edited) => result.record_edited(name, edited),
            Err(Some(err)) => {
                tracing::warn!("Could not process {}: {}", name, err);
                result.record_failed(name, err.to_string());
            }
            Err(None) => {
                tracing::warn!("Could not process {}: empty completion", name);
                result.record_failed(name, "empty completion");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientError, MockCompletionClient};
    use crate::models::{MemberStatus, Settings};
    use std::io::{Cursor, Write};
    use std::sync::Arc;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn processor_with(mock: MockCompletionClient) -> BatchProcessor {
        BatchProcessor::new(RewriteService::new(
            Some(Arc::new(mock)),
            &Settings::default(),
        ))
    }

    fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    /// Echoes the `<FILE>` body back in upper case
    fn upper_case_mock() -> MockCompletionClient {
        let mut mock = MockCompletionClient::new();
        mock.expect_complete().returning(|req| {
            let user = &req.messages[1].content;
            let start = user.find("<FILE>\n").unwrap() + "<FILE>\n".len();
            let end = user.rfind("\n</FILE>").unwrap();
            Ok(user[start..end].to_uppercase())
        });
        mock
    }

    #[tokio::test]
    async fn test_process_archive_skips_binary_members() {
        let bytes = zip_of(&[
            ("a.txt", &b"alpha"[..]),
            ("img.png", &[0x89, 0x50, 0x4E, 0x47, 0x00, 0x00][..]),
            ("dir/b.txt", &b"beta"[..]),
        ]);

        let result = processor_with(upper_case_mock())
            .process_archive(&bytes, "Upper-case it")
            .await
            .unwrap();

        assert_eq!(result.names().collect::<Vec<_>>(), vec!["a.txt", "dir/b.txt"]);
        assert_eq!(result.get("dir/b.txt"), Some("BETA"));
        assert_eq!(result.outcomes[1].status, MemberStatus::Skipped);
        assert_eq!(result.summary().skipped, 1);
    }

    #[tokio::test]
    async fn test_process_archive_skips_oversized_member_in_place() {
        let mut mock = MockCompletionClient::new();
        mock.expect_complete()
            .times(2)
            .returning(|_| Ok("done".to_string()));
        let settings = Settings {
            max_chars: 10,
            ..Settings::default()
        };
        let processor = BatchProcessor::new(RewriteService::new(Some(Arc::new(mock)), &settings));

        let big = "z".repeat(500);
        let bytes = zip_of(&[
            ("a.txt", &b"short"[..]),
            ("big.txt", big.as_bytes()),
            ("c.txt", &b"tiny"[..]),
        ]);

        let result = processor.process_archive(&bytes, "Edit").await.unwrap();

        assert_eq!(result.names().collect::<Vec<_>>(), vec!["a.txt", "c.txt"]);
        let order: Vec<_> = result.outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(order, vec!["a.txt", "big.txt", "c.txt"]);
        assert_eq!(result.outcomes[1].status, MemberStatus::Skipped);
        assert_eq!(result.outcomes[1].message, "larger than 40 bytes");
    }

    #[tokio::test]
    async fn test_process_archive_drops_empty_completion() {
        let mut mock = MockCompletionClient::new();
        mock.expect_complete().returning(|_| Ok(String::new()));

        let bytes = zip_of(&[("a.txt", &b"alpha"[..])]);
        let result = processor_with(mock)
            .process_archive(&bytes, "Edit")
            .await
            .unwrap();

        assert!(result.is_empty());
        assert_eq!(result.summary().failed, 1);
    }

    #[tokio::test]
    async fn test_process_archive_invalid_container() {
        let mut mock = MockCompletionClient::new();
        mock.expect_complete().times(0);

        let result = processor_with(mock).process_archive(b"nope", "Edit").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_process_files_continues_after_failure() {
        let mut mock = MockCompletionClient::new();
        mock.expect_complete().returning(|req| {
            if req.messages[1].content.contains("second") {
                Err(ClientError::RateLimited)
            } else {
                Ok("done".to_string())
            }
        });

        let mut files = IndexMap::new();
        files.insert("1.md".to_string(), "first".to_string());
        files.insert("2.md".to_string(), "second".to_string());
        files.insert("3.md".to_string(), "   ".to_string());
        files.insert("4.md".to_string(), "fourth".to_string());

        let result = processor_with(mock).process_files(&files, "Edit").await;

        assert_eq!(result.names().collect::<Vec<_>>(), vec!["1.md", "4.md"]);
        let summary = result.summary();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert!(result.outcomes[1].message.contains("Rate limited"));
    }

    #[tokio::test]
    async fn test_process_files_without_client() {
        let processor = BatchProcessor::new(RewriteService::new(None, &Settings::default()));

        let mut files = IndexMap::new();
        files.insert("a.txt".to_string(), "text".to_string());

        let result = processor.process_files(&files, "Edit").await;
        assert!(result.is_empty());
        assert_eq!(result.summary().failed, 1);
    }
}
