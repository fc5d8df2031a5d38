//! Export pipeline: document snapshot -> upload -> converted download
//!
//! Every export click creates its own [`ExportJob`]; jobs are independent
//! and may run concurrently. A job either completes (artifact handed to the
//! downloader) or ends with a terminal [`ExportError`], never retried.

use crate::{
    ConversionClient, ConversionType, Downloader, DownloadLinks, ExportError, UploadFile,
};
use chrono::{DateTime, Utc};
use doc_model::Document;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use store::{to_plain_text, HtmlSerializer, DEFAULT_DOCUMENT_NAME};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

/// Message reported when there is nothing to export
pub const EMPTY_DOCUMENT_MESSAGE: &str = "Document is empty. Please add some content before exporting.";

/// Message reported when a conversion is requested without a file
pub const NO_FILE_MESSAGE: &str = "Please select a file to convert.";

/// User-facing export targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Pdf,
    Docx,
}

impl OutputFormat {
    pub fn conversion_type(&self) -> ConversionType {
        match self {
            OutputFormat::Pdf => ConversionType::HtmlToPdf,
            OutputFormat::Docx => ConversionType::TextToDocx,
        }
    }

    /// Extension of the downloaded file
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Docx => "docx",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "docx" => Ok(OutputFormat::Docx),
            other => Err(format!("unknown export format '{}' (expected pdf or docx)", other)),
        }
    }
}

/// One export request, carrying an immutable snapshot of the document
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub id: Uuid,
    pub snapshot: Document,
    pub format: OutputFormat,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl ExportJob {
    /// A blank name falls back to the default document name
    pub fn new(snapshot: Document, format: OutputFormat, name: &str) -> Self {
        let name = name.trim();
        let name = if name.is_empty() {
            DEFAULT_DOCUMENT_NAME
        } else {
            name
        };
        Self {
            id: Uuid::new_v4(),
            snapshot,
            format,
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    /// The payload sent to the backend: HTML for PDF, plain text for DOCX
    pub fn upload_file(&self, html: &HtmlSerializer) -> UploadFile {
        match self.format {
            OutputFormat::Pdf => UploadFile::new(
                format!("{}.html", self.name),
                "text/html",
                html.serialize(&self.snapshot, &self.name),
            ),
            OutputFormat::Docx => UploadFile::new(
                format!("{}.txt", self.name),
                "text/plain",
                to_plain_text(&self.snapshot),
            ),
        }
    }

    /// Name the converted file is saved under
    pub fn download_file_name(&self) -> String {
        format!("{}.{}", self.name, self.format.extension())
    }
}

/// Summary of a completed export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub job_id: Uuid,
    pub file_name: String,
    pub original_id: String,
    pub converted_id: String,
    pub bytes: usize,
}

/// Runs export jobs against a conversion backend
pub struct ExportPipeline {
    client: ConversionClient,
    downloader: Arc<dyn Downloader>,
    html: HtmlSerializer,
}

impl ExportPipeline {
    pub fn new(client: ConversionClient, downloader: Arc<dyn Downloader>) -> Self {
        Self {
            client,
            downloader,
            html: HtmlSerializer::new(),
        }
    }

    pub fn with_serializer(mut self, html: HtmlSerializer) -> Self {
        self.html = html;
        self
    }

    pub fn client(&self) -> &ConversionClient {
        &self.client
    }

    /// Run a job to completion. Blank documents are rejected before any
    /// network call. With a token, cancellation aborts the upload or
    /// download in flight and nothing is saved.
    pub async fn run(
        &self,
        job: ExportJob,
        cancel: Option<&CancellationToken>,
    ) -> Result<ExportOutcome, ExportError> {
        if job.snapshot.is_blank() {
            warn!(job = %job.id, "export rejected: document is empty");
            return Err(ExportError::Validation(EMPTY_DOCUMENT_MESSAGE.to_string()));
        }
        info!(job = %job.id, format = %job.format, name = %job.name, "export started");

        let work = async {
            let file = job.upload_file(&self.html);
            let response = self.client.submit(file, job.format.conversion_type()).await?;
            let artifact = self.client.fetch_artifact(&response.converted_id).await?;
            Ok::<_, crate::ConversionError>((response, artifact))
        };

        let finished = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => None,
                result = work => Some(result),
            },
            None => Some(work.await),
        };
        let (response, artifact) = match finished {
            Some(Ok(done)) => done,
            Some(Err(err)) => {
                warn!(job = %job.id, error = %err, "export failed");
                return Err(err.into());
            }
            None => {
                info!(job = %job.id, "export cancelled");
                return Err(ExportError::Cancelled);
            }
        };

        let file_name = job.download_file_name();
        self.downloader.save(&artifact, &file_name);
        info!(job = %job.id, file = %file_name, bytes = artifact.len(), "export finished");

        Ok(ExportOutcome {
            job_id: job.id,
            file_name,
            original_id: response.original_id,
            converted_id: response.converted_id,
            bytes: artifact.len(),
        })
    }
}

/// Generic upload flow: convert a user-chosen file and return both links
pub async fn convert_upload(
    client: &ConversionClient,
    file: Option<UploadFile>,
    kind: ConversionType,
) -> Result<DownloadLinks, ExportError> {
    let Some(file) = file.filter(|f| !f.is_empty()) else {
        return Err(ExportError::Validation(NO_FILE_MESSAGE.to_string()));
    };
    info!(file = %file.file_name, %kind, "conversion requested");
    Ok(client.convert(file, kind).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_naming() {
        let html = HtmlSerializer::new();
        let doc = Document::from_text("Hello");

        let pdf = ExportJob::new(doc.clone(), OutputFormat::Pdf, "Report");
        let file = pdf.upload_file(&html);
        assert_eq!(file.file_name, "Report.html");
        assert_eq!(file.content_type, "text/html");
        assert!(std::str::from_utf8(&file.bytes).unwrap().contains("<span>Hello</span>"));
        assert_eq!(pdf.download_file_name(), "Report.pdf");

        let docx = ExportJob::new(doc, OutputFormat::Docx, "  ");
        let file = docx.upload_file(&html);
        assert_eq!(file.file_name, "Untitled Document.txt");
        assert_eq!(&file.bytes[..], b"Hello\n");
        assert_eq!(docx.download_file_name(), "Untitled Document.docx");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("PDF".parse::<OutputFormat>(), Ok(OutputFormat::Pdf));
        assert_eq!(OutputFormat::Docx.conversion_type(), ConversionType::TextToDocx);
        assert!("odt".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_jobs_are_distinct() {
        let a = ExportJob::new(Document::new(), OutputFormat::Pdf, "a");
        let b = ExportJob::new(Document::new(), OutputFormat::Pdf, "a");
        assert_ne!(a.id, b.id);
    }
}
