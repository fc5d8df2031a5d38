//! Command-line front end for document export and file conversion.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use conversion::{
    convert_upload, ClientConfig, ConversionClient, ConversionType, DirectoryDownloader,
    DownloadConfig, ExportJob, ExportPipeline, OutputFormat, UploadFile,
};
use doc_model::Document;
use edit_engine::{CommandDispatcher, MemoryEngine};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use store::{DocumentFile, HtmlExportOptions, HtmlSerializer, PageWidth};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "docexport", about = "Export rich-text documents to PDF or DOCX", version)]
struct Cli {
    /// Conversion service URL
    #[arg(short, long, env = "CONVERTER_BASE_URL", global = true)]
    server: Option<String>,

    /// Request timeout in seconds
    #[arg(short = 't', long, env = "CONVERTER_TIMEOUT_SECS", global = true)]
    timeout: Option<u64>,

    /// Directory converted files are saved to
    #[arg(short, long, env = "DOWNLOAD_DIR", global = true)]
    out_dir: Option<PathBuf>,

    /// Page width used for HTML output
    #[arg(long, value_enum, default_value = "wide", global = true)]
    page_width: PageWidthArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a saved document through the conversion service
    Export {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        format: OutputFormat,
        /// Document name; defaults to the one stored in the file
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Upload any file and print where the original and result live
    Convert {
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(long = "type")]
        kind: ConversionType,
    },
    /// Print the HTML a PDF export would upload
    Render {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        name: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PageWidthArg {
    Letter,
    A4,
    Wide,
    Legal,
}

impl From<PageWidthArg> for PageWidth {
    fn from(arg: PageWidthArg) -> Self {
        match arg {
            PageWidthArg::Letter => PageWidth::Letter,
            PageWidthArg::A4 => PageWidth::A4,
            PageWidthArg::Wide => PageWidth::Wide,
            PageWidthArg::Legal => PageWidth::Legal,
        }
    }
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(server) = &self.server {
            config = config.with_base_url(server);
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }

    fn download_config(&self) -> DownloadConfig {
        match &self.out_dir {
            Some(dir) => DownloadConfig::new(dir),
            None => DownloadConfig::from_env(),
        }
    }

    fn serializer(&self) -> HtmlSerializer {
        HtmlSerializer::with_options(
            HtmlExportOptions::default().with_page_width(self.page_width.into()),
        )
    }
}

/// Load a document file into an editing session and take the export snapshot
fn open_document(path: &Path) -> Result<(Document, String)> {
    let DocumentFile { header, document } =
        store::load(path).with_context(|| format!("failed to open {}", path.display()))?;

    let mut session = CommandDispatcher::new();
    session.attach(Box::new(MemoryEngine::new()));
    session.load(document)?;
    debug!(
        path = %path.display(),
        unsaved = session.has_unsaved_content(),
        "document loaded"
    );

    let snapshot = session
        .snapshot()
        .context("editing session has no engine attached")?;
    Ok((snapshot, header.name))
}

fn document_name(explicit: Option<String>, stored: String) -> String {
    explicit.filter(|n| !n.trim().is_empty()).unwrap_or(stored)
}

/// Cancel the token on Ctrl-C
fn cancel_on_interrupt() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    token
}

async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Export {
            input,
            format,
            name,
        } => {
            let (snapshot, stored) = open_document(input)?;
            let job = ExportJob::new(snapshot, *format, &document_name(name.clone(), stored));

            let client = ConversionClient::new(&cli.client_config())?;
            let downloader = Arc::new(DirectoryDownloader::new(&cli.download_config()));
            let directory = downloader.directory().to_path_buf();
            let pipeline = ExportPipeline::new(client, downloader).with_serializer(cli.serializer());

            let token = cancel_on_interrupt();
            let outcome = pipeline.run(job, Some(&token)).await?;
            info!(job = %outcome.job_id, "saved {} bytes", outcome.bytes);
            println!("{}", directory.join(&outcome.file_name).display());
        }
        Commands::Convert { file, kind } => {
            let upload = file
                .as_deref()
                .map(UploadFile::from_path)
                .transpose()
                .context("failed to read upload file")?;
            let client = ConversionClient::new(&cli.client_config())?;
            let links = convert_upload(&client, upload, *kind).await?;
            println!("original:  {}", links.original);
            println!("converted: {}", links.converted);
        }
        Commands::Render { input, name } => {
            let (snapshot, stored) = open_document(input)?;
            let name = document_name(name.clone(), stored);
            print!("{}", cli.serializer().serialize(&snapshot, &name));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    run(Cli::parse()).await
}
