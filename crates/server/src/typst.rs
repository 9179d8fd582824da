use std::path::Path;
use std::sync::LazyLock;

use chrono::Datelike;
use ecow::EcoVec;
use shared_types::{AppError, ExportDocument};
use typst::diag::{FileError, FileResult, SourceDiagnostic};
use typst::foundations::{Bytes, Datetime};
use typst::layout::PagedDocument;
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};

use crate::config::env_value;

/// Escape a value for use inside a Typst string literal.
pub fn escape_typst(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Build a complete Typst source by prepending `#let` bindings for the
/// document to the `intake-export.typ` template.
pub fn build_export_source(doc: &ExportDocument) -> String {
    let entries: String = doc
        .entries
        .iter()
        .map(|e| {
            format!(
                "  (\"{}\", \"{}\"),\n",
                escape_typst(&e.label),
                escape_typst(&e.value)
            )
        })
        .collect();

    let bindings = format!(
        r##"#let title = "{title}"
#let document_date = "{date}"
#let entries = (
{entries})

"##,
        title = escape_typst(&doc.title),
        date = escape_typst(&doc.date),
    );

    let template = include_str!("../../../templates/intake-export.typ");
    format!("{bindings}{template}")
}

/// Render an export document to PDF bytes.
pub async fn render_export_pdf(doc: &ExportDocument) -> Result<Vec<u8>, AppError> {
    compile_typst(&build_export_source(doc)).await
}

// ---------------------------------------------------------------------------
// Static singletons, initialized once and reused across requests
// ---------------------------------------------------------------------------

/// Bundled fonts plus anything in `EXPORT_FONT_DIR`. The bundled set has no
/// Hangul glyphs, so deployments point that variable at a CJK font directory.
static FONTS: LazyLock<Vec<Font>> = LazyLock::new(|| {
    let mut fonts: Vec<Font> = typst_assets::fonts()
        .flat_map(|data| Font::iter(Bytes::new(data)))
        .collect();
    if let Some(dir) = env_value("EXPORT_FONT_DIR") {
        let before = fonts.len();
        fonts.extend(load_font_dir(Path::new(&dir)));
        tracing::info!(dir = %dir, loaded = fonts.len() - before, "Loaded export fonts");
    }
    fonts
});

static FONT_BOOK: LazyLock<LazyHash<FontBook>> =
    LazyLock::new(|| LazyHash::new(FontBook::from_fonts(FONTS.iter())));

static LIBRARY: LazyLock<LazyHash<Library>> = LazyLock::new(|| LazyHash::new(Library::default()));

fn load_font_dir(dir: &Path) -> Vec<Font> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Cannot read font directory");
            return Vec::new();
        }
    };

    entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc" | "otc"))
        })
        .filter_map(|path| std::fs::read(&path).ok())
        .flat_map(|data| Font::iter(Bytes::new(data)))
        .collect()
}

// ---------------------------------------------------------------------------
// World implementation for in-process Typst compilation
// ---------------------------------------------------------------------------

struct ExportWorld {
    source: Source,
}

impl ExportWorld {
    fn new(source_text: &str) -> Self {
        Self {
            source: Source::detached(source_text),
        }
    }
}

impl World for ExportWorld {
    fn library(&self) -> &LazyHash<Library> {
        &LIBRARY
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &FONT_BOOK
    }

    fn main(&self) -> FileId {
        self.source.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.source.id() {
            Ok(self.source.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rooted_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rooted_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        FONTS.get(index).cloned()
    }

    fn today(&self, offset: Option<i64>) -> Option<Datetime> {
        // Schools run on KST unless the template asks otherwise.
        let hours = offset.unwrap_or(9);
        let tz = chrono::FixedOffset::east_opt((hours as i32) * 3600)?;
        let now = chrono::Utc::now().with_timezone(&tz).naive_local();
        Datetime::from_ymd(now.year(), now.month() as u8, now.day() as u8)
    }
}

// ---------------------------------------------------------------------------
// Compilation entry point
// ---------------------------------------------------------------------------

/// Compile a Typst source string into PDF bytes.
///
/// Compilation is CPU-bound and runs on a blocking thread.
pub async fn compile_typst(source: &str) -> Result<Vec<u8>, AppError> {
    let source = source.to_owned();

    tokio::task::spawn_blocking(move || compile_typst_sync(&source))
        .await
        .map_err(|e| AppError::internal(format!("Typst task panicked: {e}")))?
}

fn compile_typst_sync(source: &str) -> Result<Vec<u8>, AppError> {
    let world = ExportWorld::new(source);

    let warned = typst::compile::<PagedDocument>(&world);
    let document = warned
        .output
        .map_err(|diagnostics| format_diagnostics("Typst compilation failed", &diagnostics))?;

    typst_pdf::pdf(&document, &typst_pdf::PdfOptions::default())
        .map_err(|diagnostics| format_diagnostics("PDF export failed", &diagnostics))
}

fn format_diagnostics(prefix: &str, diagnostics: &EcoVec<SourceDiagnostic>) -> AppError {
    let msgs: Vec<String> = diagnostics.iter().map(|d| d.message.to_string()).collect();
    AppError::internal(format!("{prefix}: {}", msgs.join("; ")))
}
