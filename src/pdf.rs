//! Markdown → PDF sibling pipeline.
//!
//! A separate conversion path from the vault converter: render the document
//! to HTML with `pulldown-cmark`, wrap it in a fixed stylesheet (A4 pages,
//! 2 cm margins, a "{title} - Page N" footer), and hand the result to the
//! external `weasyprint` renderer. Layout and pagination are entirely the
//! renderer's problem; this module only produces its input.

use crate::error::ConvertError;
use crate::frontmatter::{self, FrontMatter};
use crate::pipeline::metadata;
use pulldown_cmark::{html, Options, Parser};
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tracing::info;

/// External HTML→PDF renderer invoked as `weasyprint <input.html> <output.pdf>`.
const RENDERER: &str = "weasyprint";

/// Fixed document shell. `%TITLE%` and `%BODY%` are substituted at render
/// time; the stylesheet itself never varies per document.
const HTML_SHELL: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>%TITLE%</title>
    <style>
        @page {
            size: A4;
            margin: 2cm;
            @bottom-center {
                content: "%TITLE% - Page " counter(page);
                font-size: 10pt;
                color: #666;
            }
        }

        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 100%;
        }

        h1 {
            color: #2c3e50;
            font-size: 2.5em;
            border-bottom: 3px solid #3498db;
            padding-bottom: 10px;
            margin-top: 30px;
            page-break-before: always;
        }

        h1:first-of-type {
            page-break-before: avoid;
            border-bottom: 3px solid #e74c3c;
            color: #e74c3c;
        }

        h2 {
            color: #2980b9;
            font-size: 1.8em;
            margin-top: 30px;
            border-bottom: 2px solid #3498db;
            padding-bottom: 5px;
        }

        h3 {
            color: #16a085;
            font-size: 1.4em;
            margin-top: 25px;
        }

        h4 {
            color: #27ae60;
            font-size: 1.2em;
            margin-top: 20px;
        }

        p {
            margin: 10px 0;
            text-align: justify;
        }

        ul, ol {
            margin: 10px 0;
            padding-left: 30px;
        }

        li {
            margin: 5px 0;
        }

        code {
            background-color: #f5f5f5;
            padding: 2px 5px;
            border-radius: 3px;
            font-family: 'Monaco', 'Menlo', 'Ubuntu Mono', monospace;
            font-size: 0.9em;
        }

        pre {
            background-color: #2c3e50;
            color: #ecf0f1;
            padding: 20px;
            border-radius: 5px;
            overflow-x: auto;
            page-break-inside: avoid;
        }

        pre code {
            background-color: transparent;
            padding: 0;
            color: #ecf0f1;
        }

        blockquote {
            border-left: 4px solid #3498db;
            margin: 20px 0;
            padding: 10px 20px;
            background-color: #ecf0f1;
            font-style: italic;
        }

        table {
            border-collapse: collapse;
            width: 100%;
            margin: 20px 0;
            page-break-inside: avoid;
        }

        table, th, td {
            border: 1px solid #bdc3c7;
        }

        th {
            background-color: #3498db;
            color: white;
            padding: 12px;
            text-align: left;
        }

        td {
            padding: 10px;
        }

        tr:nth-child(even) {
            background-color: #f9f9f9;
        }

        strong {
            color: #2c3e50;
        }

        em {
            color: #7f8c8d;
        }

        hr {
            border: none;
            border-top: 2px solid #bdc3c7;
            margin: 30px 0;
        }
    </style>
</head>
<body>
%BODY%
</body>
</html>
"#;

/// Render markdown to a complete, styled HTML document.
pub fn render_html(markdown: &str, title: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut body = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut body, parser);

    HTML_SHELL
        .replace("%TITLE%", &escape_html(title))
        .replace("%BODY%", &body)
}

/// Convert a markdown file to PDF via the external renderer.
///
/// Any front matter is split off first; its `title` (or one derived from
/// the filename) feeds the page footer.
pub fn markdown_to_pdf(input: &Path, output: &Path) -> Result<(), ConvertError> {
    let raw = std::fs::read_to_string(input).map_err(|e| ConvertError::ReadFailed {
        path: input.to_path_buf(),
        source: e,
    })?;

    let (header_text, body) = frontmatter::split(&raw);
    let front = match header_text {
        Some(text) => {
            FrontMatter::parse(text).map_err(|e| ConvertError::MalformedFrontMatter {
                path: input.to_path_buf(),
                detail: e.to_string(),
            })?
        }
        None => FrontMatter::new(),
    };
    let title = document_title(input, &front);

    info!("converting {} to {}", input.display(), output.display());
    let html = render_html(body, &title);

    let mut page = tempfile::Builder::new()
        .suffix(".html")
        .tempfile()
        .map_err(|e| ConvertError::Internal(format!("tempfile: {e}")))?;
    page.write_all(html.as_bytes())
        .map_err(|e| ConvertError::Internal(format!("tempfile write: {e}")))?;

    let result = Command::new(RENDERER)
        .arg(page.path())
        .arg(output)
        .output();

    let out = match result {
        Ok(out) => out,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConvertError::RendererMissing {
                program: RENDERER.to_string(),
            });
        }
        Err(e) => return Err(ConvertError::Internal(format!("{RENDERER}: {e}"))),
    };

    if !out.status.success() {
        return Err(ConvertError::RendererFailed {
            program: RENDERER.to_string(),
            status: out.status.to_string(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        });
    }

    info!("PDF created: {}", output.display());
    Ok(())
}

/// Footer title: the front-matter `title` when present, else derived from
/// the filename stem.
fn document_title(input: &Path, front: &FrontMatter) -> String {
    front
        .get("title")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            metadata::title_from_filename(&stem)
        })
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
