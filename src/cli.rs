use std::{fmt, fs, path::PathBuf, str::FromStr};

use clap::{Args, Parser, Subcommand};
use url::Url;

use crate::export::ExportFormat;
use crate::style::Style;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract metadata from pages and print one formatted citation each
    Cite {
        #[arg(value_name = "SRC")]
        from: Vec<Source>,
        /// Citation style: apa, mla, chicago, ieee, harvard or vancouver
        #[arg(long, default_value = "apa")]
        style: Style,
        /// Append the style's retrieved/accessed clause
        #[arg(long)]
        accessed: bool,
        /// Smart sentence-casing of the title (APA)
        #[arg(long)]
        sentence_case: bool,
        /// Use the publisher/site as a corporate author when nobody resolved
        #[arg(long)]
        corporate_author: bool,
        /// Append " [PDF]" to the title of PDF pages
        #[arg(long)]
        pdf_suffix: bool,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Print an export record (BibTeX, RIS, CSL-JSON) per source
    Export {
        #[arg(value_name = "SRC")]
        from: Vec<Source>,
        /// Output format: bibtex, ris or csl-json
        #[arg(long, default_value = "bibtex")]
        format: ExportFormat,
        #[command(flatten)]
        common: CommonArgs,
    },
}

/// Flags shared by both subcommands: the logical page URL for file input,
/// the re-check window, and manual field overrides.
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Treat file input as if it had been fetched from this URL
    #[arg(long, value_name = "URL")]
    pub page_url: Option<Url>,
    /// How long to wait before the single re-check of a silent page (0 disables)
    #[arg(long, default_value_t = 800, value_name = "MS")]
    pub recheck_ms: u64,
    /// Override the extracted title
    #[arg(long)]
    pub title: Option<String>,
    /// Override the author list (comma-separated names)
    #[arg(long)]
    pub authors: Option<String>,
    /// Override the publication date
    #[arg(long)]
    pub date: Option<String>,
    /// Override the publisher
    #[arg(long)]
    pub publisher: Option<String>,
    /// Override the DOI
    #[arg(long)]
    pub doi: Option<String>,
}

impl CommonArgs {
    pub fn overrides(&self) -> crate::payload::FieldOverrides {
        crate::payload::FieldOverrides {
            title: self.title.clone(),
            authors: self.authors.clone(),
            date: self.date.clone(),
            publisher: self.publisher.clone(),
            doi: self.doi.clone(),
        }
    }
}

/// Where a page comes from: a local HTML file, or an HTTP(S) URL to fetch.
#[derive(Clone, Debug)]
pub enum Source {
    File(PathBuf),
    Url(Url),
}

impl FromStr for Source {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // An existing path wins; anything else must parse as an http(s) URL.
        if let Ok(path) = fs::canonicalize(s) {
            return Ok(Source::File(path));
        }
        match Url::parse(s) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Source::Url(url)),
            Ok(url) => Err(format!("unsupported URL scheme: {}", url.scheme())),
            Err(_) => Err(format!("not an existing file or http(s) URL: {s}")),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Url(url) => write!(f, "{url}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn from_str_identifies_existing_file() {
        let tmp = NamedTempFile::new().expect("tmp file");
        let path = tmp.path().to_path_buf();
        let src = Source::from_str(path.to_str().unwrap()).expect("parse");
        match src {
            Source::File(p) => {
                let can = std::fs::canonicalize(&path).unwrap();
                assert_eq!(p, can);
            }
            _ => panic!("expected file source"),
        }
    }

    #[test]
    fn from_str_accepts_http_urls() {
        let src = Source::from_str("https://example.com/article").expect("parse");
        match src {
            Source::Url(u) => assert_eq!(u.as_str(), "https://example.com/article"),
            _ => panic!("expected URL source"),
        }
    }

    #[test]
    fn from_str_rejects_other_schemes_and_junk() {
        assert!(Source::from_str("ftp://example.com/x").is_err());
        proptest::proptest!(|(s in "[A-Za-z0-9._-]{1,32}")| {
            let path = PathBuf::from(&s);
            proptest::prop_assume!(!path.exists());
            proptest::prop_assert!(Source::from_str(&s).is_err());
        })
    }
}
