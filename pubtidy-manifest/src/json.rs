use crate::error::{ManifestError, ManifestResult};
use camino::Utf8Path;
use fs_err as fs;
use serde::Serialize;
use serde::de::DeserializeOwned;

const BOM: char = '\u{feff}';

/// Byte-level details of the original file that survive a rewrite.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Layout {
    bom: bool,
    trailing_newline: bool,
}

pub(crate) fn parse_str<T: DeserializeOwned>(contents: &str) -> Result<(T, Layout), serde_json::Error> {
    let bom = contents.starts_with(BOM);
    let body = contents.trim_start_matches(BOM);
    let layout = Layout {
        bom,
        trailing_newline: body.ends_with('\n'),
    };
    Ok((serde_json::from_str(body)?, layout))
}

pub(crate) fn render<T: Serialize>(value: &T, layout: Layout) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    if layout.bom {
        out.push(BOM);
    }
    out.push_str(&serde_json::to_string_pretty(value)?);
    if layout.trailing_newline {
        out.push('\n');
    }
    Ok(out)
}

pub(crate) fn read(path: &Utf8Path) -> ManifestResult<String> {
    fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write(path: &Utf8Path, contents: &str) -> ManifestResult<()> {
    fs::write(path, contents).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn json_error(path: &Utf8Path, source: serde_json::Error) -> ManifestError {
    ManifestError::Json {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_and_newline_survive_render() {
        let (v, layout) = parse_str::<serde_json::Value>("\u{feff}{\"a\":1}\n").unwrap();
        let out = render(&v, layout).unwrap();
        assert!(out.starts_with(BOM));
        assert!(out.ends_with("}\n"));
    }

    #[test]
    fn plain_document_stays_plain() {
        let (v, layout) = parse_str::<serde_json::Value>("{\"a\":1}").unwrap();
        let out = render(&v, layout).unwrap();
        assert_eq!(out, "{\n  \"a\": 1\n}");
    }
}
