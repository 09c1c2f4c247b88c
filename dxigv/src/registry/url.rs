//! Registry URL construction.
//!
//! Manifest URLs are percent-encoded like Python's `urllib.quote` with a wide
//! safe set: IGV expects reserved characters literal, while spaces and other
//! unsafe bytes in project names must be escaped.

use std::path::Path;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::{RegistryError, RegistryResult};

/// Reserved characters left unescaped in registry URLs.
pub const SAFE_CHARS: &str = "%/:=&?~#+!$,;'@()*[]";

/// Bytes escaped by [`quote`]: everything but alphanumerics, `_.-~` and
/// [`SAFE_CHARS`].
const QUOTE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'%')
    .remove(b'/')
    .remove(b':')
    .remove(b'=')
    .remove(b'&')
    .remove(b'?')
    .remove(b'#')
    .remove(b'+')
    .remove(b'!')
    .remove(b'$')
    .remove(b',')
    .remove(b';')
    .remove(b'\'')
    .remove(b'@')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'[')
    .remove(b']');

/// Percent-encode every byte outside the safe set as `%XX`.
pub fn quote(value: &str) -> String {
    utf8_percent_encode(value, QUOTE_SET).to_string()
}

/// URL of a manifest file inside the registry folder.
///
/// The manifest path relative to `folder` is appended to `folder_url`
/// with a single `/`, and the result is quoted.
pub fn manifest_url(folder_url: &str, folder: &Path, manifest: &Path) -> RegistryResult<String> {
    let relative = manifest.strip_prefix(folder).map_err(|_| {
        RegistryError::InvalidPath(format!(
            "{} is not inside {}",
            manifest.display(),
            folder.display()
        ))
    })?;

    let mut segments = Vec::new();
    for component in relative.components() {
        let segment = component.as_os_str().to_str().ok_or_else(|| {
            RegistryError::InvalidPath(format!("{} is not valid UTF-8", manifest.display()))
        })?;
        segments.push(segment);
    }

    let url = format!(
        "{}/{}",
        folder_url.trim_end_matches('/'),
        segments.join("/")
    );
    Ok(quote(&url))
}
