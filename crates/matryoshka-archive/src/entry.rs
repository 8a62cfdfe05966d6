use serde::{Deserialize, Serialize};

/// One manifest record: a member of the archive tree.
///
/// `path` is the containment chain, from the top-level archive down to the
/// member's name inside its immediate container. `hash` and `text` are both
/// absent when the member's bytes were not captured.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "name")]
    pub path: Vec<String>,
    pub size: u64,
    pub mode: u32,
    pub hash: Option<String>,
    pub text: Option<bool>,
}

impl Entry {
    pub fn stored(path: Vec<String>, size: u64, mode: u32, hash: String, text: bool) -> Self {
        Self {
            path,
            size,
            mode,
            hash: Some(hash),
            text: Some(text),
        }
    }

    /// A member whose content was not captured (symlink, device, failed store).
    pub fn uncaptured(path: Vec<String>, size: u64, mode: u32) -> Self {
        Self {
            path,
            size,
            mode,
            hash: None,
            text: None,
        }
    }

    pub fn is_captured(&self) -> bool {
        self.hash.is_some()
    }

    /// Name of the member inside its immediate container.
    pub fn member_name(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }
}

/// Lexically normalize a member name the way POSIX `normpath` does.
///
/// Collapses repeated separators, drops `.` segments, resolves `..` against
/// the preceding segment, and strips trailing slashes. An empty result is `.`.
pub fn normalize_member_name(raw: &str) -> String {
    if raw.is_empty() {
        return ".".to_owned();
    }

    let leading = raw.bytes().take_while(|&b| b == b'/').count();
    let root = match leading {
        0 => "",
        2 => "//",
        _ => "/",
    };

    let mut parts: Vec<&str> = Vec::new();
    for part in raw.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if root.is_empty() {
                    parts.push("..");
                }
            }
            _ => parts.push(part),
        }
    }

    let joined = format!("{root}{}", parts.join("/"));
    if joined.is_empty() { ".".to_owned() } else { joined }
}
