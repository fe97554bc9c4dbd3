// Helpers for the slash-delimited virtual paths used by the store.
// Directory paths are always normalized: they begin and end with a separator,
// and the root directory is the bare separator.

use serde::Serialize;

pub const SEPARATOR: char = '/';
pub const ROOT: &str = "/";
pub const DEFAULT_ROOT_LABEL: &str = "Home";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub name: String,
    pub path: String,
}

impl Breadcrumb {
    fn new(name: &str, path: &str) -> Breadcrumb {
        Breadcrumb {
            name: name.to_string(),
            path: path.to_string(),
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|part| !part.is_empty())
}

/// Build the navigation trail for a directory, starting with the root.
pub fn compute_breadcrumbs(path: &str, root_label: &str) -> Vec<Breadcrumb> {
    let mut crumbs = vec![Breadcrumb::new(root_label, ROOT)];
    let mut prefix = String::from(ROOT);
    for part in segments(path) {
        prefix.push_str(part);
        prefix.push(SEPARATOR);
        crumbs.push(Breadcrumb::new(part, &prefix));
    }
    crumbs
}

pub fn normalize(path: &str) -> String {
    let parts: Vec<&str> = segments(path).collect();
    if parts.is_empty() {
        return ROOT.to_string();
    }
    format!("{ROOT}{}{SEPARATOR}", parts.join("/"))
}

pub fn is_root(path: &str) -> bool {
    path == ROOT
}

/// The directory one level above `path`. The root is its own parent.
pub fn parent_path(path: &str) -> String {
    let mut parts: Vec<&str> = segments(path).collect();
    parts.pop();
    if parts.is_empty() {
        return ROOT.to_string();
    }
    format!("{ROOT}{}{SEPARATOR}", parts.join("/"))
}

/// The directory a file lives in: everything up to and including the last separator.
pub fn parent_of_file(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(index) => &path[..=index],
        None => "",
    }
}

pub fn join_file(parent: &str, name: &str) -> String {
    format!("{parent}{name}")
}

pub fn join_folder(parent: &str, name: &str) -> String {
    format!("{parent}{name}{SEPARATOR}")
}
