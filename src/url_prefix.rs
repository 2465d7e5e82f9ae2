use regex::Regex;
use std::sync::OnceLock;

/// Leading two-letter language segment, e.g. the "/en" in "/en/orders"
fn prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/[a-z]{2}(/|$)").expect("prefix regex is valid"))
}

fn normalize(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Remove a leading two-letter language segment, if present.
///
/// `"/en/orders"` becomes `"/orders"`, `"/en"` becomes `"/"`; a path whose
/// first segment is not exactly two lowercase letters (like `"/orders"`) is
/// returned unchanged.
pub fn strip_prefix(path: &str) -> String {
    let path = normalize(path);
    match prefix_regex().find(&path) {
        Some(m) => format!("/{}", &path[m.end()..]),
        None => path,
    }
}

/// The language code named by a leading prefix, or `default` when the path
/// carries none
pub fn language_from_path(path: &str, default: &str) -> String {
    let path = normalize(path);
    if prefix_regex().is_match(&path) {
        path[1..3].to_string()
    } else {
        default.to_string()
    }
}

/// Compute the path that reflects `target` as the active language.
///
/// Any existing prefix is stripped first. The default language carries no
/// prefix; every other language is prepended as `/{code}`. The root path
/// stays `"/"` for the default and becomes `"/{code}"` otherwise.
pub fn compute_path(path: &str, target: &str, default: &str) -> String {
    let base = strip_prefix(path);
    if target == default {
        base
    } else if base == "/" {
        format!("/{}", target)
    } else {
        format!("/{}{}", target, base)
    }
}

/// Whether applying a new path overwrites the current history entry or
/// pushes a new one. Fixed per synchronizer so navigation semantics stay
/// consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    Push,
    Replace,
}

/// Keeps the address path's language prefix in sync with the active
/// language, without reloads.
///
/// Models the browser history the embedding shell drives: `sync` applies the
/// computed path, and under `HistoryMode::Push` the previous path stays
/// reachable through `back`.
#[derive(Debug)]
pub struct UrlSynchronizer {
    mode: HistoryMode,
    current: String,
    back_stack: Vec<String>,
}

impl UrlSynchronizer {
    pub fn new(initial_path: &str, mode: HistoryMode) -> Self {
        Self {
            mode,
            current: normalize(initial_path),
            back_stack: Vec::new(),
        }
    }

    /// The path currently shown in the address bar
    pub fn path(&self) -> &str {
        &self.current
    }

    /// Record a navigation performed by the embedding shell (a route change,
    /// not a language change); always pushes
    pub fn navigate(&mut self, path: &str) {
        let next = normalize(path);
        if next == self.current {
            return;
        }
        self.back_stack.push(std::mem::replace(&mut self.current, next));
    }

    /// Rewrite the current path to reflect `target` as the active language.
    /// Returns the path now shown. A path that would not change is left
    /// alone, adding no history entry.
    pub fn sync(&mut self, target: &str, default: &str) -> &str {
        let next = compute_path(&self.current, target, default);
        if next != self.current {
            match self.mode {
                HistoryMode::Push => {
                    self.back_stack.push(std::mem::replace(&mut self.current, next));
                }
                HistoryMode::Replace => self.current = next,
            }
        }
        &self.current
    }

    /// Step back to the previous history entry, if any
    pub fn back(&mut self) -> Option<&str> {
        let previous = self.back_stack.pop()?;
        self.current = previous;
        Some(&self.current)
    }
}
