//! Command variant expansion.
//!
//! Different hosts ship different toolsets: a command may exist as a plain
//! binary, or only as an applet of a multi-call binary such as `busybox`.
//! A *flavor* is such a prefix; the empty flavor means "run it as is".
//!
//! Expanding a template yields one candidate per flavor, in flavor order.
//! The candidates are meant to be tried in that order until one exits with
//! an accepted code.
//!
//! # Substitution
//!
//! - With the marker: every `"%binary "` is replaced by `"<flavor> "`, or
//!   removed for the empty flavor.
//!   `(%binary test -d x) || exit 1` becomes `(busybox test -d x) || exit 1`.
//! - Without the marker: a non-empty flavor is prepended with a space;
//!   `ls` becomes `busybox ls`.

/// Placeholder replaced by the flavor prefix.
pub const BINARY_MARKER: &str = "%binary";

/// Flavors tried when no others are configured, in order.
pub const DEFAULT_FLAVORS: [&str; 3] = ["", "busybox", "toolbox"];

/// Expand `template` into one command per flavor, preserving flavor order.
pub fn expand<S: AsRef<str>>(template: &str, flavors: &[S]) -> Vec<String> {
    flavors
        .iter()
        .map(|flavor| expand_one(template, flavor.as_ref()))
        .collect()
}

/// Expand `template` for a single flavor.
pub fn expand_one(template: &str, flavor: &str) -> String {
    let marker = format!("{BINARY_MARKER} ");

    if template.contains(&marker) {
        let replacement = if flavor.is_empty() {
            String::new()
        } else {
            format!("{flavor} ")
        };
        template.replace(&marker, &replacement)
    } else if flavor.is_empty() {
        template.to_string()
    } else {
        format!("{flavor} {template}")
    }
}

/// Build the invocation for a logical command under a flavor (`cat`, `busybox cat`).
pub fn invocation(name: &str, flavor: &str) -> String {
    if flavor.is_empty() {
        name.to_string()
    } else {
        format!("{flavor} {name}")
    }
}
