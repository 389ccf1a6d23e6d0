//! Single-line POSIX shell commands issued to the remote interpreter.
//!
//! Paths are always single-quoted. The only unquoted shell syntax is the
//! Part glob, redirections and the `||` fallbacks.

use crate::layout::RemoteLayout;

/// Quotes `value` as one POSIX shell word.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// `mkdir -p '<dir>'`
pub fn make_dir(dir: &str) -> String {
    format!("mkdir -p {}", quote(dir))
}

/// `rm -rf '<a>' '<b>' ...`
pub fn remove_all(paths: &[&str]) -> String {
    let quoted: Vec<String> = paths.iter().map(|p| quote(p)).collect();
    format!("rm -rf {}", quoted.join(" "))
}

/// `rm -f '<file>'`
pub fn remove_file(path: &str) -> String {
    format!("rm -f {}", quote(path))
}

/// `printf '%s' '<text>' >> '<file>'`
///
/// `printf '%s'` writes `text` verbatim, without the trailing newline
/// `echo` would add.
pub fn append(text: &str, path: &str) -> String {
    format!("printf '%s' {} >> {}", quote(text), quote(path))
}

/// `cat '<scratch>'/part_* > '<merged>'`
pub fn concat_parts(layout: &RemoteLayout) -> String {
    format!(
        "cat {}/{} > {}",
        quote(layout.scratch_dir()),
        layout.part_glob(),
        quote(layout.merged_file())
    )
}

/// Decodes the merged file into the target, falling back to `fallback`.
pub fn decode(layout: &RemoteLayout, fallback: &str) -> String {
    let merged = quote(layout.merged_file());
    let target = quote(layout.target());
    format!("base64 -d {merged} > {target} || {fallback} -d {merged} > {target}")
}

/// `chmod +x '<file>'`
pub fn make_executable(path: &str) -> String {
    format!("chmod +x {}", quote(path))
}

/// Clears the remote terminal, with an ANSI reset as fallback.
pub fn clear_screen() -> String {
    r"clear || printf '\033c'".to_string()
}

/// Command whose output is exactly `token` followed by a newline.
///
/// The token is split across two adjacent quoted words so the command text
/// itself never contains it. A remote terminal that echoes input back
/// therefore cannot produce a false acknowledgment.
pub fn acknowledge(token: &str) -> String {
    let mid = token
        .char_indices()
        .map(|(i, _)| i)
        .nth(token.chars().count() / 2)
        .unwrap_or(0);
    let (head, tail) = token.split_at(mid);
    if head.is_empty() || tail.is_empty() {
        format!("echo {}", quote(token))
    } else {
        format!("echo {}{}", quote(head), quote(tail))
    }
}
