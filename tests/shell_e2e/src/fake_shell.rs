//! In-memory stand-in for a remote POSIX shell.
//!
//! Understands just enough `sh` for the upload protocol: single-quoted
//! words (including the `'\''` escape and adjacent-word joining), unquoted
//! `*` globs, `>` / `>>` redirections and `||` fallbacks. The filesystem
//! outlives individual connections so a resumed session sees what an
//! earlier, stalled one left behind.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::task::JoinHandle;

/// Remote filesystem state.
#[derive(Debug, Default)]
pub struct FakeFs {
    pub files: BTreeMap<String, Vec<u8>>,
    pub dirs: BTreeSet<String>,
    pub executable: BTreeSet<String>,
}

impl FakeFs {
    fn parent_exists(&self, path: &str) -> bool {
        match path.rsplit_once('/') {
            None => true,
            Some(("", _)) => true,
            Some((parent, _)) => self.dirs.contains(parent),
        }
    }

    fn remove_tree(&mut self, path: &str) {
        let prefix = format!("{path}/");
        self.files.retain(|p, _| p != path && !p.starts_with(&prefix));
        self.dirs.retain(|p| p != path && !p.starts_with(&prefix));
        self.executable.retain(|p| p != path && !p.starts_with(&prefix));
    }

    /// Part files present in `dir`, sorted.
    pub fn parts_in(&self, dir: &str) -> Vec<String> {
        let prefix = format!("{dir}/part_");
        self.files
            .keys()
            .filter(|p| p.starts_with(&prefix))
            .cloned()
            .collect()
    }
}

/// Per-connection behavior.
#[derive(Debug, Clone)]
pub struct ShellOptions {
    /// `false` emulates a host without a standalone `base64` binary.
    pub has_base64: bool,
    /// Echo every input line back, like a terminal in cooked mode.
    pub echo_input: bool,
    /// Go silent at the `n`-th (1-based) line containing the pattern.
    pub stall_at: Option<(String, usize)>,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            has_base64: true,
            echo_input: false,
            stall_at: None,
        }
    }
}

/// A fake remote host; each [`connect`](Self::connect) is one shell.
#[derive(Clone, Default)]
pub struct FakeShell {
    fs: Arc<Mutex<FakeFs>>,
}

impl FakeShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fs(&self) -> std::sync::MutexGuard<'_, FakeFs> {
        self.fs.lock().unwrap()
    }

    /// Starts a shell session; returns our end of the stream and a handle
    /// yielding every line the shell received.
    pub fn connect(&self, options: ShellOptions) -> (DuplexStream, JoinHandle<Vec<String>>) {
        let (local, remote) = tokio::io::duplex(64 * 1024);
        let fs = Arc::clone(&self.fs);
        let handle = tokio::spawn(run_shell(remote, fs, options));
        (local, handle)
    }
}

async fn run_shell(stream: DuplexStream, fs: Arc<Mutex<FakeFs>>, options: ShellOptions) -> Vec<String> {
    let (reader, mut writer) = tokio::io::split(stream);
    let mut lines = BufReader::new(reader).lines();
    let mut received = Vec::new();
    let mut matches = 0;
    let mut stalled = false;

    while let Ok(Some(line)) = lines.next_line().await {
        received.push(line.clone());
        if stalled {
            continue;
        }
        if let Some((pattern, n)) = &options.stall_at {
            if line.contains(pattern.as_str()) {
                matches += 1;
                if matches == *n {
                    stalled = true;
                    continue;
                }
            }
        }

        let mut out = Vec::new();
        if options.echo_input {
            out.extend_from_slice(line.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        {
            let mut fs = fs.lock().unwrap();
            execute_line(&line, &mut fs, &options, &mut out);
        }
        if writer.write_all(&out).await.is_err() {
            break;
        }
    }
    received
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word { text: String, glob: bool },
    Op(&'static str),
}

fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();
    let mut word = String::new();
    let mut in_word = false;
    let mut glob = false;

    let flush = |tokens: &mut Vec<Token>, word: &mut String, in_word: &mut bool, glob: &mut bool| {
        if *in_word {
            tokens.push(Token::Word {
                text: std::mem::take(word),
                glob: *glob,
            });
            *in_word = false;
            *glob = false;
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                for q in chars.by_ref() {
                    if q == '\'' {
                        break;
                    }
                    word.push(q);
                }
            }
            '\\' => {
                in_word = true;
                if let Some(next) = chars.next() {
                    word.push(next);
                }
            }
            ' ' | '\t' => flush(&mut tokens, &mut word, &mut in_word, &mut glob),
            '>' => {
                flush(&mut tokens, &mut word, &mut in_word, &mut glob);
                if chars.peek() == Some(&'>') {
                    chars.next();
                    tokens.push(Token::Op(">>"));
                } else {
                    tokens.push(Token::Op(">"));
                }
            }
            '|' if chars.peek() == Some(&'|') => {
                chars.next();
                flush(&mut tokens, &mut word, &mut in_word, &mut glob);
                tokens.push(Token::Op("||"));
            }
            '*' => {
                in_word = true;
                glob = true;
                word.push('*');
            }
            other => {
                in_word = true;
                word.push(other);
            }
        }
    }
    flush(&mut tokens, &mut word, &mut in_word, &mut glob);
    tokens
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

fn execute_line(line: &str, fs: &mut FakeFs, options: &ShellOptions, out: &mut Vec<u8>) {
    let tokens = tokenize(line);
    for alternative in tokens.split(|t| *t == Token::Op("||")) {
        if run_simple(alternative, fs, options, out) {
            return;
        }
    }
}

/// Runs one simple command; returns whether it succeeded.
fn run_simple(tokens: &[Token], fs: &mut FakeFs, options: &ShellOptions, out: &mut Vec<u8>) -> bool {
    let mut args = Vec::new();
    let mut redirect: Option<(&str, String)> = None;
    let mut iter = tokens.iter();
    while let Some(token) = iter.next() {
        match token {
            Token::Op(op) => match iter.next() {
                Some(Token::Word { text, .. }) => redirect = Some((*op, text.clone())),
                _ => return false,
            },
            Token::Word { text, glob: true } => args.extend(expand_glob(text, fs)),
            Token::Word { text, .. } => args.push(text.clone()),
        }
    }

    if let Some((_, path)) = &redirect {
        if !fs.parent_exists(path) || fs.dirs.contains(path) {
            return false;
        }
    }

    let mut stdout = Vec::new();
    let ok = run_builtin(&args, fs, options, &mut stdout);

    match redirect {
        Some((">", path)) => {
            if ok {
                fs.files.insert(path, stdout);
            }
        }
        Some((_, path)) => fs.files.entry(path).or_default().extend_from_slice(&stdout),
        None => out.extend_from_slice(&stdout),
    }
    ok
}

fn expand_glob(pattern: &str, fs: &FakeFs) -> Vec<String> {
    let Some((prefix, suffix)) = pattern.split_once('*') else {
        return vec![pattern.to_string()];
    };
    let found: Vec<String> = fs
        .files
        .keys()
        .filter(|p| p.starts_with(prefix) && p.ends_with(suffix) && p.len() >= prefix.len() + suffix.len())
        .filter(|p| !p[prefix.len()..p.len() - suffix.len()].contains('/'))
        .cloned()
        .collect();
    if found.is_empty() {
        vec![pattern.to_string()]
    } else {
        found
    }
}

fn run_builtin(args: &[String], fs: &mut FakeFs, options: &ShellOptions, stdout: &mut Vec<u8>) -> bool {
    let argv: Vec<&str> = args.iter().map(String::as_str).collect();
    match argv.as_slice() {
        ["echo", rest @ ..] => {
            stdout.extend_from_slice(rest.join(" ").as_bytes());
            stdout.push(b'\n');
            true
        }
        ["printf", "%s", text] => {
            stdout.extend_from_slice(text.as_bytes());
            true
        }
        ["printf", r"\033c"] => {
            stdout.extend_from_slice(b"\x1bc");
            true
        }
        ["clear"] => {
            stdout.extend_from_slice(b"\x1b[H\x1b[2J");
            true
        }
        ["mkdir", "-p", dir] => {
            let mut current = String::new();
            for component in dir.split('/').filter(|c| !c.is_empty()) {
                if !current.is_empty() || dir.starts_with('/') {
                    current.push('/');
                }
                current.push_str(component);
                fs.dirs.insert(current.clone());
            }
            true
        }
        ["rm", "-rf", paths @ ..] => {
            for path in paths {
                fs.remove_tree(path);
            }
            true
        }
        ["rm", "-f", paths @ ..] => {
            for path in paths {
                fs.files.remove(*path);
            }
            true
        }
        ["cat", paths @ ..] => {
            for path in paths {
                match fs.files.get(*path) {
                    Some(data) => stdout.extend_from_slice(data),
                    None => return false,
                }
            }
            true
        }
        ["base64", "-d", path] if options.has_base64 => decode_into(fs, path, stdout),
        ["busybox", "base64", "-d", path] => decode_into(fs, path, stdout),
        ["chmod", "+x", path] => {
            if fs.files.contains_key(*path) {
                fs.executable.insert(path.to_string());
                true
            } else {
                false
            }
        }
        _ => false,
    }
}

fn decode_into(fs: &FakeFs, path: &str, stdout: &mut Vec<u8>) -> bool {
    let Some(data) = fs.files.get(path) else {
        return false;
    };
    match STANDARD.decode(data) {
        Ok(raw) => {
            stdout.extend_from_slice(&raw);
            true
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(fs: &mut FakeFs, line: &str) -> Vec<u8> {
        let mut out = Vec::new();
        execute_line(line, fs, &ShellOptions::default(), &mut out);
        out
    }

    #[test]
    fn split_token_echo_joins_words() {
        let mut fs = FakeFs::default();
        assert_eq!(run(&mut fs, "echo '__O''K__'"), b"__OK__\n");
    }

    #[test]
    fn escaped_quote_in_path() {
        let mut fs = FakeFs::default();
        run(&mut fs, r"mkdir -p '/tmp/it'\''s'");
        assert!(fs.dirs.contains("/tmp/it's"));
        assert!(fs.dirs.contains("/tmp"));
    }

    #[test]
    fn redirect_requires_parent_dir() {
        let mut fs = FakeFs::default();
        run(&mut fs, "printf '%s' 'abc' >> '/nope/file'");
        assert!(fs.files.is_empty());

        run(&mut fs, "mkdir -p '/d'");
        run(&mut fs, "printf '%s' 'abc' >> '/d/file'");
        run(&mut fs, "printf '%s' 'def' >> '/d/file'");
        assert_eq!(fs.files["/d/file"], b"abcdef");
    }

    #[test]
    fn glob_concatenates_in_order() {
        let mut fs = FakeFs::default();
        run(&mut fs, "mkdir -p '/s'");
        run(&mut fs, "printf '%s' 'B' >> '/s/part_0001'");
        run(&mut fs, "printf '%s' 'A' >> '/s/part_0000'");
        run(&mut fs, "cat '/s'/part_* > '/s.out'");
        assert_eq!(fs.files["/s.out"], b"AB");
    }

    #[test]
    fn fallback_runs_after_failure() {
        let mut fs = FakeFs::default();
        fs.files.insert("/m".into(), b"aGk=".to_vec());
        let mut out = Vec::new();
        let options = ShellOptions {
            has_base64: false,
            ..ShellOptions::default()
        };
        execute_line(
            "base64 -d '/m' > '/t' || busybox base64 -d '/m' > '/t'",
            &mut fs,
            &options,
            &mut out,
        );
        assert_eq!(fs.files["/t"], b"hi");
    }
}
