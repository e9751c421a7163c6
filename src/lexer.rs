//! Streaming lexer: splits input bytes into the five trivia slots per node
//! and builds the tree (SPEC_FULL.md §4.2).
//!
//! The original implementation this is modeled on reads from a `FILE*` with
//! single-byte `ungetc` pushback. Here the whole input is held as a byte
//! slice with a cursor, which gives free, unlimited lookahead/pushback (no
//! pushback stack is needed beyond moving the cursor back) — an adaptation
//! that lets several scanners use a clean two-byte peek to disambiguate `//`
//! and `/*` comment openers instead of the original's consume-then-maybe-
//! unread "slashed" flag dance.

use crate::buffer::ByteBuf;
use crate::config::SyntaxConfig;
use crate::error::LexError;
use crate::node::{NodeId, Tree};

struct Source<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Source<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.data.get(self.pos + ahead).copied()
    }

    fn next(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    /// Rewinds the cursor by one byte. Only ever called right after that byte
    /// was consumed by this same scan, so it can never underflow.
    fn unget(&mut self) {
        debug_assert!(self.pos > 0, "unget with empty pushback history");
        self.pos -= 1;
    }

    fn unget_n(&mut self, n: usize) {
        debug_assert!(self.pos >= n, "unget_n beyond start of stream");
        self.pos -= n;
    }

    fn offset(&self) -> u64 {
        self.pos as u64
    }
}

fn is_ws(ch: u8) -> bool {
    ch == b' ' || ch == b'\t' || ch == b'\n' || ch == b'\r' || ch == 0x0b || ch == 0x0c
}

/// Consumes bytes up to and including the next newline (or EOF), appending
/// them to `buf`. Used for both shell (`#`) and line (`//`) comments, which
/// terminate identically.
fn consume_line_comment(src: &mut Source, buf: &mut ByteBuf) {
    loop {
        match src.peek() {
            None => break,
            Some(b'\n') | Some(b'\r') => {
                buf.append(src.next().unwrap());
                break;
            }
            Some(_) => buf.append(src.next().unwrap()),
        }
    }
}

/// Consumes up to and including a `*/`, given that the opening `/*` has
/// already been appended to `buf`.
fn consume_block_comment(src: &mut Source, buf: &mut ByteBuf) -> Result<(), LexError> {
    loop {
        match src.next() {
            None => {
                return Err(LexError::UnterminatedComment {
                    offset: src.offset(),
                });
            }
            Some(b'*') => {
                buf.append(b'*');
                if src.peek() == Some(b'/') {
                    buf.append(src.next().unwrap());
                    return Ok(());
                }
            }
            Some(ch) => buf.append(ch),
        }
    }
}

/// `before`: leading trivia — whitespace, `;`, comments — plus, when this
/// scan is invoked at a point where a `}` can legally close the *parent*, the
/// `}` itself and whatever trails it on the same line. Returns the bytes and
/// whether a closing brace (or EOF) was seen.
fn read_before(src: &mut Source, cfg: &SyntaxConfig) -> Result<(ByteBuf, bool), LexError> {
    let mut b = ByteBuf::new();
    let mut no_newline = false;
    let mut closing_bracket = false;

    loop {
        let ch = match src.peek() {
            None => {
                closing_bracket = true;
                break;
            }
            Some(c) => c,
        };

        if no_newline && matches!(ch, b'\n' | b'\r' | b'}') {
            break;
        }

        match ch {
            b'#' => {
                b.append(src.next().unwrap());
                consume_line_comment(src, &mut b);
            }
            b'}' => {
                b.append(src.next().unwrap());
                no_newline = true;
                closing_bracket = true;
            }
            b'/' if cfg.slash_slash_comments && src.peek_at(1) == Some(b'/') => {
                b.append(src.next().unwrap());
                b.append(src.next().unwrap());
                consume_line_comment(src, &mut b);
            }
            b'/' if cfg.slash_star_comments && src.peek_at(1) == Some(b'*') => {
                b.append(src.next().unwrap());
                b.append(src.next().unwrap());
                consume_block_comment(src, &mut b)?;
            }
            _ if ch == b';' || is_ws(ch) => {
                b.append(src.next().unwrap());
            }
            _ => break,
        }
    }

    Ok((b, closing_bracket))
}

/// `name`: an unquoted-separator-terminated run, honoring `\`-escapes and
/// quote state. Every byte (including quote marks and backslashes) is kept
/// verbatim, since round-trip fidelity requires the name be stored exactly
/// as written.
fn read_name(src: &mut Source, cfg: &SyntaxConfig) -> Result<ByteBuf, LexError> {
    let mut b = ByteBuf::new();
    let mut escaped = false;
    let mut quoted = false;
    let mut squoted = false;

    loop {
        let ch = match src.peek() {
            None => {
                if quoted || squoted {
                    return Err(LexError::PrematureEofInQuote {
                        offset: src.offset(),
                    });
                }
                break;
            }
            Some(c) => c,
        };

        if escaped {
            b.append(src.next().unwrap());
            escaped = false;
            continue;
        }
        if ch == b'\\' {
            b.append(src.next().unwrap());
            escaped = true;
            continue;
        }
        if !squoted && ch == b'"' {
            quoted = !quoted;
        } else if !quoted && ch == b'\'' {
            squoted = !squoted;
        }
        if quoted || squoted {
            b.append(src.next().unwrap());
            continue;
        }
        let terminates = ch == b'#'
            || ch == b';'
            || ch == b'{'
            || ch == b'}'
            || ch == b'='
            || ch == b'\n'
            || ch == b'\r'
            || (!cfg.equals_sign && is_ws(ch))
            || (cfg.slash_slash_comments && ch == b'/' && src.peek_at(1) == Some(b'/'))
            || (cfg.slash_star_comments && ch == b'/' && src.peek_at(1) == Some(b'*'));
        if terminates {
            break;
        }
        b.append(src.next().unwrap());
    }

    Ok(b)
}

/// `middle`: whitespace, a single `=`-or-`{` worth of structure, and
/// escaped newline continuations. Returns whether `{` was consumed
/// (opening a container).
fn read_middle(src: &mut Source, cfg: &SyntaxConfig) -> (ByteBuf, bool) {
    let mut b = ByteBuf::new();
    let mut opening_bracket = false;

    loop {
        let ch = match src.peek() {
            None => break,
            Some(c) => c,
        };

        if ch == b'\\' {
            if matches!(src.peek_at(1), Some(b'\n') | Some(b'\r')) {
                b.append(src.next().unwrap());
                b.append(src.next().unwrap());
                continue;
            }
            // Any other escape belongs to the value; leave it unconsumed.
            break;
        }

        if ch == b';' {
            strip_trailing_ws_eq(src, &mut b);
            break;
        }
        if ch == b'#' {
            strip_trailing_ws_eq(src, &mut b);
            break;
        }
        if cfg.slash_slash_comments && ch == b'/' && src.peek_at(1) == Some(b'/') {
            strip_trailing_ws_eq(src, &mut b);
            break;
        }
        if cfg.slash_star_comments && ch == b'/' && src.peek_at(1) == Some(b'*') {
            strip_trailing_ws_eq(src, &mut b);
            break;
        }
        if ch == b'\n' || ch == b'\r' {
            if cfg.semicolon {
                b.append(src.next().unwrap());
                continue;
            }
            strip_trailing_ws_eq(src, &mut b);
            break;
        }
        if ch == b'{' && !opening_bracket {
            b.append(src.next().unwrap());
            opening_bracket = true;
            continue;
        }
        if is_ws(ch) || ch == b'=' {
            b.append(src.next().unwrap());
            continue;
        }
        break;
    }

    (b, opening_bracket)
}

/// Strips trailing whitespace/`=` bytes from `b`, pushing each one back onto
/// `src` so that a later scan (of `after` or the next `value`) sees them
/// again — mirrors the original's `ungetc`-per-stripped-byte loop.
fn strip_trailing_ws_eq(src: &mut Source, b: &mut ByteBuf) {
    while !b.is_empty() {
        let last = b.last();
        if is_ws(last) || last == b'=' {
            b.strip_last();
            src.unget();
        } else {
            break;
        }
    }
}

/// `value`: like `read_name` but also terminates on `{`/`}`/newline (unless
/// in semicolon mode) and strips trailing whitespace back into `after`.
/// Reports `opening_bracket` when the terminator was `{` — the caller must
/// reinterpret what was read as the start of an implicit-container chain
/// (SPEC_FULL.md §4.2 case 3).
fn read_value(src: &mut Source, cfg: &SyntaxConfig) -> Result<(ByteBuf, bool), LexError> {
    let mut b = ByteBuf::new();
    let mut escaped = false;
    let mut quoted = false;
    let mut squoted = false;
    let mut opening_bracket = false;

    loop {
        let ch = match src.peek() {
            None => {
                if quoted || squoted {
                    return Err(LexError::PrematureEofInQuote {
                        offset: src.offset(),
                    });
                }
                break;
            }
            Some(c) => c,
        };

        if escaped {
            b.append(src.next().unwrap());
            escaped = false;
            continue;
        }
        if ch == b'\\' {
            b.append(src.next().unwrap());
            escaped = true;
            continue;
        }
        if !squoted && ch == b'"' {
            quoted = !quoted;
        } else if !quoted && ch == b'\'' {
            squoted = !squoted;
        }
        if quoted || squoted {
            b.append(src.next().unwrap());
            continue;
        }

        let is_newline = ch == b'\n' || ch == b'\r';
        let stops_here = ch == b'{'
            || ch == b'}'
            || ch == b'#'
            || ch == b';'
            || (is_newline && !cfg.semicolon)
            || (cfg.slash_slash_comments && ch == b'/' && src.peek_at(1) == Some(b'/'))
            || (cfg.slash_star_comments && ch == b'/' && src.peek_at(1) == Some(b'*'));

        if stops_here {
            if ch == b'{' {
                opening_bracket = true;
            }
            while !b.is_empty() && is_ws(b.last()) {
                b.strip_last();
                src.unget();
            }
            break;
        }
        b.append(src.next().unwrap());
    }

    Ok((b, opening_bracket))
}

/// `after`: trailing same-line trivia — spaces, `;`, an inline comment —
/// stopping at (not consuming) the next newline or any other non-trivia byte.
fn read_after(src: &mut Source, cfg: &SyntaxConfig) -> Result<ByteBuf, LexError> {
    let mut b = ByteBuf::new();

    loop {
        let ch = match src.peek() {
            None => break,
            Some(c) => c,
        };
        if ch == b'\n' || ch == b'\r' {
            break;
        }
        match ch {
            b'#' => {
                b.append(src.next().unwrap());
                consume_line_comment(src, &mut b);
            }
            b'/' if cfg.slash_slash_comments && src.peek_at(1) == Some(b'/') => {
                b.append(src.next().unwrap());
                b.append(src.next().unwrap());
                consume_line_comment(src, &mut b);
            }
            b'/' if cfg.slash_star_comments && src.peek_at(1) == Some(b'*') => {
                b.append(src.next().unwrap());
                b.append(src.next().unwrap());
                consume_block_comment(src, &mut b)?;
            }
            _ if ch == b';' || is_ws(ch) => {
                b.append(src.next().unwrap());
            }
            _ => break,
        }
    }

    Ok(b)
}

/// Parses one node (and, recursively, its subtree) as a child of `parent`.
/// Returns `true` when this call consumed a closing brace (or hit EOF) and
/// so set `parent`'s `after`, signaling the caller's loop to stop.
fn parse_node(tree: &mut Tree, parent: NodeId, src: &mut Source, cfg: &SyntaxConfig) -> Result<bool, LexError> {
    let (before, closing_bracket) = read_before(src, cfg)?;
    if closing_bracket {
        tree.get_mut(parent).after = before;
        return Ok(true);
    }

    let name = read_name(src, cfg)?;
    let (middle, opening_bracket) = read_middle(src, cfg);

    let node = tree.new_child(parent, name);
    tree.get_mut(node).before = before;
    tree.get_mut(node).middle = middle;

    if opening_bracket {
        loop {
            if parse_node(tree, node, src, cfg)? {
                break;
            }
        }
        return Ok(false);
    }

    let (value, value_opens_bracket) = read_value(src, cfg)?;
    if !value_opens_bracket {
        let after = read_after(src, cfg)?;
        tree.get_mut(node).value = Some(value);
        tree.get_mut(node).after = after;
        return Ok(false);
    }

    // Case 3: what was scanned as `value` is actually one or more further
    // container names, terminated by the `{` we just saw. Push those bytes
    // back and re-lex them with name/middle rules (which split on
    // whitespace, unlike value scanning), looping one implicit level per
    // name/middle pair until a middle finally consumes the `{`.
    tree.get_mut(node).implicit_container = true;
    src.unget_n(value.len());

    let mut current = node;
    loop {
        let inner_name = read_name(src, cfg)?;
        let (inner_middle, inner_opens_bracket) = read_middle(src, cfg);
        let child = tree.new_child(current, inner_name);
        tree.get_mut(child).middle = inner_middle;
        current = child;
        if inner_opens_bracket {
            break;
        }
        tree.get_mut(current).implicit_container = true;
    }

    loop {
        if parse_node(tree, current, src, cfg)? {
            break;
        }
    }
    Ok(false)
}

/// Parses `input` into a fresh [`Tree`] under `cfg`'s syntax rules.
pub fn parse(input: &[u8], cfg: &SyntaxConfig) -> Result<Tree, LexError> {
    log::trace!("lexing {} bytes, cfg={cfg:?}", input.len());
    let mut tree = Tree::new();
    let root = tree.root();
    let mut src = Source::new(input);

    loop {
        if parse_node(&mut tree, root, &mut src, cfg)? {
            break;
        }
    }

    Ok(tree)
}
