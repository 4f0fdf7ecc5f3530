//! [§ 4.5 URLs](https://www.w3.org/TR/css-values-4/#urls)
//!
//! "Relative URLs are resolved to full URLs using a base URL."
//!
//! Once a declaration moves from a stylesheet into a `style` attribute its
//! relative `url()` references resolve against the document instead of the
//! sheet, so they are made absolute first.

use koala_common::url::resolve_against;
use url::Url;

use crate::tokenizer::{CSSToken, CSSTokenizer};

/// Rewrite the relative `url()` references in a declaration value against
/// `base`.
///
/// Both the unquoted `url(a.png)` form and the quoted `url("a.png")` form
/// are handled. Everything else in the value is copied byte for byte.
#[must_use]
pub fn rewrite_urls(value: &str, base: &Url) -> String {
    let mut tokenizer = CSSTokenizer::new(value);
    tokenizer.run();
    let tokens = tokenizer.into_spanned();

    let mut out = String::with_capacity(value.len());
    let mut copied = 0;
    let mut i = 0;
    while let Some(spanned) = tokens.get(i) {
        match &spanned.token {
            CSSToken::Url(href) => {
                let resolved = resolve_against(href, base);
                if resolved != *href {
                    out.push_str(value.get(copied..spanned.start).unwrap_or_default());
                    out.push_str("url(");
                    out.push_str(&resolved);
                    out.push(')');
                    copied = spanned.end;
                }
            }
            // "The url() function can also be written with a quoted string,
            // which is parsed as a normal function."
            CSSToken::Function(name) if name.eq_ignore_ascii_case("url") => {
                let mut j = i + 1;
                while tokens.get(j).is_some_and(|t| t.token.is_whitespace()) {
                    j += 1;
                }
                if let Some(argument) = tokens.get(j)
                    && let CSSToken::String(href) = &argument.token
                {
                    let resolved = resolve_against(href, base);
                    if resolved != *href {
                        let quote = argument.slice(value).chars().next().unwrap_or('"');
                        out.push_str(value.get(copied..argument.start).unwrap_or_default());
                        out.push(quote);
                        for c in resolved.chars() {
                            if c == quote || c == '\\' {
                                out.push('\\');
                            }
                            out.push(c);
                        }
                        out.push(quote);
                        copied = argument.end;
                    }
                    i = j;
                }
            }
            _ => {}
        }
        i += 1;
    }
    out.push_str(value.get(copied..).unwrap_or_default());
    out
}
