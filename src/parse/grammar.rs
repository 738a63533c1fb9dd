use winnow::combinator::{alt, cut_err, opt, preceded, repeat};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, take_till, take_while};

use super::parser::Directive;

// -- Whitespace -------------------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_ascii_whitespace())
        .void()
        .parse_next(input)
}

// -- Tokens -----------------------------------------------------------------

fn bare<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| !c.is_ascii_whitespace()).parse_next(input)
}

fn quoted_body(input: &mut &str) -> ModalResult<String> {
    let mut s = String::new();
    loop {
        let ch = any.parse_next(input)?;
        match ch {
            '"' => return Ok(s),
            '\\' => {
                let esc = any.parse_next(input)?;
                match esc {
                    '"' | '\\' => s.push(esc),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

fn quoted(input: &mut &str) -> ModalResult<String> {
    '"'.parse_next(input)?;
    cut_err(quoted_body)
        .context(StrContext::Expected(StrContextValue::CharLiteral('"')))
        .parse_next(input)
}

/// A `[...]` flag field, which may contain spaces.
fn bracketed<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    ('[', take_till(0.., ']'), cut_err(']'))
        .take()
        .context(StrContext::Expected(StrContextValue::CharLiteral(']')))
        .parse_next(input)
}

fn arg(input: &mut &str) -> ModalResult<String> {
    preceded(ws, alt((quoted, bare.map(str::to_owned)))).parse_next(input)
}

fn required_arg(what: &'static str) -> impl FnMut(&mut &str) -> ModalResult<String> {
    move |input: &mut &str| {
        cut_err(arg)
            .context(StrContext::Expected(StrContextValue::Description(what)))
            .parse_next(input)
    }
}

fn flags_arg(input: &mut &str) -> ModalResult<String> {
    preceded(
        ws,
        alt((quoted, bracketed.map(str::to_owned), bare.map(str::to_owned))),
    )
    .parse_next(input)
}

// -- Directives -------------------------------------------------------------

fn engine(input: &mut &str) -> ModalResult<Directive> {
    let value = required_arg("on or off").parse_next(input)?;
    Ok(Directive::Engine(value.eq_ignore_ascii_case("on")))
}

fn base(input: &mut &str) -> ModalResult<Directive> {
    let path = required_arg("base path").parse_next(input)?;
    Ok(Directive::Base(path))
}

fn cond(input: &mut &str) -> ModalResult<Directive> {
    let test = required_arg("test string").parse_next(input)?;
    let pattern = required_arg("condition pattern").parse_next(input)?;
    let flags = opt(flags_arg).parse_next(input)?;
    Ok(Directive::Cond {
        test,
        pattern,
        flags,
    })
}

fn rule(input: &mut &str) -> ModalResult<Directive> {
    let source = required_arg("rule pattern").parse_next(input)?;
    let destination = required_arg("substitution").parse_next(input)?;
    let flags = opt(flags_arg).parse_next(input)?;
    Ok(Directive::Rule {
        source,
        destination,
        flags,
    })
}

// -- Top-level line parser --------------------------------------------------

type ArgsParser = fn(&mut &str) -> ModalResult<Directive>;

fn directive_parser(name: &str) -> Option<(&'static str, ArgsParser)> {
    let known: [(&'static str, ArgsParser); 4] = [
        ("RewriteEngine", engine),
        ("RewriteBase", base),
        ("RewriteCond", cond),
        ("RewriteRule", rule),
    ];
    known
        .into_iter()
        .find(|(keyword, _)| keyword.eq_ignore_ascii_case(name))
}

fn with_extra(
    args: ArgsParser,
) -> impl FnMut(&mut &str) -> ModalResult<(Directive, Vec<String>)> {
    move |input: &mut &str| {
        let directive = args(input)?;
        let extra: Vec<String> = repeat(0.., arg).parse_next(input)?;
        ws.parse_next(input)?;
        Ok((directive, extra))
    }
}

/// Parse one preprocessed line into a directive plus any surplus tokens.
///
/// Never fails. A known directive whose arguments do not parse comes back as
/// [`Directive::Malformed`], leaving it to the compiler whether that matters.
pub fn directive_line(text: &str) -> (Directive, Vec<String>) {
    let text = text.trim_start();
    let (name, body) = text
        .split_once(|c: char| c.is_ascii_whitespace())
        .unwrap_or((text, ""));

    let Some((keyword, args)) = directive_parser(name) else {
        return (Directive::Unrecognized(name.to_owned()), Vec::new());
    };

    with_extra(args).parse(body).unwrap_or_else(|e| {
        let mut reason = e.inner().to_string();
        if reason.is_empty() {
            reason = "invalid arguments".to_owned();
        }
        let malformed = Directive::Malformed {
            keyword: keyword.to_owned(),
            reason,
        };
        (malformed, Vec::new())
    })
}
