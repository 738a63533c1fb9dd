mod error;
mod grammar;
mod parser;

pub use error::ParseError;
pub use parser::{Directive, DirectiveLine};

/// Drop blank lines and `#` comments, trimming the rest.
///
/// Yields `(line number, text)` with 1-based numbers from the original input.
pub fn preprocess<'a>(input: &'a str) -> impl Iterator<Item = (usize, &'a str)> + 'a {
    input
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

/// Parse a whole rule file into directives, in file order.
///
/// Lines whose arguments do not parse are kept as [`Directive::Malformed`].
pub fn parse(input: &str) -> Vec<DirectiveLine> {
    parse_lines(preprocess(input))
}

/// Parse already preprocessed `(line number, text)` pairs.
pub fn parse_lines<'a, I>(lines: I) -> Vec<DirectiveLine>
where
    I: IntoIterator<Item = (usize, &'a str)>,
{
    lines
        .into_iter()
        .map(|(line, text)| {
            let (directive, extra) = grammar::directive_line(text);
            DirectiveLine {
                line,
                directive,
                extra,
            }
        })
        .collect()
}
