use std::fmt::{Display, Write};
use std::iter::Peekable;
use std::str::Chars;

use chrono::{DateTime, Local};

use crate::level::{Level, COLOR_RESET};

const DBGRM_PREFIX: &str = "#### ";
const TIMESTAMP_FORMAT: &str = "%d-%m-%Y:%H%M%S-%f-%Z";

/// Where a log call was made. Built by [`call_site!`](crate::call_site).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
    /// Rust path of the calling function, e.g. `demo::worker::run`.
    pub function: &'static str,
}

pub struct Entry<'a> {
    pub component: &'a str,
    pub level: Level,
    pub template: &'a str,
    pub args: &'a [&'a dyn Display],
    pub call_site: CallSite,
}

struct LogLine<'a> {
    entry: &'a Entry<'a>,
    timestamp: DateTime<Local>,
}

impl Display for LogLine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let entry = self.entry;
        if entry.level == Level::Dbgrm {
            f.write_str(DBGRM_PREFIX)?;
        }
        writeln!(
            f,
            "[{}] [{}] [{}] [{} +{}]@[{}]:",
            entry.component,
            self.timestamp.format(TIMESTAMP_FORMAT),
            entry.level,
            entry.call_site.file,
            entry.call_site.line,
            dotted_function(entry.call_site.function),
        )?;
        writeln!(f, "{}", interpolate(entry.template, entry.args))
    }
}

pub fn render(entry: &Entry, colored: bool) -> String {
    render_at(entry, Local::now(), colored)
}

/// Renders `entry` as the two-line text blob written to the log. `colored`
/// wraps it in the level's terminal color, used when echoing to a console.
pub fn render_at(entry: &Entry, timestamp: DateTime<Local>, colored: bool) -> String {
    let line = LogLine { entry, timestamp }.to_string();
    if colored {
        format!("{}{}{}", entry.level.color(), line, COLOR_RESET)
    } else {
        line
    }
}

fn dotted_function(path: &str) -> String {
    path.split("::")
        .filter(|segment| *segment != "{{closure}}")
        .collect::<Vec<_>>()
        .join(".")
}

struct Directive {
    left: bool,
    zero: bool,
    width: Option<usize>,
    precision: Option<usize>,
    verb: char,
}

/// printf-style substitution of `args` into `template`.
///
/// Never fails: a directive without an argument renders as
/// `%!v(MISSING)`, unused arguments are appended as `%!(EXTRA a, b)`, an
/// unknown verb as `%!z(value)` and a trailing `%` as `%!(NOVERB)`.
pub fn interpolate(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len() + 16 * args.len());
    let mut chars = template.chars().peekable();
    let mut next_arg = 0;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let directive = match parse_directive(&mut chars) {
            Some(directive) => directive,
            None => {
                out.push_str("%!(NOVERB)");
                break;
            }
        };
        if directive.verb == '%' {
            out.push('%');
            continue;
        }
        match args.get(next_arg) {
            Some(arg) => {
                next_arg += 1;
                write_arg(&mut out, &directive, *arg);
            }
            None => {
                let _ = write!(out, "%!{}(MISSING)", directive.verb);
            }
        }
    }

    if next_arg < args.len() {
        let extra: Vec<String> = args[next_arg..].iter().map(|arg| arg.to_string()).collect();
        let _ = write!(out, "%!(EXTRA {})", extra.join(", "));
    }
    out
}

fn parse_directive(chars: &mut Peekable<Chars>) -> Option<Directive> {
    let mut directive = Directive {
        left: false,
        zero: false,
        width: None,
        precision: None,
        verb: '%',
    };
    while let Some(&c) = chars.peek() {
        match c {
            '-' => directive.left = true,
            '0' => directive.zero = true,
            '+' | ' ' | '#' => {}
            _ => break,
        }
        chars.next();
    }
    directive.width = read_number(chars);
    if chars.peek() == Some(&'.') {
        chars.next();
        directive.precision = Some(read_number(chars).unwrap_or(0));
    }
    directive.verb = chars.next()?;
    Some(directive)
}

fn read_number(chars: &mut Peekable<Chars>) -> Option<usize> {
    let mut value: Option<usize> = None;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(digit as usize));
        chars.next();
    }
    value
}

fn write_arg(out: &mut String, directive: &Directive, arg: &dyn Display) {
    let body = match directive.verb {
        's' | 'v' | 'd' | 't' | 'f' | 'F' | 'g' | 'e' => match directive.precision {
            Some(precision) => format!("{:.*}", precision, arg),
            None => arg.to_string(),
        },
        'q' => format!("{:?}", arg.to_string()),
        'x' => to_hex(&arg.to_string(), false),
        'X' => to_hex(&arg.to_string(), true),
        other => {
            let _ = write!(out, "%!{}({})", other, arg);
            return;
        }
    };
    pad_into(out, &body, directive);
}

fn to_hex(text: &str, upper: bool) -> String {
    let hex = match text.parse::<i128>() {
        Ok(number) if number < 0 => format!("-{:x}", number.unsigned_abs()),
        Ok(number) => format!("{:x}", number),
        Err(_) => text.bytes().map(|b| format!("{:02x}", b)).collect(),
    };
    if upper {
        hex.to_uppercase()
    } else {
        hex
    }
}

fn pad_into(out: &mut String, body: &str, directive: &Directive) {
    let len = body.chars().count();
    let fill = directive.width.map_or(0, |width| width.saturating_sub(len));
    if fill == 0 {
        out.push_str(body);
    } else if directive.left {
        out.push_str(body);
        out.extend(std::iter::repeat(' ').take(fill));
    } else if directive.zero {
        let digits = match body.strip_prefix('-') {
            Some(rest) => {
                out.push('-');
                rest
            }
            None => body,
        };
        out.extend(std::iter::repeat('0').take(fill));
        out.push_str(digits);
    } else {
        out.extend(std::iter::repeat(' ').take(fill));
        out.push_str(body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SITE: CallSite = CallSite {
        file: "crates/app/src/session.rs",
        line: 42,
        function: "app::session::login::{{closure}}",
    };

    #[test]
    fn interpolates_positional_arguments() {
        assert_eq!(interpolate("user %s logged in", &[&"bob"]), "user bob logged in");
        assert_eq!(interpolate("%d of %d", &[&3, &7]), "3 of 7");
        assert_eq!(interpolate("ok: %t", &[&true]), "ok: true");
        assert_eq!(interpolate("100%%", &[]), "100%");
    }

    #[test]
    fn honours_width_and_precision() {
        assert_eq!(interpolate("[%5s]", &[&"ab"]), "[   ab]");
        assert_eq!(interpolate("[%-5s]", &[&"ab"]), "[ab   ]");
        assert_eq!(interpolate("[%05d]", &[&-42]), "[-0042]");
        assert_eq!(interpolate("%.2f", &[&3.14159]), "3.14");
        assert_eq!(interpolate("%q", &[&"hi"]), "\"hi\"");
        assert_eq!(interpolate("%x %X", &[&255, &"hi"]), "ff 6869");
    }

    #[test]
    fn argument_mismatch_renders_placeholders() {
        assert_eq!(interpolate("%s and %s", &[&"one"]), "one and %!s(MISSING)");
        assert_eq!(interpolate("just %s", &[&"one", &2, &"three"]), "just one%!(EXTRA 2, three)");
        assert_eq!(interpolate("odd %z", &[&5]), "odd %!z(5)");
        assert_eq!(interpolate("dangling %", &[]), "dangling %!(NOVERB)");
    }

    #[test]
    fn renders_header_and_message() {
        let timestamp = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        let entry = Entry {
            component: "svc",
            level: Level::Info,
            template: "user %s logged in",
            args: &[&"bob"],
            call_site: SITE,
        };
        let text = render_at(&entry, timestamp, false);
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("[svc] [07-03-2024:090501-000000000-"), "{header}");
        assert!(header.ends_with(
            "] [INFO] [crates/app/src/session.rs +42]@[app.session.login]:"
        ));
        assert_eq!(lines.next(), Some("user bob logged in"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn dbgrm_lines_are_marked_and_console_lines_colored() {
        let entry = Entry {
            component: "svc",
            level: Level::Dbgrm,
            template: "cache miss",
            args: &[],
            call_site: SITE,
        };
        let plain = render(&entry, false);
        assert!(plain.starts_with("#### [svc] ["));

        let colored = render(&entry, true);
        assert!(colored.starts_with(Level::Dbgrm.color()));
        assert!(colored.ends_with(COLOR_RESET));
    }
}
