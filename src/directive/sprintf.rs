//! printf-style formatting for the `sprintf` directive
//!
//! A format holds literal text and conversions that all consume the single
//! value being transformed. `%1$s` style argument numbers are accepted as long
//! as they point at that value.

use std::fmt;

/// A parsed sprintf format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintfFormat {
    source: String,
    pieces: Vec<Piece>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Spec(Spec),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Spec {
    left: bool,
    plus: bool,
    zero: bool,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: char,
}

const CONVERSIONS: &str = "sdiufFeExXob";

impl SprintfFormat {
    /// Parse a format string
    ///
    /// Fails on unknown conversions, truncated specs, or more than one
    /// unnumbered conversion.
    pub fn parse(format: &str) -> std::result::Result<Self, String> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut unnumbered = 0usize;
        let mut chars = format.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            if chars.peek() == Some(&'%') {
                chars.next();
                literal.push('%');
                continue;
            }

            let mut spec = Spec::default();

            // Optional argument number: digits followed by '$'
            let mut digits = String::new();
            while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                digits.push(d);
                chars.next();
            }
            let numbered = if chars.peek() == Some(&'$') && !digits.is_empty() {
                chars.next();
                if digits != "1" {
                    return Err(format!(
                        "argument %{digits}$ out of range, only one value is formatted"
                    ));
                }
                digits.clear();
                true
            } else {
                false
            };

            // Digits already read without '$' are flags/width
            let mut pending = digits;
            if pending.is_empty() {
                while let Some(flag) = chars.peek().copied() {
                    match flag {
                        '-' => spec.left = true,
                        '+' => spec.plus = true,
                        '0' => spec.zero = true,
                        ' ' => {}
                        _ => break,
                    }
                    chars.next();
                }
                while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                    pending.push(d);
                    chars.next();
                }
            } else if pending.starts_with('0') {
                spec.zero = true;
            }
            if !pending.is_empty() {
                spec.width = pending.parse().ok();
            }

            if chars.peek() == Some(&'.') {
                chars.next();
                let mut precision = String::new();
                while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                    precision.push(d);
                    chars.next();
                }
                spec.precision = Some(precision.parse().unwrap_or(0));
            }

            match chars.next() {
                Some(conv) if CONVERSIONS.contains(conv) => spec.conversion = conv,
                Some(conv) => return Err(format!("unsupported conversion '%{conv}'")),
                None => return Err("format ends inside a conversion".to_string()),
            }

            if !numbered {
                unnumbered += 1;
                if unnumbered > 1 {
                    return Err("more than one conversion, only one value is formatted".into());
                }
            }

            if !literal.is_empty() {
                pieces.push(Piece::Literal(std::mem::take(&mut literal)));
            }
            pieces.push(Piece::Spec(spec));
        }

        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        Ok(Self {
            source: format.to_string(),
            pieces,
        })
    }

    /// Format a value
    pub fn render(&self, value: &str) -> std::result::Result<String, String> {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Spec(spec) => out.push_str(&spec.render(value)?),
            }
        }
        Ok(out)
    }

    /// The original format string
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for SprintfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Spec {
    fn render(&self, value: &str) -> std::result::Result<String, String> {
        let body = match self.conversion {
            's' => match self.precision {
                Some(p) => value.chars().take(p).collect(),
                None => value.to_string(),
            },
            'd' | 'i' => self.signed(parse_integer(value)?),
            'u' => {
                let n = parse_integer(value)?;
                if n < 0 {
                    return Err(format!("'{value}' is negative, %u needs an unsigned value"));
                }
                n.to_string()
            }
            'f' | 'F' => {
                let n = parse_float(value)?;
                self.signed_float(n, format!("{:.*}", self.precision.unwrap_or(6), n.abs()))
            }
            'e' | 'E' => {
                let n = parse_float(value)?;
                let text = exponent(n.abs(), self.precision.unwrap_or(6));
                let text = if self.conversion == 'E' {
                    text.to_uppercase()
                } else {
                    text
                };
                self.signed_float(n, text)
            }
            'x' => format!("{:x}", parse_integer(value)? as u64),
            'X' => format!("{:X}", parse_integer(value)? as u64),
            'o' => format!("{:o}", parse_integer(value)? as u64),
            'b' => format!("{:b}", parse_integer(value)? as u64),
            other => return Err(format!("unsupported conversion '%{other}'")),
        };

        Ok(self.pad(body))
    }

    fn signed(&self, n: i64) -> String {
        if n < 0 {
            format!("-{}", n.unsigned_abs())
        } else if self.plus {
            format!("+{n}")
        } else {
            n.to_string()
        }
    }

    fn signed_float(&self, n: f64, magnitude: String) -> String {
        if n.is_sign_negative() && n != 0.0 {
            format!("-{magnitude}")
        } else if self.plus {
            format!("+{magnitude}")
        } else {
            magnitude
        }
    }

    fn pad(&self, body: String) -> String {
        let width = self.width.unwrap_or(0);
        let len = body.chars().count();
        if len >= width {
            return body;
        }
        let fill = width - len;

        if self.left {
            return format!("{body}{}", " ".repeat(fill));
        }

        let numeric = self.conversion != 's';
        if self.zero && numeric {
            // Zeros go after the sign
            let (sign, digits) = match body.chars().next() {
                Some(c @ ('-' | '+')) => (c.to_string(), body[1..].to_string()),
                _ => (String::new(), body),
            };
            return format!("{sign}{}{digits}", "0".repeat(fill));
        }

        let pad_char = if self.zero { "0" } else { " " };
        format!("{}{body}", pad_char.repeat(fill))
    }
}

fn parse_integer(value: &str) -> std::result::Result<i64, String> {
    let trimmed = value.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(n);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
        .ok_or_else(|| format!("'{value}' is not numeric"))
}

fn parse_float(value: &str) -> std::result::Result<f64, String> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("'{value}' is not numeric"))
}

/// Scientific notation with an explicitly signed exponent (1.5e+3)
fn exponent(n: f64, precision: usize) -> String {
    let text = format!("{n:.precision$e}");
    match text.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("%s", "abc", "abc"; "plain string")]
    #[test_case("id-%s", "7", "id-7"; "prefix")]
    #[test_case("%05d", "42", "00042"; "zero padded int")]
    #[test_case("%05d", "-42", "-0042"; "zero padded negative")]
    #[test_case("%-5s|", "ab", "ab   |"; "left justified")]
    #[test_case("%5s", "ab", "   ab"; "right justified")]
    #[test_case("%.2f", "3.14159", "3.14"; "float precision")]
    #[test_case("%+d", "5", "+5"; "plus flag")]
    #[test_case("%d", "12.9", "12"; "float truncated to int")]
    #[test_case("%x", "255", "ff"; "hex")]
    #[test_case("%X", "255", "FF"; "upper hex")]
    #[test_case("%o", "8", "10"; "octal")]
    #[test_case("%.3e", "1500", "1.500e+3"; "exponent")]
    #[test_case("100%%", "x", "100%"; "literal percent")]
    #[test_case("%1$s-%1$s", "a", "a-a"; "numbered argument reused")]
    #[test_case("%.2s", "abcdef", "ab"; "string precision")]
    fn test_render(format: &str, value: &str, expected: &str) {
        let parsed = SprintfFormat::parse(format).unwrap();
        assert_eq!(parsed.render(value).unwrap(), expected);
    }

    #[test]
    fn test_parse_rejects_two_conversions() {
        assert!(SprintfFormat::parse("%s-%s").is_err());
    }

    #[test]
    fn test_parse_rejects_second_argument() {
        assert!(SprintfFormat::parse("%2$s").is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_conversion() {
        let err = SprintfFormat::parse("%q").unwrap_err();
        assert!(err.contains("%q"));
    }

    #[test]
    fn test_parse_rejects_truncated_spec() {
        assert!(SprintfFormat::parse("abc%5").is_err());
    }

    #[test]
    fn test_render_non_numeric_fails() {
        let parsed = SprintfFormat::parse("%d").unwrap();
        assert!(parsed.render("abc").is_err());
    }

    #[test]
    fn test_no_conversion_is_constant() {
        let parsed = SprintfFormat::parse("fixed").unwrap();
        assert_eq!(parsed.render("ignored").unwrap(), "fixed");
    }
}
