//! Evaluated style values.

use std::fmt;

/// An RGBA color with 8-bit channels and a unit alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: f32,
}

impl Rgba {
    /// Creates an opaque color.
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 1.0,
        }
    }

    /// Parses the digits of a hex color (without the leading `#`).
    ///
    /// Accepts the 3, 4, 6 and 8 digit forms.
    ///
    /// # Example
    ///
    /// ```rust
    /// use torque_config::style::Rgba;
    ///
    /// assert_eq!(Rgba::from_hex("f00"), Some(Rgba::rgb(255, 0, 0)));
    /// assert_eq!(Rgba::from_hex("00ff0080").map(|c| c.green), Some(255));
    /// assert_eq!(Rgba::from_hex("zz0"), None);
    /// ```
    pub fn from_hex(digits: &str) -> Option<Self> {
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let nibble = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).ok().map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        let (red, green, blue, alpha) = match digits.len() {
            3 => (nibble(0)?, nibble(1)?, nibble(2)?, 255),
            4 => (nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?),
            6 => (byte(0)?, byte(2)?, byte(4)?, 255),
            8 => (byte(0)?, byte(2)?, byte(4)?, byte(6)?),
            _ => return None,
        };
        Some(Self {
            red,
            green,
            blue,
            alpha: alpha as f32 / 255.0,
        })
    }

    /// Looks up one of the basic CSS color keywords.
    pub fn named(name: &str) -> Option<Self> {
        let rgb = match name.to_ascii_lowercase().as_str() {
            "black" => (0, 0, 0),
            "silver" => (192, 192, 192),
            "gray" | "grey" => (128, 128, 128),
            "white" => (255, 255, 255),
            "maroon" => (128, 0, 0),
            "red" => (255, 0, 0),
            "purple" => (128, 0, 128),
            "fuchsia" | "magenta" => (255, 0, 255),
            "green" => (0, 128, 0),
            "lime" => (0, 255, 0),
            "olive" => (128, 128, 0),
            "yellow" => (255, 255, 0),
            "navy" => (0, 0, 128),
            "blue" => (0, 0, 255),
            "teal" => (0, 128, 128),
            "aqua" | "cyan" => (0, 255, 255),
            "orange" => (255, 165, 0),
            "transparent" => {
                return Some(Self {
                    red: 0,
                    green: 0,
                    blue: 0,
                    alpha: 0.0,
                })
            }
            _ => return None,
        };
        Some(Self::rgb(rgb.0, rgb.1, rgb.2))
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alpha >= 1.0 {
            write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
        } else {
            write!(
                f,
                "rgba({}, {}, {}, {})",
                self.red, self.green, self.blue, self.alpha
            )
        }
    }
}

/// A literal value as produced by the style parser.
///
/// Variables are already substituted, so a `Literal` is always fully evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// A number, dimension or percentage (the unit is dropped).
    Number(f64),
    /// A quoted string.
    String(String),
    /// A bare identifier such as `linear` or `ts`.
    Keyword(String),
    /// A hex or named color.
    Color(Rgba),
    /// A function call such as `rgba(0, 0, 0, 0.5)`, left unevaluated.
    Call { name: String, args: Vec<Literal> },
    /// Several comma or space separated terms.
    List(Vec<Literal>),
}

impl Literal {
    /// Short name of the literal's kind, reported by type mismatches.
    pub fn kind(&self) -> &'static str {
        match self {
            Literal::Number(_) => "number",
            Literal::String(_) => "string",
            Literal::Keyword(_) => "keyword",
            Literal::Color(_) => "color",
            Literal::Call { .. } => "call",
            Literal::List(_) => "list",
        }
    }

    /// Returns the numeric value, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Literal::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the raw text of a string or keyword.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Literal::String(s) | Literal::Keyword(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the color components, if this literal carries them.
    pub fn rgba(&self) -> Option<Rgba> {
        match self {
            Literal::Color(c) => Some(*c),
            _ => None,
        }
    }
}

/// Formats a number the way style sheets print it: integral values have no fraction.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => f.write_str(&format_number(*n)),
            Literal::String(s) | Literal::Keyword(s) => f.write_str(s),
            Literal::Color(c) => write!(f, "{}", c),
            Literal::Call { name, args } => {
                let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", name, args.join(", "))
            }
            Literal::List(items) => {
                let items: Vec<String> = items.iter().map(|a| a.to_string()).collect();
                f.write_str(&items.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_short_and_long_forms_agree() {
        assert_eq!(Rgba::from_hex("abc"), Rgba::from_hex("aabbcc"));
    }

    #[test]
    fn test_hex_alpha() {
        let c = Rgba::from_hex("0000").unwrap();
        assert_eq!(c.alpha, 0.0);
        assert_eq!(c.to_string(), "rgba(0, 0, 0, 0)");
    }

    #[test]
    fn test_hex_rejects_bad_lengths() {
        assert_eq!(Rgba::from_hex("12345"), None);
        assert_eq!(Rgba::from_hex(""), None);
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(Rgba::named("Red"), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(Rgba::named("linear"), None);
    }

    #[test]
    fn test_literal_display() {
        assert_eq!(Literal::Number(10.0).to_string(), "10");
        assert_eq!(Literal::Number(0.25).to_string(), "0.25");
        assert_eq!(Literal::Keyword("count".into()).to_string(), "count");
        assert_eq!(Literal::Color(Rgba::rgb(255, 0, 0)).to_string(), "#ff0000");
        let call = Literal::Call {
            name: "rgb".into(),
            args: vec![
                Literal::Number(1.0),
                Literal::Number(2.0),
                Literal::Number(3.0),
            ],
        };
        assert_eq!(call.to_string(), "rgb(1, 2, 3)");
    }

    #[test]
    fn test_literal_accessors() {
        assert_eq!(Literal::Number(4.0).as_number(), Some(4.0));
        assert_eq!(Literal::String("x".into()).as_text(), Some("x"));
        assert_eq!(Literal::Keyword("x".into()).as_text(), Some("x"));
        assert_eq!(Literal::Number(4.0).as_text(), None);
        assert_eq!(Literal::List(vec![]).kind(), "list");
    }
}
