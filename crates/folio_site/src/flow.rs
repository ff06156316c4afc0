//! SVG flow line geometry
//!
//! The flow lines are drawn with dashed strokes whose offset starts at the
//! full path length. Only `M`, `L` and `Q` commands (absolute or relative)
//! are used by the page, so that is all the parser understands.

use std::str::FromStr;

use crate::error::SiteError;

/// Samples per quadratic segment when estimating length
const QUAD_SAMPLES: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Point {
    x: f32,
    y: f32,
}

impl Point {
    fn distance(self, other: Point) -> f32 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    fn offset(self, dx: f32, dy: f32) -> Point {
        Point {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Segment {
    Line { from: Point, to: Point },
    Quad { from: Point, ctrl: Point, to: Point },
}

impl Segment {
    fn length(&self) -> f32 {
        match *self {
            Segment::Line { from, to } => from.distance(to),
            Segment::Quad { from, ctrl, to } => {
                let at = |t: f32| {
                    let u = 1.0 - t;
                    Point {
                        x: u * u * from.x + 2.0 * u * t * ctrl.x + t * t * to.x,
                        y: u * u * from.y + 2.0 * u * t * ctrl.y + t * t * to.y,
                    }
                };
                let mut prev = from;
                let mut total = 0.0;
                for i in 1..=QUAD_SAMPLES {
                    let p = at(i as f32 / QUAD_SAMPLES as f32);
                    total += prev.distance(p);
                    prev = p;
                }
                total
            }
        }
    }
}

#[derive(Debug, PartialEq)]
enum Token {
    Command(char),
    Number(f32),
}

fn flush(number: &mut String, tokens: &mut Vec<Token>) -> Result<(), SiteError> {
    if number.is_empty() {
        return Ok(());
    }
    let value = number.parse::<f32>().map_err(|_| SiteError::InvalidPath {
        position: tokens.len(),
        reason: format!("bad number {number:?}"),
    })?;
    tokens.push(Token::Number(value));
    number.clear();
    Ok(())
}

fn tokenize(d: &str) -> Result<Vec<Token>, SiteError> {
    let mut tokens = Vec::new();
    let mut number = String::new();

    for c in d.chars() {
        match c {
            'M' | 'm' | 'L' | 'l' | 'Q' | 'q' => {
                flush(&mut number, &mut tokens)?;
                tokens.push(Token::Command(c));
            }
            c if c.is_whitespace() || c == ',' => flush(&mut number, &mut tokens)?,
            '-' if !number.is_empty() && !number.ends_with('e') => {
                flush(&mut number, &mut tokens)?;
                number.push(c);
            }
            c if c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e') => number.push(c),
            other => {
                return Err(SiteError::InvalidPath {
                    position: tokens.len(),
                    reason: format!("unsupported character {other:?}"),
                })
            }
        }
    }
    flush(&mut number, &mut tokens)?;
    Ok(tokens)
}

/// A parsed flow line
#[derive(Clone, Debug, PartialEq)]
pub struct FlowPath {
    segments: Vec<Segment>,
}

impl FlowPath {
    pub fn parse(d: &str) -> Result<Self, SiteError> {
        d.parse()
    }

    /// Arc length of the whole path in viewBox units
    pub fn length(&self) -> f32 {
        self.segments.iter().map(Segment::length).sum()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

impl FromStr for FlowPath {
    type Err = SiteError;

    fn from_str(d: &str) -> Result<Self, Self::Err> {
        let tokens = tokenize(d)?;
        let mut segments = Vec::new();
        let mut cursor: Option<Point> = None;
        let mut command: Option<char> = None;
        let mut i = 0;

        let invalid = |position: usize, reason: &str| SiteError::InvalidPath {
            position,
            reason: reason.to_string(),
        };

        while i < tokens.len() {
            if let Token::Command(c) = tokens[i] {
                command = Some(c);
                i += 1;
                continue;
            }

            let cmd = command.ok_or_else(|| invalid(i, "path must start with a command"))?;
            let arity = match cmd.to_ascii_uppercase() {
                'Q' => 4,
                _ => 2,
            };
            let mut args = [0.0f32; 4];
            for (slot, arg) in args.iter_mut().take(arity).enumerate() {
                match tokens.get(i + slot) {
                    Some(Token::Number(v)) => *arg = *v,
                    _ => return Err(invalid(i + slot, "missing coordinate")),
                }
            }
            i += arity;

            let relative = cmd.is_ascii_lowercase();
            let origin = cursor.unwrap_or(Point { x: 0.0, y: 0.0 });
            let point = |x: f32, y: f32| {
                if relative {
                    origin.offset(x, y)
                } else {
                    Point { x, y }
                }
            };

            match cmd.to_ascii_uppercase() {
                'M' => {
                    cursor = Some(point(args[0], args[1]));
                    // extra pairs after a move are implicit line-tos
                    command = Some(if relative { 'l' } else { 'L' });
                }
                'L' => {
                    let from = cursor.ok_or_else(|| invalid(i, "line before move"))?;
                    let to = point(args[0], args[1]);
                    segments.push(Segment::Line { from, to });
                    cursor = Some(to);
                }
                _ => {
                    let from = cursor.ok_or_else(|| invalid(i, "curve before move"))?;
                    let ctrl = point(args[0], args[1]);
                    let to = point(args[2], args[3]);
                    segments.push(Segment::Quad { from, ctrl, to });
                    cursor = Some(to);
                }
            }
        }

        if cursor.is_none() {
            return Err(invalid(0, "empty path"));
        }
        Ok(FlowPath { segments })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FLOW_PATHS;

    #[test]
    fn test_line_length() {
        let path = FlowPath::parse("M0 0 L3 4").unwrap();
        assert_eq!(path.length(), 5.0);
    }

    #[test]
    fn test_straight_quad_length() {
        let path = FlowPath::parse("M0,0 Q5,0 10,0").unwrap();
        assert!((path.length() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_relative_commands() {
        let path = FlowPath::parse("m10 10 l3 4 l-3 -4").unwrap();
        assert_eq!(path.segment_count(), 2);
        assert!((path.length() - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_page_paths_parse() {
        for (_, d) in FLOW_PATHS {
            let path = FlowPath::parse(d).unwrap();
            assert_eq!(path.segment_count(), 6);
            // 1800 units of vertical travel plus the sideways wiggle
            let len = path.length();
            assert!(len > 1800.0 && len < 1900.0, "{len}");
        }
    }

    #[test]
    fn test_rejects_bad_paths() {
        assert!(FlowPath::parse("").is_err());
        assert!(FlowPath::parse("10 20").is_err());
        assert!(FlowPath::parse("M0 0 Q1 2").is_err());
        assert!(FlowPath::parse("M0 0 C1 2 3 4 5 6").is_err());
        assert!(FlowPath::parse("M0 0 L1 abc").is_err());
    }
}
