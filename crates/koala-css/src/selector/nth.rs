//! [§ 6 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)

/// "The An+B notation defines an integer step (A) and offset (B), and
/// represents the An+Bth elements in a list, for every positive integer or
/// zero value of n, with the first element in the list having index 1 (not 0)."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Nth {
    /// The step.
    pub a: i32,
    /// The offset.
    pub b: i32,
}

impl Nth {
    /// Parse the argument of an `:nth-*()` pseudo-class.
    ///
    /// Accepts `odd`, `even`, a bare integer, and the `An+B` forms (`2n+1`,
    /// `-n+3`, `n`, `+n-2`). Whitespace is ignored.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let s: String = raw
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        // "'odd' means the same as 2n+1 ... 'even' means the same as 2n."
        match s.as_str() {
            "odd" => return Some(Self { a: 2, b: 1 }),
            "even" => return Some(Self { a: 2, b: 0 }),
            "" => return None,
            _ => {}
        }

        let Some((a_part, b_part)) = s.split_once('n') else {
            return s.parse().ok().map(|b| Self { a: 0, b });
        };
        let a = match a_part {
            "" | "+" => 1,
            "-" => -1,
            other => other.parse().ok()?,
        };
        let b = if b_part.is_empty() {
            0
        } else if b_part.starts_with(['+', '-']) {
            b_part.parse().ok()?
        } else {
            return None;
        };
        Some(Self { a, b })
    }

    /// Whether the 1-based `position` is An+B for some n >= 0.
    #[must_use]
    pub fn matches(self, position: usize) -> bool {
        let Ok(position) = i64::try_from(position) else {
            return false;
        };
        let (a, b) = (i64::from(self.a), i64::from(self.b));
        if a == 0 {
            return position == b;
        }
        let diff = position - b;
        diff % a == 0 && diff / a >= 0
    }
}
