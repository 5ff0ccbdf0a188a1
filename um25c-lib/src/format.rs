//! Output templates.
//!
//! A template is plain text in which the words below are replaced by the
//! current reading. Everything else is copied through unchanged.
//!
//! | Token     | Output                                  |
//! |-----------|-----------------------------------------|
//! | `Time`    | sample time, seconds with 3 decimals    |
//! | `Volt`    | bus voltage, V, 3 decimals              |
//! | `Amp`     | bus current, A, 4 decimals              |
//! | `Watt`    | power, W, 3 decimals                    |
//! | `Temp`    | temperature, whole °C                   |
//! | `SumAmp`  | active group charge, Ah, 3 decimals     |
//! | `SumWatt` | active group energy, Wh, 3 decimals     |
//!
//! [`TokenSet::Extended`] additionally recognises these. They are off by
//! default so that words like `Group` or `Ohm` in a plain template stay text.
//!
//! | Token     | Output                                  |
//! |-----------|-----------------------------------------|
//! | `TempF`   | temperature, whole °F                   |
//! | `DPlus`   | D+ line voltage, V, 2 decimals          |
//! | `DMinus`  | D- line voltage, V, 2 decimals          |
//! | `Ohm`     | load resistance, Ω, 1 decimal           |
//! | `Group`   | active data-group index                 |

use crate::frame::Measurement;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Time,
    Volt,
    Amp,
    Watt,
    Temp,
    TempF,
    SumWatt,
    SumAmp,
    DPlus,
    DMinus,
    Ohm,
    Group,
}

// Tried in order at each position. A token that is a prefix of another must come after it.
const STANDARD_TOKENS: &[(&str, Token)] = &[
    ("SumWatt", Token::SumWatt),
    ("SumAmp", Token::SumAmp),
    ("Time", Token::Time),
    ("Volt", Token::Volt),
    ("Watt", Token::Watt),
    ("Temp", Token::Temp),
    ("Amp", Token::Amp),
];

const EXTENDED_TOKENS: &[(&str, Token)] = &[
    ("SumWatt", Token::SumWatt),
    ("SumAmp", Token::SumAmp),
    ("DMinus", Token::DMinus),
    ("DPlus", Token::DPlus),
    ("TempF", Token::TempF),
    ("Group", Token::Group),
    ("Time", Token::Time),
    ("Volt", Token::Volt),
    ("Watt", Token::Watt),
    ("Temp", Token::Temp),
    ("Amp", Token::Amp),
    ("Ohm", Token::Ohm),
];

/// Which words a template treats as tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenSet {
    /// `Time`, `Volt`, `Amp`, `Watt`, `Temp`, `SumWatt`, `SumAmp`
    #[default]
    Standard,
    /// The standard set plus `TempF`, `DPlus`, `DMinus`, `Ohm`, `Group`
    Extended,
}

impl TokenSet {
    fn table(self) -> &'static [(&'static str, Token)] {
        match self {
            TokenSet::Standard => STANDARD_TOKENS,
            TokenSet::Extended => EXTENDED_TOKENS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Token(Token),
}

/// A parsed output template, ready to render any number of samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Split `source` into literal text and standard tokens. Never fails.
    pub fn parse(source: &str) -> Self {
        Self::with_tokens(source, TokenSet::Standard)
    }

    pub fn with_tokens(source: &str, tokens: TokenSet) -> Self {
        let table = tokens.table();
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(c) = rest.chars().next() {
            if let Some((text, token)) = table.iter().find(|(text, _)| rest.starts_with(text)) {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Token(*token));
                rest = &rest[text.len()..];
            } else {
                literal.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self {
            source: source.to_string(),
            segments,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Tokens in the order they appear
    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Token(t) => Some(*t),
            Segment::Literal(_) => None,
        })
    }

    /// Render one output line, including the trailing newline.
    pub fn render(&self, m: &Measurement, timestamp: Duration) -> String {
        let mut line = String::with_capacity(self.source.len() + 16);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => line.push_str(text),
                Segment::Token(token) => render_token(*token, m, timestamp, &mut line),
            }
        }
        line.push('\n');
        line
    }
}

/// Parse `template` and render a single line.
pub fn render(template: &str, m: &Measurement, timestamp: Duration) -> String {
    Template::parse(template).render(m, timestamp)
}

fn render_token(token: Token, m: &Measurement, timestamp: Duration, out: &mut String) {
    let group = m.active_group().copied().unwrap_or_default();
    let text = match token {
        Token::Time => format_time(timestamp),
        Token::Volt => fixed_point(m.millivolts.into(), 3),
        Token::Amp => fixed_point(m.tenths_milliamps.into(), 4),
        Token::Watt => fixed_point(m.milliwatts.into(), 3),
        Token::Temp => m.temp_celsius.to_string(),
        Token::TempF => m.temp_fahrenheit.to_string(),
        Token::SumWatt => fixed_point(group.milliwatt_hours.into(), 3),
        Token::SumAmp => fixed_point(group.milliamp_hours.into(), 3),
        Token::DPlus => fixed_point(m.dplus_centivolts.into(), 2),
        Token::DMinus => fixed_point(m.dminus_centivolts.into(), 2),
        Token::Ohm => fixed_point(m.resistance_deciohms.into(), 1),
        Token::Group => m.data_group.to_string(),
    };
    out.push_str(&text);
}

/// Seconds with millisecond precision, truncated.
pub fn format_time(timestamp: Duration) -> String {
    format!("{}.{:03}", timestamp.as_secs(), timestamp.subsec_millis())
}

/// Format `value / 10^places` with exactly `places` decimals, without going through floats.
pub fn fixed_point(value: u64, places: u32) -> String {
    if places == 0 {
        return value.to_string();
    }
    let scale = 10u64.pow(places);
    format!(
        "{}.{:0width$}",
        value / scale,
        value % scale,
        width = places as usize
    )
}
