//! Line-oriented command interpreter
//!
//! Grammar:
//!
//! ```text
//! ?
//! INIT CLOCK
//! SET {TIME|ALARM|STWATCH} HH:MM:SS
//! SET DATE YYYY.MM.DD
//! GET {RUNTIME|TIME|DATE|ALARM|STWATCH}
//! RUN {RUNTIME|TIME|DATE|ALARM|STWATCH}
//! REVERSE
//! SAVE
//! ```
//!
//! Keywords match case-insensitively and any verb or sub-verb followed by
//! `?` asks for help instead of executing. Interpretation is pure: a line
//! becomes either a [`Request`] or exactly one [`CommandError`].

use core::fmt;

use heapless::Vec;

use crate::calendar::Date;
use crate::types::{Action, DisplayMode, TimeOfDay};

/// Longest token kept; longer tokens are truncated and never validate
pub const MAX_TOKEN_LEN: usize = 10;
/// Arguments stored after the verb; further tokens are only counted
pub const MAX_ARGS: usize = 3;

/// One whitespace-delimited word, in its original case
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Token {
    bytes: Vec<u8, MAX_TOKEN_LEN>,
    truncated: bool,
}

impl Token {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Case-insensitive keyword comparison
    pub fn is(&self, keyword: &str) -> bool {
        !self.truncated && self.bytes.eq_ignore_ascii_case(keyword.as_bytes())
    }

    fn complete(&self) -> Option<&[u8]> {
        if self.truncated {
            None
        } else {
            Some(&self.bytes)
        }
    }

    fn push(&mut self, byte: u8) {
        if self.bytes.push(byte).is_err() {
            self.truncated = true;
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.bytes.iter() {
            fmt::Write::write_char(f, char::from(b))?;
        }
        Ok(())
    }
}

/// A tokenized input line
#[derive(Clone, Debug, Default)]
pub struct Line {
    tokens: Vec<Token, { MAX_ARGS + 1 }>,
    count: usize,
}

impl Line {
    /// Split on runs of blanks, stopping at the first CR, LF or NUL
    pub fn tokenize(raw: &[u8]) -> Self {
        let mut line = Line::default();
        let mut current: Option<Token> = None;

        for &byte in raw {
            match byte {
                b'\r' | b'\n' | 0 => break,
                b' ' | b'\t' => {
                    if let Some(token) = current.take() {
                        line.finish(token);
                    }
                }
                _ => current.get_or_insert_with(Token::default).push(byte),
            }
        }
        if let Some(token) = current {
            line.finish(token);
        }
        line
    }

    fn finish(&mut self, token: Token) {
        // Tokens past the storage cap still count towards "too many"
        let _ = self.tokens.push(token);
        self.count += 1;
    }

    pub fn verb(&self) -> Option<&Token> {
        self.tokens.first()
    }

    /// 1-based argument access
    pub fn arg(&self, index: usize) -> Option<&Token> {
        if index == 0 {
            None
        } else {
            self.tokens.get(index)
        }
    }

    pub fn arg_count(&self) -> usize {
        self.count.saturating_sub(1)
    }
}

/// Command verbs; `Help` is the bare `?`
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verb {
    Help,
    Init,
    Set,
    Get,
    Run,
    Reverse,
    Save,
}

impl Verb {
    pub const ALL: [Verb; 7] = [
        Verb::Help,
        Verb::Init,
        Verb::Set,
        Verb::Get,
        Verb::Run,
        Verb::Reverse,
        Verb::Save,
    ];

    pub const fn keyword(&self) -> &'static str {
        match self {
            Verb::Help => "?",
            Verb::Init => "INIT",
            Verb::Set => "SET",
            Verb::Get => "GET",
            Verb::Run => "RUN",
            Verb::Reverse => "REVERSE",
            Verb::Save => "SAVE",
        }
    }

    pub fn parse(token: &Token) -> Option<Self> {
        Self::ALL.into_iter().find(|verb| token.is(verb.keyword()))
    }

    /// Arguments the verb takes
    pub const fn arity(&self) -> usize {
        match self {
            Verb::Help | Verb::Reverse | Verb::Save => 0,
            Verb::Init | Verb::Get | Verb::Run => 1,
            Verb::Set => 2,
        }
    }

    fn accepts_subverb(&self, token: &Token) -> bool {
        match self {
            Verb::Init => token.is("CLOCK"),
            Verb::Set => SetTarget::parse(token).is_some(),
            Verb::Get | Verb::Run => DisplayMode::from_keyword(token.as_bytes()).is_some(),
            Verb::Help | Verb::Reverse | Verb::Save => false,
        }
    }

    pub const fn help_text(&self) -> &'static str {
        match self {
            Verb::Help => {
                "Commands: ?, INIT, SET, GET, RUN, REVERSE, SAVE. \
                 Type a command followed by \"?\" for details."
            }
            Verb::Init => "Reset every counter and the date to defaults with \"INIT CLOCK\".",
            Verb::Set => {
                "Use \"SET TIME HH:MM:SS\", \"SET ALARM HH:MM:SS\", \
                 \"SET STWATCH HH:MM:SS\" or \"SET DATE YYYY.MM.DD\"."
            }
            Verb::Get => "Print a value with \"GET RUNTIME|TIME|DATE|ALARM|STWATCH\".",
            Verb::Run => "Show a value on the display with \"RUN RUNTIME|TIME|DATE|ALARM|STWATCH\".",
            Verb::Reverse => "Turn the display upside down with \"REVERSE\".",
            Verb::Save => "Store time and date in flash with \"SAVE\"; they are restored at boot.",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum SetTarget {
    Time,
    Date,
    Alarm,
    Stopwatch,
}

impl SetTarget {
    fn parse(token: &Token) -> Option<Self> {
        [
            ("TIME", SetTarget::Time),
            ("DATE", SetTarget::Date),
            ("ALARM", SetTarget::Alarm),
            ("STWATCH", SetTarget::Stopwatch),
        ]
        .into_iter()
        .find(|(keyword, _)| token.is(keyword))
        .map(|(_, target)| target)
    }
}

/// Outcome of a well-formed line
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Request {
    Execute(Action),
    Help(Verb),
    /// Blank line
    Ignore,
}

/// Exactly one of these is reported per rejected line
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum CommandError {
    UnknownVerb(Token),
    TooManyArguments(Verb),
    /// `index` is 1-based
    InvalidArgument { index: usize, token: Token, verb: Verb },
    /// `index` is 1-based
    MissingArgument { index: usize, verb: Verb },
}

impl CommandError {
    /// Help topic printed after the error message
    pub fn help(&self) -> Verb {
        match self {
            CommandError::UnknownVerb(_) => Verb::Help,
            CommandError::TooManyArguments(verb)
            | CommandError::InvalidArgument { verb, .. }
            | CommandError::MissingArgument { verb, .. } => *verb,
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownVerb(token) => write!(f, "Invalid command: {}", token),
            CommandError::TooManyArguments(verb) => {
                write!(f, "Too many arguments for command {}", verb.keyword())
            }
            CommandError::InvalidArgument { index, token, verb } => write!(
                f,
                "Invalid argument-{} {} for command {}",
                index,
                token,
                verb.keyword()
            ),
            CommandError::MissingArgument { index, verb } => {
                write!(f, "Empty argument-{} for command {}", index, verb.keyword())
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CommandError {}

/// Turn one raw input line into a request or the first error found
pub fn interpret(raw: &[u8]) -> Result<Request, CommandError> {
    let line = Line::tokenize(raw);
    let Some(first) = line.verb() else {
        return Ok(Request::Ignore);
    };
    let verb = Verb::parse(first).ok_or_else(|| CommandError::UnknownVerb(first.clone()))?;

    if verb == Verb::Help || wants_help(&line, verb) {
        return Ok(Request::Help(verb));
    }
    if line.arg_count() > verb.arity() {
        return Err(CommandError::TooManyArguments(verb));
    }

    let arg = |index| line.arg(index).ok_or(CommandError::MissingArgument { index, verb });
    let invalid = |index, token: &Token| CommandError::InvalidArgument {
        index,
        token: token.clone(),
        verb,
    };

    let action = match verb {
        Verb::Init => {
            let target = arg(1)?;
            if !target.is("CLOCK") {
                return Err(invalid(1, target));
            }
            Action::InitClock
        }
        Verb::Set => {
            let target = arg(1)?;
            let kind = SetTarget::parse(target).ok_or_else(|| invalid(1, target))?;
            let value = arg(2)?;
            let action = match kind {
                SetTarget::Time => parse_time(value).map(Action::SetTime),
                SetTarget::Alarm => parse_time(value).map(Action::SetAlarm),
                SetTarget::Stopwatch => parse_time(value).map(Action::SetStopwatch),
                SetTarget::Date => parse_date(value).map(Action::SetDate),
            };
            action.ok_or_else(|| invalid(2, value))?
        }
        Verb::Get | Verb::Run => {
            let target = arg(1)?;
            let mode = DisplayMode::from_keyword(target.as_bytes())
                .filter(|_| !target.is_truncated())
                .ok_or_else(|| invalid(1, target))?;
            if verb == Verb::Get {
                Action::Get(mode)
            } else {
                Action::Run(mode)
            }
        }
        Verb::Reverse => Action::ToggleReverse,
        Verb::Save => Action::Save,
        Verb::Help => return Ok(Request::Help(Verb::Help)),
    };
    Ok(Request::Execute(action))
}

fn wants_help(line: &Line, verb: Verb) -> bool {
    match (line.arg(1), line.arg(2)) {
        (Some(first), _) if first.is("?") => true,
        (Some(first), Some(second)) => second.is("?") && verb.accepts_subverb(first),
        _ => false,
    }
}

fn digit(byte: u8) -> Option<u8> {
    byte.is_ascii_digit().then(|| byte - b'0')
}

fn two_digits(hi: u8, lo: u8) -> Option<u8> {
    Some(digit(hi)? * 10 + digit(lo)?)
}

/// `HH:MM:SS`, exactly eight characters
pub fn parse_time(token: &Token) -> Option<TimeOfDay> {
    match token.complete()? {
        &[h0, h1, b':', m0, m1, b':', s0, s1] => {
            TimeOfDay::new(two_digits(h0, h1)?, two_digits(m0, m1)?, two_digits(s0, s1)?)
        }
        _ => None,
    }
}

/// `YYYY.MM.DD`, exactly ten characters and a real calendar day
pub fn parse_date(token: &Token) -> Option<Date> {
    match token.complete()? {
        &[y0, y1, y2, y3, b'.', m0, m1, b'.', d0, d1] => {
            let year = two_digits(y0, y1)? as u16 * 100 + two_digits(y2, y3)? as u16;
            Date::from_ymd(year, two_digits(m0, m1)?, two_digits(d0, d1)?)
        }
        _ => None,
    }
}
