//! Terminal input through rustyline: the selection prompt and the masked
//! password prompt.

use crate::controller::{InputEvent, InputSource};
use crate::error::PortalResult;
use rustyline::completion::Completer;
use rustyline::config::Config;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper};
use std::borrow::Cow;

/// Line editor helper. When masking, every typed character is drawn as `*`.
struct PromptHelper {
    masking: bool,
}

impl Completer for PromptHelper {
    type Candidate = String;
}

impl Hinter for PromptHelper {
    type Hint = String;
}

impl Highlighter for PromptHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if self.masking {
            Cow::Owned("*".repeat(line.chars().count()))
        } else {
            Cow::Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        self.masking
    }
}

impl Validator for PromptHelper {}
impl Helper for PromptHelper {}

/// The operator's terminal.
pub struct LineEditor {
    editor: Editor<PromptHelper, DefaultHistory>,
    color: bool,
}

impl LineEditor {
    pub fn new(color: bool) -> PortalResult<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .auto_add_history(true)
            .build();
        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(PromptHelper { masking: false }));
        Ok(Self { editor, color })
    }

    /// Read a password without echoing it. `None` when the operator
    /// cancels with Ctrl+C or Ctrl+D.
    pub fn read_password(prompt: &str) -> PortalResult<Option<String>> {
        let config = Config::builder().auto_add_history(false).build();
        let mut editor: Editor<PromptHelper, DefaultHistory> = Editor::with_config(config)?;
        editor.set_helper(Some(PromptHelper { masking: true }));
        match editor.readline(prompt) {
            Ok(password) => Ok(Some(password)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn styled_prompt<'p>(&self, prompt: &'p str) -> Cow<'p, str> {
        if self.color {
            Cow::Owned(format!("\x1b[36m{prompt}\x1b[0m"))
        } else {
            Cow::Borrowed(prompt)
        }
    }
}

impl InputSource for LineEditor {
    fn read_line(&mut self, prompt: &str) -> PortalResult<InputEvent> {
        let prompt = self.styled_prompt(prompt).into_owned();
        match self.editor.readline(&prompt) {
            Ok(line) => Ok(InputEvent::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(InputEvent::Interrupted),
            Err(ReadlineError::Eof) => Ok(InputEvent::Closed),
            Err(e) => Err(e.into()),
        }
    }
}
