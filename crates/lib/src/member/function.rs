use crate::output::{OutputError, OutputFile};

use super::{Member, MemberKind, MemberType, Mergeable};

/// A game-logic script: one command per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Function {
  body: Vec<String>,
}

impl Function {
  /// Embedded newlines are stripped so every entry stays a single command.
  pub fn new<I, S>(body: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      body: body.into_iter().map(clean_line).collect(),
    }
  }

  pub fn body(&self) -> &[String] {
    &self.body
  }

  pub fn push(&mut self, line: impl Into<String>) {
    self.body.push(clean_line(line));
  }

  /// Insert a command before every existing one.
  pub fn prepend(&mut self, line: impl Into<String>) {
    self.body.insert(0, clean_line(line));
  }
}

fn clean_line(line: impl Into<String>) -> String {
  line.into().replace('\n', "")
}

impl Member for Function {
  fn kind(&self) -> MemberKind {
    Self::KIND
  }

  fn save(&self, file: &mut OutputFile<'_>) -> Result<(), OutputError> {
    file.write(self.body.join("\n"));
    Ok(())
  }
}

impl MemberType for Function {
  const KIND: MemberKind = MemberKind::Function;
}

impl Mergeable for Function {
  fn merge(&mut self, other: Self) {
    self.body.extend(other.body);
  }
}
