use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::*;

/// Discrete rover instruction, one per command character.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    MoveForward,
    Turn(Turn),
    Disarm,
}

impl Instruction {
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'M' => Some(Self::MoveForward),
            'R' => Some(Self::Turn(Turn::Right)),
            'L' => Some(Self::Turn(Turn::Left)),
            'D' => Some(Self::Disarm),
            _ => None,
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            Self::MoveForward => 'M',
            Self::Turn(Turn::Right) => 'R',
            Self::Turn(Turn::Left) => 'L',
            Self::Disarm => 'D',
        }
    }
}

/// How characters outside `M`, `R`, `L`, `D` are treated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandMode {
    /// Unknown characters become inert steps.
    Lenient,
    /// Unknown characters reject the whole command string.
    Strict,
}

impl Default for CommandMode {
    fn default() -> Self {
        Self::Lenient
    }
}

/// A single command character together with what it decodes to.
///
/// `instruction` is `None` for characters that are carried along inertly in
/// lenient mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub source: char,
    pub instruction: Option<Instruction>,
}

impl From<Instruction> for Command {
    fn from(instruction: Instruction) -> Self {
        Self {
            source: instruction.as_char(),
            instruction: Some(instruction),
        }
    }
}

/// Parsed command string, in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSequence {
    commands: Vec<Command>,
}

impl CommandSequence {
    pub fn parse(input: &str, mode: CommandMode) -> Result<Self> {
        let commands = input
            .chars()
            .enumerate()
            .map(|(index, source)| {
                let instruction = Instruction::from_char(source);
                match (instruction, mode) {
                    (None, CommandMode::Strict) => Err(RoverError::InvalidCommand {
                        index,
                        found: source,
                    }),
                    _ => Ok(Command {
                        source,
                        instruction,
                    }),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let ignored = commands.iter().filter(|c| c.instruction.is_none()).count();
        if ignored > 0 {
            log::debug!("Command string carries {ignored} inert character(s)");
        }

        Ok(Self { commands })
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Command> + '_ {
        self.commands.iter().copied()
    }

    /// Decoded instructions only, skipping inert characters.
    pub fn instructions(&self) -> impl Iterator<Item = Instruction> + '_ {
        self.iter().filter_map(|command| command.instruction)
    }
}

impl FromIterator<Instruction> for CommandSequence {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().map(Command::from).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CommandSequence {
    type Item = &'a Command;
    type IntoIter = core::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
