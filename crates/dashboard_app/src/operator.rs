//! Line-based operator console.
//!
//! Each line is one operator gesture. Cells are given either as two integers
//! (`hover 3 4`) or as a point (`hover (3,4)`).

use std::str::FromStr;

use dashboard_grid::{CellCoordinate, EntitySize, GridError};

/// A parsed operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    /// Choose a construct from the catalog, or `destroy`.
    Select(String),
    /// Choose an arbitrary entity type and size.
    Create {
        /// Entity type sent with the command.
        entity_type: String,
        /// Footprint.
        size: EntitySize,
    },
    /// Enter destroy mode.
    Destroy,
    /// Leave the current mode.
    Cancel,
    /// Move the cursor over a cell.
    Hover(CellCoordinate),
    /// Primary click on a cell.
    Click(CellCoordinate),
    /// Secondary click on a cell.
    Right(CellCoordinate),
    /// Print the grid.
    Show,
    /// Leave the dashboard.
    Quit,
}

/// Why an operator line could not be read as an [`OperatorCommand`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OperatorParseError {
    /// The line held no command.
    #[error("empty input")]
    Empty,

    /// The first word is not a known command.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A required argument was left out.
    #[error("{command}: missing {argument}")]
    MissingArgument {
        /// Command being parsed.
        command: &'static str,
        /// Name of the missing argument.
        argument: &'static str,
    },

    /// More arguments were given than the command takes.
    #[error("{command}: unexpected argument {value:?}")]
    UnexpectedArgument {
        /// Command being parsed.
        command: &'static str,
        /// The first extra argument.
        value: String,
    },

    /// A coordinate or size argument was not an integer.
    #[error("not a number: {0:?}")]
    InvalidNumber(String),

    /// A `(x,y)` point argument could not be parsed.
    #[error(transparent)]
    InvalidPoint(#[from] GridError),
}

impl FromStr for OperatorCommand {
    type Err = OperatorParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or(OperatorParseError::Empty)?;
        let args: Vec<&str> = words.collect();

        let command = match verb {
            "select" => {
                let [name] = exactly::<1>("select", "construct name", &args)?;
                Self::Select(name.to_string())
            }
            "create" => {
                let [entity_type, height, width] = exactly::<3>("create", "entity type, height and width", &args)?;
                Self::Create {
                    entity_type: entity_type.to_string(),
                    size: EntitySize::new(number(height)?, number(width)?),
                }
            }
            "destroy" => {
                exactly::<0>("destroy", "", &args)?;
                Self::Destroy
            }
            "cancel" | "esc" => {
                exactly::<0>("cancel", "", &args)?;
                Self::Cancel
            }
            "hover" => Self::Hover(cell("hover", &args)?),
            "click" => Self::Click(cell("click", &args)?),
            "right" => Self::Right(cell("right", &args)?),
            "show" => Self::Show,
            "quit" | "exit" => Self::Quit,
            other => return Err(OperatorParseError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

fn exactly<'a, const N: usize>(
    command: &'static str,
    argument: &'static str,
    args: &[&'a str],
) -> Result<[&'a str; N], OperatorParseError> {
    if let Some(extra) = args.get(N) {
        return Err(OperatorParseError::UnexpectedArgument {
            command,
            value: (*extra).to_string(),
        });
    }
    <[&str; N]>::try_from(args).map_err(|_| OperatorParseError::MissingArgument { command, argument })
}

fn number<T: FromStr>(word: &str) -> Result<T, OperatorParseError> {
    word.parse()
        .map_err(|_| OperatorParseError::InvalidNumber(word.to_string()))
}

fn cell(command: &'static str, args: &[&str]) -> Result<CellCoordinate, OperatorParseError> {
    match args {
        [] => Err(OperatorParseError::MissingArgument {
            command,
            argument: "cell",
        }),
        [point] => Ok(point.parse()?),
        [x, y] => Ok(CellCoordinate::new(number(x)?, number(y)?)),
        [_, _, extra, ..] => Err(OperatorParseError::UnexpectedArgument {
            command,
            value: (*extra).to_string(),
        }),
    }
}

/// Usage text printed for unparseable input.
pub const HELP: &str = "\
commands:
  select <construct>         choose a catalog construct (or `destroy`)
  create <type> <h> <w>      choose an entity type and size directly
  destroy                    enter destroy mode
  cancel                     leave the current mode
  hover <x> <y>              preview the current tool at a cell
  click <x> <y>              apply the current tool at a cell
  right <x> <y>              cancel the tool, or inspect a cell when idle
  show                       print the grid
  quit";
