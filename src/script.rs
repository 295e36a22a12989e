use std::io::{IsTerminal, Write};

use clap::Args;
use linked_stack::{Stack, StackError};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::*;

#[derive(Args, Debug)]
pub struct ScriptArgs {
    /// Abort on the first pop or peek against an empty stack.
    #[arg(short, long)]
    strict: bool,
    /// Commands separated by `;`. Read from stdin when omitted.
    #[arg(name = "COMMANDS")]
    commands: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Push(String),
    Pop,
    Peek,
    Empty,
    Len,
    Show,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: unknown command `{word}`")]
    UnknownCommand { line: usize, word: String },

    #[error("line {line}: `push` needs a value")]
    MissingValue { line: usize },

    #[error("line {line}: `{word}` takes no arguments")]
    UnexpectedArgument { line: usize, word: String },
}

pub async fn execute_script(args: ScriptArgs) -> anyhow::Result<()> {
    let source = read_source(
        &args.commands,
        std::io::stdin().is_terminal(),
        tokio::io::stdin(),
    )
    .await?;

    let commands = parse(&source)?;
    info!("Parsed {} commands", commands.len());

    let mut stdout = std::io::stdout().lock();
    run(&commands, args.strict, &mut stdout)?;

    Ok(())
}

/// Picks the script text: `commands` joined with `;` turned into line breaks,
/// or everything piped into `input` when no commands were given.
async fn read_source<R: AsyncRead + Unpin>(
    commands: &[String],
    input_is_terminal: bool,
    mut input: R,
) -> anyhow::Result<String> {
    if !commands.is_empty() {
        return Ok(commands.join(" ").replace(';', "\n"));
    }
    if input_is_terminal {
        anyhow::bail!("no commands given and stdin is a terminal");
    }

    let mut buf = Vec::with_capacity(256);
    input.read_to_end(&mut buf).await?;
    debug!("Read {} bytes of script from stdin", buf.len());
    Ok(String::from_utf8_lossy(&buf).to_string())
}

/// Parses a script into commands. `push` keeps the remainder of its line
/// as the value, so values may contain spaces.
pub fn parse(source: &str) -> Result<Vec<Command>, ParseError> {
    let mut commands = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let (word, rest) = match text.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (text, ""),
        };

        let command = match word {
            "push" if rest.is_empty() => return Err(ParseError::MissingValue { line }),
            "push" => Command::Push(rest.to_string()),
            "pop" => Command::Pop,
            "peek" => Command::Peek,
            "empty" => Command::Empty,
            "len" => Command::Len,
            "show" => Command::Show,
            _ => {
                return Err(ParseError::UnknownCommand {
                    line,
                    word: word.to_string(),
                })
            }
        };

        if !rest.is_empty() && !matches!(command, Command::Push(_)) {
            return Err(ParseError::UnexpectedArgument {
                line,
                word: word.to_string(),
            });
        }
        commands.push(command);
    }
    Ok(commands)
}

/// Runs `commands` against a fresh stack, writing one line per command that
/// produces output. Returns the stack in its final state.
pub fn run<W: Write>(
    commands: &[Command],
    strict: bool,
    out: &mut W,
) -> anyhow::Result<Stack<String>> {
    let mut stack = Stack::new();
    for command in commands {
        debug!("Running {:?}", command);
        let printed: Result<Option<String>, StackError> = match command {
            Command::Push(value) => {
                stack.push(value.clone());
                Ok(None)
            }
            Command::Pop => stack.pop().map(Some),
            Command::Peek => stack.peek().map(|value| Some(value.clone())),
            Command::Empty => Ok(Some(stack.is_empty().to_string())),
            Command::Len => Ok(Some(stack.len().to_string())),
            Command::Show => Ok(Some(stack.to_string())),
        };

        match printed {
            Ok(Some(line)) => writeln!(out, "{}", line)?,
            Ok(None) => {}
            Err(e) if strict => return Err(e.into()),
            Err(e) => {
                info!("{:?} failed: {}", command, e);
                writeln!(out, "error: {}", e)?;
            }
        }
    }
    Ok(stack)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(source: &str, strict: bool) -> (anyhow::Result<Stack<String>>, String) {
        let commands = parse(source).unwrap();
        let mut buf = Vec::new();
        let res = run(&commands, strict, &mut buf);
        (res, String::from_utf8(buf).unwrap())
    }

    #[test]
    fn test_parse_commands() {
        let source = "\
# build a stack
push 10
push hello world

pop
peek
empty
len
show
";
        assert_eq!(
            parse(source).unwrap(),
            vec![
                Command::Push("10".into()),
                Command::Push("hello world".into()),
                Command::Pop,
                Command::Peek,
                Command::Empty,
                Command::Len,
                Command::Show,
            ]
        );
    }

    #[test]
    fn test_parse_errors_report_line() {
        assert_eq!(
            parse("push 1\nshove 2"),
            Err(ParseError::UnknownCommand {
                line: 2,
                word: "shove".into()
            })
        );
        assert_eq!(parse("\n\npush"), Err(ParseError::MissingValue { line: 3 }));
        assert_eq!(
            parse("pop now"),
            Err(ParseError::UnexpectedArgument {
                line: 1,
                word: "pop".into()
            })
        );
        assert_eq!(
            ParseError::MissingValue { line: 3 }.to_string(),
            "line 3: `push` needs a value"
        );
    }

    #[test]
    fn test_run_scenario() {
        let (res, out) = output(
            "push 10\npush 20\npush 30\nshow\npeek\npop\npop\nshow\nempty\npop\nempty\nlen",
            false,
        );
        assert!(res.unwrap().is_empty());
        assert_eq!(
            out,
            "Top -> 30 -> 20 -> 10 -> null\n30\n30\n20\nTop -> 10 -> null\nfalse\n10\ntrue\n0\n"
        );
    }

    #[test]
    fn test_run_reports_underflow_and_continues() {
        let (res, out) = output("pop\npeek\npush a\nlen", false);
        assert_eq!(res.unwrap().len(), 1);
        assert_eq!(out, "error: Stack is empty\nerror: Stack is empty\n1\n");
    }

    #[test]
    fn test_run_strict_aborts_on_underflow() {
        let (res, out) = output("push a\npop\npop\npush b", true);
        let err = res.unwrap_err();
        assert_eq!(
            err.downcast_ref::<StackError>(),
            Some(&StackError::Empty)
        );
        assert_eq!(out, "a\n");
    }

    #[tokio::test]
    async fn test_read_source_prefers_args() {
        let commands = vec!["push a;".to_string(), "pop".to_string()];
        let source = read_source(&commands, false, &b"push ignored"[..])
            .await
            .unwrap();
        assert_eq!(source, "push a\n pop");
    }

    #[tokio::test]
    async fn test_read_source_from_piped_input() {
        let piped = b"push 1\npush 2\n# done\npop\n";
        let source = read_source(&[], false, &piped[..]).await.unwrap();
        assert_eq!(
            parse(&source).unwrap(),
            vec![
                Command::Push("1".into()),
                Command::Push("2".into()),
                Command::Pop,
            ]
        );
    }

    #[tokio::test]
    async fn test_read_source_rejects_terminal() {
        let err = read_source(&[], true, &b""[..]).await.unwrap_err();
        assert_eq!(err.to_string(), "no commands given and stdin is a terminal");
    }

    #[tokio::test]
    async fn test_execute_script_from_args() {
        let _ = tracing_subscriber::fmt::try_init();

        let args = ScriptArgs {
            strict: true,
            commands: vec!["push".into(), "1;".into(), "push 2;".into(), "pop".into()],
        };
        execute_script(args).await.unwrap();
    }

    #[tokio::test]
    async fn test_execute_script_rejects_bad_command() {
        let args = ScriptArgs {
            strict: false,
            commands: vec!["frobnicate".into()],
        };
        assert!(execute_script(args).await.is_err());
    }
}
