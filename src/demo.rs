use std::io::Write;

use clap::Args;
use linked_stack::Stack;

use crate::*;

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Values to push, bottom first.
    #[arg(default_values_t = [10, 20, 30], allow_negative_numbers = true)]
    pub(crate) values: Vec<i64>,
}

pub async fn execute_demo(args: DemoArgs) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    write_demo(&args.values, &mut stdout)
}

fn write_demo<W: Write>(values: &[i64], out: &mut W) -> anyhow::Result<()> {
    if values.len() < 2 {
        anyhow::bail!("the demo needs at least two values, got {}", values.len());
    }

    let mut stack = Stack::new();
    for value in values {
        stack.push(*value);
    }
    info!("Pushed {} values", stack.len());

    let listed = values
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(out, "After push {}:", listed)?;
    writeln!(out, "{}", stack)?;

    writeln!(out, "\nTop element peek: {}", stack.peek()?)?;

    writeln!(out, "\nPopped: {}", stack.pop()?)?;
    writeln!(out, "Popped: {}", stack.pop()?)?;
    writeln!(out, "After popping:")?;
    writeln!(out, "{}", stack)?;

    writeln!(out, "\nIs stack empty? {}", stack.is_empty())?;

    while let Ok(value) = stack.pop() {
        debug!("Draining {}", value);
        writeln!(out, "Popped: {}", value)?;
    }
    writeln!(out, "Is stack empty? {}", stack.is_empty())?;

    match stack.pop() {
        Ok(value) => writeln!(out, "Popped: {}", value)?,
        Err(e) => writeln!(out, "Popping again: {}", e)?,
    }

    Ok(())
}
