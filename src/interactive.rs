mod commands;
mod printers;

use crate::error::Result;
use crate::mi::{MiSession, Transport};
use commands::{execute_command, CommandOutcome};
use std::io::{self, Write};

pub fn repl<T: Transport>(session: &mut MiSession<T>) -> Result<()> {
    println!("Type 'help' for commands.");
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("gdbq> ");
        io::stdout().flush()?;
        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            println!();
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let mut parts = input.splitn(2, char::is_whitespace);
        let cmd = parts.next().unwrap_or("").trim();
        let rest = parts.next().unwrap_or("").trim();
        if let CommandOutcome::Quit = execute_command(input, cmd, rest, session) {
            break;
        }
    }
    Ok(())
}
