use std::io::BufRead;
use std::sync::Arc;

use snake_engine::{Speed, SpeedControl, log};
use tokio::sync::watch;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Faster,
    Slower,
    SetSpeed(Speed),
    Stop,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let command = match words.next() {
        Some("faster") | Some("+") => Command::Faster,
        Some("slower") | Some("-") => Command::Slower,
        Some("speed") => match words.next() {
            Some(name) => Command::SetSpeed(name.parse()?),
            None => return Err("Usage: speed <name>".to_string()),
        },
        Some("stop") | Some("quit") | Some("q") => Command::Stop,
        Some(other) => return Err(format!("Unknown command '{}'", other)),
        None => return Err("Empty command".to_string()),
    };
    Ok(command)
}

/// Reads commands from stdin on a plain thread so a pending read never holds
/// up shutdown.
pub fn spawn_stdin_reader(speed: Arc<SpeedControl>, stop: Arc<watch::Sender<bool>>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_command(&line) {
                Ok(Command::Faster) => log!("Speed is now {}", speed.faster()),
                Ok(Command::Slower) => log!("Speed is now {}", speed.slower()),
                Ok(Command::SetSpeed(new_speed)) => {
                    speed.set(new_speed);
                    log!("Speed is now {}", new_speed);
                }
                Ok(Command::Stop) => {
                    let _ = stop.send(true);
                    break;
                }
                Err(e) => log!("{}", e),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("faster"), Ok(Command::Faster));
        assert_eq!(parse_command("  - "), Ok(Command::Slower));
        assert_eq!(parse_command("speed unlimited"), Ok(Command::SetSpeed(Speed::Unlimited)));
        assert_eq!(parse_command("quit"), Ok(Command::Stop));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_command("speed").is_err());
        assert!(parse_command("speed ludicrous").is_err());
        assert!(parse_command("jump").is_err());
        assert!(parse_command("").is_err());
    }
}
