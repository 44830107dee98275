use std::io::{self, BufRead, Write};

use anyhow::Result;
use kubesim::{Sandbox, Simulation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kubesim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting kubesim sandbox cluster");

    let mut sim = Simulation::new(Box::new(Sandbox));
    println!("kubesim sandbox: kubectl-style commands, plus `tick`, `goal`, `quit`.");
    println!("For `apply`, enter the YAML body after the command; finish with a blank line.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("kubesim> ");
        io::stdout().flush()?;
        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let line = line.trim().to_string();

        match line.as_str() {
            "" => continue,
            "quit" | "exit" => break,
            "tick" => {
                sim.tick();
                println!("tick {} complete", sim.state().tick);
            }
            "goal" => {
                println!(
                    "{}",
                    if sim.goal_reached() {
                        "goal reached"
                    } else {
                        "goal not reached"
                    }
                );
            }
            _ => {
                let mut input = line.clone();
                if line.starts_with("apply") {
                    // Collect the manifest body up to a blank line.
                    input.push('\n');
                    for body_line in lines.by_ref() {
                        let body_line = body_line?;
                        if body_line.trim().is_empty() {
                            break;
                        }
                        input.push_str(&body_line);
                        input.push('\n');
                    }
                }
                match sim.run_command(&input) {
                    Ok(output) => {
                        if !output.is_empty() {
                            println!("{}", output);
                        }
                    }
                    Err(err) => eprintln!("error: {}", err),
                }
            }
        }
    }

    Ok(())
}
