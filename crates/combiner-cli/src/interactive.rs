//! A `stdin`-backed [`Chooser`] for interactive `combine` runs.

use combiner_resolve::{Candidate, Chooser};
use std::io::{self, Write};

#[derive(Debug, Default)]
pub struct StdinChooser;

impl Chooser for StdinChooser {
    fn pick(&mut self, entity_name: &str, candidates: &[Candidate]) -> String {
        println!("Multiple packs contribute to '{entity_name}':");
        for (i, candidate) in candidates.iter().enumerate() {
            let tag = if candidate.is_base {
                " (base)"
            } else if candidate.is_mod {
                " (mod)"
            } else {
                ""
            };
            println!("  {}. {}{tag}", i + 1, candidate.pack_name);
        }

        loop {
            print!("Choose [1-{}]: ", candidates.len());
            let _ = io::stdout().flush();
            let mut line = String::new();
            if io::stdin().read_line(&mut line).is_err() {
                return candidates[0].pack_name.clone();
            }
            if let Ok(choice) = line.trim().parse::<usize>() {
                if choice >= 1 && choice <= candidates.len() {
                    return candidates[choice - 1].pack_name.clone();
                }
            }
            println!("Not a valid choice, try again.");
        }
    }

    fn notify(&mut self, message: &str) {
        println!("--! {message}");
    }
}
