// UI layer: an interactive menu built on `dialoguer` plus the one-shot quick
// run. Everything here is presentation; network calls go through
// `PrimesClient` and their errors are printed, never propagated, so a failed
// call does not end the session.

use crate::api::{PrimesClient, RequestId, ResultSet};
use crate::config::PollPolicy;
use crate::error::ClientError;
use crate::poll::{SystemClock, WaitOutcome};
use anyhow::Result;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub const QUICK_QUANTITY: u32 = 3;
pub const QUICK_DIGITS: u32 = 12;

const MENU_ITEMS: [&str; 5] = [
    "Create new request",
    "Check status",
    "Fetch result",
    "Create and wait for completion",
    "Exit",
];

/// Main interactive menu. Runs until the user picks "Exit".
pub fn main_menu(api: PrimesClient) -> Result<()> {
    if let Err(e) = api.health() {
        println!("Warning: service at {} is not answering ({})", api.base_url(), e);
    }

    loop {
        println!();
        let selection = Select::new()
            .with_prompt("Prime generation client")
            .items(&MENU_ITEMS)
            .default(0)
            .interact()?;
        match selection {
            0 => handle_create(&api)?,
            1 => handle_status(&api)?,
            2 => handle_result(&api)?,
            3 => handle_create_and_wait(&api)?,
            _ => {
                println!("Bye!");
                break;
            }
        }
    }
    Ok(())
}

/// Non-interactive run: request 3 primes of 12 digits, wait with the default
/// policy and print them.
pub fn quick(api: &PrimesClient) -> Result<()> {
    println!(
        "Quick run: requesting {} primes of {} digits...",
        QUICK_QUANTITY, QUICK_DIGITS
    );
    let id = match api.create(QUICK_QUANTITY, QUICK_DIGITS) {
        Ok(id) => id,
        Err(e) => {
            report(&e);
            println!("Could not create request");
            return Ok(());
        }
    };
    println!("✓ Request created: {}", id);

    let policy = PollPolicy::default();
    println!("Waiting for completion...");
    match wait_with_progress(api, &id, policy)? {
        WaitOutcome::Completed { .. } => {
            println!("✓ Completed!");
            fetch_and_print(api, &id);
        }
        WaitOutcome::TimedOut { .. } => println!("✗ Maximum wait reached"),
        WaitOutcome::Aborted { error, .. } => report(&error),
    }
    Ok(())
}

fn prompt_positive(prompt: &str) -> Result<u32> {
    let value = Input::<u32>::new()
        .with_prompt(prompt)
        .validate_with(|v: &u32| -> Result<(), &str> {
            if *v > 0 {
                Ok(())
            } else {
                Err("must be a positive number")
            }
        })
        .interact_text()?;
    Ok(value)
}

fn prompt_id() -> Result<RequestId> {
    let raw: String = Input::new().with_prompt("Request ID").interact_text()?;
    Ok(RequestId::new(raw.trim()))
}

fn handle_create(api: &PrimesClient) -> Result<()> {
    let quantity = prompt_positive("How many primes")?;
    let digits = prompt_positive("Digits per prime")?;
    match api.create(quantity, digits) {
        Ok(id) => {
            println!("✓ Request created: {}", id);
            println!("Keep this ID to check on it later: {}", id);
        }
        Err(e) => report(&e),
    }
    Ok(())
}

fn handle_status(api: &PrimesClient) -> Result<()> {
    let id = prompt_id()?;
    match api.status(&id) {
        Ok(snapshot) => {
            println!("✓ Status:");
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Err(e) => report(&e),
    }
    Ok(())
}

fn handle_result(api: &PrimesClient) -> Result<()> {
    let id = prompt_id()?;
    match api.result(&id) {
        Ok(result) => {
            println!("✓ Result:");
            println!("  ID: {}", result.id);
            println!("  Primes ({} found):", result.primos.len());
            for prime in &result.primos {
                println!("    - {}", prime);
            }
        }
        Err(e) => report(&e),
    }
    Ok(())
}

fn handle_create_and_wait(api: &PrimesClient) -> Result<()> {
    let quantity = prompt_positive("How many primes")?;
    let digits = prompt_positive("Digits per prime")?;
    let max_wait: u64 = Input::new()
        .with_prompt("Maximum wait (seconds)")
        .default(PollPolicy::default().max_wait.as_secs())
        .interact_text()?;

    let id = match api.create(quantity, digits) {
        Ok(id) => id,
        Err(e) => {
            report(&e);
            return Ok(());
        }
    };
    println!("✓ Request created: {}", id);

    let policy = PollPolicy::default().with_max_wait_secs(max_wait);
    println!("⏳ Waiting for completion...");
    match wait_with_progress(api, &id, policy)? {
        WaitOutcome::Completed { .. } => {
            println!("✓ Completed!");
            fetch_and_print(api, &id);
        }
        WaitOutcome::TimedOut { .. } => {
            println!("✗ Maximum wait ({}s) reached", max_wait);
            match api.status(&id) {
                Ok(snapshot) => {
                    println!("  Progress: {}/{}", snapshot.generados, snapshot.cantidad)
                }
                Err(e) => report(&e),
            }
        }
        WaitOutcome::Aborted { error, .. } => report(&error),
    }
    Ok(())
}

/// Run the polling loop on the wall clock with a progress bar that follows
/// the generated count.
fn wait_with_progress(
    api: &PrimesClient,
    id: &RequestId,
    policy: PollPolicy,
) -> Result<WaitOutcome> {
    let bar = ProgressBar::new(0);
    bar.set_style(ProgressStyle::with_template(
        "{spinner} [{elapsed_precise}] [{bar:30}] {pos}/{len} primes",
    )?);
    bar.enable_steady_tick(Duration::from_millis(120));

    let outcome = api.poll_until_complete(id, policy, &SystemClock, |progress| {
        bar.set_length(progress.requested);
        bar.set_position(progress.generated.min(progress.requested));
    });
    bar.finish_and_clear();
    Ok(outcome)
}

fn fetch_and_print(api: &PrimesClient, id: &RequestId) {
    match api.result(id) {
        Ok(result) => print_primes(&result),
        Err(e) => report(&e),
    }
}

fn print_primes(result: &ResultSet) {
    println!("Generated primes:");
    for prime in &result.primos {
        println!("  - {}", prime);
    }
}

/// Console diagnostic for a failed call.
fn report(err: &ClientError) {
    match err {
        ClientError::NotFound { id } => println!("✗ Request not found: {}", id),
        ClientError::Transport(e) => println!("✗ Connection error: {}", e),
        ClientError::Server { status, message } => {
            println!("✗ Server error: {}", status);
            if !message.is_empty() {
                println!("  {}", message);
            }
        }
        ClientError::Decode { .. } => println!("✗ Unexpected response: {}", err),
    }
}
