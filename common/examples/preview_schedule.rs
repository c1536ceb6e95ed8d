// Print the next occurrences of a cron expression
// Usage: cargo run -p common --example preview_schedule -- "0 13 * * *"

fn main() {
    let expression = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "0 13 * * *".to_string());

    match common::schedule::upcoming(&expression, 5) {
        Ok(times) => {
            println!("Expression: {}", expression);
            for t in times {
                println!("  next: {}", t);
            }
        }
        Err(e) => {
            eprintln!("Invalid expression: {}", e);
            std::process::exit(1);
        }
    }
}
