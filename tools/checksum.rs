// Simple utility to print the SHA-256 pin for a downloaded release artifact
// Usage: cargo run --bin checksum -- path/to/supercronic

use sha2::{Digest, Sha256};

fn main() {
    let path = std::env::args()
        .nth(1)
        .expect("usage: checksum <artifact-file>");

    let bytes = std::fs::read(&path).expect("Failed to read artifact");

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    println!("File: {}", path);
    println!("SHA-256: {}", digest);
}
