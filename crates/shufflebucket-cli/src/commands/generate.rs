use std::io::Write;

use shufflebucket_core::DatasetExpander;

use super::GenerationArgs;

pub fn run(seed: u64, bits: usize, format: &str, args: &GenerationArgs) {
    let config = super::load_config(args);
    let sequence = DatasetExpander::new(config.generator, config.chunk_bits)
        .and_then(|expander| expander.expand(seed, bits))
        .unwrap_or_else(|e| super::fail_generation(seed, e));

    let mut stdout = std::io::stdout().lock();
    let written = match format {
        "hex" => {
            let hex: String = sequence.to_bytes().iter().map(|b| format!("{b:02x}")).collect();
            writeln!(stdout, "{hex}")
        }
        "raw" => stdout.write_all(&sequence.to_bytes()),
        _ => writeln!(stdout, "{}", sequence.to_bit_string()),
    };
    if let Err(e) = written.and_then(|_| stdout.flush()) {
        eprintln!("Failed to write output: {e}");
        std::process::exit(1);
    }

    let status = if sequence.ones() == sequence.zeros() {
        "balanced"
    } else {
        "unbalanced"
    };
    eprintln!(
        "seed={seed} bits={} zeros={} ones={} ({status})",
        sequence.len(),
        sequence.zeros(),
        sequence.ones()
    );
}
