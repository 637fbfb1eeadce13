//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - echo-decay scrambling experiments",
        style("Kaelion").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  kaelion-ir    Circuit intermediate representation");
    println!("  kaelion-otoc  Echo circuit construction");
    println!("  kaelion-fit   Decay fitting and λ normalization");
    println!("  kaelion-run   Experiment orchestration");
    println!("  kaelion-hal   Hardware abstraction layer");
    println!("  kaelion-cli   Command-line interface");
    println!();
    println!(
        "Repository: {}",
        style("https://github.com/kaelion-lab/kaelion").underlined()
    );
    println!("License:    {}", style("Apache-2.0").dim());
}
