//! Fit command implementation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use kaelion_fit::{alpha, fit_decay, lambda_normalized, mss_bound};

/// Execute the fit command.
pub fn execute(input: &str, t_eff: f64) -> Result<()> {
    let data = load_pairs(input)?;
    println!(
        "{} Fitting {} points from {}",
        style("→").cyan().bold(),
        data.len(),
        style(input).green()
    );

    let fit = fit_decay(&data)?;
    let lambda = lambda_normalized(fit.lambda_l, t_eff);

    println!("\n{} Fit F(d) = A·exp(-λ_L·d) + B:", style("✓").green().bold());
    println!("  A   = {:.4}", fit.amplitude);
    println!("  λ_L = {:.4} ± {:.4}", fit.lambda_l, fit.lambda_stderr);
    println!("  B   = {:.4}", fit.offset);
    println!("  SSE = {:.6}", fit.sse);
    println!("\n  MSS bound 2πT = {:.4} (T = {t_eff})", mss_bound(t_eff));
    println!("  λ = {:.4}", lambda);
    println!("  α = {:.4}", alpha(lambda));

    Ok(())
}

/// Load (depth, probability) pairs from a JSON array or a CSV file.
fn load_pairs(input: &str) -> Result<Vec<(f64, f64)>> {
    let path = Path::new(input);
    if !path.exists() {
        anyhow::bail!("File not found: {input}");
    }
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {input}"))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext.to_lowercase().as_str() {
        "json" => {
            let pairs: Vec<(f64, f64)> =
                serde_json::from_str(&text).context("Expected a JSON array of [depth, F] pairs")?;
            Ok(pairs)
        }
        _ => parse_csv(&text),
    }
}

fn parse_csv(text: &str) -> Result<Vec<(f64, f64)>> {
    let mut pairs = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        // Tolerate a header row on the first line.
        let mut fields = line.split(',').map(str::trim);
        let (Some(depth), Some(value)) = (fields.next(), fields.next()) else {
            anyhow::bail!("Line {}: expected 'depth,probability'", line_no + 1);
        };
        match (depth.parse::<f64>(), value.parse::<f64>()) {
            (Ok(d), Ok(f)) => pairs.push((d, f)),
            _ if line_no == 0 => continue,
            _ => anyhow::bail!("Line {}: could not parse '{line}'", line_no + 1),
        }
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_with_header() {
        let pairs = parse_csv("depth,otoc\n1,0.9\n2,0.7\n4,0.4\n").unwrap();
        assert_eq!(pairs, vec![(1.0, 0.9), (2.0, 0.7), (4.0, 0.4)]);
    }

    #[test]
    fn test_parse_csv_rejects_garbage_past_header() {
        assert!(parse_csv("1,0.9\nnot,numbers\n").is_err());
    }

    #[test]
    fn test_json_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.json");
        fs::write(&path, "[[1.0, 0.9], [2.0, 0.7], [4.0, 0.4]]").unwrap();
        let pairs = load_pairs(path.to_str().unwrap()).unwrap();
        assert_eq!(pairs.len(), 3);
    }
}
