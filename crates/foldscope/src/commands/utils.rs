use crate::categorizer::Categorizer;
use crate::utils::config::{AnalyzerConfig, SCHEMA_VERSION};

/// Print the effective category rules in priority order
pub fn display_categories(config: &AnalyzerConfig) {
    println!("Category rules (first match wins)");
    println!();

    for (index, rule) in config.categories.iter().enumerate() {
        println!("{:>3}. {:<20} contains '{}'", index + 1, rule.name, rule.pattern);
    }
    println!("     {:<20} (no rule matched)", config.fallback_category);

    println!();
    println!(
        "Memory leaves: alloc {:?}, free {:?}",
        config.memory.alloc_patterns, config.memory.free_patterns
    );
    println!("Pattern tokens: {:?}", config.pattern_tokens);
}

/// Classify a single frame name with the effective rules
pub fn classify_frame(config: &AnalyzerConfig, frame: &str) -> String {
    Categorizer::from_config(config).classify(frame).to_string()
}

/// Display version information
pub fn display_version() {
    println!("foldscope v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Ranked, categorized reports from folded stack samples.");
}
