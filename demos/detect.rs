//! Run both detectors on two bridged cliques and print the results.
//!
//! ```text
//! RUST_LOG=cohort=debug cargo run --example detect
//! RUST_LOG=cohort=debug cargo run --example detect -- girvan_newman
//! ```

use cohort::community::{
    format_community_result, get_community_detector, Algorithm, CommunityConfig,
};
use cohort::graph::UnGraph;
use tracing_subscriber::EnvFilter;

fn bridged_cliques() -> UnGraph<String> {
    let mut graph = UnGraph::new_undirected();
    for side in ["a", "b"] {
        for i in 0..4 {
            for j in (i + 1)..4 {
                graph.add_edge(format!("{side}{i}"), format!("{side}{j}"));
            }
        }
    }
    graph.add_edge("a3".to_string(), "b0".to_string());
    graph
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cohort=info")),
        )
        .init();

    let names: Vec<String> = match std::env::args().nth(1) {
        Some(name) => vec![name],
        None => Algorithm::ALL.iter().map(|a| a.to_string()).collect(),
    };

    let graph = bridged_cliques();
    let config = CommunityConfig::default();
    for name in names {
        let result = get_community_detector(&name, &graph)?.detect(&config)?;
        let formatted = format_community_result(&result);
        println!("{}", serde_json::to_string_pretty(&formatted.to_json()?)?);
    }
    Ok(())
}
