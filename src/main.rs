use std::sync::Arc;

use petxref::{CompareEngine, CompareMode, CompareRequest};

/// Seeds the demo catalog and runs the same comparison in both modes, so
/// `cargo run` shows the difference canonical resolution makes.
fn main() -> anyhow::Result<()> {
    let store = Arc::new(petxref::demo_store());
    let engine = CompareEngine::new(store);

    for mode in [CompareMode::Raw, CompareMode::Canonical] {
        let result = engine.compare(&CompareRequest {
            product_tokens: vec!["acme-adult-chicken".into(), "bluff-puppy-harvest".into()],
            mode,
            ..CompareRequest::default()
        })?;

        println!("=== {} mode ===", mode.as_str());
        println!("{}", serde_json::to_string_pretty(&result)?);
        println!();
    }

    Ok(())
}
